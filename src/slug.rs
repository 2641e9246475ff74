//! Slug generation for breed ids, file names and folder keys.
//!
//! A slug is lowercase ASCII: accented Latin letters are folded to their
//! base letter, every other run of non-alphanumeric characters becomes a
//! single `-`, and the result never starts or ends with `-`.

/// Convert a display name to a slug (`"Bouledogue Français"` → `"bouledogue-francais"`).
pub fn slugify(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut pending_separator = false;

    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            push_slug_char(&mut result, &mut pending_separator, c);
            continue;
        }
        let folded = fold_char(c);
        if folded.is_empty() {
            pending_separator = true;
            continue;
        }
        for f in folded.chars() {
            push_slug_char(&mut result, &mut pending_separator, f);
        }
    }

    result
}

fn push_slug_char(out: &mut String, pending_separator: &mut bool, c: char) {
    if *pending_separator && !out.is_empty() {
        out.push('-');
    }
    *pending_separator = false;
    out.push(c.to_ascii_lowercase());
}

/// Fold one non-ASCII character to its ASCII spelling. Returns `""` for
/// anything that is not a Latin letter.
fn fold_char(c: char) -> &'static str {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä'
        | 'Å' | 'Ā' | 'Ă' | 'Ą' => "a",
        'ç' | 'ć' | 'č' | 'Ç' | 'Ć' | 'Č' => "c",
        'ď' | 'đ' | 'Ď' | 'Đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' | 'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė'
        | 'Ę' | 'Ě' => "e",
        'ğ' | 'Ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' | 'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' | 'İ' => {
            "i"
        }
        'ł' | 'ľ' | 'Ł' | 'Ľ' => "l",
        'ñ' | 'ń' | 'ň' | 'Ñ' | 'Ń' | 'Ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø'
        | 'Ō' | 'Ő' => "o",
        'ř' | 'Ř' => "r",
        'ś' | 'š' | 'ş' | 'Ś' | 'Š' | 'Ş' => "s",
        'ť' | 'ţ' | 'Ť' | 'Ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' | 'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů'
        | 'Ű' | 'Ų' => "u",
        'ý' | 'ÿ' | 'Ý' | 'Ÿ' => "y",
        'ź' | 'ż' | 'ž' | 'Ź' | 'Ż' | 'Ž' => "z",
        'ß' => "ss",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        'þ' | 'Þ' => "th",
        _ => "",
    }
}
