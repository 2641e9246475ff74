//! Small text scans that fill the BreedDetail tabs from free-form sections.
//!
//! None of these fail: when a pattern does not match, the caller gets a
//! fixed Italian placeholder instead.

use once_cell::sync::Lazy;
use regex::Regex;

pub const DA_DEFINIRE: &str = "Da definire";
pub const IN_ARRIVO: &str = "Informazioni in arrivo";

/// Longest list returned by [`split_list`].
pub const MAX_LIST_ITEMS: usize = 8;

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?](\s|$)").unwrap());
static COAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(pelo|mantello|manto)\b[^.;\n]{2,80}").unwrap());
static WEIGHT_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:-|–|a)\s*(\d+(?:[.,]\d+)?)\s*(kg|chili|g)\b").unwrap()
});
static WEIGHT_SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(kg|chili)\b").unwrap());
static HEIGHT_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:-|–|a)\s*(\d+(?:[.,]\d+)?)\s*cm\b").unwrap()
});
static HEIGHT_SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*cm\b").unwrap());
static LIFESPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:-|–|a)\s*(\d+)\s*anni").unwrap()
});
static LIST_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,.;\n•]+").unwrap());
static LIST_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[-*]\s*|e\s+|ed\s+)").unwrap());

/// Traits looked for in behavior text: (stem, label).
const TRAITS: &[(&str, &str)] = &[
    ("affettuos", "Affettuoso"),
    ("amichevol", "Amichevole"),
    ("intelligent", "Intelligente"),
    ("energic", "Energico"),
    ("giocos", "Giocoso"),
    ("vivac", "Vivace"),
    ("calm", "Calmo"),
    ("tranquill", "Tranquillo"),
    ("leal", "Leale"),
    ("fedel", "Fedele"),
    ("docil", "Docile"),
    ("socievol", "Socievole"),
    ("protettiv", "Protettivo"),
    ("indipendent", "Indipendente"),
    ("testard", "Testardo"),
    ("curios", "Curioso"),
];

/// Size words in the order they are checked.
const SIZE_WORDS: &[(&str, &str)] = &[
    ("gigant", "Gigante"),
    ("toy", "Toy"),
    ("nano", "Piccola"),
    ("nana", "Piccola"),
    ("piccol", "Piccola"),
    ("medio", "Media"),
    ("media", "Media"),
    ("grand", "Grande"),
];

pub const CHILDREN_WORDS: &[&str] = &["bambin", "famigli"];
pub const ANIMALS_WORDS: &[&str] = &["altri animali", "altri cani", "gatti", "animali"];
pub const FEEDING_WORDS: &[&str] = &["alimentazion", "dieta", "cibo", "pasti", "crocchett"];
pub const EXERCISE_WORDS: &[&str] = &["esercizi", "attività", "passeggiat", "moviment", "sport"];
pub const GROOMING_WORDS: &[&str] = &["spazzol", "toelettatura", "pelo", "bagn", "tosatura"];

/// First sentence of `text`, or `None` for blank text.
pub fn first_sentence(text: &str) -> Option<String> {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return None;
    }
    let end = SENTENCE_END
        .find(&flat)
        .map(|m| m.start() + 1)
        .unwrap_or(flat.len());
    Some(flat[..end].trim().to_string())
}

/// Sentences of `text`, whitespace flattened.
fn sentences(text: &str) -> Vec<String> {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(&flat) {
        let end = m.start() + 1;
        let s = flat[start..end].trim();
        if !s.is_empty() {
            out.push(s.to_string());
        }
        start = m.end();
    }
    let tail = flat[start..].trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }
    out
}

/// First sentence mentioning any of `words` (case-insensitive stems).
pub fn sentence_with(text: &str, words: &[&str]) -> Option<String> {
    sentences(text).into_iter().find(|s| {
        let lower = s.to_lowercase();
        words.iter().any(|w| lower.contains(w))
    })
}

/// Coat description such as `"pelo corto e denso"`.
pub fn extract_coat(text: &str) -> Option<String> {
    COAT.find(text).map(|m| capitalize(m.as_str().trim()))
}

fn number(s: &str) -> String {
    s.replace(',', ".")
}

pub fn extract_weight(text: &str) -> Option<String> {
    if let Some(c) = WEIGHT_RANGE.captures(text) {
        let unit = normalize_weight_unit(&c[3]);
        return Some(format!("{}-{} {}", number(&c[1]), number(&c[2]), unit));
    }
    WEIGHT_SINGLE
        .captures(text)
        .map(|c| format!("{} kg", number(&c[1])))
}

fn normalize_weight_unit(unit: &str) -> &'static str {
    if unit.eq_ignore_ascii_case("g") {
        "g"
    } else {
        "kg"
    }
}

pub fn extract_height(text: &str) -> Option<String> {
    if let Some(c) = HEIGHT_RANGE.captures(text) {
        return Some(format!("{}-{} cm", number(&c[1]), number(&c[2])));
    }
    HEIGHT_SINGLE
        .captures(text)
        .map(|c| format!("{} cm", number(&c[1])))
}

pub fn extract_lifespan(text: &str) -> Option<String> {
    LIFESPAN
        .captures(text)
        .map(|c| format!("{}-{} anni", &c[1], &c[2]))
}

/// Size class from a size word in `text`.
pub fn size_class(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    SIZE_WORDS
        .iter()
        .find(|(stem, _)| words.iter().any(|w| w.starts_with(stem)))
        .map(|(_, label)| *label)
}

/// Temperament labels whose stem appears in `text`, in table order.
pub fn temperament_traits(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    TRAITS
        .iter()
        .filter(|(stem, _)| words.iter().any(|w| w.starts_with(stem)))
        .map(|(_, label)| label.to_string())
        .collect()
}

/// Split a free-form list on commas, periods, semicolons and newlines.
/// Items are trimmed, capitalized and de-duplicated; at most
/// [`MAX_LIST_ITEMS`] are returned.
pub fn split_list(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for piece in LIST_SPLIT.split(text) {
        let item = LIST_BULLET.replace(piece.trim(), "");
        let item = item.trim();
        if item.chars().count() < 2 {
            continue;
        }
        let item = capitalize(item);
        if out.iter().any(|o| o.eq_ignore_ascii_case(&item)) {
            continue;
        }
        out.push(item);
        if out.len() == MAX_LIST_ITEMS {
            break;
        }
    }
    out
}

/// A 1–5 score; missing values default to 3.
pub fn score(value: Option<i64>) -> u8 {
    value.map_or(3, |v| v.clamp(1, 5) as u8)
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `value` or the placeholder.
pub fn or_fallback(value: Option<String>, fallback: &str) -> String {
    value.unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sentence_stops_at_terminator() {
        assert_eq!(
            first_sentence("Cane   energico e leale. Ama correre!").as_deref(),
            Some("Cane energico e leale.")
        );
        assert_eq!(first_sentence("Senza punto").as_deref(), Some("Senza punto"));
        assert_eq!(first_sentence("v1.2 resta intero").as_deref(), Some("v1.2 resta intero"));
        assert_eq!(first_sentence("  "), None);
    }

    #[test]
    fn sentence_with_keyword() {
        let text = "Cane vivace. Ottimo con i bambini e la famiglia. Tollera poco i gatti.";
        assert_eq!(
            sentence_with(text, CHILDREN_WORDS).as_deref(),
            Some("Ottimo con i bambini e la famiglia.")
        );
        assert_eq!(
            sentence_with(text, ANIMALS_WORDS).as_deref(),
            Some("Tollera poco i gatti.")
        );
        assert_eq!(sentence_with(text, FEEDING_WORDS), None);
    }

    #[test]
    fn coat_weight_height_lifespan() {
        let text = "Ha un pelo corto e denso; pesa 25-36 kg e misura 54–62 cm. Vive 10 a 12 anni.";
        assert_eq!(extract_coat(text).as_deref(), Some("Pelo corto e denso"));
        assert_eq!(extract_weight(text).as_deref(), Some("25-36 kg"));
        assert_eq!(extract_height(text).as_deref(), Some("54-62 cm"));
        assert_eq!(extract_lifespan(text).as_deref(), Some("10-12 anni"));

        assert_eq!(extract_weight("circa 3,5 kg").as_deref(), Some("3.5 kg"));
        assert_eq!(extract_height("alto 30 cm").as_deref(), Some("30 cm"));
        assert_eq!(extract_weight("nessun dato"), None);
        assert_eq!(extract_coat("nessun dato"), None);
    }

    #[test]
    fn size_and_traits() {
        assert_eq!(size_class("Cane di taglia grande"), Some("Grande"));
        assert_eq!(size_class("razza gigante"), Some("Gigante"));
        assert_eq!(size_class("Barboncino toy"), Some("Toy"));
        assert_eq!(size_class("niente"), None);
        assert_eq!(
            temperament_traits("Molto affettuoso, intelligente e un po' testardo."),
            vec!["Affettuoso", "Intelligente", "Testardo"]
        );
        assert!(temperament_traits("").is_empty());
    }

    #[test]
    fn list_splitting() {
        assert_eq!(
            split_list("displasia dell'anca, atrofia retinica. e displasia dell'anca; - otiti"),
            vec!["Displasia dell'anca", "Atrofia retinica", "Otiti"]
        );
        let many = (0..20).map(|i| format!("voce {i}")).collect::<Vec<_>>().join(", ");
        assert_eq!(split_list(&many).len(), MAX_LIST_ITEMS);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn scores_clamp_and_default() {
        assert_eq!(score(None), 3);
        assert_eq!(score(Some(0)), 1);
        assert_eq!(score(Some(4)), 4);
        assert_eq!(score(Some(9)), 5);
    }
}
