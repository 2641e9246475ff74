//! Reader for the Markdown breed files.
//!
//! The front-matter dialect is deliberately small: `key: value` lines
//! between two `---` lines, `#` comments, and scalar values only (quoted
//! strings, integers, `null`, `true`/`false`, bare strings). Anything else
//! is ignored rather than rejected.
//!
//! The body is split on `##` headings into [`Sections`], keyed by the heading
//! lower-cased with spaces turned into underscores (`Problemi Genetici` →
//! `problemi_genetici`).

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::text_parser::PLACEHOLDER;

static KEY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*)\s*:\s*(.*)$").unwrap());
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());

/// A scalar front-matter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Null,
}

impl FrontValue {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "null" || raw == "~" {
            return FrontValue::Null;
        }
        if let Some(inner) = strip_quotes(raw, '"') {
            return FrontValue::Str(unescape(inner));
        }
        if let Some(inner) = strip_quotes(raw, '\'') {
            return FrontValue::Str(inner.replace("''", "'"));
        }
        match raw {
            "true" => return FrontValue::Bool(true),
            "false" => return FrontValue::Bool(false),
            _ => {}
        }
        if INTEGER.is_match(raw) {
            if let Ok(n) = raw.parse() {
                return FrontValue::Int(n);
            }
        }
        FrontValue::Str(raw.to_string())
    }

    /// Non-empty text form of the value; integers are rendered, `null` and
    /// blank strings are absent.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FrontValue::Str(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            FrontValue::Int(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FrontValue::Int(n) => Some(*n),
            FrontValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FrontValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

fn strip_quotes(raw: &str, quote: char) -> Option<&str> {
    if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Split a document into its front-matter map and the remaining body.
/// Without a leading `---` block the map is empty and the body is the whole
/// input.
pub fn parse_front_matter(content: &str) -> (BTreeMap<String, FrontValue>, &str) {
    let mut map = BTreeMap::new();
    let trimmed = content.trim_start_matches('\u{feff}');

    let Some(after_open) = trimmed
        .strip_prefix("---\n")
        .or_else(|| trimmed.strip_prefix("---\r\n"))
    else {
        return (map, trimmed);
    };

    let mut offset = 0;
    let mut closed = false;
    for line in after_open.split_inclusive('\n') {
        offset += line.len();
        let line = line.trim();
        if line == "---" {
            closed = true;
            break;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(caps) = KEY_VALUE.captures(line) {
            map.insert(caps[1].to_string(), FrontValue::parse(&caps[2]));
        }
    }

    if !closed {
        return (BTreeMap::new(), trimmed);
    }
    (map, &after_open[offset..])
}

/// Typed view over the front-matter keys the pipeline understands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub species: Option<String>,
    pub category: Option<String>,
    pub lang: Option<String>,
    pub fci_group: Option<String>,
    pub origin: Option<String>,
    pub lifespan: Option<String>,
    pub size: Option<String>,
    pub popularity: Option<i64>,
    pub energy: Option<i64>,
    pub affection: Option<i64>,
    pub trainability: Option<i64>,
    pub grooming: Option<i64>,
    pub health: Option<i64>,
    pub status: Option<String>,
    pub needs_review: Option<bool>,
    pub last_updated: Option<String>,
}

impl FrontMatter {
    pub fn from_map(map: &BTreeMap<String, FrontValue>) -> Self {
        let text = |key: &str| map.get(key).and_then(FrontValue::as_text);
        let int = |key: &str| map.get(key).and_then(FrontValue::as_int);
        Self {
            id: text("id"),
            name: text("name"),
            species: text("species"),
            category: text("category"),
            lang: text("lang"),
            fci_group: text("fci_group"),
            origin: text("origin"),
            lifespan: text("lifespan"),
            size: text("size"),
            popularity: int("popularity"),
            energy: int("energy"),
            affection: int("affection"),
            trainability: int("trainability"),
            grooming: int("grooming"),
            health: int("health"),
            status: text("status"),
            needs_review: map.get("needs_review").and_then(FrontValue::as_bool),
            last_updated: text("last_updated"),
        }
    }
}

/// `##` sections of a breed file plus its `#` title.
#[derive(Debug, Clone, Default)]
pub struct Sections {
    pub title: Option<String>,
    map: BTreeMap<String, String>,
}

impl Sections {
    /// Section text, or `None` when missing, blank, or still the placeholder.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map
            .get(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && *s != PLACEHOLDER)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }
}

/// Lower-cased, underscore-joined heading key.
pub fn section_key(heading: &str) -> String {
    heading
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

pub fn parse_sections(body: &str) -> Sections {
    let mut sections = Sections::default();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in body.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            if let Some((key, lines)) = current.take() {
                sections.map.insert(key, lines.join("\n").trim().to_string());
            }
            current = Some((section_key(heading), Vec::new()));
        } else if let Some(title) = line.strip_prefix("# ") {
            if sections.title.is_none() && current.is_none() {
                sections.title = Some(title.trim().to_string());
            } else if let Some((_, lines)) = current.as_mut() {
                lines.push(line);
            }
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some((key, lines)) = current {
        sections.map.insert(key, lines.join("\n").trim().to_string());
    }

    sections
}

/// A fully parsed Markdown breed file.
#[derive(Debug, Clone)]
pub struct BreedDocument {
    pub front: FrontMatter,
    pub sections: Sections,
}

impl BreedDocument {
    /// A stub has no identity and no description to show.
    pub fn is_stub(&self) -> bool {
        self.front.id.is_none() && self.front.name.is_none() && self.sections.get("descrizione").is_none()
    }
}

pub fn parse_markdown(content: &str) -> BreedDocument {
    let (map, body) = parse_front_matter(content);
    BreedDocument {
        front: FrontMatter::from_map(&map),
        sections: parse_sections(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BreedEntry;
    use crate::slug::slugify;
    use crate::text_parser::generate_markdown;
    use chrono::NaiveDate;

    #[test]
    fn parses_scalar_values() {
        let doc = "---\nid: akita\nname: \"Akita \\\"Inu\\\"\"\nalias: 'l''akita'\nfci_group: null\nenergy: 4\nneeds_review: false\n# comment: ignored\nnot a pair\n---\nbody\n";
        let (map, body) = parse_front_matter(doc);
        assert_eq!(map["id"], FrontValue::Str("akita".to_string()));
        assert_eq!(map["name"], FrontValue::Str("Akita \"Inu\"".to_string()));
        assert_eq!(map["alias"], FrontValue::Str("l'akita".to_string()));
        assert_eq!(map["fci_group"], FrontValue::Null);
        assert_eq!(map["energy"], FrontValue::Int(4));
        assert_eq!(map["needs_review"], FrontValue::Bool(false));
        assert!(!map.contains_key("comment"));
        assert_eq!(map.len(), 6);
        assert_eq!(body, "body\n");
    }

    #[test]
    fn missing_or_unclosed_block_is_empty() {
        let (map, body) = parse_front_matter("# Title\n");
        assert!(map.is_empty());
        assert_eq!(body, "# Title\n");

        let (map, _) = parse_front_matter("---\nid: x\nno end");
        assert!(map.is_empty());
    }

    #[test]
    fn typed_view_separates_null_from_value() {
        let (map, _) = parse_front_matter("---\nid: x\norigin: null\nsize: \"\"\nhealth: 5\n---\n");
        let fm = FrontMatter::from_map(&map);
        assert_eq!(fm.id.as_deref(), Some("x"));
        assert_eq!(fm.origin, None);
        assert_eq!(fm.size, None);
        assert_eq!(fm.health, Some(5));
        assert_eq!(fm.energy, None);
    }

    #[test]
    fn sections_are_keyed_and_placeholders_hidden() {
        let body = "# Labrador\n\n## Descrizione\n\nCane energico.\nSeconda riga.\n\n## Problemi Genetici\n\n_Da completare_\n\n## Cure\n\n";
        let sections = parse_sections(body);
        assert_eq!(sections.title.as_deref(), Some("Labrador"));
        assert_eq!(sections.get("descrizione"), Some("Cane energico.\nSeconda riga."));
        assert_eq!(sections.get("problemi_genetici"), None);
        assert_eq!(sections.get("cure"), None);
        assert_eq!(
            sections.keys().collect::<Vec<_>>(),
            vec!["cure", "descrizione", "problemi_genetici"]
        );
    }

    #[test]
    fn stub_detection() {
        assert!(parse_markdown("just text").is_stub());
        assert!(!parse_markdown("---\nname: X\n---\n").is_stub());
        assert!(!parse_markdown("## Descrizione\n\nQualcosa\n").is_stub());
        assert!(parse_markdown("---\nstatus: draft\n---\n## Descrizione\n\n_Da completare_\n").is_stub());
    }

    #[test]
    fn generated_markdown_round_trips_identity() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        for name in ["Labrador", "Cão de \"Água\" Português", r"Back\slash Terrier", "Shih Tzu"] {
            let breed = BreedEntry {
                name: name.to_string(),
                number: 1,
                behavior: "Docile".to_string(),
                ..Default::default()
            };
            let md = generate_markdown(&breed, "dog", "domestici", today);
            let doc = parse_markdown(&md.content);
            assert_eq!(doc.front.id.as_deref(), Some(slugify(name).as_str()));
            assert_eq!(doc.front.name.as_deref(), Some(name));
            assert_eq!(doc.front.status.as_deref(), Some("draft"));
            assert_eq!(doc.front.needs_review, Some(true));
            assert_eq!(doc.front.energy, Some(3));
            assert_eq!(doc.front.last_updated.as_deref(), Some("2024-01-02"));
            assert_eq!(doc.sections.title.as_deref(), Some(name));
            assert_eq!(doc.sections.get("comportamento"), Some("Docile"));
            assert_eq!(doc.sections.get("descrizione"), None);
        }
    }
}
