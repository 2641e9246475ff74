//! Folder-name lookup tables.
//!
//! Source trees are organized as `<category-folder>/<species-folder>/...`
//! with human folder names (`01-Animali domestici/Cani/`). These tables turn
//! them into the canonical ids used in the Markdown and JSON trees, and hold
//! the display labels and emoji the JSON builder attaches to each species.

use anyhow::Result;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Component, Path};

use crate::models::Placement;
use crate::slug::slugify;

/// Category used when the first folder matches no entry.
pub const FALLBACK_CATEGORY: &str = "altro";

/// Emoji used for species without a dedicated one.
pub const DEFAULT_EMOJI: &str = "🐾";

/// Prefix match on the slugified first folder (ordinal prefix removed).
pub const CATEGORY_FOLDERS: &[(&str, &str)] = &[
    ("animali-domestici", "domestici"),
    ("domestici", "domestici"),
    ("cani", "domestici"),
    ("gatti", "domestici"),
    ("piccoli-mammiferi", "piccoli-mammiferi"),
    ("roditori", "piccoli-mammiferi"),
    ("mammiferi", "piccoli-mammiferi"),
    ("uccelli", "uccelli"),
    ("volatili", "uccelli"),
    ("rettili", "rettili"),
    ("anfibi", "anfibi"),
    ("pesci", "acquatici"),
    ("acquari", "acquatici"),
    ("acquatici", "acquatici"),
    ("fattoria", "fattoria"),
    ("equini", "fattoria"),
    ("esotici", "esotici"),
    ("invertebrati", "esotici"),
];

/// Matched against the hyphen-separated words of every slugified folder.
/// Declaration order decides which entry wins when several match.
pub const SPECIES_FOLDERS: &[(&str, &str)] = &[
    ("cani", "dog"),
    ("cane", "dog"),
    ("gatti", "cat"),
    ("gatto", "cat"),
    ("conigli", "rabbit"),
    ("coniglio", "rabbit"),
    ("criceti", "hamster"),
    ("criceto", "hamster"),
    ("porcellini", "guinea-pig"),
    ("porcellino", "guinea-pig"),
    ("cavie", "guinea-pig"),
    ("cavia", "guinea-pig"),
    ("furetti", "ferret"),
    ("furetto", "ferret"),
    ("cincilla", "chinchilla"),
    ("cavalli", "horse"),
    ("cavallo", "horse"),
    ("pony", "horse"),
    ("asini", "donkey"),
    ("asino", "donkey"),
    ("capre", "goat"),
    ("capra", "goat"),
    ("pecore", "sheep"),
    ("pecora", "sheep"),
    ("galline", "chicken"),
    ("gallina", "chicken"),
    ("pappagalli", "parrot"),
    ("pappagallo", "parrot"),
    ("canarini", "canary"),
    ("canarino", "canary"),
    ("uccelli", "bird"),
    ("uccello", "bird"),
    ("tartarughe", "turtle"),
    ("tartaruga", "turtle"),
    ("serpenti", "snake"),
    ("serpente", "snake"),
    ("gechi", "lizard"),
    ("geco", "lizard"),
    ("lucertole", "lizard"),
    ("lucertola", "lizard"),
    ("iguane", "lizard"),
    ("iguana", "lizard"),
    ("pesci", "fish"),
    ("pesce", "fish"),
    ("anfibi", "amphibian"),
    ("anfibio", "amphibian"),
];

/// Species id → (display label, emoji).
const SPECIES_DISPLAY: &[(&str, &str, &str)] = &[
    ("dog", "Cane", "🐕"),
    ("cat", "Gatto", "🐈"),
    ("rabbit", "Coniglio", "🐇"),
    ("hamster", "Criceto", "🐹"),
    ("guinea-pig", "Porcellino d'India", "🐹"),
    ("ferret", "Furetto", "🦦"),
    ("chinchilla", "Cincillà", "🐭"),
    ("horse", "Cavallo", "🐎"),
    ("donkey", "Asino", "🫏"),
    ("goat", "Capra", "🐐"),
    ("sheep", "Pecora", "🐑"),
    ("chicken", "Gallina", "🐔"),
    ("parrot", "Pappagallo", "🦜"),
    ("canary", "Canarino", "🐤"),
    ("bird", "Uccello", "🐦"),
    ("turtle", "Tartaruga", "🐢"),
    ("snake", "Serpente", "🐍"),
    ("lizard", "Lucertola", "🦎"),
    ("fish", "Pesce", "🐟"),
    ("amphibian", "Anfibio", "🐸"),
];

/// Slugify a folder name and drop a leading ordinal (`"01 - Cani"` → `"cani"`).
fn folder_key(name: &str) -> String {
    let slug = slugify(name);
    match slug.split_once('-') {
        Some((head, tail)) if !tail.is_empty() && head.chars().all(|c| c.is_ascii_digit()) => {
            tail.to_string()
        }
        _ => slug,
    }
}

/// Category for the first folder of a relative path, if any entry matches.
pub fn resolve_category(first_folder: &str) -> Option<&'static str> {
    let key = folder_key(first_folder);
    CATEGORY_FOLDERS
        .iter()
        .find(|(prefix, _)| key.starts_with(prefix))
        .map(|(_, category)| *category)
}

/// First species entry (in declaration order) matching any folder.
pub fn resolve_species<'a, I>(folders: I) -> Option<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    // Pad with hyphens so "cani" matches "cani-e-gatti" but not "africani".
    let keys: Vec<String> = folders
        .into_iter()
        .map(|f| format!("-{}-", folder_key(f)))
        .collect();
    SPECIES_FOLDERS
        .iter()
        .find(|(needle, _)| {
            let word = format!("-{}-", needle);
            keys.iter().any(|k| k.contains(&word))
        })
        .map(|(_, species)| *species)
}

/// Folder names of a relative file path, file name excluded.
fn folder_segments(relative: &Path) -> Vec<String> {
    relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Decide `(category, species)` for a file path relative to the raw root.
pub fn resolve(relative: &Path) -> Placement {
    let folders = folder_segments(relative);

    let category = folders
        .first()
        .and_then(|first| resolve_category(first))
        .unwrap_or(FALLBACK_CATEGORY)
        .to_string();

    if let Some(species) = resolve_species(folders.iter().map(String::as_str)) {
        return Placement {
            category,
            species: species.to_string(),
            mapped: true,
        };
    }

    let parent = folders.last().map(|f| slugify(f)).unwrap_or_default();
    Placement {
        category: FALLBACK_CATEGORY.to_string(),
        species: if parent.is_empty() {
            FALLBACK_CATEGORY.to_string()
        } else {
            parent
        },
        mapped: false,
    }
}

/// Display label for a species id; unknown ids are title-cased.
pub fn species_label(species: &str) -> String {
    SPECIES_DISPLAY
        .iter()
        .find(|(id, _, _)| *id == species)
        .map(|(_, label, _)| label.to_string())
        .unwrap_or_else(|| title_case(&species.replace('-', " ")))
}

/// Emoji for a species id, or the generic paw.
pub fn species_emoji(species: &str) -> &'static str {
    SPECIES_DISPLAY
        .iter()
        .find(|(id, _, _)| *id == species)
        .map(|(_, _, emoji)| *emoji)
        .unwrap_or(DEFAULT_EMOJI)
}

pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// File-name patterns the batch converter never parses.
pub struct IgnoreRules {
    set: GlobSet,
}

impl IgnoreRules {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(GlobBuilder::new(pattern).case_insensitive(true).build()?);
        }
        Ok(Self {
            set: builder.build()?,
        })
    }

    pub fn is_ignored(&self, file_name: &str) -> bool {
        self.set.is_match(file_name)
    }
}
