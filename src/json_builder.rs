//! Markdown breed tree → BreedDetail JSON assets.
//!
//! Reads `<content>/<lang>/<category>/<species>/*.md` and writes, under
//! `<assets>/<lang>`:
//!
//! | File | Content |
//! |------|---------|
//! | `<category>/<species>/<id>.json` | one [`BreedDetailRecord`] |
//! | `index.json` | category → species → `[{id, name, image}]` |
//! | `breeds-list.json` | flat `[{id, name, image, category, species, path}]` |
//!
//! Every output is rewritten on each run and contains no timestamps, so the
//! same Markdown input always produces byte-identical JSON.

use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::frontmatter::{parse_markdown, BreedDocument};
use crate::fsutil::write_json;
use crate::heuristics::{
    extract_coat, extract_height, extract_lifespan, extract_weight, first_sentence, or_fallback,
    score, sentence_with, size_class, split_list, temperament_traits, capitalize,
    ANIMALS_WORDS, CHILDREN_WORDS, DA_DEFINIRE, EXERCISE_WORDS, FEEDING_WORDS, GROOMING_WORDS,
    IN_ARRIVO,
};
use crate::mapping::{species_emoji, species_label, title_case};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::report::{BuildReport, FileError};
use crate::slug::slugify;

const STAGE: &str = "build";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreedDetailRecord {
    pub id: String,
    pub name: String,
    /// Display label, e.g. `"Cane"`.
    pub species: String,
    pub species_id: String,
    pub category: String,
    pub image: String,
    pub popularity: u8,
    pub origin: String,
    pub description: String,
    pub characteristics: Characteristics,
    pub dna: Dna,
    pub size: SizeInfo,
    pub temperament: Temperament,
    pub care: Care,
    pub risks: Risks,
    pub pedigree: Pedigree,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Characteristics {
    pub energy: u8,
    pub affection: u8,
    pub trainability: u8,
    pub grooming: u8,
    pub health: u8,
    pub coat: String,
    pub lifespan: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dna {
    pub fci_group: String,
    pub origin: String,
    pub ancestry: String,
    pub genetic_notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeInfo {
    pub category: String,
    pub weight: String,
    pub height: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Temperament {
    pub summary: String,
    pub traits: Vec<String>,
    pub with_children: String,
    pub with_animals: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Care {
    pub feeding: String,
    pub exercise: String,
    pub grooming: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Risks {
    pub diseases: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pedigree {
    pub recognition: String,
    pub fci_group: String,
    pub status: String,
    pub needs_review: bool,
    pub last_updated: String,
}

/// Entry of the per-language `index.json`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub id: String,
    pub name: String,
    pub image: String,
}

/// Entry of `breeds-list.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub id: String,
    pub name: String,
    pub image: String,
    pub category: String,
    pub species: String,
    pub path: String,
}

type LanguageIndex = BTreeMap<String, BTreeMap<String, Vec<IndexEntry>>>;

/// A Markdown file found at `<category>/<species>/<file>.md`.
#[derive(Debug, Clone)]
pub struct MarkdownSource {
    pub path: PathBuf,
    pub category: String,
    pub species: String,
    pub stem: String,
}

fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map a parsed breed file onto the fixed BreedDetail shape.
pub fn to_detail(doc: &BreedDocument, source: &MarkdownSource) -> BreedDetailRecord {
    let fm = &doc.front;
    let sec = &doc.sections;

    let descrizione = sec.get("descrizione").unwrap_or("");
    let comportamento = sec.get("comportamento").unwrap_or("");
    let problemi = sec.get("problemi_genetici").unwrap_or("");
    let cure = sec.get("cure").unwrap_or("");
    let all_text = [descrizione, comportamento, problemi, cure].join("\n");

    // The id names the output file, so it is always a slug.
    let id = fm
        .id
        .as_deref()
        .map(slugify)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| slugify(&source.stem));
    let name = fm
        .name
        .clone()
        .or_else(|| sec.title.clone())
        .unwrap_or_else(|| title_case(&source.stem.replace('-', " ")));
    let species_id = fm.species.clone().unwrap_or_else(|| source.species.clone());
    let category = fm.category.clone().unwrap_or_else(|| source.category.clone());
    let origin = or_fallback(fm.origin.clone(), DA_DEFINIRE);
    let fci_group = or_fallback(fm.fci_group.clone(), DA_DEFINIRE);

    let description = if descrizione.is_empty() {
        IN_ARRIVO.to_string()
    } else {
        flatten(descrizione)
    };

    BreedDetailRecord {
        image: species_emoji(&species_id).to_string(),
        species: species_label(&species_id),
        popularity: score(fm.popularity),
        description,
        characteristics: Characteristics {
            energy: score(fm.energy),
            affection: score(fm.affection),
            trainability: score(fm.trainability),
            grooming: score(fm.grooming),
            health: score(fm.health),
            coat: or_fallback(
                extract_coat(descrizione).or_else(|| extract_coat(cure)),
                DA_DEFINIRE,
            ),
            lifespan: or_fallback(
                fm.lifespan.clone().or_else(|| extract_lifespan(&all_text)),
                DA_DEFINIRE,
            ),
        },
        dna: Dna {
            fci_group: fci_group.clone(),
            origin: origin.clone(),
            ancestry: or_fallback(first_sentence(descrizione), IN_ARRIVO),
            genetic_notes: or_fallback(first_sentence(problemi), IN_ARRIVO),
        },
        size: SizeInfo {
            category: or_fallback(
                fm.size
                    .as_deref()
                    .map(capitalize)
                    .or_else(|| size_class(descrizione).map(str::to_string)),
                DA_DEFINIRE,
            ),
            weight: or_fallback(extract_weight(&all_text), DA_DEFINIRE),
            height: or_fallback(extract_height(&all_text), DA_DEFINIRE),
        },
        temperament: Temperament {
            summary: or_fallback(first_sentence(comportamento), IN_ARRIVO),
            traits: temperament_traits(&format!("{}\n{}", comportamento, descrizione)),
            with_children: or_fallback(sentence_with(comportamento, CHILDREN_WORDS), DA_DEFINIRE),
            with_animals: or_fallback(sentence_with(comportamento, ANIMALS_WORDS), DA_DEFINIRE),
        },
        care: Care {
            feeding: or_fallback(sentence_with(cure, FEEDING_WORDS), IN_ARRIVO),
            exercise: or_fallback(
                sentence_with(cure, EXERCISE_WORDS)
                    .or_else(|| sentence_with(comportamento, EXERCISE_WORDS)),
                IN_ARRIVO,
            ),
            grooming: or_fallback(sentence_with(cure, GROOMING_WORDS), IN_ARRIVO),
            notes: if cure.is_empty() {
                IN_ARRIVO.to_string()
            } else {
                flatten(cure)
            },
        },
        risks: Risks {
            diseases: split_list(problemi),
            pros: split_list(sec.get("pro").unwrap_or("")),
            cons: split_list(sec.get("contro").unwrap_or("")),
        },
        pedigree: Pedigree {
            recognition: match &fm.fci_group {
                Some(group) => format!("Riconosciuta FCI, gruppo {}", group),
                None => DA_DEFINIRE.to_string(),
            },
            fci_group,
            status: fm.status.clone().unwrap_or_else(|| "draft".to_string()),
            needs_review: fm.needs_review.unwrap_or(true),
            last_updated: or_fallback(fm.last_updated.clone(), DA_DEFINIRE),
        },
        id,
        name,
        species_id,
        category,
        origin,
    }
}

/// Breed files under `<root>/<category>/<species>/`, sorted, `_`-prefixed
/// files excluded.
pub fn scan_markdown(root: &Path) -> Result<Vec<MarkdownSource>> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(3)
        .max_depth(3)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();
        if file_name.starts_with('_') || path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        let mut parts = relative.iter().map(|p| p.to_string_lossy().into_owned());
        let (Some(category), Some(species)) = (parts.next(), parts.next()) else {
            continue;
        };
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        sources.push(MarkdownSource {
            path: path.to_path_buf(),
            category,
            species,
            stem,
        });
    }
    Ok(sources)
}

pub fn run_build(config: &Config, lang: &str, progress: &dyn ProgressReporter) -> Result<BuildReport> {
    let root = config.markdown_root(lang);
    if !root.is_dir() {
        bail!("Markdown folder does not exist: {}", root.display());
    }
    let out_root = config.assets_root(lang);

    progress.report(ProgressEvent::Discovering { stage: STAGE });
    let sources = scan_markdown(&root)?;
    tracing::info!(lang, files = sources.len(), root = %root.display(), "building breed JSON");

    let mut report = BuildReport {
        lang: lang.to_string(),
        files_seen: sources.len(),
        ..Default::default()
    };
    let mut index: LanguageIndex = BTreeMap::new();
    let mut list: Vec<ListEntry> = Vec::new();
    let total = sources.len() as u64;

    for (i, source) in sources.iter().enumerate() {
        match build_one(source, &out_root) {
            Ok(Some(record)) => {
                let image = record.image.clone();
                index
                    .entry(source.category.clone())
                    .or_default()
                    .entry(source.species.clone())
                    .or_default()
                    .push(IndexEntry {
                        id: record.id.clone(),
                        name: record.name.clone(),
                        image: image.clone(),
                    });
                list.push(ListEntry {
                    path: format!("{}/{}/{}.json", source.category, source.species, record.id),
                    id: record.id,
                    name: record.name,
                    image,
                    category: source.category.clone(),
                    species: source.species.clone(),
                });
                report.built += 1;
            }
            Ok(None) => {
                tracing::debug!(path = %source.path.display(), "skipping empty stub");
                report.skipped_stub += 1;
            }
            Err(e) => {
                tracing::warn!(path = %source.path.display(), error = %e, "failed to build breed");
                report.errors.push(FileError::new(&source.path, format!("{:#}", e)));
            }
        }
        progress.report(ProgressEvent::Processing {
            stage: STAGE,
            n: i as u64 + 1,
            total,
        });
    }

    report.categories = index.len();
    write_json(&out_root.join("index.json"), &index)?;
    write_json(&out_root.join("breeds-list.json"), &list)?;
    tracing::info!(built = report.built, out = %out_root.display(), "wrote breed index");

    Ok(report)
}

fn build_one(source: &MarkdownSource, out_root: &Path) -> Result<Option<BreedDetailRecord>> {
    let content = std::fs::read_to_string(&source.path)?;
    let doc = parse_markdown(&content);
    if doc.is_stub() {
        return Ok(None);
    }
    let record = to_detail(&doc, source);
    let out = out_root
        .join(&source.category)
        .join(&source.species)
        .join(format!("{}.json", record.id));
    write_json(&out, &record)?;
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use std::fs;
    use tempfile::TempDir;

    const LABRADOR: &str = r#"---
id: labrador
name: "Labrador Retriever"
species: dog
category: domestici
lang: it
fci_group: 8
origin: "Canada"
lifespan: null
size: grande
energy: 5
affection: 9
status: draft
needs_review: true
last_updated: 2024-03-15
---

# Labrador Retriever

## Descrizione

Cane robusto dal pelo corto e fitto. Pesa 25-36 kg e misura 54-57 cm.

## Comportamento

Affettuoso e giocoso. Ottimo con i bambini. Va d'accordo con altri animali.

## Problemi Genetici

Displasia dell'anca, atrofia retinica progressiva.

## Cure

Spazzolatura settimanale. Alimentazione controllata per evitare sovrappeso. Lunghe passeggiate ogni giorno.

## Pro

Leale, adattabile

## Contro

_Da completare_
"#;

    fn source(stem: &str) -> MarkdownSource {
        MarkdownSource {
            path: PathBuf::from(format!("{stem}.md")),
            category: "domestici".to_string(),
            species: "dog".to_string(),
            stem: stem.to_string(),
        }
    }

    #[test]
    fn maps_front_matter_and_sections() {
        let record = to_detail(&parse_markdown(LABRADOR), &source("labrador"));
        assert_eq!(record.id, "labrador");
        assert_eq!(record.name, "Labrador Retriever");
        assert_eq!(record.species, "Cane");
        assert_eq!(record.species_id, "dog");
        assert_eq!(record.image, "🐕");
        assert_eq!(record.origin, "Canada");
        assert_eq!(record.popularity, 3);
        assert_eq!(record.characteristics.energy, 5);
        assert_eq!(record.characteristics.affection, 5);
        assert_eq!(record.characteristics.health, 3);
        assert_eq!(record.characteristics.coat, "Pelo corto e fitto");
        assert_eq!(record.characteristics.lifespan, DA_DEFINIRE);
        assert_eq!(record.dna.fci_group, "8");
        assert_eq!(record.dna.ancestry, "Cane robusto dal pelo corto e fitto.");
        assert_eq!(record.size.category, "Grande");
        assert_eq!(record.size.weight, "25-36 kg");
        assert_eq!(record.size.height, "54-57 cm");
        assert_eq!(record.temperament.traits, vec!["Affettuoso", "Giocoso"]);
        assert_eq!(record.temperament.with_children, "Ottimo con i bambini.");
        assert_eq!(record.temperament.with_animals, "Va d'accordo con altri animali.");
        assert_eq!(
            record.care.feeding,
            "Alimentazione controllata per evitare sovrappeso."
        );
        assert_eq!(record.care.exercise, "Lunghe passeggiate ogni giorno.");
        assert_eq!(record.care.grooming, "Spazzolatura settimanale.");
        assert_eq!(
            record.risks.diseases,
            vec!["Displasia dell'anca", "Atrofia retinica progressiva"]
        );
        assert_eq!(record.risks.pros, vec!["Leale", "Adattabile"]);
        assert!(record.risks.cons.is_empty());
        assert_eq!(record.pedigree.recognition, "Riconosciuta FCI, gruppo 8");
        assert_eq!(record.pedigree.status, "draft");
        assert!(record.pedigree.needs_review);
        assert_eq!(record.pedigree.last_updated, "2024-03-15");
    }

    #[test]
    fn missing_data_uses_fallbacks() {
        let doc = parse_markdown("## Descrizione\n\nUn coniglio.\n");
        let mut src = source("ariete-nano");
        src.species = "rabbit".to_string();
        let record = to_detail(&doc, &src);
        assert_eq!(record.id, "ariete-nano");
        assert_eq!(record.name, "Ariete Nano");
        assert_eq!(record.species, "Coniglio");
        assert_eq!(record.origin, DA_DEFINIRE);
        assert_eq!(record.temperament.summary, IN_ARRIVO);
        assert_eq!(record.care.notes, IN_ARRIVO);
        assert_eq!(record.size.weight, DA_DEFINIRE);
        assert_eq!(record.pedigree.recognition, DA_DEFINIRE);
        assert!(record.risks.diseases.is_empty());
    }

    #[test]
    fn unknown_species_gets_paw() {
        let mut src = source("x");
        src.species = "axolotl".to_string();
        let record = to_detail(&parse_markdown("---\nname: Axolotl\n---\n"), &src);
        assert_eq!(record.image, "🐾");
        assert_eq!(record.species, "Axolotl");
        assert_eq!(record.description, IN_ARRIVO);
    }

    #[test]
    fn json_uses_camel_case() {
        let record = to_detail(&parse_markdown(LABRADOR), &source("labrador"));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("speciesId").is_some());
        assert!(json["dna"].get("geneticNotes").is_some());
        assert!(json["temperament"].get("withChildren").is_some());
        assert!(json["pedigree"].get("needsReview").is_some());
    }

    fn setup(tmp: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.content = tmp.path().join("content");
        config.paths.assets = tmp.path().join("assets");
        let dogs = config.markdown_root("it").join("domestici").join("dog");
        fs::create_dir_all(&dogs).unwrap();
        fs::write(dogs.join("labrador.md"), LABRADOR).unwrap();
        fs::write(dogs.join("_index.json"), "{}").unwrap();
        fs::write(dogs.join("_bozza.md"), "---\nname: Bozza\n---\n").unwrap();
        fs::write(dogs.join("vuoto.md"), "niente qui\n").unwrap();
        fs::write(config.markdown_root("it").join("index.json"), "{}").unwrap();
        config
    }

    #[test]
    fn run_build_writes_records_and_indexes() {
        let tmp = TempDir::new().unwrap();
        let config = setup(&tmp);
        let report = run_build(&config, "it", &NoProgress).unwrap();
        assert_eq!(report.files_seen, 2);
        assert_eq!(report.built, 1);
        assert_eq!(report.skipped_stub, 1);
        assert!(report.errors.is_empty());

        let out = config.assets_root("it");
        assert!(out.join("domestici/dog/labrador.json").exists());
        assert!(!out.join("domestici/dog/bozza.json").exists());

        let index: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("index.json")).unwrap()).unwrap();
        assert_eq!(index["domestici"]["dog"][0]["id"], "labrador");
        assert_eq!(index["domestici"]["dog"][0]["image"], "🐕");

        let list: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("breeds-list.json")).unwrap())
                .unwrap();
        assert_eq!(list[0]["path"], "domestici/dog/labrador.json");
        assert_eq!(list[0]["name"], "Labrador Retriever");
    }

    #[test]
    fn run_build_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        let config = setup(&tmp);
        let out = config.assets_root("it");
        run_build(&config, "it", &NoProgress).unwrap();
        let first = fs::read(out.join("domestici/dog/labrador.json")).unwrap();
        let first_list = fs::read(out.join("breeds-list.json")).unwrap();
        run_build(&config, "it", &NoProgress).unwrap();
        assert_eq!(first, fs::read(out.join("domestici/dog/labrador.json")).unwrap());
        assert_eq!(first_list, fs::read(out.join("breeds-list.json")).unwrap());
    }

    #[test]
    fn edited_id_stays_inside_the_assets_tree() {
        let tmp = TempDir::new().unwrap();
        let config = setup(&tmp);
        let dogs = config.markdown_root("it").join("domestici").join("dog");
        fs::write(
            dogs.join("labrador.md"),
            LABRADOR.replace("id: labrador", "id: ../../../../fuori"),
        )
        .unwrap();

        let report = run_build(&config, "it", &NoProgress).unwrap();
        assert_eq!(report.built, 1);
        let assets = config.assets_root("it");
        assert!(assets.join("domestici/dog/fuori.json").exists());
        assert!(!tmp.path().join("fuori.json").exists());
        assert!(!assets.join("fuori.json").exists());

        let record = to_detail(
            &parse_markdown(&LABRADOR.replace("id: labrador", "id: \"???\"")),
            &source("labrador"),
        );
        assert_eq!(record.id, "labrador");
    }

    #[test]
    fn missing_language_folder_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.content = tmp.path().join("content");
        let err = run_build(&config, "de", &NoProgress).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
