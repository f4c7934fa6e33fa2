//! Translation bundle loading from JSON strings and directories.

use super::{Language, TranslationCatalog, Translations};
use crate::error::{Result, ShelfError};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

/// Parse a single-language bundle.
pub fn translations_from_json_str(json: &str) -> Result<Translations> {
    Ok(serde_json::from_str(json)?)
}

/// Parse an object keyed by language code (`{"en": {...}, "es": {...}}`).
///
/// Unknown language codes are an error so typos don't silently fall back to
/// English.
pub fn catalog_from_json_str(json: &str) -> Result<TranslationCatalog> {
    let raw: HashMap<String, Translations> = serde_json::from_str(json)?;
    let mut catalog = TranslationCatalog::new();

    for (code, translations) in raw {
        let language =
            Language::from_tag(&code).ok_or_else(|| ShelfError::UnknownLanguage(code.clone()))?;
        catalog.add_bundle(language, translations);
    }

    Ok(catalog)
}

/// Load every `{code}.json` bundle in a directory.
///
/// Files whose stem is not a supported language are skipped, and so are
/// bundles that fail to parse (with a warning).
pub fn load_from_directory<P: AsRef<Path>>(dir: P) -> Result<TranslationCatalog> {
    let dir = dir.as_ref();
    let mut catalog = TranslationCatalog::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(language) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(Language::from_tag)
        else {
            debug!("skipping {}: not a language bundle", path.display());
            continue;
        };

        let contents = std::fs::read_to_string(&path)?;
        match translations_from_json_str(&contents) {
            Ok(translations) => catalog.add_bundle(language, translations),
            Err(e) => warn!("failed to parse bundle {}: {}", path.display(), e),
        }
    }

    if catalog.bundle(Language::FALLBACK).is_none() {
        warn!(
            "no '{}' bundle in {}; missing keys will have no fallback",
            Language::FALLBACK,
            dir.display()
        );
    }

    Ok(catalog)
}
