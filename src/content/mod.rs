//! Localized portfolio content and image resolution.
//!
//! Book titles, captions and UI strings come from per-language translation
//! bundles. The viewer reads them through [`ContentCatalog`] so hosts can plug
//! in their own localization layer; [`TranslationCatalog`] is the bundled
//! JSON-backed implementation.

pub mod assets;
pub mod loader;

pub use assets::{AssetResolver, ImageFileResolver, StaticResolver};

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    En,
    Es,
    Pt,
    Ca,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Es, Language::Pt, Language::Ca];

    /// Language every lookup falls back to.
    pub const FALLBACK: Language = Language::En;

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Pt => "pt",
            Language::Ca => "ca",
        }
    }

    /// Match a BCP 47 tag on its primary subtag only (`es-ES` -> `es`).
    pub fn from_tag(tag: &str) -> Option<Language> {
        let primary = tag.split(['-', '_']).next()?.to_ascii_lowercase();
        Language::ALL.into_iter().find(|l| l.code() == primary)
    }

    /// Like [`Language::from_tag`], falling back to English.
    pub fn from_tag_or_fallback(tag: &str) -> Language {
        Language::from_tag(tag).unwrap_or(Language::FALLBACK)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One artwork inside a book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookContent {
    pub title: String,
    pub date: String,
    pub technique: String,
    pub size: String,
    /// Image name without directory or extension; empty when the entry has
    /// no picture yet.
    pub image_path: String,
}

impl BookContent {
    pub fn has_image(&self) -> bool {
        !self.image_path.trim().is_empty()
    }
}

/// A book on the shelf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    pub title: String,
    pub content: Vec<BookContent>,
}

/// All strings for one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Translations {
    #[serde(default)]
    pub books: Vec<Book>,
    /// Flat UI strings such as `close`.
    #[serde(flatten)]
    pub strings: HashMap<String, serde_json::Value>,
}

impl Translations {
    pub fn text(&self, key: &str) -> Option<&str> {
        self.strings.get(key).and_then(|v| v.as_str())
    }
}

/// Localization collaborator.
///
/// Lookups are synchronous; results may change after
/// [`set_language`](ContentCatalog::set_language), and callers must recompute
/// anything derived from them.
pub trait ContentCatalog {
    fn language(&self) -> Language;

    fn set_language(&mut self, language: Language);

    fn book_count(&self) -> usize;

    fn book(&self, index: usize) -> Option<&Book>;

    fn text(&self, key: &str) -> Option<&str>;
}

/// JSON-backed catalog with per-lookup English fallback.
#[derive(Debug, Clone)]
pub struct TranslationCatalog {
    bundles: HashMap<Language, Translations>,
    active: Language,
}

impl Default for TranslationCatalog {
    fn default() -> Self {
        Self {
            bundles: HashMap::new(),
            active: Language::FALLBACK,
        }
    }
}

impl TranslationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the bundle for `language`.
    pub fn add_bundle(&mut self, language: Language, translations: Translations) {
        self.bundles.insert(language, translations);
    }

    pub fn bundle(&self, language: Language) -> Option<&Translations> {
        self.bundles.get(&language)
    }

    /// Languages with a bundle, in [`Language::ALL`] order.
    pub fn languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|l| self.bundles.contains_key(l))
            .collect()
    }

    fn active_then_fallback(&self) -> impl Iterator<Item = &Translations> {
        [self.active, Language::FALLBACK]
            .into_iter()
            .filter_map(move |l| self.bundles.get(&l))
    }
}

impl ContentCatalog for TranslationCatalog {
    fn language(&self) -> Language {
        self.active
    }

    fn set_language(&mut self, language: Language) {
        if !self.bundles.contains_key(&language) {
            warn!("no bundle for '{}', lookups fall back to '{}'", language, Language::FALLBACK);
        }
        self.active = language;
    }

    fn book_count(&self) -> usize {
        self.active_then_fallback()
            .map(|t| t.books.len())
            .max()
            .unwrap_or(0)
    }

    fn book(&self, index: usize) -> Option<&Book> {
        self.active_then_fallback().find_map(|t| t.books.get(index))
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.active_then_fallback().find_map(|t| t.text(key))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two-language catalog used across the crate's tests.
    pub(crate) fn sample_catalog() -> TranslationCatalog {
        loader::catalog_from_json_str(
            r#"{
                "en": {
                    "close": "Close",
                    "books": [
                        { "title": "Painting", "content": [
                            { "title": "Dawn", "date": "2021", "technique": "Oil", "size": "50x70", "imagePath": "pintura/0" },
                            { "title": "Dusk", "date": "2022", "technique": "Oil", "size": "40x40", "imagePath": "pintura/1" },
                            { "title": "Untitled", "imagePath": "" },
                            { "title": "Noon", "date": "2023", "technique": "Acrylic", "size": "30x60", "imagePath": "pintura/2" }
                        ] },
                        { "title": "Drawing", "content": [] },
                        { "title": "Etching", "content": [
                            { "title": "Plate", "imagePath": "gravat/0" }
                        ] }
                    ]
                },
                "es": {
                    "close": "Cerrar",
                    "books": [
                        { "title": "Pintura", "content": [
                            { "title": "Alba", "date": "2021", "technique": "Óleo", "size": "50x70", "imagePath": "pintura/0" },
                            { "title": "Ocaso", "date": "2022", "technique": "Óleo", "size": "40x40", "imagePath": "pintura/1" }
                        ] }
                    ]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_language_from_tag() {
        assert_eq!(Language::from_tag("es-ES"), Some(Language::Es));
        assert_eq!(Language::from_tag("CA"), Some(Language::Ca));
        assert_eq!(Language::from_tag("pt_BR"), Some(Language::Pt));
        assert_eq!(Language::from_tag("de"), None);
        assert_eq!(Language::from_tag_or_fallback("de-AT"), Language::En);
        assert_eq!(Language::Ca.to_string(), "ca");
    }

    #[test]
    fn test_lookup_uses_active_language() {
        let mut catalog = sample_catalog();
        catalog.set_language(Language::Es);

        assert_eq!(catalog.text("close"), Some("Cerrar"));
        assert_eq!(catalog.book(0).unwrap().title, "Pintura");
    }

    #[test]
    fn test_missing_entries_fall_back_to_english() {
        let mut catalog = sample_catalog();
        catalog.set_language(Language::Es);

        // Spanish bundle only has the first book.
        assert_eq!(catalog.book_count(), 3);
        assert_eq!(catalog.book(2).unwrap().title, "Etching");
        assert!(catalog.book(3).is_none());
    }

    #[test]
    fn test_language_without_bundle_falls_back() {
        let mut catalog = sample_catalog();
        catalog.set_language(Language::Pt);

        assert_eq!(catalog.language(), Language::Pt);
        assert_eq!(catalog.text("close"), Some("Close"));
        assert_eq!(catalog.languages(), vec![Language::En, Language::Es]);
    }

    #[test]
    fn test_content_without_image() {
        let catalog = sample_catalog();
        let book = catalog.book(0).unwrap();
        let with_images = book.content.iter().filter(|c| c.has_image()).count();
        assert_eq!(with_images, 3);
    }
}
