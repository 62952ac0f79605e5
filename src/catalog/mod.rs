pub mod builtin;
pub mod custom;

use std::path::PathBuf;

use thiserror::Error;

use crate::session::word::WordPair;

pub use builtin::Catalog;
pub use custom::{CUSTOM_CATEGORY, CustomSetLibrary, CustomSetReference, CustomSetSlot};

/// Supplies the ordered words of a set. An empty result means "not found".
pub trait WordSource {
    fn get_words(&self, category_id: &str, set_name: &str) -> Vec<WordPair>;
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a valid word set: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("word set '{0}' has no usable words")]
    Empty(String),
}

/// Routes lookups for the custom category to the staged custom set and
/// everything else to the catalog.
pub struct WordResolver<'a> {
    pub catalog: &'a Catalog,
    pub custom: &'a CustomSetSlot,
}

impl WordSource for WordResolver<'_> {
    fn get_words(&self, category_id: &str, set_name: &str) -> Vec<WordPair> {
        if category_id == CUSTOM_CATEGORY {
            self.custom.words_for(set_name)
        } else {
            self.catalog.get_words(category_id, set_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_routes_custom_category_to_slot() {
        let catalog = Catalog::from_categories(Vec::new());
        let mut slot = CustomSetSlot::default();
        slot.stage(CustomSetReference {
            set_name: "Kitchen".to_string(),
            words: vec![WordPair::new("Bếp", "stove")],
        });
        let resolver = WordResolver {
            catalog: &catalog,
            custom: &slot,
        };
        assert_eq!(resolver.get_words(CUSTOM_CATEGORY, "Kitchen").len(), 1);
        assert!(resolver.get_words(CUSTOM_CATEGORY, "kitchen").is_empty());
        assert!(resolver.get_words("TOEIC", "Kitchen").is_empty());
    }
}
