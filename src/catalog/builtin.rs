use std::fs;
use std::path::Path;

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::WordSource;
use crate::session::word::WordPair;

#[derive(Embed)]
#[folder = "assets/vocabulary/"]
struct VocabularyAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: u32,
    pub sets: Vec<WordSet>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordSet {
    pub name: String,
    pub words: Vec<WordPair>,
}

impl Category {
    pub fn set(&self, name: &str) -> Option<&WordSet> {
        self.sets.iter().find(|s| s.name == name)
    }

    pub fn set_names(&self) -> Vec<&str> {
        self.sets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Built-in categories, plus any user category files dropped into the
/// config directory. A user file with the same id replaces the bundled one.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    pub fn load() -> Self {
        let user_dir = dirs::config_dir().map(|d| d.join("wordfall").join("vocabulary"));
        Self::load_with_user_dir(user_dir.as_deref())
    }

    pub fn load_with_user_dir(user_dir: Option<&Path>) -> Self {
        let mut categories: Vec<Category> = Vec::new();

        for name in VocabularyAssets::iter() {
            let Some(file) = VocabularyAssets::get(&name) else {
                continue;
            };
            match serde_json::from_slice::<Category>(file.data.as_ref()) {
                Ok(category) => categories.push(category),
                Err(e) => warn!(file = %name, error = %e, "skipping bundled category"),
            }
        }

        if let Some(dir) = user_dir {
            for category in load_user_categories(dir) {
                categories.retain(|c| c.id != category.id);
                categories.push(category);
            }
        }

        Self::from_categories(categories)
    }

    pub fn from_categories(mut categories: Vec<Category>) -> Self {
        categories.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

impl WordSource for Catalog {
    fn get_words(&self, category_id: &str, set_name: &str) -> Vec<WordPair> {
        self.category(category_id)
            .and_then(|c| c.set(set_name))
            .map(|s| s.words.clone())
            .unwrap_or_default()
    }
}

fn load_user_categories(dir: &Path) -> Vec<Category> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("json"))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| {
            let content = fs::read_to_string(&path).ok()?;
            match serde_json::from_str::<Category>(&content) {
                Ok(category) => Some(category),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping user category");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::load_with_user_dir(None);
        assert!(!catalog.categories().is_empty());
        for category in catalog.categories() {
            assert!(!category.sets.is_empty(), "{} has no sets", category.id);
            for set in &category.sets {
                assert!(!set.words.is_empty(), "{}/{} is empty", category.id, set.name);
            }
        }
    }

    #[test]
    fn test_categories_are_ordered() {
        let catalog = Catalog::load_with_user_dir(None);
        let orders: Vec<u32> = catalog.categories().iter().map(|c| c.order).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);
    }

    #[test]
    fn test_get_words_preserves_order() {
        let catalog = Catalog::load_with_user_dir(None);
        let category = &catalog.categories()[0];
        let set = &category.sets[0];
        let words = catalog.get_words(&category.id, &set.name);
        assert_eq!(words, set.words);
    }

    #[test]
    fn test_unknown_lookups_are_empty() {
        let catalog = Catalog::load_with_user_dir(None);
        assert!(catalog.get_words("nope", "Set 1").is_empty());
        let id = catalog.categories()[0].id.clone();
        assert!(catalog.get_words(&id, "no such set").is_empty());
    }

    #[test]
    fn test_user_category_overrides_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = Catalog::load_with_user_dir(None);
        let id = bundled.categories()[0].id.clone();
        let custom = format!(
            r#"{{"id": "{id}", "title": "Mine", "sets": [{{"name": "Only", "words": [{{"native": "Sách", "target": "book"}}]}}]}}"#
        );
        fs::write(dir.path().join("mine.json"), custom).unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();

        let catalog = Catalog::load_with_user_dir(Some(dir.path()));
        let category = catalog.category(&id).unwrap();
        assert_eq!(category.title, "Mine");
        assert_eq!(catalog.get_words(&id, "Only"), vec![WordPair::new("Sách", "book")]);
        assert_eq!(catalog.categories().len(), bundled.categories().len());
    }
}
