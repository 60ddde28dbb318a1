//! Process-lifetime food-type label cache.
//!
//! Recipe documents store denormalized food-type *labels* in their
//! `ingredient_food_type` array, while callers filter by food-type
//! *identifiers*. This cache translates one into the other. It is loaded
//! once, before the service answers its first query, and never invalidated
//! for the life of the client.

use std::collections::HashMap;

use crate::store::{collections, DocumentStore};

/// Identifier-to-label mapping for the food-type collection.
#[derive(Debug, Clone, Default)]
pub struct FoodTypeLabels {
    labels: HashMap<String, String>,
    ready: bool,
}

impl FoodTypeLabels {
    /// Eagerly load the whole food-type collection.
    ///
    /// A load failure is not fatal: the cache comes back not-ready, label
    /// resolution returns nothing, and food-type filtering degrades to a
    /// no-op rather than an error.
    pub async fn load(store: &dyn DocumentStore) -> Self {
        match store.get_all(collections::FOOD_TYPES).await {
            Ok(docs) => {
                let labels: HashMap<String, String> = docs
                    .into_iter()
                    .filter_map(|doc| {
                        let label = doc.str_field("label")?.to_string();
                        Some((doc.id, label))
                    })
                    .collect();
                tracing::debug!(count = labels.len(), "food-type label map loaded");
                Self {
                    labels,
                    ready: true,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "failed to load food-type labels, filtering disabled");
                Self::default()
            }
        }
    }

    /// Build a cache from known pairs, ready for use.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            labels: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ready: true,
        }
    }

    /// Whether the initial load succeeded.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Translate food-type identifiers into stored labels, dropping
    /// identifiers with no mapping. Empty when the cache never loaded.
    pub fn resolve_labels<S: AsRef<str>>(&self, ids: &[S]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.labels.get(id.as_ref()).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn load_maps_every_document() {
        let store = MemoryStore::new();
        store.insert_label("foodTypes", "1", "Legumes");
        store.insert_label("foodTypes", "2", "Carnes");

        let cache = FoodTypeLabels::load(&store).await;
        assert!(cache.is_ready());
        assert_eq!(
            cache.resolve_labels(&["2", "1"]),
            vec!["Carnes".to_string(), "Legumes".to_string()]
        );
    }

    #[tokio::test]
    async fn unknown_identifiers_are_dropped() {
        let cache = FoodTypeLabels::from_pairs([("1", "Legumes")]);
        assert_eq!(cache.resolve_labels(&["1", "99"]), vec!["Legumes".to_string()]);
    }

    #[tokio::test]
    async fn failed_load_degrades_to_empty_resolution() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let cache = FoodTypeLabels::load(&store).await;
        assert!(!cache.is_ready());
        assert!(cache.resolve_labels(&["1"]).is_empty());
    }
}
