//! Public surface of the recipe core.
//!
//! Error policy, applied uniformly: read paths catch store failures, log
//! them, and return an empty result so callers never handle store-specific
//! errors; write paths log and propagate, because a failed write must stay
//! visible to the user.

use serde::Serialize;
use std::sync::Arc;

use crate::detail::{to_detail, RecipeDetail};
use crate::error::StoreError;
use crate::filters::{build_recipe_query, RecipeFilters};
use crate::food_types::FoodTypeLabels;
use crate::list::{to_list_items, RecipeListItem};
use crate::mutation::{creation_batch, update_batch, RecipeDraft};
use crate::store::{
    collections, DocRef, DocumentStore, FieldWrite, Filter, Query, Value, DOCUMENT_ID,
    MAX_DISJUNCTION,
};

/// An `{id, label}` pair from one of the lookup collections, shaped for
/// selection widgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
}

/// Recipe query, aggregation, and mutation service.
pub struct RecipeService {
    store: Arc<dyn DocumentStore>,
    food_types: FoodTypeLabels,
}

impl RecipeService {
    /// Construct the service, eagerly loading the food-type label cache.
    /// The cache is ready (or has observably failed) before the first
    /// query runs.
    pub async fn new(store: Arc<dyn DocumentStore>) -> Self {
        let food_types = FoodTypeLabels::load(store.as_ref()).await;
        Self { store, food_types }
    }

    /// Whether food-type filtering is operational.
    pub fn food_types_ready(&self) -> bool {
        self.food_types.is_ready()
    }

    fn recipe_ref(id: &str) -> DocRef {
        DocRef::new(collections::RECIPES, id)
    }

    fn user_ref(id: &str) -> DocRef {
        DocRef::new(collections::USERS, id)
    }

    /// List a lookup collection as option items. Entries without a label
    /// are dropped.
    pub async fn option_items(&self, collection: &str) -> Vec<OptionItem> {
        match self.store.get_all(collection).await {
            Ok(docs) => docs
                .into_iter()
                .filter_map(|doc| {
                    let label = doc.str_field("label")?.to_string();
                    Some(OptionItem {
                        value: doc.id,
                        label,
                    })
                })
                .collect(),
            Err(error) => {
                tracing::warn!(collection, %error, "lookup listing failed, returning empty");
                Vec::new()
            }
        }
    }

    /// All recipe categories.
    pub async fn all_categories(&self) -> Vec<OptionItem> {
        self.option_items(collections::CATEGORIES).await
    }

    /// Feed listing with optional filters.
    pub async fn recipes(&self, filters: &RecipeFilters) -> Vec<RecipeListItem> {
        let query = build_recipe_query(filters, &self.food_types);
        self.run_list_query(&query).await
    }

    /// Recipes created by one user.
    pub async fn recipes_by_creator(&self, creator_id: &str) -> Vec<RecipeListItem> {
        let query = Query::collection(collections::RECIPES)
            .filter(Filter::eq("user_id", Self::user_ref(creator_id)));
        let items = self.run_list_query(&query).await;
        tracing::debug!(creator_id, count = items.len(), "listed recipes by creator");
        items
    }

    async fn run_list_query(&self, query: &Query) -> Vec<RecipeListItem> {
        match self.store.run_query(query).await {
            Ok(docs) => to_list_items(self.store.as_ref(), docs).await,
            Err(error) => {
                tracing::warn!(%error, "recipe listing failed, returning empty");
                Vec::new()
            }
        }
    }

    /// Full detail for one recipe. `None` when the recipe does not exist
    /// or the read fails.
    pub async fn recipe_with_details(&self, id: &str) -> Option<RecipeDetail> {
        let doc = match self.store.get(&Self::recipe_ref(id)).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::debug!(id, "recipe not found");
                return None;
            }
            Err(error) => {
                tracing::warn!(id, %error, "recipe detail read failed");
                return None;
            }
        };
        match to_detail(self.store.as_ref(), &doc).await {
            Ok(detail) => Some(detail),
            Err(error) => {
                tracing::warn!(id, %error, "recipe detail assembly failed");
                None
            }
        }
    }

    /// Create a recipe, returning its new identifier.
    pub async fn save_recipe(&self, draft: &RecipeDraft) -> Result<String, StoreError> {
        let fields = creation_batch(self.store.as_ref(), draft).await?;
        let id = self
            .store
            .create(collections::RECIPES, fields)
            .await
            .inspect_err(|error| tracing::error!(%error, "failed to create recipe"))?;
        tracing::debug!(id, "recipe created");
        Ok(id)
    }

    /// Re-resolve and overwrite an existing recipe's fields.
    pub async fn update_recipe(&self, id: &str, draft: &RecipeDraft) -> Result<(), StoreError> {
        let fields = update_batch(self.store.as_ref(), draft).await?;
        self.store
            .update(&Self::recipe_ref(id), fields)
            .await
            .inspect_err(|error| tracing::error!(id, %error, "failed to update recipe"))?;
        tracing::debug!(id, "recipe updated");
        Ok(())
    }

    /// Delete a recipe document. Dangling favorite references in user
    /// documents are not cleaned up; the favorites listing simply omits
    /// identifiers that no longer resolve.
    pub async fn delete_recipe(&self, id: &str) -> Result<(), StoreError> {
        self.store
            .delete(&Self::recipe_ref(id))
            .await
            .inspect_err(|error| tracing::error!(id, %error, "failed to delete recipe"))
    }

    /// Whether a recipe is in the user's favorites. Blank inputs, a
    /// missing user document, or a read failure all answer `false`.
    pub async fn is_recipe_favorite(&self, user_id: &str, recipe_id: &str) -> bool {
        if user_id.trim().is_empty() || recipe_id.trim().is_empty() {
            return false;
        }
        match self.store.get(&Self::user_ref(user_id)).await {
            Ok(Some(doc)) => doc
                .string_array("favoriteRecipeIds")
                .iter()
                .any(|id| id == recipe_id),
            Ok(None) => false,
            Err(error) => {
                tracing::warn!(user_id, %error, "favorite check failed");
                false
            }
        }
    }

    /// Toggle a favorite with field-level union/remove, never a raw array
    /// write, so concurrent toggles from the same user's other devices
    /// merge instead of clobbering each other.
    pub async fn toggle_favorite_recipe(
        &self,
        user_id: &str,
        recipe_id: &str,
        currently_favorite: bool,
    ) -> Result<(), StoreError> {
        if user_id.trim().is_empty() || recipe_id.trim().is_empty() {
            tracing::error!("blank user or recipe id for favorite toggle");
            return Ok(());
        }
        let write = if currently_favorite {
            FieldWrite::ArrayRemove(vec![Value::from(recipe_id)])
        } else {
            FieldWrite::ArrayUnion(vec![Value::from(recipe_id)])
        };
        self.store
            .update(
                &Self::user_ref(user_id),
                vec![("favoriteRecipeIds".to_string(), write)],
            )
            .await
            .inspect_err(|error| {
                tracing::error!(user_id, recipe_id, %error, "failed to toggle favorite");
            })
    }

    /// List the user's favorite recipes.
    ///
    /// Blank stored identifiers are filtered out, then the first ten are
    /// fetched in one document-id membership query (store limit; favorites
    /// beyond the tenth are not returned by this path). Identifiers whose
    /// recipe no longer exists are silently omitted.
    pub async fn favorite_recipes(&self, user_id: &str) -> Vec<RecipeListItem> {
        if user_id.trim().is_empty() {
            tracing::debug!("no user id for favorites listing");
            return Vec::new();
        }
        let user = match self.store.get(&Self::user_ref(user_id)).await {
            Ok(Some(doc)) => doc,
            Ok(None) => return Vec::new(),
            Err(error) => {
                tracing::warn!(user_id, %error, "favorites read failed, returning empty");
                return Vec::new();
            }
        };

        let mut ids: Vec<String> = user
            .string_array("favoriteRecipeIds")
            .into_iter()
            .filter(|id| !id.trim().is_empty())
            .collect();
        if ids.is_empty() {
            return Vec::new();
        }
        if ids.len() > MAX_DISJUNCTION {
            tracing::debug!(
                user_id,
                total = ids.len(),
                "favorites over the membership-query limit, keeping the first {MAX_DISJUNCTION}"
            );
            ids.truncate(MAX_DISJUNCTION);
        }

        let query = Query::collection(collections::RECIPES).filter(Filter::is_in(
            DOCUMENT_ID,
            ids.into_iter().map(Value::from).collect(),
        ));
        self.run_list_query(&query).await
    }
}
