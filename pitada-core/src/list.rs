//! Recipe list aggregation.
//!
//! Maps raw recipe documents into flat [`RecipeListItem`] view models:
//! shallow identifier extraction from embedded references, denormalized
//! labels copied verbatim, the derived read time, and the creator's display
//! name resolved with one concurrent lookup per row.

use futures::future::join_all;
use serde::Serialize;

use crate::lookup::{
    PLACEHOLDER_PHOTO, UNDEFINED_FEMININE, UNDEFINED_MASCULINE, UNKNOWN_USER, UNNAMED_RECIPE,
};
use crate::store::{collections, Document, DocumentStore, Value};
use crate::users::display_name;

/// Flat view model for list rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListItem {
    pub id: String,
    pub recipe_name: String,
    pub photo_url: String,
    pub description: String,
    pub category_id: Option<String>,
    pub difficulty_id: Option<String>,
    pub time_id: Option<String>,
    pub user_id: Option<String>,
    pub category_label: String,
    pub difficulty_label: String,
    pub time_label: String,
    pub user_name: String,
    pub ingredient_food_types: Vec<String>,
    pub created_at: Option<String>,
    pub read_time: u32,
}

/// Estimated preparation minutes for a time-bucket identifier.
pub fn read_time_minutes(time_id: Option<&str>) -> u32 {
    match time_id {
        Some("1") => 10,
        Some("2") => 25,
        Some("3") => 45,
        Some("4") => 75,
        _ => 5,
    }
}

/// Photo URL with the legacy `photo` field and placeholder fallbacks.
pub(crate) fn photo_url(doc: &Document) -> String {
    match doc.str_field("photo_url").filter(|s| !s.is_empty()) {
        Some(url) => url.to_string(),
        None => doc.str_or("photo", PLACEHOLDER_PHOTO),
    }
}

/// Map one recipe document, leaving `user_name` for the batch join.
fn base_item(doc: &Document) -> RecipeListItem {
    RecipeListItem {
        id: doc.id.clone(),
        recipe_name: doc.str_or("recipe_name", UNNAMED_RECIPE),
        photo_url: photo_url(doc),
        description: doc.str_or("description", ""),
        category_id: doc.reference_id("category_id"),
        difficulty_id: doc.reference_id("difficulty_id"),
        time_id: doc.reference_id("time_id"),
        user_id: doc.reference_id("user_id"),
        category_label: doc.str_or("category_label", UNDEFINED_FEMININE),
        difficulty_label: doc.str_or("difficulty_label", UNDEFINED_FEMININE),
        time_label: doc.str_or("time_label", UNDEFINED_MASCULINE),
        user_name: String::new(),
        ingredient_food_types: doc.string_array("ingredient_food_type"),
        created_at: doc.timestamp_iso("createdAt"),
        read_time: read_time_minutes(doc.reference_id("time_id").as_deref()),
    }
}

/// Resolve the creator's display name for one recipe row.
///
/// Handles both reference forms of `user_id` (typed pointer or bare
/// identifier from historical documents). A missing user or a failed lookup
/// yields the unknown-user sentinel for that row only.
pub(crate) async fn creator_display_name(
    store: &dyn DocumentStore,
    user_field: Option<&Value>,
) -> String {
    let Some(user_ref) = user_field.and_then(|v| v.reference_in(collections::USERS)) else {
        return UNKNOWN_USER.to_string();
    };
    match store.get(&user_ref).await {
        Ok(Some(doc)) => display_name(&doc),
        Ok(None) => UNKNOWN_USER.to_string(),
        Err(error) => {
            tracing::warn!(user = %user_ref, %error, "creator lookup failed");
            UNKNOWN_USER.to_string()
        }
    }
}

/// Aggregate a batch of recipe documents into list items.
///
/// The per-row creator lookups are issued concurrently and joined before
/// returning; output order matches input document order regardless of
/// lookup completion order.
pub async fn to_list_items(store: &dyn DocumentStore, docs: Vec<Document>) -> Vec<RecipeListItem> {
    let names = join_all(
        docs.iter()
            .map(|doc| creator_display_name(store, doc.get("user_id"))),
    )
    .await;

    docs.iter()
        .zip(names)
        .map(|(doc, user_name)| {
            let mut item = base_item(doc);
            item.user_name = user_name;
            item
        })
        .collect()
}
