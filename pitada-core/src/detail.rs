//! Recipe detail assembly.
//!
//! Expands a single recipe document into the full nested view model:
//! ingredient unit and food-type labels are looked up live (concurrently
//! across all ingredients), the creator name follows the usual fallback
//! chain, and store timestamps become ISO-8601 strings.

use futures::future::join_all;
use serde::Serialize;

use crate::error::StoreError;
use crate::list::{creator_display_name, photo_url};
use crate::lookup::{
    try_resolve_ref, NOT_AVAILABLE, UNDEFINED_FEMININE, UNDEFINED_MASCULINE, UNNAMED_RECIPE,
};
use crate::store::{collections, Document, DocumentStore, Value};

/// One ingredient with its labels resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDetail {
    pub fdc_id: Option<String>,
    pub name: String,
    pub quantity: f64,
    pub unit_id: Option<String>,
    pub unit_label: String,
    pub food_type_id: Option<String>,
    pub food_type_label: String,
}

/// Full nested recipe content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeContent {
    pub recipe_name: String,
    pub description: String,
    pub photo_url: String,
    pub preparation_steps: Vec<String>,
    pub ingredients: Vec<IngredientDetail>,
    pub category_id: Option<String>,
    pub category_label: String,
    pub difficulty_id: Option<String>,
    pub difficulty_label: String,
    pub time_id: Option<String>,
    pub time_label: String,
    pub user_id: Option<String>,
    pub user_name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub ingredient_food_types: Vec<String>,
}

/// Detail view model for one recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetail {
    pub id: String,
    pub recipe: RecipeContent,
}

async fn ingredient_detail(
    store: &dyn DocumentStore,
    raw: &Value,
) -> Result<IngredientDetail, StoreError> {
    let fields = raw.as_map().cloned().unwrap_or_default();
    let get = |name: &str| fields.get(name).cloned();

    let unit_ref = get("unit_id").and_then(|v| v.reference_in(collections::UNITS));
    let food_type_ref = get("food_type_id").and_then(|v| v.reference_in(collections::FOOD_TYPES));

    let (unit, food_type) = futures::join!(
        try_resolve_ref(store, unit_ref.as_ref(), NOT_AVAILABLE),
        try_resolve_ref(store, food_type_ref.as_ref(), NOT_AVAILABLE),
    );
    let (unit, food_type) = (unit?, food_type?);

    Ok(IngredientDetail {
        fdc_id: get("fdc_id").and_then(|v| v.as_str().map(str::to_string)),
        name: get("ingredient_name")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default(),
        quantity: get("quantity").and_then(|v| v.as_f64()).unwrap_or(0.0),
        unit_id: unit.id,
        unit_label: unit.label,
        food_type_id: food_type.id,
        food_type_label: food_type.label,
    })
}

/// Assemble the detail view model for a recipe document.
///
/// Ingredient label lookups run concurrently, bounded only by the
/// ingredient count. A store failure propagates; the service collapses it
/// to a no-result per the read-path policy.
pub async fn to_detail(
    store: &dyn DocumentStore,
    doc: &Document,
) -> Result<RecipeDetail, StoreError> {
    let raw_ingredients = doc
        .get("ingredients")
        .and_then(Value::as_array)
        .unwrap_or(&[]);

    let resolved = join_all(
        raw_ingredients
            .iter()
            .map(|raw| ingredient_detail(store, raw)),
    )
    .await;
    let ingredients = resolved.into_iter().collect::<Result<Vec<_>, _>>()?;

    let user_name = creator_display_name(store, doc.get("user_id")).await;

    Ok(RecipeDetail {
        id: doc.id.clone(),
        recipe: RecipeContent {
            recipe_name: doc.str_or("recipe_name", UNNAMED_RECIPE),
            description: doc.str_or("description", ""),
            photo_url: photo_url(doc),
            preparation_steps: doc.string_array("preparation_mode"),
            ingredients,
            category_id: doc.reference_id("category_id"),
            category_label: doc.str_or("category_label", UNDEFINED_FEMININE),
            difficulty_id: doc.reference_id("difficulty_id"),
            difficulty_label: doc.str_or("difficulty_label", UNDEFINED_FEMININE),
            time_id: doc.reference_id("time_id"),
            time_label: doc.str_or("time_label", UNDEFINED_MASCULINE),
            user_id: doc.reference_id("user_id"),
            user_name,
            created_at: doc.timestamp_iso("createdAt"),
            updated_at: doc.timestamp_iso("updatedAt"),
            ingredient_food_types: doc.string_array("ingredient_food_type"),
        },
    })
}
