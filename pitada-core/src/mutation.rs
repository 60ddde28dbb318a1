//! Mutation pipeline for recipe create and update.
//!
//! Resolves every foreign-key input to a stored reference plus its
//! denormalized label, recomputes the derived fields, and produces the
//! composite write batch. Business-rule validation (non-empty title,
//! positive quantities, and so on) happens before this pipeline; only
//! reference resolution lives here.

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::lookup::{try_resolve_ref, NOT_AVAILABLE, UNDEFINED_FEMININE, UNDEFINED_MASCULINE};
use crate::store::{collections, DocRef, DocumentStore, FieldWrite, Value, WriteBatch};

/// Ingredient input for create/update.
#[derive(Debug, Clone, Default)]
pub struct IngredientDraft {
    pub name: String,
    pub quantity: f64,
    pub unit_id: Option<String>,
    pub food_type_id: Option<String>,
    pub fdc_id: Option<String>,
}

/// Recipe input for create/update, identifiers not yet resolved.
#[derive(Debug, Clone, Default)]
pub struct RecipeDraft {
    pub recipe_name: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub user_id: Option<String>,
    pub category_id: Option<String>,
    pub difficulty_id: Option<String>,
    pub time_id: Option<String>,
    pub preparation_steps: Vec<String>,
    pub ingredients: Vec<IngredientDraft>,
}

fn opt_ref(collection: &str, id: &Option<String>) -> Option<DocRef> {
    id.as_deref()
        .filter(|id| !id.trim().is_empty())
        .map(|id| DocRef::new(collection, id))
}

fn ref_value(r: &Option<DocRef>) -> Value {
    match r {
        Some(r) => Value::Reference(r.clone()),
        None => Value::Null,
    }
}

async fn resolve_ingredient(
    store: &dyn DocumentStore,
    draft: &IngredientDraft,
) -> Result<Value, StoreError> {
    let unit_ref = opt_ref(collections::UNITS, &draft.unit_id);
    let food_type_ref = opt_ref(collections::FOOD_TYPES, &draft.food_type_id);

    let (unit, food_type) = futures::join!(
        try_resolve_ref(store, unit_ref.as_ref(), NOT_AVAILABLE),
        try_resolve_ref(store, food_type_ref.as_ref(), NOT_AVAILABLE),
    );
    let (unit, food_type) = (unit?, food_type?);

    let mut fields = BTreeMap::new();
    fields.insert(
        "fdc_id".to_string(),
        draft
            .fdc_id
            .clone()
            .map(Value::from)
            .unwrap_or(Value::Null),
    );
    fields.insert(
        "ingredient_name".to_string(),
        Value::from(draft.name.clone()),
    );
    fields.insert("quantity".to_string(), Value::Double(draft.quantity));
    fields.insert("unit_id".to_string(), ref_value(&unit_ref));
    fields.insert("unit_label".to_string(), Value::from(unit.label));
    fields.insert("food_type_id".to_string(), ref_value(&food_type_ref));
    fields.insert("food_type_label".to_string(), Value::from(food_type.label));
    Ok(Value::Map(fields))
}

/// Unique, non-blank food-type labels across the resolved ingredients, in
/// first-occurrence order. This is the recipe's sole array-filterable field
/// and must be recomputed on every save.
fn unique_food_type_labels(ingredients: &[Value]) -> Vec<Value> {
    let mut seen = Vec::new();
    for ingredient in ingredients {
        let label = ingredient
            .as_map()
            .and_then(|m| m.get("food_type_label"))
            .and_then(Value::as_str)
            .unwrap_or("");
        if !label.is_empty() && !seen.iter().any(|s| s == label) {
            seen.push(label.to_string());
        }
    }
    seen.into_iter().map(Value::from).collect()
}

/// Resolve every reference in a draft into the composite field set shared
/// by create and update. Lookup failures propagate; missing lookup targets
/// resolve to sentinel labels.
pub async fn resolve_references(
    store: &dyn DocumentStore,
    draft: &RecipeDraft,
) -> Result<WriteBatch, StoreError> {
    let category_ref = opt_ref(collections::CATEGORIES, &draft.category_id);
    let difficulty_ref = opt_ref(collections::DIFFICULTIES, &draft.difficulty_id);
    let time_ref = opt_ref(collections::TIMES, &draft.time_id);
    let user_ref = opt_ref(collections::USERS, &draft.user_id);

    let (category, difficulty, time) = futures::join!(
        try_resolve_ref(store, category_ref.as_ref(), UNDEFINED_FEMININE),
        try_resolve_ref(store, difficulty_ref.as_ref(), UNDEFINED_FEMININE),
        try_resolve_ref(store, time_ref.as_ref(), UNDEFINED_MASCULINE),
    );
    let (category, difficulty, time) = (category?, difficulty?, time?);

    let resolved = futures::future::join_all(
        draft
            .ingredients
            .iter()
            .map(|ingredient| resolve_ingredient(store, ingredient)),
    )
    .await;
    let ingredients = resolved.into_iter().collect::<Result<Vec<_>, _>>()?;
    let food_type_labels = unique_food_type_labels(&ingredients);

    let set = |v: Value| FieldWrite::Set(v);
    Ok(vec![
        (
            "recipe_name".to_string(),
            set(Value::from(draft.recipe_name.clone())),
        ),
        (
            "description".to_string(),
            set(Value::from(draft.description.clone())),
        ),
        (
            "photo_url".to_string(),
            set(draft
                .photo_url
                .clone()
                .map(Value::from)
                .unwrap_or(Value::Null)),
        ),
        ("user_id".to_string(), set(ref_value(&user_ref))),
        ("category_id".to_string(), set(ref_value(&category_ref))),
        ("category_label".to_string(), set(Value::from(category.label))),
        ("difficulty_id".to_string(), set(ref_value(&difficulty_ref))),
        (
            "difficulty_label".to_string(),
            set(Value::from(difficulty.label)),
        ),
        ("time_id".to_string(), set(ref_value(&time_ref))),
        ("time_label".to_string(), set(Value::from(time.label))),
        (
            "preparation_mode".to_string(),
            set(Value::Array(
                draft
                    .preparation_steps
                    .iter()
                    .cloned()
                    .map(Value::from)
                    .collect(),
            )),
        ),
        ("ingredients".to_string(), set(Value::Array(ingredients))),
        (
            "ingredient_food_type".to_string(),
            set(Value::Array(food_type_labels)),
        ),
        (
            "recipe_name_lower".to_string(),
            set(Value::from(draft.recipe_name.to_lowercase())),
        ),
    ])
}

/// Write batch for a create: resolved fields plus both server timestamps.
pub async fn creation_batch(
    store: &dyn DocumentStore,
    draft: &RecipeDraft,
) -> Result<WriteBatch, StoreError> {
    let mut fields = resolve_references(store, draft).await?;
    fields.push(("createdAt".to_string(), FieldWrite::ServerTimestamp));
    fields.push(("updatedAt".to_string(), FieldWrite::ServerTimestamp));
    Ok(fields)
}

/// Write batch for an update: resolved fields plus the update timestamp.
/// Creation time is stamped only on create.
pub async fn update_batch(
    store: &dyn DocumentStore,
    draft: &RecipeDraft,
) -> Result<WriteBatch, StoreError> {
    let mut fields = resolve_references(store, draft).await?;
    fields.push(("updatedAt".to_string(), FieldWrite::ServerTimestamp));
    Ok(fields)
}
