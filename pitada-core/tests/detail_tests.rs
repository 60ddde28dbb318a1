//! Detail assembly: nested ingredient resolution, timestamps, and the
//! explicit no-result for a missing recipe.

mod common;

use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use pitada_core::store::collections;
use pitada_core::{DocRef, MemoryStore, RecipeService, Value};

fn new_store() -> Arc<MemoryStore> {
    common::init_tracing();
    Arc::new(MemoryStore::new())
}

fn ingredient(name: &str, quantity: f64, unit_id: &str, food_type_id: &str) -> Value {
    let mut fields = BTreeMap::new();
    fields.insert("ingredient_name".to_string(), Value::from(name));
    fields.insert("quantity".to_string(), Value::Double(quantity));
    fields.insert(
        "unit_id".to_string(),
        Value::Reference(DocRef::new(collections::UNITS, unit_id)),
    );
    fields.insert(
        "food_type_id".to_string(),
        Value::Reference(DocRef::new(collections::FOOD_TYPES, food_type_id)),
    );
    fields.insert("fdc_id".to_string(), Value::Null);
    Value::Map(fields)
}

async fn seeded_service() -> (Arc<MemoryStore>, RecipeService) {
    let store = new_store();
    store.insert_label(collections::UNITS, "g", "gramas");
    store.insert_label(collections::FOOD_TYPES, "1", "Legumes");
    store.insert_with_id(
        collections::USERS,
        "u1",
        vec![("user_name", Value::from("chef_ana"))],
    );

    let created = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    store.insert_with_id(
        collections::RECIPES,
        "r1",
        vec![
            ("recipe_name", Value::from("Sopa de Legumes")),
            ("description", Value::from("Leve e rápida")),
            (
                "preparation_mode",
                Value::Array(vec![Value::from("Corte"), Value::from("Cozinhe")]),
            ),
            (
                "ingredients",
                Value::Array(vec![
                    ingredient("Cenoura", 2.0, "g", "1"),
                    ingredient("Batata", 3.0, "missing-unit", "1"),
                ]),
            ),
            (
                "user_id",
                Value::Reference(DocRef::new(collections::USERS, "u1")),
            ),
            ("createdAt", Value::Timestamp(created)),
        ],
    );

    let service = RecipeService::new(store.clone()).await;
    (store, service)
}

#[tokio::test]
async fn missing_recipe_returns_none_not_an_error() {
    let (_store, service) = seeded_service().await;
    assert!(service.recipe_with_details("missing-id").await.is_none());
}

#[tokio::test]
async fn detail_resolves_ingredient_labels_live() {
    let (_store, service) = seeded_service().await;
    let detail = service.recipe_with_details("r1").await.unwrap();

    assert_eq!(detail.id, "r1");
    assert_eq!(detail.recipe.recipe_name, "Sopa de Legumes");
    assert_eq!(
        detail.recipe.preparation_steps,
        vec!["Corte".to_string(), "Cozinhe".to_string()]
    );
    assert_eq!(detail.recipe.user_name, "chef_ana");

    let ingredients = &detail.recipe.ingredients;
    assert_eq!(ingredients.len(), 2);
    assert_eq!(ingredients[0].name, "Cenoura");
    assert_eq!(ingredients[0].quantity, 2.0);
    assert_eq!(ingredients[0].unit_label, "gramas");
    assert_eq!(ingredients[0].food_type_label, "Legumes");
    // Missing unit document: sentinel label, identifier preserved.
    assert_eq!(ingredients[1].unit_label, "N/A");
    assert_eq!(ingredients[1].unit_id.as_deref(), Some("missing-unit"));
}

#[tokio::test]
async fn absent_timestamps_map_to_none_not_now() {
    let (_store, service) = seeded_service().await;
    let detail = service.recipe_with_details("r1").await.unwrap();
    assert_eq!(
        detail.recipe.created_at.as_deref(),
        Some("2024-03-15T12:00:00+00:00")
    );
    assert_eq!(detail.recipe.updated_at, None);
}

#[tokio::test]
async fn detail_read_failure_collapses_to_none() {
    let (store, service) = seeded_service().await;
    store.set_unavailable(true);
    assert!(service.recipe_with_details("r1").await.is_none());
}
