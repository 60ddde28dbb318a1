//! List aggregation: defaults, read time, creator-name resolution across
//! both reference forms, and batch order preservation.

mod common;

use chrono::{TimeZone, Utc};
use std::sync::Arc;

use pitada_core::store::collections;
use pitada_core::{to_list_items, DocRef, DocumentStore, MemoryStore, Value};

fn new_store() -> Arc<MemoryStore> {
    common::init_tracing();
    Arc::new(MemoryStore::new())
}

fn seed_user(store: &MemoryStore, id: &str, fields: Vec<(&str, Value)>) {
    store.insert_with_id(collections::USERS, id, fields);
}

#[tokio::test]
async fn list_item_fills_documented_defaults() {
    let store = new_store();
    store.insert_with_id(collections::RECIPES, "r1", vec![]);
    let docs = store.get_all(collections::RECIPES).await.unwrap();

    let items = to_list_items(store.as_ref(), docs).await;
    let item = &items[0];
    assert_eq!(item.recipe_name, "Sem Nome");
    assert_eq!(item.photo_url, "assets/placeholder.png");
    assert_eq!(item.description, "");
    assert_eq!(item.category_label, "Não definida");
    assert_eq!(item.difficulty_label, "Não definida");
    assert_eq!(item.time_label, "Não definido");
    assert_eq!(item.user_name, "Desconhecido");
    assert_eq!(item.created_at, None);
    assert_eq!(item.read_time, 5);
}

#[tokio::test]
async fn read_time_derives_from_the_time_bucket() {
    let store = new_store();
    store.insert_with_id(
        collections::RECIPES,
        "r1",
        vec![(
            "time_id",
            Value::Reference(DocRef::new(collections::TIMES, "2")),
        )],
    );
    let docs = store.get_all(collections::RECIPES).await.unwrap();
    let items = to_list_items(store.as_ref(), docs).await;
    assert_eq!(items[0].read_time, 25);
    assert_eq!(items[0].time_id.as_deref(), Some("2"));
}

#[tokio::test]
async fn creator_name_resolves_from_typed_reference() {
    let store = new_store();
    seed_user(&store, "u1", vec![("user_name", Value::from("chef_ana"))]);
    store.insert_with_id(
        collections::RECIPES,
        "r1",
        vec![(
            "user_id",
            Value::Reference(DocRef::new(collections::USERS, "u1")),
        )],
    );
    let docs = store.get_all(collections::RECIPES).await.unwrap();
    let items = to_list_items(store.as_ref(), docs).await;
    assert_eq!(items[0].user_name, "chef_ana");
    assert_eq!(items[0].user_id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn creator_name_resolves_from_bare_identifier() {
    let store = new_store();
    seed_user(
        &store,
        "u2",
        vec![
            ("displayName", Value::from("Maria Silva")),
            ("email", Value::from("maria@example.com")),
        ],
    );
    store.insert_with_id(
        collections::RECIPES,
        "r1",
        vec![("user_id", Value::from("u2"))],
    );
    let docs = store.get_all(collections::RECIPES).await.unwrap();
    let items = to_list_items(store.as_ref(), docs).await;
    assert_eq!(items[0].user_name, "Maria Silva");
    assert_eq!(items[0].user_id.as_deref(), Some("u2"));
}

#[tokio::test]
async fn missing_creator_yields_the_sentinel_for_that_row_only() {
    let store = new_store();
    seed_user(&store, "u1", vec![("user_name", Value::from("chef_ana"))]);
    store.insert_with_id(
        collections::RECIPES,
        "r1",
        vec![("user_id", Value::from("ghost"))],
    );
    store.insert_with_id(
        collections::RECIPES,
        "r2",
        vec![(
            "user_id",
            Value::Reference(DocRef::new(collections::USERS, "u1")),
        )],
    );
    let docs = store.get_all(collections::RECIPES).await.unwrap();
    let items = to_list_items(store.as_ref(), docs).await;
    assert_eq!(items[0].user_name, "Desconhecido");
    assert_eq!(items[1].user_name, "chef_ana");
}

#[tokio::test]
async fn batch_output_order_matches_input_document_order() {
    let store = new_store();
    for (id, user) in [("r1", "u1"), ("r2", "u2"), ("r3", "u3")] {
        seed_user(&store, user, vec![("user_name", Value::from(user))]);
        store.insert_with_id(
            collections::RECIPES,
            id,
            vec![
                ("recipe_name", Value::from(id)),
                (
                    "user_id",
                    Value::Reference(DocRef::new(collections::USERS, user)),
                ),
            ],
        );
    }
    let docs = store.get_all(collections::RECIPES).await.unwrap();
    let items = to_list_items(store.as_ref(), docs).await;
    let pairs: Vec<(&str, &str)> = items
        .iter()
        .map(|i| (i.id.as_str(), i.user_name.as_str()))
        .collect();
    assert_eq!(pairs, vec![("r1", "u1"), ("r2", "u2"), ("r3", "u3")]);
}

#[tokio::test]
async fn created_at_is_iso_8601_when_present() {
    let store = new_store();
    let created = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    store.insert_with_id(
        collections::RECIPES,
        "r1",
        vec![("createdAt", Value::Timestamp(created))],
    );
    let docs = store.get_all(collections::RECIPES).await.unwrap();
    let items = to_list_items(store.as_ref(), docs).await;
    assert_eq!(items[0].created_at.as_deref(), Some("2024-03-15T12:00:00+00:00"));
}

#[tokio::test]
async fn denormalized_labels_are_copied_verbatim() {
    let store = new_store();
    store.insert_with_id(
        collections::RECIPES,
        "r1",
        vec![
            ("category_label", Value::from("Doces")),
            ("difficulty_label", Value::from("Fácil")),
            ("time_label", Value::from("30 a 60 min")),
            (
                "ingredient_food_type",
                Value::Array(vec![Value::from("Legumes"), Value::from("Carnes")]),
            ),
        ],
    );
    let docs = store.get_all(collections::RECIPES).await.unwrap();
    let items = to_list_items(store.as_ref(), docs).await;
    assert_eq!(items[0].category_label, "Doces");
    assert_eq!(items[0].difficulty_label, "Fácil");
    assert_eq!(items[0].time_label, "30 a 60 min");
    assert_eq!(
        items[0].ingredient_food_types,
        vec!["Legumes".to_string(), "Carnes".to_string()]
    );
}
