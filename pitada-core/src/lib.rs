//! Core recipe query, aggregation, and reference-resolution layer for the
//! Pitada de Sabor app: denormalizes recipe documents from the managed
//! document store into flat view models, composes feed queries within the
//! store's predicate limits, and resolves every foreign-key input on write.

pub mod detail;
pub mod error;
pub mod filters;
pub mod food_types;
pub mod list;
pub mod lookup;
pub mod mutation;
pub mod service;
pub mod store;
pub mod upload;
pub mod users;

pub use detail::{IngredientDetail, RecipeContent, RecipeDetail};
pub use error::{StoreError, UploadError};
pub use filters::{build_recipe_query, RecipeFilters};
pub use food_types::FoodTypeLabels;
pub use list::{read_time_minutes, to_list_items, RecipeListItem};
pub use lookup::{resolve_ref, ResolvedRef};
pub use mutation::{IngredientDraft, RecipeDraft};
pub use service::{OptionItem, RecipeService};
pub use store::{
    DocRef, Document, DocumentStore, FieldWrite, Filter, MemoryStore, OrderBy, Query, Value,
};
pub use upload::{ImageUploader, ImageUploaderBuilder};
pub use users::{AuthIdentity, UserData, UserDirectory};
