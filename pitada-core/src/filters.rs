//! Recipe feed query builder.
//!
//! Composes the base recipe collection query with the optional feed
//! predicates, staying inside the store's limits: at most ten elements per
//! disjunctive clause (excess is dropped and logged) and a single
//! order-by/range clause, which the name prefix search occupies.

use crate::food_types::FoodTypeLabels;
use crate::store::{collections, DocRef, Filter, Query, Value, MAX_DISJUNCTION};

/// Highest code point the store orders after every valid string, making
/// `start_at(term)..end_at(term + PREFIX_UPPER_BOUND)` a prefix match.
const PREFIX_UPPER_BOUND: char = '\u{f8ff}';

/// Optional feed predicates. All recognized filters are ANDed; an empty
/// set yields the unfiltered collection query.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilters {
    /// Category identifiers; one becomes an equality, several an `in`.
    pub categories: Vec<String>,
    /// Time identifiers; only the first is used.
    pub time: Vec<String>,
    /// Difficulty identifiers; only the first is used.
    pub difficulty: Vec<String>,
    /// Food-type identifiers, translated to stored labels before filtering.
    pub food_types: Vec<String>,
    /// Name prefix, matched case-insensitively against `recipe_name_lower`.
    pub recipe_name: Option<String>,
}

impl RecipeFilters {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.time.is_empty()
            && self.difficulty.is_empty()
            && self.food_types.is_empty()
            && self.recipe_name.is_none()
    }
}

/// Truncate a disjunctive clause to the store's limit, keeping input order.
fn cap_disjunction(mut values: Vec<Value>, clause: &str) -> Vec<Value> {
    if values.len() > MAX_DISJUNCTION {
        tracing::warn!(
            clause,
            dropped = values.len() - MAX_DISJUNCTION,
            "disjunction over the store limit, keeping the first {MAX_DISJUNCTION}"
        );
        values.truncate(MAX_DISJUNCTION);
    }
    values
}

/// Build the recipe feed query for a filter set.
pub fn build_recipe_query(filters: &RecipeFilters, food_types: &FoodTypeLabels) -> Query {
    let mut query = Query::collection(collections::RECIPES);

    if !filters.food_types.is_empty() {
        let labels = food_types.resolve_labels(&filters.food_types);
        // An unpopulated cache resolves nothing; the predicate silently
        // becomes a no-op rather than an error.
        if !labels.is_empty() {
            let labels = cap_disjunction(
                labels.into_iter().map(Value::from).collect(),
                "array-contains-any",
            );
            query = query.filter(Filter::array_contains_any("ingredient_food_type", labels));
        }
    }

    if !filters.categories.is_empty() {
        if filters.categories.len() == 1 {
            query = query.filter(Filter::eq(
                "category_id",
                DocRef::new(collections::CATEGORIES, filters.categories[0].clone()),
            ));
        } else {
            let refs = cap_disjunction(
                filters
                    .categories
                    .iter()
                    .map(|id| Value::Reference(DocRef::new(collections::CATEGORIES, id.clone())))
                    .collect(),
                "in",
            );
            query = query.filter(Filter::is_in("category_id", refs));
        }
    }

    if let Some(time_id) = filters.time.first() {
        query = query.filter(Filter::eq(
            "time_id",
            DocRef::new(collections::TIMES, time_id.clone()),
        ));
    }
    if let Some(difficulty_id) = filters.difficulty.first() {
        query = query.filter(Filter::eq(
            "difficulty_id",
            DocRef::new(collections::DIFFICULTIES, difficulty_id.clone()),
        ));
    }

    if let Some(term) = filters
        .recipe_name
        .as_deref()
        .filter(|term| !term.is_empty())
    {
        let term = term.to_lowercase();
        let upper = format!("{term}{PREFIX_UPPER_BOUND}");
        query = query.order_between(
            "recipe_name_lower",
            Some(Value::from(term)),
            Some(Value::from(upper)),
        );
    }

    query
}
