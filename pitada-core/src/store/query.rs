//! Query model for the document store.
//!
//! The store composes predicates under tight limits: all predicates are
//! ANDed, disjunctive clauses (`in`, `array-contains-any`) accept at most
//! ten elements, and a single order-by with range bounds may be active.

use super::Value;

/// Pseudo field path addressing the document identifier in a predicate.
pub const DOCUMENT_ID: &str = "__name__";

/// Maximum number of elements the store accepts in one `in` or
/// `array-contains-any` clause.
pub const MAX_DISJUNCTION: usize = 10;

/// A single predicate. Predicates on the same query are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the value exactly.
    Eq { field: String, value: Value },
    /// Field equals any of the values.
    In { field: String, values: Vec<Value> },
    /// Array field shares at least one element with the values.
    ArrayContainsAny { field: String, values: Vec<Value> },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Filter::In {
            field: field.into(),
            values,
        }
    }

    pub fn array_contains_any(field: impl Into<String>, values: Vec<Value>) -> Self {
        Filter::ArrayContainsAny {
            field: field.into(),
            values,
        }
    }
}

/// Ordering clause with optional inclusive range bounds.
///
/// Documents missing the ordered field are excluded from the result, per
/// store semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub start_at: Option<Value>,
    pub end_at: Option<Value>,
}

/// A composed collection query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
}

impl Query {
    /// Unfiltered query over a collection.
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Order by a field with inclusive start/end bounds. At most one such
    /// clause may be active on a query.
    pub fn order_between(
        mut self,
        field: impl Into<String>,
        start_at: Option<Value>,
        end_at: Option<Value>,
    ) -> Self {
        self.order = Some(OrderBy {
            field: field.into(),
            start_at,
            end_at,
        });
        self
    }
}
