//! Reference resolution against the small lookup collections.
//!
//! A resolved reference always carries a label: when the reference is null,
//! the target document is missing, or (on lenient paths) the lookup fails,
//! the label falls back to the caller's sentinel instead of erroring.

use crate::error::StoreError;
use crate::store::{DocRef, DocumentStore};

/// Sentinel label for unresolved category and difficulty references.
pub const UNDEFINED_FEMININE: &str = "Não definida";
/// Sentinel label for unresolved time references.
pub const UNDEFINED_MASCULINE: &str = "Não definido";
/// Sentinel label for unresolved unit and food-type references.
pub const NOT_AVAILABLE: &str = "N/A";
/// Sentinel display name for an unresolvable recipe creator.
pub const UNKNOWN_USER: &str = "Desconhecido";
/// Fallback name for a recipe document without one.
pub const UNNAMED_RECIPE: &str = "Sem Nome";
/// Fallback photo for a recipe or profile without one.
pub const PLACEHOLDER_PHOTO: &str = "assets/placeholder.png";

/// A reference resolved to its identifier and display label.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRef {
    pub id: Option<String>,
    pub label: String,
}

impl ResolvedRef {
    fn sentinel(sentinel: &str) -> Self {
        Self {
            id: None,
            label: sentinel.to_string(),
        }
    }
}

/// Resolve a lookup reference, isolating failures at the field level: a
/// failed or empty lookup yields the sentinel label, never an error.
pub async fn resolve_ref(
    store: &dyn DocumentStore,
    target: Option<&DocRef>,
    sentinel: &str,
) -> ResolvedRef {
    let Some(target) = target else {
        return ResolvedRef::sentinel(sentinel);
    };
    match store.get(target).await {
        Ok(Some(doc)) => ResolvedRef {
            id: Some(target.id.clone()),
            label: doc.str_or("label", sentinel),
        },
        Ok(None) => ResolvedRef {
            id: Some(target.id.clone()),
            label: sentinel.to_string(),
        },
        Err(error) => {
            tracing::warn!(target = %target, %error, "lookup failed, using sentinel label");
            ResolvedRef {
                id: Some(target.id.clone()),
                label: sentinel.to_string(),
            }
        }
    }
}

/// Resolve a lookup reference on a write path: a missing document still
/// yields the sentinel, but a store failure propagates so the caller's
/// write fails visibly.
pub async fn try_resolve_ref(
    store: &dyn DocumentStore,
    target: Option<&DocRef>,
    sentinel: &str,
) -> Result<ResolvedRef, StoreError> {
    let Some(target) = target else {
        return Ok(ResolvedRef::sentinel(sentinel));
    };
    let label = match store.get(target).await? {
        Some(doc) => doc.str_or("label", sentinel),
        None => sentinel.to_string(),
    };
    Ok(ResolvedRef {
        id: Some(target.id.clone()),
        label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn null_reference_resolves_to_sentinel() {
        let store = MemoryStore::new();
        let resolved = resolve_ref(&store, None, UNDEFINED_FEMININE).await;
        assert_eq!(resolved.id, None);
        assert_eq!(resolved.label, UNDEFINED_FEMININE);
    }

    #[tokio::test]
    async fn missing_document_keeps_id_and_uses_sentinel() {
        let store = MemoryStore::new();
        let target = DocRef::new("times", "9");
        let resolved = resolve_ref(&store, Some(&target), UNDEFINED_MASCULINE).await;
        assert_eq!(resolved.id.as_deref(), Some("9"));
        assert_eq!(resolved.label, UNDEFINED_MASCULINE);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_sentinel_on_read_path() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let target = DocRef::new("categories", "1");
        let resolved = resolve_ref(&store, Some(&target), UNDEFINED_FEMININE).await;
        assert_eq!(resolved.label, UNDEFINED_FEMININE);
    }

    #[tokio::test]
    async fn store_failure_propagates_on_write_path() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let target = DocRef::new("categories", "1");
        assert!(try_resolve_ref(&store, Some(&target), UNDEFINED_FEMININE)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn existing_document_resolves_to_its_label() {
        let store = MemoryStore::new();
        store.insert_label("categories", "1", "Sobremesas");
        let target = DocRef::new("categories", "1");
        let resolved = resolve_ref(&store, Some(&target), UNDEFINED_FEMININE).await;
        assert_eq!(resolved.id.as_deref(), Some("1"));
        assert_eq!(resolved.label, "Sobremesas");
    }
}
