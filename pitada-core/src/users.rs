//! User directory: typed profile documents and the display-name rules.
//!
//! The `users` collection carries a legacy mix of `user_name` and
//! `displayName`; every read prefers `user_name`, then `displayName`, then
//! the email, then the unknown-user sentinel.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::StoreError;
use crate::lookup::UNKNOWN_USER;
use crate::store::{collections, DocRef, Document, DocumentStore, FieldWrite, Value};

/// Default stored name for an identity that supplied neither a display
/// name nor an email.
const NEW_USER_NAME: &str = "Novo Usuário";

/// A user profile document mapped to a typed view model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub uid: String,
    pub user_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub favorite_recipe_ids: Vec<String>,
}

impl UserData {
    /// Map a raw user document. Every optional field defaults explicitly;
    /// untyped data does not leak past this boundary.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            uid: doc.id.clone(),
            user_name: doc.str_field("user_name").map(str::to_string),
            display_name: doc.str_field("displayName").map(str::to_string),
            email: doc.str_field("email").map(str::to_string),
            photo_url: doc.str_field("photoURL").map(str::to_string),
            favorite_recipe_ids: doc.string_array("favoriteRecipeIds"),
        }
    }
}

/// Display name for a user document: `user_name`, then `displayName`, then
/// email, then the unknown-user sentinel.
pub fn display_name(doc: &Document) -> String {
    for field in ["user_name", "displayName", "email"] {
        if let Some(name) = doc.str_field(field) {
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    UNKNOWN_USER.to_string()
}

/// The slice of the auth provider's current-user event this core consumes.
#[derive(Debug, Clone, Default)]
pub struct AuthIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Profile document reads and writes for the `users` collection.
pub struct UserDirectory {
    store: Arc<dyn DocumentStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn user_ref(uid: &str) -> DocRef {
        DocRef::new(collections::USERS, uid)
    }

    /// Read a profile. Read-path policy: failures are logged and collapse
    /// to `None`.
    pub async fn user_data(&self, uid: &str) -> Option<UserData> {
        match self.store.get(&Self::user_ref(uid)).await {
            Ok(Some(doc)) => Some(UserData::from_document(&doc)),
            Ok(None) => {
                tracing::debug!(uid, "user document not found");
                None
            }
            Err(error) => {
                tracing::warn!(uid, %error, "failed to read user data");
                None
            }
        }
    }

    /// Create the profile document for a freshly registered identity, with
    /// an empty favorites list. Merge semantics keep any fields written by
    /// a concurrent login on another device.
    pub async fn register_profile(
        &self,
        identity: &AuthIdentity,
        user_name: &str,
    ) -> Result<(), StoreError> {
        let fields = vec![
            ("user_name".to_string(), set_opt(Some(user_name.to_string()))),
            ("displayName".to_string(), set_opt(identity.display_name.clone())),
            ("email".to_string(), set_opt(identity.email.clone())),
            ("photoURL".to_string(), set_opt(identity.photo_url.clone())),
            (
                "favoriteRecipeIds".to_string(),
                FieldWrite::Set(Value::Array(Vec::new())),
            ),
        ];
        self.store
            .set(&Self::user_ref(&identity.uid), fields, true)
            .await
            .inspect_err(|error| {
                tracing::error!(uid = identity.uid, %error, "failed to create user profile");
            })
    }

    /// Create or refresh the profile document on login. An existing
    /// document keeps its favorites; only the identity fields are patched.
    pub async fn refresh_profile(&self, identity: &AuthIdentity) -> Result<(), StoreError> {
        let user_ref = Self::user_ref(&identity.uid);
        let user_name = identity
            .display_name
            .clone()
            .or_else(|| identity.email.clone())
            .unwrap_or_else(|| NEW_USER_NAME.to_string());

        let identity_fields = vec![
            ("user_name".to_string(), set_opt(Some(user_name))),
            ("displayName".to_string(), set_opt(identity.display_name.clone())),
            ("email".to_string(), set_opt(identity.email.clone())),
            ("photoURL".to_string(), set_opt(identity.photo_url.clone())),
        ];

        let result = match self.store.get(&user_ref).await? {
            Some(_) => self.store.update(&user_ref, identity_fields).await,
            None => {
                let mut fields = identity_fields;
                fields.push((
                    "favoriteRecipeIds".to_string(),
                    FieldWrite::Set(Value::Array(Vec::new())),
                ));
                self.store.set(&user_ref, fields, false).await
            }
        };
        result.inspect_err(|error| {
            tracing::error!(uid = identity.uid, %error, "failed to refresh user profile");
        })
    }

    /// Point the profile photo at a freshly uploaded URL.
    pub async fn update_photo_url(&self, uid: &str, photo_url: &str) -> Result<(), StoreError> {
        self.store
            .update(
                &Self::user_ref(uid),
                vec![(
                    "photoURL".to_string(),
                    FieldWrite::Set(Value::from(photo_url)),
                )],
            )
            .await
            .inspect_err(|error| {
                tracing::error!(uid, %error, "failed to update profile photo");
            })
    }
}

fn set_opt(value: Option<String>) -> FieldWrite {
    FieldWrite::Set(value.map(Value::from).unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn doc(fields: Vec<(&str, Value)>) -> Document {
        let fields: BTreeMap<String, Value> = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Document::new("u1", fields)
    }

    #[test]
    fn display_name_prefers_user_name() {
        let user = doc(vec![
            ("user_name", Value::from("maria")),
            ("displayName", Value::from("Maria Silva")),
            ("email", Value::from("maria@example.com")),
        ]);
        assert_eq!(display_name(&user), "maria");
    }

    #[test]
    fn display_name_falls_back_through_the_chain() {
        let user = doc(vec![("email", Value::from("maria@example.com"))]);
        assert_eq!(display_name(&user), "maria@example.com");

        let empty = doc(vec![]);
        assert_eq!(display_name(&empty), UNKNOWN_USER);
    }

    #[test]
    fn blank_user_name_is_skipped() {
        let user = doc(vec![
            ("user_name", Value::from("")),
            ("displayName", Value::from("Maria Silva")),
        ]);
        assert_eq!(display_name(&user), "Maria Silva");
    }
}
