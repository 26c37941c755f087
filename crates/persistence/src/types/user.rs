//! Account records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Entity;
use crate::error::ValidationError;
use crate::schema::{EntitySchema, FieldDescriptor};
use crate::types::FieldValue;

/// Descriptor tree of [`User`].
pub static USER_SCHEMA: EntitySchema = EntitySchema {
    name: "User",
    table: "users",
    fields: &[
        FieldDescriptor::integer("id"),
        FieldDescriptor::text("email"),
        FieldDescriptor::text("first_name"),
        FieldDescriptor::text("last_name"),
        FieldDescriptor::text("cellphone"),
        FieldDescriptor::boolean("is_active"),
        FieldDescriptor::timestamp("created_at"),
    ],
};

/// A registered account.
///
/// Serializes as the public profile (names, email and cellphone), which is
/// how owners appear inside source payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    #[serde(skip_serializing)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub cellphone: Option<String>,
    #[serde(skip_serializing)]
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds a user from a validated draft.
    pub fn from_draft(id: i64, draft: UserDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            cellphone: draft.cellphone,
            is_active: true,
            created_at,
        }
    }
}

impl Entity for User {
    fn schema() -> &'static EntitySchema {
        &USER_SCHEMA
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn field_value(&self, path: &str) -> FieldValue {
        match path {
            "id" => self.id.into(),
            "email" => self.email.clone().into(),
            "first_name" => self.first_name.clone().into(),
            "last_name" => self.last_name.clone().into(),
            "cellphone" => self.cellphone.clone().into(),
            "is_active" => self.is_active.into(),
            "created_at" => self.created_at.into(),
            _ => FieldValue::Null,
        }
    }
}

/// Fields supplied when registering an account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDraft {
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub cellphone: Option<String>,
}

impl UserDraft {
    /// A draft with only an email address.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    /// Checks that the account can be identified by email or cellphone.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        if blank(&self.email) && blank(&self.cellphone) {
            return Err(ValidationError::MissingRequiredField {
                field: "email".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_serialization() {
        let user = User::from_draft(
            7,
            UserDraft {
                email: Some("john@snow.com".to_string()),
                first_name: "john".to_string(),
                last_name: "snow".to_string(),
                cellphone: Some("09123456789".to_string()),
            },
            Utc::now(),
        );
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "first_name": "john",
                "last_name": "snow",
                "email": "john@snow.com",
                "cellphone": "09123456789"
            })
        );
    }

    #[test]
    fn test_draft_requires_contact() {
        assert!(UserDraft::default().validate().is_err());
        assert!(UserDraft::with_email("a@b.c").validate().is_ok());
    }

    #[test]
    fn test_field_value() {
        let user = User::from_draft(3, UserDraft::with_email("a@b.c"), Utc::now());
        assert_eq!(user.field_value("id"), FieldValue::Integer(3));
        assert_eq!(user.field_value("cellphone"), FieldValue::Null);
        assert_eq!(user.field_value("email"), FieldValue::from("a@b.c"));
    }
}
