//! Farmer and administrator accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{require_text, Document};
use crate::lenient;
use crate::{ObjectId, Result};

/// Account role of a farmer profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    User,
    Admin,
    Moderator,
}

/// Account status, changed by administrators (e.g. suspension)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

fn default_password() -> String {
    "password".to_string()
}

/// A farmer account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub farm_location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub farm_size: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stored as supplied; compared verbatim on login
    #[serde(default = "default_password")]
    pub password: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.full_name(),
            email: self.email.clone(),
        }
    }
}

impl Document for User {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        require_text("firstName", &self.first_name)?;
        require_text("lastName", &self.last_name)?;
        require_text("email", &self.email)?;
        require_text("address", &self.address)
    }
}

/// The name/email projection embedded into prediction listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
}

fn default_admin_name() -> String {
    "Admin User".to_string()
}

/// A back-office administrator, kept apart from farmer accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub password: String,
    #[serde(default = "default_admin_name")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(name: Option<String>, email: &str, password: &str) -> Self {
        let now = crate::now();
        Self {
            id: ObjectId::new(),
            email: normalize_email(email),
            password: password.to_string(),
            name: name.unwrap_or_else(default_admin_name),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> AdminSummary {
        AdminSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

impl Document for Admin {
    const PROTECTED: &'static [&'static str] = &["_id", "createdAt"];

    fn id(&self) -> ObjectId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        require_text("email", &self.email)?;
        require_text("password", &self.password)
    }
}

/// The whitelisted admin fields returned from create/update/login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSummary {
    pub id: ObjectId,
    pub name: String,
    pub email: String,
}

/// Admin emails are stored and looked up lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document::{apply_update, create};

    fn farmer() -> User {
        create(json!({
            "firstName": "Sita",
            "lastName": "Rai",
            "email": "sita@example.com",
            "address": "Pokhara",
            "farmSize": 3
        }))
        .unwrap()
    }

    #[test]
    fn test_user_defaults() {
        let user = farmer();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.password, "password");
        assert_eq!(user.farm_size.as_deref(), Some("3"));
    }

    #[test]
    fn test_suspend_user() {
        let user = farmer();
        let updated = apply_update(&user, json!({ "status": "Suspended" })).unwrap();
        assert_eq!(updated.status, UserStatus::Suspended);
        assert_eq!(updated.email, user.email);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let user = farmer();
        assert!(apply_update(&user, json!({ "role": "Overlord" })).is_err());
    }

    #[test]
    fn test_summary_name() {
        let summary = farmer().summary();
        assert_eq!(summary.name, "Sita Rai");
    }

    #[test]
    fn test_admin_email_normalized() {
        let admin = Admin::new(None, " Boss@Example.COM ", "p");
        assert_eq!(admin.email, "boss@example.com");
        assert_eq!(admin.name, "Admin User");
    }
}
