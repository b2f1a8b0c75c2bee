//! User records and the identity resolved from an access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Persisted user record. Only the storage layer and the account service
/// ever see `password_hash`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for `UserStore::create_user`. The email is already normalized.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

/// Partial profile change. Outer `None` leaves a field alone, `Some(None)`
/// clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 120))]
    pub display_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 1000))]
    pub bio: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ProfileUpdate {
    pub fn apply(&self, user: &mut User) {
        if let Some(display_name) = &self.display_name {
            user.display_name = display_name.clone();
        }
        if let Some(bio) = &self.bio {
            user.bio = bio.clone();
        }
    }
}

/// Authenticated identity for the duration of one request. Also the public
/// profile representation: it never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            bio: user.bio,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Lowercase and trim an email so lookups and the uniqueness constraint see
/// one spelling.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "u@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            display_name: Some("Old".to_string()),
            bio: Some("bio".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
    }

    #[test]
    fn principal_serialization_omits_hash() {
        let json = serde_json::to_value(Principal::from(user())).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "u@example.com");
    }

    #[test]
    fn profile_update_distinguishes_absent_and_null() {
        let update: ProfileUpdate = serde_json::from_str(r#"{"bio": null}"#).unwrap();
        assert_eq!(update.display_name, None);
        assert_eq!(update.bio, Some(None));

        let mut u = user();
        update.apply(&mut u);
        assert_eq!(u.display_name.as_deref(), Some("Old"));
        assert_eq!(u.bio, None);
    }

    #[test]
    fn profile_update_length_limits() {
        let ok: ProfileUpdate = serde_json::from_str(r#"{"display_name": null, "bio": "short"}"#).unwrap();
        assert!(ok.validate().is_ok());

        let long_name = "n".repeat(121);
        let update = ProfileUpdate {
            display_name: Some(Some(long_name)),
            bio: None,
        };
        let errors = update.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("display_name"));
        assert!(!errors.field_errors().contains_key("bio"));

        let at_limit = ProfileUpdate {
            display_name: Some(Some("n".repeat(120))),
            bio: Some(Some("b".repeat(1000))),
        };
        assert!(at_limit.validate().is_ok());

        let long_bio = ProfileUpdate {
            display_name: Some(None),
            bio: Some(Some("b".repeat(1001))),
        };
        let errors = long_bio.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("bio"));
        assert!(!errors.field_errors().contains_key("display_name"));
    }

    #[test]
    fn profile_update_sets_value() {
        let update: ProfileUpdate = serde_json::from_str(r#"{"display_name": "U"}"#).unwrap();
        let mut u = user();
        update.apply(&mut u);
        assert_eq!(u.display_name.as_deref(), Some("U"));
        assert_eq!(u.bio.as_deref(), Some("bio"));
    }
}
