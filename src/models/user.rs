//! User domain models

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::catalog::Movie;

static ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

/// User account as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    /// Ordered, duplicate-free movie references
    pub favorite_movies: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
}

/// Registration request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserRequest {
    #[validate(
        length(min = 5, message = "Username must be at least 5 characters long."),
        regex(path = *ALPHANUMERIC, message = "Username can only contain alphanumeric characters.")
    )]
    pub username: String,
    pub password: String,
    #[validate(email(message = "Email does not appear to be valid."))]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_birthday")]
    pub birthday: Option<NaiveDate>,
}

/// Profile update request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 5, message = "Username must be at least 5 characters long."),
        regex(path = *ALPHANUMERIC, message = "Username can only contain alphanumeric characters.")
    )]
    pub username: Option<String>,
    pub password: Option<String>,
    #[validate(email(message = "Email does not appear to be valid."))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_birthday")]
    pub birthday: Option<NaiveDate>,
}

/// Accepts a calendar date (`1990-04-01`) or an RFC 3339 timestamp, which is
/// reduced to its UTC date.
pub fn parse_birthday(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

fn deserialize_birthday<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| {
        parse_birthday(&value).ok_or_else(|| {
            de::Error::custom("Birthday must be a date (YYYY-MM-DD) or an RFC 3339 timestamp")
        })
    })
    .transpose()
}

/// User response (without sensitive data)
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub favorite_movies: Vec<Uuid>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            birthday: user.birthday,
            favorite_movies: user.favorite_movies,
        }
    }
}

/// User with favorite movies resolved
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserFavoritesResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub favorite_movies: Vec<Movie>,
}

/// Normalise an email for uniqueness checks
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateUserRequest {
        CreateUserRequest {
            username: "alice12".to_string(),
            password: "Secret123!".to_string(),
            email: "alice@example.com".to_string(),
            birthday: None,
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_short_username_rejected() {
        let mut req = valid_request();
        req.username = "al1".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_non_alphanumeric_username_rejected() {
        let mut req = valid_request();
        req.username = "alice_12".to_string();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut req = valid_request();
        req.email = "not-an-email".to_string();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_update_fields_are_optional() {
        assert!(UpdateUserRequest::default().validate().is_ok());

        let req = UpdateUserRequest {
            username: Some("bob".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_registration_wire_format() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"Username":"alice12","Password":"Secret123!","Email":"a@b.co","Birthday":"1990-04-01"}"#,
        )
        .unwrap();
        assert_eq!(req.username, "alice12");
        assert_eq!(req.birthday, NaiveDate::from_ymd_opt(1990, 4, 1));
    }

    #[test]
    fn test_birthday_accepts_timestamps() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"Username":"alice12","Password":"Secret123!","Email":"a@b.co","Birthday":"1990-04-01T00:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(req.birthday, NaiveDate::from_ymd_opt(1990, 4, 1));

        assert_eq!(
            parse_birthday("1990-04-01T01:30:00+02:00"),
            NaiveDate::from_ymd_opt(1990, 3, 31)
        );
        assert_eq!(parse_birthday("April 1st"), None);
    }

    #[test]
    fn test_birthday_is_optional() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"Birthday":null}"#).unwrap();
        assert!(req.birthday.is_none());

        let req: CreateUserRequest = serde_json::from_str(
            r#"{"Username":"alice12","Password":"Secret123!","Email":"a@b.co"}"#,
        )
        .unwrap();
        assert!(req.birthday.is_none());
    }

    #[test]
    fn test_response_never_carries_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice12".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            email: "alice@example.com".to_string(),
            birthday: None,
            favorite_movies: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.to_lowercase().contains("password"));
        assert!(json.contains("\"_id\""));
        assert!(json.contains("\"FavoriteMovies\""));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
