/*
 * Responsibility
 * - register / login の request/response DTO
 * - email は trim + lower-case に正規化してから保存・照合する
 */
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::repos::user_repo::UserProfile;
use crate::services::auth::Role;
use crate::services::ids::UserId;

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

impl RegisterRequest {
    /// Returns the requested role (defaults to applicant).
    pub fn validate(&self) -> Result<Role, AppError> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err(AppError::bad_request(
                "MISSING_FIELDS",
                "name, email and password are required",
            ));
        }
        if !self.email.contains('@') {
            return Err(AppError::bad_request("INVALID_EMAIL", "email is invalid"));
        }
        if self.name.trim().chars().count() > 100 {
            return Err(AppError::bad_request(
                "INVALID_NAME",
                "name must be <= 100 chars",
            ));
        }

        match self.role.as_deref() {
            None => Ok(Role::default()),
            Some(raw) => raw.parse().map_err(|_| {
                AppError::bad_request("INVALID_ROLE", "role must be employer or applicant")
            }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::bad_request(
                "MISSING_FIELDS",
                "email and password are required",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<UserProfile> for UserResponse {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "pw".to_string(),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn role_defaults_to_applicant() {
        assert_eq!(register(None).validate().unwrap(), Role::Applicant);
        assert_eq!(register(Some("employer")).validate().unwrap(), Role::Employer);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(register(Some("admin")).validate().is_err());
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut req = register(None);
        req.name = "  ".to_string();
        assert!(req.validate().is_err());

        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn name_limit_counts_characters_not_bytes() {
        let mut req = register(None);
        req.name = "あ".repeat(100);
        assert!(req.validate().is_ok());

        req.name = "あ".repeat(101);
        assert!(req.validate().is_err());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(normalize_email("  Ann@X.com "), "ann@x.com");
    }
}
