//! User account domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Account role determining which capabilities a user holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Student,
    Teacher,
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Student => "student",
            UserRole::Teacher => "teacher",
            UserRole::Staff => "staff",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "student" => Ok(UserRole::Student),
            "teacher" => Ok(UserRole::Teacher),
            "staff" => Ok(UserRole::Staff),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

/// Error for unrecognized role strings.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct InvalidRole(pub String);

/// User account domain model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this account is a student account.
    pub fn is_student(&self) -> bool {
        self.role == UserRole::Student
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::Admin,
            UserRole::Student,
            UserRole::Teacher,
            UserRole::Staff,
        ] {
            let parsed: UserRole = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_role_from_str_rejects_unknown() {
        let result: Result<UserRole, _> = "superuser".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&UserRole::Student).unwrap();
        assert_eq!(json, "\"student\"");
        let role: UserRole = serde_json::from_str("\"staff\"").unwrap();
        assert_eq!(role, UserRole::Staff);
    }

    #[test]
    fn test_user_is_student() {
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Nguyen Van A".to_string(),
            email: "a@example.edu".to_string(),
            role: UserRole::Student,
            student_code: Some("SV001234".to_string()),
            teacher_code: None,
            major_id: None,
            date_of_birth: None,
            created_at: Utc::now(),
        };
        assert!(user.is_student());
    }
}
