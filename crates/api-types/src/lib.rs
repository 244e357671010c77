//! Form and query payloads shared by the web handlers.
//!
//! Browsers submit every field of a form, empty or not, so most fields are
//! plain `String`s defaulting to empty, and numeric selects arrive as text
//! that may be blank.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
}

impl HealthCheckResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Treats a blank form value as absent.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Parses an optional numeric select value; blank or malformed means none.
pub fn optional_id(value: &str) -> Option<i32> {
    non_blank(value).and_then(|v| v.parse().ok())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub user_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Process control checkboxes: a flag is open when its box was submitted at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProcessControlForm {
    pub releasing_notices: Option<String>,
    pub complete_personal_data: Option<String>,
    pub upload_paper_guide: Option<String>,
    pub upload_end_evaluate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NoticeForm {
    pub title: String,
    pub content: String,
    pub lead_foot: String,
}

/// Admin add/edit user form. `user_type` selects which of the login number
/// fields is read on creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub user_type: String,
    pub student_no: String,
    pub teacher_no: String,
    pub username: String,
    pub password: String,
    pub sex: String,
    pub birth: String,
    pub native_place_id: String,
    pub class_id: String,
    pub grade_id: String,
    pub teacher_id: String,
    pub descs: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub username: String,
    pub sex: String,
    pub birth: String,
    pub native_place_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReviewForm {
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserListQuery {
    #[serde(rename = "type")]
    pub user_type: Option<String>,
    pub page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_ok_payload() {
        let response = HealthCheckResponse::ok();
        assert_eq!(response.status, "ok");
    }

    #[test]
    fn flash_serializes_level_in_lowercase() {
        let json = serde_json::to_string(&Flash::error("当前不允许上传论文")).expect("serialize flash");
        assert_eq!(json, r#"{"level":"error","message":"当前不允许上传论文"}"#);
    }

    #[test]
    fn blank_select_values_are_absent() {
        assert_eq!(optional_id(""), None);
        assert_eq!(optional_id("  "), None);
        assert_eq!(optional_id("x"), None);
        assert_eq!(optional_id(" 3 "), Some(3));
        assert_eq!(non_blank(" T001 "), Some("T001"));
    }
}
