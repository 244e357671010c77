use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Login number of a principal: `admin_no`, `teacher_no` or `student_no`.
///
/// Also used as the owner segment of upload directories, so it never holds
/// path separators or whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoginNo(String);

impl LoginNo {
    pub const MAX_LEN: usize = 20;

    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(DomainError::EmptyLoginNo);
        }

        let len = trimmed.chars().count();
        if len > Self::MAX_LEN {
            return Err(DomainError::InvalidLoginNoLength(len));
        }

        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '.' | ':'))
        {
            return Err(DomainError::InvalidLoginNoCharacters(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoginNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LoginNo {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LoginNo> for String {
    fn from(value: LoginNo) -> Self {
        value.0
    }
}
