use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "管理员",
            Role::Teacher => "教师",
            Role::Student => "学生",
        }
    }

    /// Succeeds only when `self` is exactly `required`; roles do not nest.
    pub fn ensure(self, required: Role) -> Result<(), DomainError> {
        if self == required {
            Ok(())
        } else {
            Err(DomainError::RoleMismatch {
                required,
                actual: self,
            })
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_from_form_value() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert_eq!(
            "root".parse::<Role>(),
            Err(DomainError::InvalidRole("root".to_string()))
        );
    }

    #[test]
    fn ensure_requires_exact_role() {
        assert!(Role::Admin.ensure(Role::Admin).is_ok());
        assert_eq!(
            Role::Admin.ensure(Role::Student),
            Err(DomainError::RoleMismatch {
                required: Role::Student,
                actual: Role::Admin,
            })
        );
    }
}
