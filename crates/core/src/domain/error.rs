use thiserror::Error;

use super::{Role, Stage};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("login number must not be empty")]
    EmptyLoginNo,
    #[error("invalid login number length: {0}. must be at most 20 characters")]
    InvalidLoginNoLength(usize),
    #[error("login number contains invalid characters: {0}")]
    InvalidLoginNoCharacters(String),
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("role {actual} is not allowed here, {required} required")]
    RoleMismatch { required: Role, actual: Role },
    #[error("invalid stage flag: {0:?}. flag must be \"0\" or \"1\"")]
    InvalidStageFlag(String),
    #[error("stage {0} is closed")]
    StageClosed(Stage),
    #[error("file name must not be empty")]
    EmptyFileName,
    #[error("file type not allowed: {0}")]
    DisallowedFileType(String),
    #[error("{field} must not be empty")]
    EmptyText { field: &'static str },
    #[error("{field} is too long: {len} characters, at most {max} allowed")]
    TextTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}
