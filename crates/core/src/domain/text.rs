use std::fmt;

use super::DomainError;

macro_rules! define_text_type {
    ($name:ident, $field:literal, $max:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub const MAX_LEN: usize = $max;

            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                let trimmed = value.trim();

                if trimmed.is_empty() {
                    return Err(DomainError::EmptyText { field: $field });
                }

                let len = trimmed.chars().count();
                if len > Self::MAX_LEN {
                    return Err(DomainError::TextTooLong {
                        field: $field,
                        len,
                        max: Self::MAX_LEN,
                    });
                }

                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_text_type!(DisplayName, "username", 20);
define_text_type!(NoticeTitle, "title", 200);
define_text_type!(NoticeContent, "content", 10_000);
define_text_type!(CommentContent, "content", 1_000);
define_text_type!(DocumentName, "file name", 200);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_notice_title_is_created() {
        let title = NoticeTitle::new("  开题报告提交通知  ").expect("title should be valid");
        assert_eq!(title.as_str(), "开题报告提交通知");
    }

    #[test]
    fn empty_comment_is_rejected() {
        let err = CommentContent::new("   ").expect_err("empty comment should be rejected");
        assert_eq!(err, DomainError::EmptyText { field: "content" });
    }

    #[test]
    fn too_long_comment_is_rejected() {
        let long = "评".repeat(CommentContent::MAX_LEN + 1);
        let err = CommentContent::new(long).expect_err("too long comment should be rejected");
        assert_eq!(
            err,
            DomainError::TextTooLong {
                field: "content",
                len: 1_001,
                max: 1_000,
            }
        );
    }

    #[test]
    fn display_name_limit_counts_characters() {
        assert!(DisplayName::new("张".repeat(20)).is_ok());
        assert!(DisplayName::new("张".repeat(21)).is_err());
    }
}
