use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            pub fn new(value: i32) -> Self {
                Self(value)
            }

            pub fn into_inner(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.into_inner()
            }
        }
    };
}

define_id_type!(PrincipalId);
define_id_type!(NoticeId);
define_id_type!(GuideId);
define_id_type!(PaperId);
define_id_type!(CommentId);
define_id_type!(LookupId);

#[cfg(test)]
mod tests {
    use super::PaperId;

    #[test]
    fn paper_id_can_roundtrip_from_string() {
        let id = PaperId::new(42);
        let parsed: PaperId = id
            .to_string()
            .parse()
            .expect("generated paper id should be valid");

        assert_eq!(id, parsed);
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        assert!("abc".parse::<PaperId>().is_err());
    }
}
