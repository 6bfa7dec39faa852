//! Domain aggregates exposed by the claims service layer.

/// Generates a closed string-backed enum used for persisted status columns.
macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name stored in the database.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::types::TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($name::$variant),)+
                    other => Err($crate::domain::types::TypeConstraintError::InvalidValue(
                        format!("unknown {}: {other}", stringify!($name)),
                    )),
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = $crate::domain::types::TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub mod claim;
pub mod claim_event;
pub mod client;
pub mod compliance;
pub mod depreciation;
pub mod document;
pub mod estimate;
pub mod job;
pub mod lead;
pub mod member;
pub mod notification;
pub mod organization;
pub mod property;
pub mod types;
pub mod webhook;
