//! Macro for implementing string conversions on status enums
//!
//! Status enums are persisted as lowercase text and parsed back
//! case-insensitively. One macro invocation generates `as_str`, `Display`
//! and `FromStr` from a single variant-to-string table.
//!
//! # Example
//!
//! ```rust
//! use leadflow_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum ConnectionPhase {
//!     Idle,
//!     Authorizing,
//! }
//!
//! impl_domain_status_conversions!(ConnectionPhase {
//!     Idle => "idle",
//!     Authorizing => "authorizing",
//! });
//!
//! assert_eq!(ConnectionPhase::Idle.as_str(), "idle");
//! assert_eq!("AUTHORIZING".parse::<ConnectionPhase>(), Ok(ConnectionPhase::Authorizing));
//! ```

/// Implements `as_str`, `Display` and `FromStr` for status enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase string
///   representations
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Persisted string form of this status.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
