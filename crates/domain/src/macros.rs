//! Macro for implementing Display and FromStr for persisted string enums
//!
//! Notification statuses, endpoints and precondition codes are stored as
//! plain strings. This macro keeps the variant/string mapping in one place.
//!
//! # Example
//!
//! ```rust
//! use passiae_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum DeliveryStatus {
//!     Queued,
//!     Sent,
//! }
//!
//! impl_domain_status_conversions!(DeliveryStatus {
//!     Queued => "queued",
//!     Sent => "sent",
//! });
//!
//! assert_eq!(DeliveryStatus::Sent.to_string(), "sent");
//! assert_eq!("queued".parse::<DeliveryStatus>(), Ok(DeliveryStatus::Queued));
//! assert!("QUEUED".parse::<DeliveryStatus>().is_err());
//! ```

/// Implements Display and FromStr traits for persisted string enums
///
/// - Display writes the mapped string exactly as given
/// - FromStr only accepts the mapped strings exactly
/// - The expansion spells out `std` paths so call sites may import their own
///   `Result` alias
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// The persisted string representation.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $(
                    if s == $str {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
