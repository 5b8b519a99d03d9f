//! Translation rule engine
//!
//! Pure functions from the normalized observation vocabulary to each
//! destination schema's vocabulary and computed totals. Nothing here touches
//! storage; callers fetch observations through [`crate::query::Observations`].
//!
//! Out-of-vocabulary or absent input maps to an explicit "not available"
//! variant. Only two conditions are errors: a non-numeric value where a
//! number is required ([`crate::Error::ValueFormat`]), and a value the
//! destination requires but cannot be resolved
//! ([`crate::Error::MissingRequiredField`]).

/// Closed vocabulary enum with its literal terms
///
/// Generates `as_str`, exact-term lookup, `Display` and string `Serialize`.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $term:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $term),+
                }
            }

            /// Exact match against an already normalized term
            pub fn from_term(term: &str) -> Option<Self> {
                match term {
                    $($term => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

pub mod audubon;
pub mod effort;
pub mod mou;
pub mod numeric;
pub mod precipitation;
pub mod species;
pub mod time;
pub mod vocab;

pub use numeric::{parse_number, round_for_report, snow_depth_reported};
pub use precipitation::{combine, Precipitation};
pub use species::{Checklist, Eligibility, SpeciesTally};
