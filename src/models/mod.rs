pub mod client;
pub mod cuisine;
pub mod dish;
pub mod site;

pub use client::{ClientProfile, Gender, MaritalStatus};
pub use cuisine::{catalog, subtypes_for, subtypes_for_label, Cuisine, CuisineCatalogEntry};
pub use dish::{CookingMethod, DishCategory, DishDietary, DishItem, DishOccasion, DishType};
pub use site::{
    FeaturedMenuSection, FooterSection, HeaderSection, ImageSlot, IntroMediaSection, IntroSection,
    SiteDocument, StorefrontSeed, WebsiteRecord, DEFAULT_COLOR, DEFAULT_LOGO_URL,
};

use thiserror::Error;

/// A string did not match any label of a closed set
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set whose wire and display form is a human label.
///
/// Generates `ALL`, `label()`, `Display`, `FromStr` and label-based serde.
#[macro_export]
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn labels() -> impl Iterator<Item = &'static str> {
                Self::ALL.iter().map(|v| v.label())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label() == s)
                    .ok_or_else(|| $crate::models::UnknownLabel {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}
