use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// Every variant, in declaration order.
            pub fn all() -> &'static [$name] {
                &[$(Self::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Gender {
    Male => "Male",
    Female => "Female",
    Other => "Other",
});

str_enum!(BiologicalSex {
    Male => "Male",
    Female => "Female",
});

str_enum!(ActivityLevel {
    Low => "Low",
    Moderate => "Moderate",
    High => "High",
});

str_enum!(YesNo {
    Yes => "Yes",
    No => "No",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn gender_accepts_exact_labels() {
        for (variant, s) in [
            (Gender::Male, "Male"),
            (Gender::Female, "Female"),
            (Gender::Other, "Other"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Gender::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn gender_is_case_sensitive() {
        assert!(Gender::from_str("male").is_err());
        assert!(Gender::from_str("").is_err());
    }

    #[test]
    fn gender_serializes_as_label() {
        assert_eq!(serde_json::to_value(Gender::Other).unwrap(), "Other");
        let parsed: Gender = serde_json::from_str("\"Female\"").unwrap();
        assert_eq!(parsed, Gender::Female);
    }

    #[test]
    fn biological_sex_has_no_other() {
        assert_eq!(BiologicalSex::all().len(), 2);
        assert!(BiologicalSex::from_str("Other").is_err());
    }

    #[test]
    fn invalid_enum_names_the_field() {
        let err = ActivityLevel::from_str("Extreme").unwrap_err();
        assert!(err.to_string().contains("ActivityLevel"));
        assert!(YesNo::from_str("maybe").is_err());
    }
}
