use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ParseEnumError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde goes through the same string table, so reports and config files
/// spell variants exactly as `as_str` does.
/// Variant order is significant: `Ord` follows declaration order.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// Declaration order doubles as the classifier's tie-break priority.
str_enum!(DocumentType {
    LastWillAndTestament => "last_will_and_testament",
    PurchaseAndSaleAgreement => "purchase_and_sale_agreement",
    PropertyDeed => "property_deed",
    PowerOfAttorney => "power_of_attorney",
    PropertyPartition => "property_partition",
    MortgageDocument => "mortgage_document",
    PropertyDeclaration => "property_declaration",
    LandBoundarySurvey => "land_boundary_survey",
    PropertyTransfer => "property_transfer",
    PropertyHoldingsRecord => "property_holdings_record",
    HeirDocumentation => "heir_documentation",
    TaxAssessmentDocument => "tax_assessment_document",
    LandRegistryDocument => "land_registry_document",
    AdministrativeForm => "administrative_form",
    Unclassified => "unclassified",
});

impl DocumentType {
    /// The fourteen recognised types, in priority order.
    pub fn classified() -> impl Iterator<Item = DocumentType> {
        Self::ALL
            .iter()
            .copied()
            .filter(|t| *t != DocumentType::Unclassified)
    }

    /// Human-readable title used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LastWillAndTestament => "Last Will and Testament",
            Self::PurchaseAndSaleAgreement => "Purchase & Sale Agreement",
            Self::PropertyDeed => "Property Deed",
            Self::PowerOfAttorney => "Power of Attorney",
            Self::PropertyPartition => "Property Partition",
            Self::MortgageDocument => "Mortgage Document",
            Self::PropertyDeclaration => "Property Declaration",
            Self::LandBoundarySurvey => "Land Boundary Survey",
            Self::PropertyTransfer => "Property Transfer",
            Self::PropertyHoldingsRecord => "Property Holdings Record",
            Self::HeirDocumentation => "Heir Documentation",
            Self::TaxAssessmentDocument => "Tax/Assessment Document",
            Self::LandRegistryDocument => "Land Registry Document",
            Self::AdministrativeForm => "Administrative Form",
            Self::Unclassified => "Unclassified Legal Document",
        }
    }
}

str_enum!(EntityKind {
    Party => "party",
    Property => "property",
    Date => "date",
    LegalReference => "legal_reference",
});

/// Which text an entity offset points into. `SourceRef` is the group's
/// source file names, separators spaced out, joined by newlines.
str_enum!(TextSource {
    Original => "original",
    Translation => "translation",
    SourceRef => "source_ref",
});

str_enum!(RelevanceVerdict {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
    Critical => "CRITICAL",
});

impl RelevanceVerdict {
    /// One level up, saturating at `Critical`.
    pub fn escalate(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Critical => Self::Critical,
        }
    }
}

str_enum!(ConfidenceLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(LegalTier {
    Dispositive => "dispositive",
    Significant => "significant",
    Administrative => "administrative",
    Contextual => "contextual",
});

str_enum!(EntityCompleteness {
    Absent => "absent",
    Partial => "partial",
    Complete => "complete",
});

str_enum!(TranslationStatus {
    NotRequired => "not_required",
    Complete => "complete",
    Partial => "partial",
});

str_enum!(Language {
    Spanish => "es",
    English => "en",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn document_type_round_trip() {
        for variant in DocumentType::ALL {
            assert_eq!(DocumentType::from_str(variant.as_str()).unwrap(), *variant);
        }
    }

    #[test]
    fn fourteen_classified_types() {
        assert_eq!(DocumentType::classified().count(), 14);
        assert!(DocumentType::classified().all(|t| t != DocumentType::Unclassified));
    }

    #[test]
    fn declaration_order_is_priority_order() {
        assert!(DocumentType::LastWillAndTestament < DocumentType::PropertyDeed);
        assert!(DocumentType::AdministrativeForm < DocumentType::Unclassified);
    }

    #[test]
    fn verdicts_are_ordered_and_escalate() {
        assert!(RelevanceVerdict::Low < RelevanceVerdict::Medium);
        assert!(RelevanceVerdict::High < RelevanceVerdict::Critical);
        assert_eq!(RelevanceVerdict::Low.escalate(), RelevanceVerdict::Medium);
        assert_eq!(RelevanceVerdict::Critical.escalate(), RelevanceVerdict::Critical);
    }

    #[test]
    fn serde_uses_string_table() {
        let json = serde_json::to_string(&DocumentType::PropertyDeed).unwrap();
        assert_eq!(json, "\"property_deed\"");
        let json = serde_json::to_string(&RelevanceVerdict::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
        assert!(serde_json::from_str::<Language>("\"fr\"").is_err());
        let kind: EntityKind = serde_json::from_str("\"legal_reference\"").unwrap();
        assert_eq!(kind, EntityKind::LegalReference);
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::Spanish.as_str(), "es");
        assert_eq!(Language::from_str("en").unwrap(), Language::English);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(DocumentType::from_str("invalid").is_err());
        assert!(RelevanceVerdict::from_str("critical").is_err());
        assert!(EntityKind::from_str("").is_err());
    }
}
