//! Keyword signatures per document type.
//!
//! Multi-word phrases weigh twice a single word. Accented and unaccented
//! spellings are both listed: OCR drops accents often enough that either
//! may be the only one present.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{DocumentType, EntityKind};

pub const WORD_WEIGHT: f32 = 1.0;
pub const PHRASE_WEIGHT: f32 = 2.0;

pub const KEYWORDS: &[(DocumentType, &[&str])] = &[
    (
        DocumentType::LastWillAndTestament,
        &["last will", "testament", "testamento", "última voluntad", "ultima voluntad", "herederos", "testador"],
    ),
    (
        DocumentType::PurchaseAndSaleAgreement,
        &["purchase", "sale", "compraventa", "compra", "venta", "buy", "sell"],
    ),
    (
        DocumentType::PropertyDeed,
        &["deed", "escritura", "escritura pública", "escritura publica", "título", "titulo"],
    ),
    (
        DocumentType::PowerOfAttorney,
        &["power of attorney", "poder", "poder especial", "poder general", "atty", "attorney", "apoderado"],
    ),
    (
        DocumentType::PropertyPartition,
        &["partition", "partición", "particion", "partioning", "división", "segregación"],
    ),
    (
        DocumentType::MortgageDocument,
        &["mortgage", "hipoteca", "cancelación de hipoteca", "cancelacion de hipoteca", "gravamen"],
    ),
    (
        DocumentType::PropertyDeclaration,
        &["declaration", "declaración", "declaracion", "declaratoria"],
    ),
    (
        DocumentType::LandBoundarySurvey,
        &["boundaries", "boundary", "boundries", "linderos", "deslinde", "demarcación", "mensura"],
    ),
    (
        DocumentType::PropertyTransfer,
        &["transfer", "transferencia", "cesión", "cesion", "traspaso"],
    ),
    (
        DocumentType::PropertyHoldingsRecord,
        &["holdings", "bienes", "propiedades", "inmuebles", "relación de bienes"],
    ),
    (
        DocumentType::HeirDocumentation,
        &["heir", "heredero", "herencia", "sucesión", "sucesion", "co-heir", "declaratoria de herederos"],
    ),
    (
        DocumentType::TaxAssessmentDocument,
        &["tax", "impuesto", "millage", "contribución", "contribucion", "avalúo", "avaluo"],
    ),
    (
        DocumentType::LandRegistryDocument,
        &["registry", "registro", "inscripción", "inscripcion", "anotación", "registro de la propiedad"],
    ),
    (
        DocumentType::AdministrativeForm,
        &["planilla", "formulario", "solicitud", "check off"],
    ),
];

/// Entity labels that point at a document type: (kind, label, type, weight).
pub const ENTITY_CUES: &[(EntityKind, &str, DocumentType, f32)] = &[
    (EntityKind::Party, "testator", DocumentType::LastWillAndTestament, 1.0),
    (EntityKind::Party, "executor", DocumentType::LastWillAndTestament, 1.0),
    (EntityKind::Party, "vendor", DocumentType::PurchaseAndSaleAgreement, 1.0),
    (EntityKind::Party, "buyer", DocumentType::PurchaseAndSaleAgreement, 1.0),
    (EntityKind::Party, "attorney", DocumentType::PowerOfAttorney, 1.0),
    (EntityKind::Party, "heir", DocumentType::HeirDocumentation, 1.0),
    (EntityKind::Party, "decedent", DocumentType::HeirDocumentation, 0.5),
    (EntityKind::LegalReference, "deed", DocumentType::PropertyDeed, 0.5),
    (EntityKind::LegalReference, "deed_book", DocumentType::PropertyDeed, 0.5),
    (EntityKind::LegalReference, "registry", DocumentType::LandRegistryDocument, 0.5),
    (EntityKind::LegalReference, "registry_entry", DocumentType::LandRegistryDocument, 1.0),
    (EntityKind::Property, "area", DocumentType::LandBoundarySurvey, 0.5),
];

/// A compiled keyword with its weight.
pub struct Signature {
    pub keyword: &'static str,
    pub weight: f32,
    pub regex: Regex,
}

pub static SIGNATURES: LazyLock<Vec<(DocumentType, Vec<Signature>)>> = LazyLock::new(|| {
    KEYWORDS
        .iter()
        .map(|(doc_type, keywords)| (*doc_type, keywords.iter().map(|k| compile(*k)).collect()))
        .collect()
});

fn compile(keyword: &'static str) -> Signature {
    let pattern = keyword
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let weight = if keyword.contains(' ') {
        PHRASE_WEIGHT
    } else {
        WORD_WEIGHT
    };
    Signature {
        keyword,
        weight,
        regex: Regex::new(&format!(r"(?i)\b{pattern}\b")).expect("valid regex"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_classified_type_has_a_signature_in_priority_order() {
        let declared: Vec<DocumentType> = KEYWORDS.iter().map(|(t, _)| *t).collect();
        let expected: Vec<DocumentType> = DocumentType::classified().collect();
        assert_eq!(declared, expected);
    }

    #[test]
    fn no_duplicate_keywords_within_a_type() {
        for (doc_type, keywords) in KEYWORDS {
            let mut seen = keywords.to_vec();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), keywords.len(), "duplicate keyword for {doc_type}");
        }
    }

    #[test]
    fn phrases_weigh_more() {
        let will = &SIGNATURES[0].1;
        let last_will = will.iter().find(|s| s.keyword == "last will").unwrap();
        let testamento = will.iter().find(|s| s.keyword == "testamento").unwrap();
        assert_eq!(last_will.weight, PHRASE_WEIGHT);
        assert_eq!(testamento.weight, WORD_WEIGHT);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let sale = compile("sale");
        assert!(sale.regex.is_match("For SALE by owner"));
        assert!(!sale.regex.is_match("wholesale goods"));
        let phrase = compile("última voluntad");
        assert!(phrase.regex.is_match("su Última\nvoluntad"));
    }
}
