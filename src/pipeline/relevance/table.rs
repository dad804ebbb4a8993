use serde::{Deserialize, Serialize};

use crate::models::{DocumentType, EntityCompleteness, LegalTier, RelevanceVerdict};

/// Verdicts for one tier, one per completeness level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierVerdicts {
    pub complete: RelevanceVerdict,
    pub partial: RelevanceVerdict,
    pub absent: RelevanceVerdict,
}

impl TierVerdicts {
    const fn new(complete: RelevanceVerdict, partial: RelevanceVerdict, absent: RelevanceVerdict) -> Self {
        Self {
            complete,
            partial,
            absent,
        }
    }

    pub fn get(&self, completeness: EntityCompleteness) -> RelevanceVerdict {
        match completeness {
            EntityCompleteness::Complete => self.complete,
            EntityCompleteness::Partial => self.partial,
            EntityCompleteness::Absent => self.absent,
        }
    }

    /// More complete entity sets never rank lower.
    pub fn is_monotonic(&self) -> bool {
        self.absent <= self.partial && self.partial <= self.complete
    }
}

/// Tier x completeness. Every cell is a field, so every combination has
/// exactly one verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictMatrix {
    pub dispositive: TierVerdicts,
    pub significant: TierVerdicts,
    pub administrative: TierVerdicts,
    pub contextual: TierVerdicts,
}

impl VerdictMatrix {
    pub fn row(&self, tier: LegalTier) -> &TierVerdicts {
        match tier {
            LegalTier::Dispositive => &self.dispositive,
            LegalTier::Significant => &self.significant,
            LegalTier::Administrative => &self.administrative,
            LegalTier::Contextual => &self.contextual,
        }
    }

    pub fn verdict(&self, tier: LegalTier, completeness: EntityCompleteness) -> RelevanceVerdict {
        self.row(tier).get(completeness)
    }
}

impl Default for VerdictMatrix {
    fn default() -> Self {
        use RelevanceVerdict::*;
        Self {
            dispositive: TierVerdicts::new(Critical, High, High),
            significant: TierVerdicts::new(High, High, Medium),
            administrative: TierVerdicts::new(Medium, Medium, Low),
            contextual: TierVerdicts::new(Low, Low, Low),
        }
    }
}

/// Which document types sit in which legal tier, and what each tier is
/// worth. Types listed in no tier are contextual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceTable {
    pub dispositive: Vec<DocumentType>,
    pub significant: Vec<DocumentType>,
    pub administrative: Vec<DocumentType>,
    pub matrix: VerdictMatrix,
}

impl Default for RelevanceTable {
    fn default() -> Self {
        use DocumentType::*;
        Self {
            dispositive: vec![LastWillAndTestament, PurchaseAndSaleAgreement, PropertyDeed, PropertyTransfer],
            significant: vec![
                PowerOfAttorney,
                PropertyPartition,
                MortgageDocument,
                LandBoundarySurvey,
                HeirDocumentation,
                LandRegistryDocument,
            ],
            administrative: vec![
                PropertyDeclaration,
                PropertyHoldingsRecord,
                TaxAssessmentDocument,
                AdministrativeForm,
            ],
            matrix: VerdictMatrix::default(),
        }
    }
}

impl RelevanceTable {
    pub fn tier_of(&self, doc_type: DocumentType) -> LegalTier {
        if self.dispositive.contains(&doc_type) {
            LegalTier::Dispositive
        } else if self.significant.contains(&doc_type) {
            LegalTier::Significant
        } else if self.administrative.contains(&doc_type) {
            LegalTier::Administrative
        } else {
            LegalTier::Contextual
        }
    }

    pub fn verdict(&self, doc_type: DocumentType, completeness: EntityCompleteness) -> RelevanceVerdict {
        self.matrix.verdict(self.tier_of(doc_type), completeness)
    }

    /// First document type listed in more than one tier (or twice in one).
    pub fn duplicate_type(&self) -> Option<DocumentType> {
        let mut seen = Vec::new();
        for doc_type in self.dispositive.iter().chain(&self.significant).chain(&self.administrative) {
            if seen.contains(doc_type) {
                return Some(*doc_type);
            }
            seen.push(*doc_type);
        }
        None
    }

    /// First tier whose row ranks a more complete entity set lower.
    pub fn non_monotonic_tier(&self) -> Option<LegalTier> {
        LegalTier::ALL
            .iter()
            .copied()
            .find(|tier| !self.matrix.row(*tier).is_monotonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_combination_has_one_verdict() {
        let table = RelevanceTable::default();
        let mut cells = 0;
        for doc_type in DocumentType::ALL {
            for completeness in EntityCompleteness::ALL {
                let verdict = table.verdict(*doc_type, *completeness);
                assert!(RelevanceVerdict::ALL.contains(&verdict));
                cells += 1;
            }
        }
        assert_eq!(cells, 15 * 3);
    }

    #[test]
    fn default_matrix_rows() {
        let matrix = VerdictMatrix::default();
        use EntityCompleteness::*;
        use LegalTier::*;
        use RelevanceVerdict::*;
        assert_eq!(matrix.verdict(Dispositive, Complete), Critical);
        assert_eq!(matrix.verdict(Dispositive, Partial), High);
        assert_eq!(matrix.verdict(Significant, Partial), High);
        assert_eq!(matrix.verdict(Administrative, Partial), Medium);
        assert_eq!(matrix.verdict(Administrative, Absent), Low);
        assert_eq!(matrix.verdict(Contextual, Complete), Low);
    }

    #[test]
    fn default_tiers() {
        let table = RelevanceTable::default();
        assert_eq!(table.tier_of(DocumentType::LastWillAndTestament), LegalTier::Dispositive);
        assert_eq!(table.tier_of(DocumentType::HeirDocumentation), LegalTier::Significant);
        assert_eq!(table.tier_of(DocumentType::TaxAssessmentDocument), LegalTier::Administrative);
        assert_eq!(table.tier_of(DocumentType::Unclassified), LegalTier::Contextual);
        assert_eq!(table.duplicate_type(), None);
        assert_eq!(table.non_monotonic_tier(), None);
    }

    #[test]
    fn every_classified_type_has_an_explicit_tier() {
        let table = RelevanceTable::default();
        let listed = table.dispositive.len() + table.significant.len() + table.administrative.len();
        assert_eq!(listed, DocumentType::classified().count());
    }

    #[test]
    fn detects_misconfiguration() {
        let mut table = RelevanceTable::default();
        table.administrative.push(DocumentType::PropertyDeed);
        assert_eq!(table.duplicate_type(), Some(DocumentType::PropertyDeed));

        let mut table = RelevanceTable::default();
        table.matrix.significant.absent = RelevanceVerdict::Critical;
        assert_eq!(table.non_monotonic_tier(), Some(LegalTier::Significant));
    }

    #[test]
    fn table_deserializes_partially() {
        let table: RelevanceTable = serde_json::from_str(r#"{"dispositive": ["property_deed"]}"#).unwrap();
        assert_eq!(table.tier_of(DocumentType::PropertyDeed), LegalTier::Dispositive);
        // The other tiers keep their defaults, none of which lists wills.
        assert_eq!(table.tier_of(DocumentType::LastWillAndTestament), LegalTier::Contextual);
        assert_eq!(table.tier_of(DocumentType::HeirDocumentation), LegalTier::Significant);
        assert_eq!(table.matrix, VerdictMatrix::default());
    }
}
