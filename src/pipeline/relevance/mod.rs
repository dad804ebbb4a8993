//! Relevance scoring: (document type, entity completeness) through a fixed
//! verdict table, then one level of escalation for watchlist hits.

pub mod table;

pub use table::{RelevanceTable, TierVerdicts, VerdictMatrix};

use serde::{Deserialize, Serialize};

use crate::models::{Entity, EntityCompleteness, EntityKind, LegalTier, RelevanceVerdict};
use crate::pipeline::classify::ClassificationResult;
use crate::pipeline::entities::completeness;

/// Names whose presence makes a document matter more to the research at hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Watchlist {
    pub parties: Vec<String>,
    pub properties: Vec<String>,
}

impl Watchlist {
    pub fn is_empty(&self) -> bool {
        self.parties.is_empty() && self.properties.is_empty()
    }

    /// Entity texts of `kind` containing a watched name, case-insensitively.
    /// Each text is reported once, in entity order.
    fn hits<'e>(&self, entities: &'e [Entity], kind: EntityKind) -> Vec<&'e str> {
        let names: Vec<String> = match kind {
            EntityKind::Party => &self.parties,
            EntityKind::Property => &self.properties,
            _ => return Vec::new(),
        }
        .iter()
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();

        let mut hits: Vec<&str> = Vec::new();
        for entity in entities.iter().filter(|e| e.kind == kind) {
            let text = entity.text.to_lowercase();
            if names.iter().any(|n| text.contains(n.as_str())) && !hits.contains(&entity.text.as_str()) {
                hits.push(&entity.text);
            }
        }
        hits
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceConfig {
    pub table: RelevanceTable,
    pub watchlist: Watchlist,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceAssessment {
    pub verdict: RelevanceVerdict,
    /// Verdict from the table before any watchlist escalation.
    pub table_verdict: RelevanceVerdict,
    pub tier: LegalTier,
    pub completeness: EntityCompleteness,
    pub reasons: Vec<String>,
}

pub struct RelevanceScorer {
    config: RelevanceConfig,
}

impl RelevanceScorer {
    pub fn new(config: RelevanceConfig) -> Self {
        Self { config }
    }

    pub fn assess(&self, classification: &ClassificationResult, entities: &[Entity]) -> RelevanceAssessment {
        let doc_type = classification.document_type;
        let tier = self.config.table.tier_of(doc_type);
        let completeness = completeness(entities);
        let table_verdict = self.config.table.matrix.verdict(tier, completeness);

        let mut reasons = vec![
            format!("Document type '{}' {}", doc_type.label(), tier_reason(tier)),
            completeness_reason(completeness, entities),
        ];

        let party_hits = self.config.watchlist.hits(entities, EntityKind::Party);
        let property_hits = self.config.watchlist.hits(entities, EntityKind::Property);
        if !party_hits.is_empty() {
            reasons.push(format!("References watched parties: {}", party_hits.join(", ")));
        }
        if !property_hits.is_empty() {
            reasons.push(format!("References watched properties: {}", property_hits.join(", ")));
        }

        let verdict = if party_hits.is_empty() && property_hits.is_empty() {
            table_verdict
        } else {
            table_verdict.escalate()
        };

        tracing::debug!(
            document_type = %doc_type,
            tier = %tier,
            completeness = %completeness,
            verdict = %verdict,
            "Relevance assessed"
        );

        RelevanceAssessment {
            verdict,
            table_verdict,
            tier,
            completeness,
            reasons,
        }
    }
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(RelevanceConfig::default())
    }
}

fn tier_reason(tier: LegalTier) -> &'static str {
    match tier {
        LegalTier::Dispositive => "is directly relevant to ownership claims",
        LegalTier::Significant => "may support the chain of ownership",
        LegalTier::Administrative => "is an administrative record",
        LegalTier::Contextual => "provides contextual information",
    }
}

fn completeness_reason(completeness: EntityCompleteness, entities: &[Entity]) -> String {
    let count = |kind: EntityKind| entities.iter().filter(|e| e.kind == kind).count();
    match completeness {
        EntityCompleteness::Complete => format!(
            "Parties ({}) and properties ({}) identified",
            count(EntityKind::Party),
            count(EntityKind::Property)
        ),
        EntityCompleteness::Partial => format!(
            "Partial entity picture: {} parties, {} properties, {} legal references",
            count(EntityKind::Party),
            count(EntityKind::Property),
            count(EntityKind::LegalReference)
        ),
        EntityCompleteness::Absent => "No parties, properties, or legal references identified".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfidenceLevel, DocumentType, TextSource};

    fn classified(doc_type: DocumentType) -> ClassificationResult {
        ClassificationResult {
            document_type: doc_type,
            score: 3.0,
            confidence: ConfidenceLevel::High,
            evidence: Vec::new(),
        }
    }

    fn party(text: &str) -> Entity {
        Entity::new(EntityKind::Party, text, 0, TextSource::Original)
    }

    fn property(text: &str) -> Entity {
        Entity::new(EntityKind::Property, text, 30, TextSource::Original)
    }

    #[test]
    fn will_with_party_and_property_is_critical() {
        let entities = vec![party("Pedro Ruiz"), property("finca La Esperanza")];
        let assessment =
            RelevanceScorer::default().assess(&classified(DocumentType::LastWillAndTestament), &entities);
        assert_eq!(assessment.verdict, RelevanceVerdict::Critical);
        assert_eq!(assessment.tier, LegalTier::Dispositive);
        assert_eq!(assessment.completeness, EntityCompleteness::Complete);
        assert_eq!(assessment.reasons.len(), 2);
    }

    #[test]
    fn partial_entities_on_significant_type_is_high() {
        let entities = vec![party("Luis Ruiz")];
        let assessment = RelevanceScorer::default().assess(&classified(DocumentType::HeirDocumentation), &entities);
        assert_eq!(assessment.verdict, RelevanceVerdict::High);
        assert_eq!(assessment.completeness, EntityCompleteness::Partial);
    }

    #[test]
    fn unclassified_without_entities_is_low() {
        let assessment = RelevanceScorer::default().assess(&classified(DocumentType::Unclassified), &[]);
        assert_eq!(assessment.verdict, RelevanceVerdict::Low);
        assert_eq!(assessment.tier, LegalTier::Contextual);
    }

    #[test]
    fn watchlist_escalates_once() {
        let config = RelevanceConfig {
            watchlist: Watchlist {
                parties: vec!["Queral".into()],
                properties: vec!["villa aurelia".into()],
            },
            ..RelevanceConfig::default()
        };
        let entities = vec![
            party("Manuel Queral"),
            party("Manuel Queral"),
            property("Villa Aurelia"),
        ];
        let assessment =
            RelevanceScorer::new(config).assess(&classified(DocumentType::TaxAssessmentDocument), &entities);
        assert_eq!(assessment.table_verdict, RelevanceVerdict::Medium);
        assert_eq!(assessment.verdict, RelevanceVerdict::High);
        assert!(assessment.reasons.contains(&"References watched parties: Manuel Queral".to_string()));
        assert!(assessment.reasons.contains(&"References watched properties: Villa Aurelia".to_string()));
    }

    #[test]
    fn escalation_saturates_at_critical() {
        let config = RelevanceConfig {
            watchlist: Watchlist {
                parties: vec!["Ruiz".into()],
                properties: Vec::new(),
            },
            ..RelevanceConfig::default()
        };
        let entities = vec![party("Pedro Ruiz"), property("finca La Esperanza")];
        let assessment = RelevanceScorer::new(config).assess(&classified(DocumentType::PropertyDeed), &entities);
        assert_eq!(assessment.verdict, RelevanceVerdict::Critical);
    }

    #[test]
    fn verdict_never_drops_as_entities_are_added() {
        let scorer = RelevanceScorer::default();
        for doc_type in DocumentType::ALL {
            let none = scorer.assess(&classified(*doc_type), &[]).verdict;
            let some = scorer.assess(&classified(*doc_type), &[party("Pedro Ruiz")]).verdict;
            let all = scorer
                .assess(&classified(*doc_type), &[party("Pedro Ruiz"), property("finca Soledad")])
                .verdict;
            assert!(none <= some && some <= all, "{doc_type}");
        }
    }

    #[test]
    fn blank_watchlist_names_never_match() {
        let watchlist = Watchlist {
            parties: vec!["  ".into()],
            properties: Vec::new(),
        };
        assert!(watchlist.hits(&[party("Pedro Ruiz")], EntityKind::Party).is_empty());
        assert!(!watchlist.is_empty());
    }
}
