//! Entity extraction: parties, properties, dates, and legal references.
//!
//! Pure functions of the text. The extractor runs over the normalized
//! original and, when one exists, the translation; every entity records
//! which text its byte offset points into.

pub mod dates;
pub mod patterns;

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{Entity, EntityCompleteness, EntityKind, TextSource};
use crate::pipeline::ingest::source_name::file_words;

/// Lexicons of names known to matter for the research at hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Family names recognised even without a title or role keyword.
    pub known_surnames: Vec<String>,
    /// Estate names recognised without a "finca"/"hacienda" prefix.
    pub known_properties: Vec<String>,
}

pub struct EntityExtractor {
    surnames: Option<Regex>,
    properties: Option<Regex>,
    property_names: Vec<String>,
}

impl EntityExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        let surnames = lexicon_regex(&config.known_surnames, |alternation| {
            format!(
                r"\b(?:[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+\s+){{0,2}}(?:{alternation})\b(?:\s+(?:y\s+)?[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+){{0,2}}"
            )
        });
        let properties = lexicon_regex(&config.known_properties, |alternation| {
            format!(r"(?i)\b(?:{alternation})\b")
        });

        Self {
            surnames,
            properties,
            property_names: config.known_properties.clone(),
        }
    }

    /// Every entity in one text, deduplicated and sorted by offset.
    pub fn extract(&self, text: &str, source: TextSource) -> Vec<Entity> {
        let mut found = Vec::new();
        found.extend(patterns::parties(text, source));
        found.extend(self.lexicon_parties(text, source));
        found.extend(patterns::properties(text, source));
        found.extend(self.lexicon_properties(text, source));
        found.extend(dates::extract_dates(text, source));
        found.extend(patterns::legal_references(text, source));
        dedupe(found)
    }

    /// Entities from the normalized original, the translation, and known
    /// estate names in the source file names, in that order.
    pub fn extract_document(&self, original: &str, translation: Option<&str>, source_refs: &[String]) -> Vec<Entity> {
        let mut entities = self.extract(original, TextSource::Original);
        if let Some(translated) = translation {
            entities.extend(self.extract(translated, TextSource::Translation));
        }
        entities.extend(self.extract_source_refs(source_refs));

        tracing::debug!(
            parties = count(&entities, EntityKind::Party),
            properties = count(&entities, EntityKind::Property),
            dates = count(&entities, EntityKind::Date),
            references = count(&entities, EntityKind::LegalReference),
            "Entities extracted"
        );
        entities
    }

    /// Known estates named in file names. Offsets index the names joined
    /// by newlines.
    pub fn extract_source_refs(&self, source_refs: &[String]) -> Vec<Entity> {
        let names = source_refs.iter().map(|r| file_words(r)).collect::<Vec<_>>().join("\n");
        dedupe(self.lexicon_properties(&names, TextSource::SourceRef))
    }

    fn lexicon_parties(&self, text: &str, source: TextSource) -> Vec<Entity> {
        let Some(regex) = &self.surnames else {
            return Vec::new();
        };
        regex
            .find_iter(text)
            .filter_map(|m| {
                let (start, name) = patterns::strip_leading_titles(m.start(), m.as_str());
                (!name.is_empty())
                    .then(|| Entity::new(EntityKind::Party, name, start, source).with_label("known_surname"))
            })
            .collect()
    }

    fn lexicon_properties(&self, text: &str, source: TextSource) -> Vec<Entity> {
        let Some(regex) = &self.properties else {
            return Vec::new();
        };
        regex
            .find_iter(text)
            .map(|m| {
                let mut entity =
                    Entity::new(EntityKind::Property, m.as_str(), m.start(), source).with_label("known_property");
                if let Some(canonical) = self.canonical_property(m.as_str()) {
                    entity = entity.with_normalized(canonical);
                }
                entity
            })
            .collect()
    }

    fn canonical_property(&self, matched: &str) -> Option<&str> {
        let key = fold_words(matched);
        self.property_names
            .iter()
            .find(|name| fold_words(name) == key)
            .map(String::as_str)
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

/// Alternation of escaped lexicon entries, longest first, with internal
/// whitespace matching any run. `None` for an empty lexicon or a pattern
/// the regex engine rejects.
fn lexicon_regex(entries: &[String], wrap: impl Fn(&str) -> String) -> Option<Regex> {
    let mut words: Vec<&str> = entries.iter().map(|e| e.trim()).filter(|e| !e.is_empty()).collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    words.dedup();

    let alternation = words
        .iter()
        .map(|w| {
            w.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|");

    match Regex::new(&wrap(&alternation)) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(entries = entries.len(), error = %e, "Lexicon disabled");
            None
        }
    }
}

fn fold_words(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn count(entities: &[Entity], kind: EntityKind) -> usize {
    entities.iter().filter(|e| e.kind == kind).count()
}

/// Collapse (source, kind, offset) duplicates to the longest span; order by
/// source, offset, then kind.
pub fn dedupe(entities: Vec<Entity>) -> Vec<Entity> {
    let mut by_key: BTreeMap<(TextSource, usize, EntityKind), Entity> = BTreeMap::new();
    for entity in entities {
        let key = (entity.source, entity.offset, entity.kind);
        match by_key.get(&key) {
            Some(existing) if existing.text.len() >= entity.text.len() => {}
            _ => {
                by_key.insert(key, entity);
            }
        }
    }
    by_key.into_values().collect()
}

/// How much of the party/property picture the entities give.
pub fn completeness(entities: &[Entity]) -> EntityCompleteness {
    let has = |kind: EntityKind| entities.iter().any(|e| e.kind == kind);
    let party = has(EntityKind::Party);
    let property = has(EntityKind::Property);

    if party && property {
        EntityCompleteness::Complete
    } else if party || property || has(EntityKind::LegalReference) {
        EntityCompleteness::Partial
    } else {
        EntityCompleteness::Absent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEED: &str = "ESCRITURA NÚMERO 112\n\
        En la ciudad de Holguín, a los veinticinco días del mes de febrero de mil novecientos sesenta, \
        ante mí, Notario Público Juan Gómez Alvarado, comparece Don Pedro Ruiz, vendedor, \
        y vende la finca denominada La Esperanza, de 3 caballerías, inscrita en el Registro de la Propiedad de Holguín.";

    fn lexicons() -> ExtractionConfig {
        ExtractionConfig {
            known_surnames: vec!["Queral".into(), "Rodriguez".into()],
            known_properties: vec!["Villa Aurelia".into(), "Aguaras".into()],
        }
    }

    #[test]
    fn deed_yields_every_kind() {
        let entities = EntityExtractor::default().extract(DEED, TextSource::Original);
        for kind in EntityKind::ALL {
            assert!(entities.iter().any(|e| e.kind == *kind), "no {kind}");
        }
        let date = entities.iter().find(|e| e.kind == EntityKind::Date).unwrap();
        assert_eq!(date.normalized.as_deref(), Some("1960-02-25"));
        assert_eq!(completeness(&entities), EntityCompleteness::Complete);
    }

    #[test]
    fn offsets_point_into_source_text() {
        let entities = EntityExtractor::default().extract(DEED, TextSource::Original);
        for entity in &entities {
            assert_eq!(&DEED[entity.offset..entity.end()], entity.text);
        }
    }

    #[test]
    fn sorted_and_unique_per_key() {
        let entities = EntityExtractor::default().extract(DEED, TextSource::Original);
        for window in entities.windows(2) {
            let a = (window[0].source, window[0].offset, window[0].kind);
            let b = (window[1].source, window[1].offset, window[1].kind);
            assert!(a < b);
        }
    }

    #[test]
    fn overlapping_spans_of_different_kinds_survive() {
        // "Pedro Ruiz" is titled and role-labelled at the same offset: one
        // entity; the estate and its bare name are distinct offsets: both kept.
        let entities = EntityExtractor::default().extract(DEED, TextSource::Original);
        assert_eq!(entities.iter().filter(|e| e.text == "Pedro Ruiz").count(), 1);
        assert!(entities.iter().any(|e| e.text == "finca denominada La Esperanza"));
        assert!(entities.iter().any(|e| e.text == "La Esperanza"));
    }

    #[test]
    fn dedupe_keeps_longest() {
        let short = Entity::new(EntityKind::Party, "Pedro", 4, TextSource::Original);
        let long = Entity::new(EntityKind::Party, "Pedro Ruiz", 4, TextSource::Original);
        let other_kind = Entity::new(EntityKind::Property, "Pedro", 4, TextSource::Original);
        let deduped = dedupe(vec![short, long.clone(), other_kind.clone()]);
        assert_eq!(deduped, vec![long, other_kind]);
    }

    #[test]
    fn lexicon_surnames_without_titles() {
        let extractor = EntityExtractor::new(&lexicons());
        let entities = extractor.extract("los bienes de Manuel Queral Cruz pasan a sus hijos", TextSource::Original);
        let party = entities.iter().find(|e| e.has_label("known_surname")).unwrap();
        assert_eq!(party.text, "Manuel Queral Cruz");
    }

    #[test]
    fn lexicon_and_title_agree_on_one_party() {
        let extractor = EntityExtractor::new(&lexicons());
        let text = "y Doña Rodriguez firma";
        let entities = extractor.extract(text, TextSource::Original);
        let parties: Vec<&Entity> = entities.iter().filter(|e| e.kind == EntityKind::Party).collect();
        assert_eq!(parties.len(), 1);
        assert_eq!(parties[0].text, "Rodriguez");
        assert_eq!(&text[parties[0].offset..parties[0].end()], "Rodriguez");
    }

    #[test]
    fn lexicon_properties_canonicalised() {
        let extractor = EntityExtractor::new(&lexicons());
        let entities = extractor.extract("la VILLA  AURELIA y tierras de aguaras", TextSource::Original);
        let known: Vec<&str> = entities
            .iter()
            .filter(|e| e.has_label("known_property"))
            .filter_map(|e| e.normalized.as_deref())
            .collect();
        assert_eq!(known, vec!["Villa Aurelia", "Aguaras"]);
    }

    #[test]
    fn translation_entities_tagged() {
        let extractor = EntityExtractor::default();
        let entities = extractor.extract_document(
            "Don Pedro Ruiz vende.",
            Some("Mr. Pedro Ruiz sells the estate known as La Esperanza."),
            &[],
        );
        assert!(entities.iter().any(|e| e.source == TextSource::Original && e.kind == EntityKind::Party));
        assert!(entities.iter().any(|e| e.source == TextSource::Translation && e.kind == EntityKind::Property));
        assert_eq!(entities[0].source, TextSource::Original);
    }

    #[test]
    fn known_estate_in_file_name() {
        let extractor = EntityExtractor::new(&lexicons());
        let refs = vec!["caja1/Escritura_12.pdf".to_string(), "caja1/Venta_Villa-Aurelia.2pdf.pdf".to_string()];
        let entities = extractor.extract_document("Don Pedro Ruiz vende la casa.", None, &refs);

        let from_name: Vec<&Entity> = entities.iter().filter(|e| e.source == TextSource::SourceRef).collect();
        assert_eq!(from_name.len(), 1);
        assert_eq!(from_name[0].kind, EntityKind::Property);
        assert_eq!(from_name[0].normalized.as_deref(), Some("Villa Aurelia"));
        assert_eq!(completeness(&entities), EntityCompleteness::Complete);

        let names = "Escritura 12\nVenta Villa Aurelia 2pdf";
        assert_eq!(&names[from_name[0].offset..from_name[0].end()], from_name[0].text);
    }

    #[test]
    fn file_names_without_lexicon_yield_nothing() {
        let refs = vec!["Finca La Esperanza.pdf".to_string()];
        assert!(EntityExtractor::default().extract_source_refs(&refs).is_empty());
    }

    #[test]
    fn completeness_levels() {
        let party = Entity::new(EntityKind::Party, "Pedro Ruiz", 0, TextSource::Original);
        let property = Entity::new(EntityKind::Property, "finca La Esperanza", 20, TextSource::Original);
        let reference = Entity::new(EntityKind::LegalReference, "tomo 4", 40, TextSource::Original);
        let date = Entity::new(EntityKind::Date, "1960", 50, TextSource::Original);

        assert_eq!(completeness(&[]), EntityCompleteness::Absent);
        assert_eq!(completeness(&[date.clone()]), EntityCompleteness::Absent);
        assert_eq!(completeness(&[reference]), EntityCompleteness::Partial);
        assert_eq!(completeness(&[party.clone(), date]), EntityCompleteness::Partial);
        assert_eq!(completeness(&[party, property]), EntityCompleteness::Complete);
    }

    #[test]
    fn empty_lexicon_entries_ignored() {
        let config = ExtractionConfig {
            known_surnames: vec!["  ".into()],
            known_properties: Vec::new(),
        };
        let extractor = EntityExtractor::new(&config);
        assert!(extractor.surnames.is_none());
        assert!(extractor.properties.is_none());
    }
}
