//! Pattern rules for parties, properties, and legal references.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::{Entity, EntityKind, TextSource};

/// One to five capitalised words, allowing Spanish particles between them
/// ("María de la Caridad Pérez", "Juan del Monte").
pub(super) const NAME: &str = r"[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+(?:\s+(?:de\s+(?:la\s+|los\s+)?|del\s+)?[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+){0,4}";

/// As `NAME` but at least two words.
const FULL_NAME: &str = r"[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+(?:\s+(?:de\s+(?:la\s+|los\s+)?|del\s+)?[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+){1,4}";

/// Leading words dropped from a matched name.
const LEADING_TITLES: &[&str] = &[
    "Don", "Doña", "El", "En", "La", "Mr", "Mrs", "Señor", "Señora", "Sr", "Sra", "The",
];

const ROLES: &str = r"notario|escribano|hereder[oa]s?|vendedor(?:a|es)?|comprador(?:a|es)?|apoderad[oa]|testador(?:a)?|albacea|causante|notary|heirs?|vendor|seller|buyer|purchaser|executor|executrix|grantor|grantee|testator|attorney";

static TITLED_PARTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:Don|Doña|Dña\.|Sr\.|Sra\.|Srta\.|[Ss]eñora?|Mr\.|Mrs\.|Miss)\s+({NAME})"
    ))
    .expect("valid regex")
});

static ROLE_THEN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?i:({ROLES}))(?:\s+(?i:p[úu]blico|public))?(?:\s*[:,])?\s+(?:(?i:el|la|los|las|the)\s+)?(?:(?:Don|Doña|Sr\.|Sra\.|Mr\.|Mrs\.)\s+)?({NAME})"
    ))
    .expect("valid regex")
});

static NAME_THEN_ROLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"({FULL_NAME}),\s+(?:(?i:en\s+su\s+car[áa]cter\s+de|como|as)\s+)?(?:(?i:el|la|the)\s+)?(?i:({ROLES}))\b"
    ))
    .expect("valid regex")
});

static NAMED_ESTATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"\b(?i:(finca|hacienda|villa|ingenio|colonia|central|estancia|potrero|sitio|estate|farm|plantation))\s+(?:(?i:denominad[oa]|conocid[oa]\s+(?:como|por)|llamad[oa]|known\s+as|called)\s+)?["«“]?({NAME})"#
    ))
    .expect("valid regex")
});

static NAMED_PLACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"\b(?i:denominad[oa]|conocid[oa]\s+(?:como|por)|known\s+as)\s+["«“]?({NAME})"#
    ))
    .expect("valid regex")
});

static LOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:solar|parcela|lote|lot|parcel)\s+(?:n[úu]mero\s+|no\.\s*|n[º°]\s*|number\s+|#\s*)?(\d{1,5}[a-z]?)\b")
        .expect("valid regex")
});

static AREA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d+(?:[.,]\d+)?\s+(?:caballer[íi]as?|hect[áa]reas?|acres?|cordeles|varas\s+(?:planas|cuadradas)|metros\s+cuadrados)\b",
    )
    .expect("valid regex")
});

/// Legal reference rules: (regex, label, capture group holding the number).
static LEGAL_REFERENCES: LazyLock<Vec<(Regex, &'static str, Option<usize>)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\bescritura\s+(?:p[úu]blica\s+)?(?:n[úu]mero|no\.|n[º°])\s*(\d{1,5})\b")
                .expect("valid regex"),
            "deed",
            Some(1),
        ),
        (
            Regex::new(r"(?i)(?:\bn[úu]mero|\bno\.|n[º°]|#)\s*(\d{1,5})\s+(?:del?\s+)?(?:mi\s+|este\s+)?protocolo\b")
                .expect("valid regex"),
            "protocol",
            Some(1),
        ),
        (
            Regex::new(&format!(
                r"\b[Rr]egistro\s+de\s+(?:la\s+)?[Pp]ropiedad(?:\s+del?\s+{NAME})?"
            ))
            .expect("valid regex"),
            "registry",
            None,
        ),
        (
            Regex::new(
                r"(?i)\b(?:tomo|libro)\s+\d{1,5}(?:\s*,?\s*(?:folio|fol\.|fº)\s*\d{1,5})?(?:\s*,?\s*finca\s+(?:n[úu]mero\s+|no\.\s*)?\d{1,6})?(?:\s*,?\s*inscripci[óo]n\s+\d{1,4})?",
            )
            .expect("valid regex"),
            "registry_entry",
            None,
        ),
        (
            Regex::new(r"(?i)\bdeed\s+book\s+\d{1,5}\s*,?\s*page\s+\d{1,5}").expect("valid regex"),
            "deed_book",
            None,
        ),
        (
            Regex::new(
                r"(?i)\b(?:art[íi]culo|article|art\.)\s+(\d{1,4})(?:\s+(?:del|of\s+the)\s+(?:c[óo]digo\s+civil|civil\s+code|ley\s+hipotecaria|mortgage\s+law))?",
            )
            .expect("valid regex"),
            "statute",
            Some(1),
        ),
    ]
});

fn span_entity(
    kind: EntityKind,
    text: &str,
    start: usize,
    end: usize,
    source: TextSource,
    label: &str,
) -> Entity {
    Entity::new(kind, &text[start..end], start, source).with_label(label)
}

fn group_entity(kind: EntityKind, caps: &Captures<'_>, group: usize, source: TextSource, label: &str) -> Option<Entity> {
    let m = caps.get(group)?;
    Some(Entity::new(kind, m.as_str(), m.start(), source).with_label(label))
}

/// Legal-role keyword to the label stored on the party.
pub fn role_label(role: &str) -> &'static str {
    let role = role.to_lowercase();
    match role.as_str() {
        r if r.starts_with("notar") || r.starts_with("escriban") => "notary",
        r if r.starts_with("hered") || r.starts_with("heir") => "heir",
        r if r.starts_with("vended") || r == "vendor" || r == "seller" || r == "grantor" => "vendor",
        r if r.starts_with("compra") || r == "buyer" || r == "purchaser" || r == "grantee" => "buyer",
        r if r.starts_with("apoderad") || r == "attorney" => "attorney",
        r if r.starts_with("testa") => "testator",
        r if r == "albacea" || r.starts_with("executr") || r == "executor" => "executor",
        "causante" => "decedent",
        _ => "party",
    }
}

/// Drop title words from the front of a name, moving `start` along.
pub fn strip_leading_titles(mut start: usize, mut name: &str) -> (usize, &str) {
    loop {
        let Some((first, rest)) = name.split_once(char::is_whitespace) else {
            return (start, name);
        };
        if !LEADING_TITLES.contains(&first.trim_end_matches('.')) {
            return (start, name);
        }
        let trimmed = rest.trim_start();
        start += name.len() - trimmed.len();
        name = trimmed;
    }
}

pub fn parties(text: &str, source: TextSource) -> Vec<Entity> {
    let mut found = Vec::new();

    for caps in TITLED_PARTY.captures_iter(text) {
        found.extend(group_entity(EntityKind::Party, &caps, 1, source, "titled"));
    }
    for caps in ROLE_THEN_NAME.captures_iter(text) {
        let label = caps.get(1).map_or("party", |m| role_label(m.as_str()));
        found.extend(group_entity(EntityKind::Party, &caps, 2, source, label));
    }
    for caps in NAME_THEN_ROLE.captures_iter(text) {
        let (Some(name), Some(role)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let (start, name) = strip_leading_titles(name.start(), name.as_str());
        if !name.is_empty() {
            found.push(Entity::new(EntityKind::Party, name, start, source).with_label(role_label(role.as_str())));
        }
    }

    found
}

pub fn properties(text: &str, source: TextSource) -> Vec<Entity> {
    let mut found = Vec::new();

    for caps in NAMED_ESTATE.captures_iter(text) {
        let (Some(whole), Some(kind), Some(name)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        found.push(
            span_entity(EntityKind::Property, text, whole.start(), name.end(), source, &kind.as_str().to_lowercase())
                .with_normalized(name.as_str()),
        );
    }
    for caps in NAMED_PLACE.captures_iter(text) {
        found.extend(group_entity(EntityKind::Property, &caps, 1, source, "named"));
    }
    for caps in LOT.captures_iter(text) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        found.push(
            span_entity(EntityKind::Property, text, whole.start(), whole.end(), source, "lot")
                .with_normalized(number.as_str()),
        );
    }
    for m in AREA.find_iter(text) {
        found.push(span_entity(EntityKind::Property, text, m.start(), m.end(), source, "area"));
    }

    found
}

pub fn legal_references(text: &str, source: TextSource) -> Vec<Entity> {
    let mut found = Vec::new();

    for (regex, label, number_group) in LEGAL_REFERENCES.iter() {
        for caps in regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let mut entity = span_entity(
                EntityKind::LegalReference,
                text,
                whole.start(),
                whole.end(),
                source,
                label,
            );
            if let Some(number) = number_group.and_then(|g| caps.get(g)) {
                entity = entity.with_normalized(number.as_str());
            }
            found.push(entity);
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn titled_parties() {
        let found = parties("comparecen Don Pedro Ruiz y Doña María de la Caridad Pérez", TextSource::Original);
        assert_eq!(texts(&found), vec!["Pedro Ruiz", "María de la Caridad Pérez"]);
        assert!(found.iter().all(|e| e.has_label("titled")));
    }

    #[test]
    fn role_keywords_label_parties() {
        let found = parties("ante el Notario Público Juan Gómez Alvarado, y el heredero Luis Ruiz", TextSource::Original);
        let notary = found.iter().find(|e| e.has_label("notary")).unwrap();
        assert_eq!(notary.text, "Juan Gómez Alvarado");
        let heir = found.iter().find(|e| e.has_label("heir")).unwrap();
        assert_eq!(heir.text, "Luis Ruiz");
    }

    #[test]
    fn name_before_role() {
        let found = parties("Carlos Méndez Sosa, en su carácter de apoderado", TextSource::Original);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Carlos Méndez Sosa");
        assert!(found[0].has_label("attorney"));
    }

    #[test]
    fn english_roles() {
        let found = parties("the vendor John Smith conveys to the buyer Mary Jones", TextSource::Translation);
        assert_eq!(texts(&found), vec!["John Smith", "Mary Jones"]);
        assert!(found[0].has_label("vendor"));
        assert!(found[1].has_label("buyer"));
        assert_eq!(found[0].source, TextSource::Translation);
    }

    #[test]
    fn lowercase_words_are_not_names() {
        assert!(parties("el vendedor declara que la finca es suya", TextSource::Original).is_empty());
    }

    #[test]
    fn named_estates() {
        let text = "la finca denominada La Esperanza, colindante con la Hacienda San Rafael";
        let found = properties(text, TextSource::Original);
        let estate = found.iter().find(|e| e.has_label("finca")).unwrap();
        assert_eq!(estate.text, "finca denominada La Esperanza");
        assert_eq!(estate.normalized.as_deref(), Some("La Esperanza"));
        assert_eq!(estate.offset, 3);

        let hacienda = found.iter().find(|e| e.has_label("hacienda")).unwrap();
        assert_eq!(hacienda.text, "Hacienda San Rafael");

        let named = found.iter().find(|e| e.has_label("named")).unwrap();
        assert_eq!(named.text, "La Esperanza");
    }

    #[test]
    fn lots_and_areas() {
        let found = properties("el solar número 14 que mide 3,5 caballerías y 20 acres", TextSource::Original);
        let lot = found.iter().find(|e| e.has_label("lot")).unwrap();
        assert_eq!(lot.normalized.as_deref(), Some("14"));
        let areas: Vec<&str> = found.iter().filter(|e| e.has_label("area")).map(|e| e.text.as_str()).collect();
        assert_eq!(areas, vec!["3,5 caballerías", "20 acres"]);
    }

    #[test]
    fn legal_reference_kinds() {
        let text = "Escritura número 112 del protocolo; inscrita en el Registro de la Propiedad de Holguín, \
                    tomo 45, folio 120, finca 3021, inscripción 2, conforme al artículo 1462 del Código Civil. \
                    Recorded in Deed Book 12, page 40. Número 37 de mi protocolo.";
        let found = legal_references(text, TextSource::Original);
        let labels: Vec<&str> = found.iter().filter_map(|e| e.label.as_deref()).collect();
        for label in ["deed", "protocol", "registry", "registry_entry", "deed_book", "statute"] {
            assert!(labels.contains(&label), "missing {label}");
        }

        let deed = found.iter().find(|e| e.has_label("deed")).unwrap();
        assert_eq!(deed.normalized.as_deref(), Some("112"));
        let registry = found.iter().find(|e| e.has_label("registry")).unwrap();
        assert_eq!(registry.text, "Registro de la Propiedad de Holguín");
        let entry = found.iter().find(|e| e.has_label("registry_entry")).unwrap();
        assert_eq!(entry.text, "tomo 45, folio 120, finca 3021, inscripción 2");
        let protocols: Vec<&str> = found
            .iter()
            .filter(|e| e.has_label("protocol"))
            .filter_map(|e| e.normalized.as_deref())
            .collect();
        assert_eq!(protocols, vec!["112", "37"]);
        let statute = found.iter().find(|e| e.has_label("statute")).unwrap();
        assert_eq!(statute.text, "artículo 1462 del Código Civil");
    }

    #[test]
    fn name_before_role_drops_title() {
        let text = "comparece Don Pedro Ruiz, vendedor";
        let found = parties(text, TextSource::Original);
        let vendor = found.iter().find(|e| e.has_label("vendor")).unwrap();
        assert_eq!(vendor.text, "Pedro Ruiz");
        assert_eq!(&text[vendor.offset..vendor.offset + vendor.text.len()], "Pedro Ruiz");
    }

    #[test]
    fn title_stripping() {
        assert_eq!(strip_leading_titles(10, "Don Pedro Ruiz"), (14, "Pedro Ruiz"));
        assert_eq!(strip_leading_titles(0, "Sr. Don Pedro"), (8, "Pedro"));
        assert_eq!(strip_leading_titles(0, "Pedro"), (0, "Pedro"));
    }

    #[test]
    fn role_labels() {
        assert_eq!(role_label("Notario"), "notary");
        assert_eq!(role_label("herederos"), "heir");
        assert_eq!(role_label("Purchaser"), "buyer");
        assert_eq!(role_label("albacea"), "executor");
        assert_eq!(role_label("causante"), "decedent");
    }
}
