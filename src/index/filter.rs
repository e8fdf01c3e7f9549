//! Filter-clause construction for index queries
//!
//! Every filtered query against the index leads with the document-kind
//! discriminator so that legacy and URL-sourced documents never
//! cross-contaminate search scope unless explicitly requested.

use serde::{Deserialize, Serialize};

use crate::index::{DocKind, DocumentMetadata};

/// A single field-equality condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCondition {
    /// Metadata field name
    pub field: String,

    /// Expected value; comparisons are case-insensitive
    pub value: String,
}

impl FieldCondition {
    /// Create a new condition
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A structured predicate passed to the vector index
///
/// Either a single field-equality condition or a conjunction of several.
/// The shape is a tagged variant rather than an object whose layout depends
/// on how many conditions it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterClause {
    /// A single condition
    Condition(FieldCondition),

    /// A conjunction of conditions, all of which must hold
    And(Vec<FieldCondition>),
}

impl FilterClause {
    /// Build a clause from a non-empty condition list, collapsing to the
    /// single condition when only one is present
    fn from_conditions(mut conditions: Vec<FieldCondition>) -> Self {
        if conditions.len() == 1 {
            FilterClause::Condition(conditions.remove(0))
        } else {
            FilterClause::And(conditions)
        }
    }

    /// The conditions of this clause, in order
    pub fn conditions(&self) -> &[FieldCondition] {
        match self {
            FilterClause::Condition(condition) => std::slice::from_ref(condition),
            FilterClause::And(conditions) => conditions,
        }
    }

    /// Whether the clause contains a condition on the given field
    pub fn has_field(&self, field: &str) -> bool {
        self.conditions().iter().any(|c| c.field == field)
    }

    /// Evaluate the clause against a document's metadata
    pub fn matches(&self, metadata: &DocumentMetadata) -> bool {
        self.conditions().iter().all(|condition| {
            metadata_field(metadata, &condition.field)
                .is_some_and(|value| value.eq_ignore_ascii_case(&condition.value))
        })
    }
}

/// Look up a metadata field by name for filter evaluation
fn metadata_field(metadata: &DocumentMetadata, field: &str) -> Option<String> {
    match field {
        "doc_type" => Some(metadata.doc_type.as_str().to_string()),
        "library_name" => Some(metadata.library_name.clone()),
        "version" => Some(metadata.version.clone()),
        "category" => Some(metadata.category.clone()),
        "url" => Some(metadata.url.clone()),
        "section" => Some(metadata.section.clone()),
        _ => None,
    }
}

/// Typed search filters supplied by a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Restrict to a library
    pub library_name: Option<String>,

    /// Restrict to a version
    pub version: Option<String>,

    /// Restrict to a category
    pub category: Option<String>,
}

/// Build the filter clause for a document search
///
/// Starts from the mandatory `doc_type` condition, then appends whichever of
/// library, version, and category the caller supplied. Values are lower-cased
/// so search is case-insensitive regardless of how they were stored.
pub fn build_document_filter(kind: DocKind, filters: &SearchFilters) -> FilterClause {
    let mut conditions = vec![FieldCondition::new("doc_type", kind.as_str())];

    if let Some(library_name) = &filters.library_name {
        conditions.push(FieldCondition::new(
            "library_name",
            library_name.to_lowercase(),
        ));
    }
    if let Some(version) = &filters.version {
        conditions.push(FieldCondition::new("version", version.to_lowercase()));
    }
    if let Some(category) = &filters.category {
        conditions.push(FieldCondition::new("category", category.to_lowercase()));
    }

    FilterClause::from_conditions(conditions)
}

/// Build the filter clause for a keyword search
///
/// Keyword matching itself is delegated to the underlying text query; the
/// structural filter only pins the document kind.
pub fn build_keyword_filter(kind: DocKind) -> FilterClause {
    FilterClause::Condition(FieldCondition::new("doc_type", kind.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_metadata() -> DocumentMetadata {
        DocumentMetadata {
            url: "https://example.com/docs/hooks".to_string(),
            title: "Hooks".to_string(),
            library_name: "react".to_string(),
            version: "18.2".to_string(),
            category: "frontend".to_string(),
            keywords: vec!["react".to_string()],
            description: String::new(),
            section: "hooks".to_string(),
            last_updated: Utc::now(),
            doc_type: DocKind::UrlDocument,
            content_extracted: false,
            added_at: Utc::now(),
            searchable_text: "react 18.2 frontend hooks".to_string(),
        }
    }

    #[test]
    fn test_doc_type_always_present() {
        let clause = build_document_filter(
            DocKind::UrlDocument,
            &SearchFilters {
                library_name: Some("react".to_string()),
                ..Default::default()
            },
        );

        assert!(clause.has_field("doc_type"));
        assert!(clause.has_field("library_name"));
        match clause {
            FilterClause::And(conditions) => {
                assert_eq!(conditions[0].field, "doc_type");
                assert_eq!(conditions[0].value, "url-document");
            }
            FilterClause::Condition(_) => panic!("expected conjunction"),
        }
    }

    #[test]
    fn test_collapses_to_single_condition() {
        let clause = build_document_filter(DocKind::UrlDocument, &SearchFilters::default());
        assert!(matches!(clause, FilterClause::Condition(_)));
        assert!(clause.has_field("doc_type"));
    }

    #[test]
    fn test_values_lower_cased() {
        let clause = build_document_filter(
            DocKind::UrlDocument,
            &SearchFilters {
                library_name: Some("React".to_string()),
                version: Some("18.2".to_string()),
                category: Some("Frontend".to_string()),
                ..Default::default()
            },
        );

        let conditions = clause.conditions();
        assert_eq!(conditions.len(), 4);
        assert_eq!(conditions[1].value, "react");
        assert_eq!(conditions[3].value, "frontend");
    }

    #[test]
    fn test_keyword_filter_pins_doc_type_only() {
        let clause = build_keyword_filter(DocKind::UrlDocument);
        assert_eq!(clause.conditions().len(), 1);
        assert!(clause.has_field("doc_type"));
    }

    #[test]
    fn test_matches_metadata() {
        let metadata = sample_metadata();

        let clause = build_document_filter(
            DocKind::UrlDocument,
            &SearchFilters {
                library_name: Some("REACT".to_string()),
                ..Default::default()
            },
        );
        assert!(clause.matches(&metadata));

        let clause = build_document_filter(
            DocKind::Document,
            &SearchFilters::default(),
        );
        assert!(!clause.matches(&metadata));

        let clause = build_document_filter(
            DocKind::UrlDocument,
            &SearchFilters {
                version: Some("17.0".to_string()),
                ..Default::default()
            },
        );
        assert!(!clause.matches(&metadata));
    }
}
