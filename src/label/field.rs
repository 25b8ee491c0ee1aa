//! Lookup attributes and search request model.

use std::fmt;

/// Label attribute a search filters on.
///
/// Both attributes live under the record's `openfda` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    /// Active ingredient / generic substance name
    SubstanceName,
    /// Proprietary product name
    BrandName,
}

impl SearchField {
    /// Key of this attribute inside the `openfda` section.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::SubstanceName => "substance_name",
            Self::BrandName => "brand_name",
        }
    }

    /// Fully qualified attribute path used in search expressions.
    #[must_use]
    pub fn api_path(self) -> String {
        format!("openfda.{}", self.key())
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One search window against the label endpoint.
///
/// A request with a single value filters `openfda.<field>` on that exact
/// (quoted) value. Several values are AND-joined, so every value must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Attribute to filter on
    pub field: SearchField,
    /// Values that must all match
    pub values: Vec<String>,
    /// Page size
    pub limit: u64,
    /// Offset of the first record; omitted from the query when zero
    pub skip: u64,
}

impl SearchRequest {
    /// Creates a single-value request starting at the first record.
    #[must_use]
    pub fn new(field: SearchField, value: impl Into<String>, limit: u64) -> Self {
        Self {
            field,
            values: vec![value.into()],
            limit,
            skip: 0,
        }
    }

    /// Creates a request matching every value in `values`.
    #[must_use]
    pub fn all_of(field: SearchField, values: &[String], limit: u64) -> Self {
        Self {
            field,
            values: values.to_vec(),
            limit,
            skip: 0,
        }
    }

    /// Sets the record offset.
    #[must_use]
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Renders the `search` query parameter.
    ///
    /// Embedded double quotes are dropped so each value stays one exact phrase.
    #[must_use]
    pub fn search_expression(&self) -> String {
        let path = self.field.api_path();
        self.values
            .iter()
            .map(|value| format!("{path}:\"{}\"", value.replace('"', "")))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Values joined for log output.
    #[must_use]
    pub fn display_value(&self) -> String {
        self.values.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_and_paths() {
        assert_eq!(SearchField::SubstanceName.key(), "substance_name");
        assert_eq!(SearchField::BrandName.api_path(), "openfda.brand_name");
        assert_eq!(SearchField::SubstanceName.to_string(), "substance_name");
    }

    #[test]
    fn test_single_value_expression_is_quoted() {
        let request = SearchRequest::new(SearchField::SubstanceName, "Aspirin", 100);
        assert_eq!(
            request.search_expression(),
            "openfda.substance_name:\"Aspirin\""
        );
        assert_eq!(request.skip, 0);
    }

    #[test]
    fn test_multi_value_expression_is_and_joined() {
        let values = vec!["aspirin".to_string(), "caffeine".to_string()];
        let request = SearchRequest::all_of(SearchField::SubstanceName, &values, 50).with_skip(100);
        assert_eq!(
            request.search_expression(),
            "openfda.substance_name:\"aspirin\" AND openfda.substance_name:\"caffeine\""
        );
        assert_eq!(request.skip, 100);
        assert_eq!(request.display_value(), "aspirin; caffeine");
    }

    #[test]
    fn test_embedded_quotes_are_dropped() {
        let request = SearchRequest::new(SearchField::BrandName, "Bayer \"Extra\"", 1);
        assert_eq!(
            request.search_expression(),
            "openfda.brand_name:\"Bayer Extra\""
        );
    }
}
