//! Closed catalogue of income brackets offered on the signup form.
//!
//! The catalogue is configuration, not user data: it is either the built-in
//! set below or a JSON document supplied at startup.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bracket preselected on the signup form.
pub const DEFAULT_INCOME_RANGE: &str = "50000-100000";

const BUILT_IN_RANGES: [(&str, &str); 6] = [
    ("0-50000", "Below ₦50,000"),
    ("50000-100000", "₦50,000 – ₦100,000"),
    ("100000-250000", "₦100,000 – ₦250,000"),
    ("250000-500000", "₦250,000 – ₦500,000"),
    ("500000-1000000", "₦500,000 – ₦1,000,000"),
    ("1000000+", "Above ₦1,000,000"),
];

/// Errors raised while building an [`IncomeRangeCatalogue`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncomeRangeCatalogueError {
    /// The catalogue document is not valid JSON of the expected shape.
    #[error("income range catalogue is malformed: {message}")]
    Malformed {
        /// Parser diagnostic.
        message: String,
    },
    /// The catalogue lists no brackets.
    #[error("income range catalogue must list at least one bracket")]
    Empty,
    /// A bracket has a blank identifier.
    #[error("income range at position {index} has a blank value")]
    BlankValue {
        /// Zero-based position in the catalogue.
        index: usize,
    },
    /// Two brackets share an identifier.
    #[error("income range value {value} is listed more than once")]
    DuplicateValue {
        /// The repeated identifier.
        value: String,
    },
}

/// One selectable bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRangeOption {
    value: String,
    label: String,
}

impl IncomeRangeOption {
    /// Build an option from its identifier and display label.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Identifier stored on registrants.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        self.label.as_str()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogueDocument {
    income_ranges: Vec<IncomeRangeOption>,
}

/// Ordered, non-empty set of brackets with unique identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeRangeCatalogue {
    options: Vec<IncomeRangeOption>,
}

impl IncomeRangeCatalogue {
    /// Validate and construct a catalogue.
    pub fn new(options: Vec<IncomeRangeOption>) -> Result<Self, IncomeRangeCatalogueError> {
        if options.is_empty() {
            return Err(IncomeRangeCatalogueError::Empty);
        }
        let mut seen = HashSet::new();
        for (index, option) in options.iter().enumerate() {
            if option.value.trim().is_empty() {
                return Err(IncomeRangeCatalogueError::BlankValue { index });
            }
            if !seen.insert(option.value.as_str()) {
                return Err(IncomeRangeCatalogueError::DuplicateValue {
                    value: option.value.clone(),
                });
            }
        }
        Ok(Self { options })
    }

    /// Parse a `{"incomeRanges": [{"value": .., "label": ..}]}` document.
    ///
    /// # Examples
    /// ```
    /// use subx_backend::domain::IncomeRangeCatalogue;
    ///
    /// let catalogue = IncomeRangeCatalogue::from_json(
    ///     r#"{"incomeRanges": [{"value": "low", "label": "Low"}]}"#,
    /// )
    /// .expect("catalogue parses");
    /// assert!(catalogue.contains("low"));
    /// ```
    pub fn from_json(json: &str) -> Result<Self, IncomeRangeCatalogueError> {
        let document: CatalogueDocument =
            serde_json::from_str(json).map_err(|error| IncomeRangeCatalogueError::Malformed {
                message: error.to_string(),
            })?;
        Self::new(document.income_ranges)
    }

    /// Whether `value` identifies a bracket in this catalogue. Exact match.
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    /// Display label for `value`, if it is in the catalogue.
    pub fn label_for(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.value == value)
            .map(IncomeRangeOption::label)
    }

    /// Brackets in display order.
    pub fn iter(&self) -> impl Iterator<Item = &IncomeRangeOption> {
        self.options.iter()
    }

    /// Bracket the form starts with: [`DEFAULT_INCOME_RANGE`] when present,
    /// otherwise the first entry.
    pub fn default_selection(&self) -> Option<&IncomeRangeOption> {
        self.options
            .iter()
            .find(|option| option.value == DEFAULT_INCOME_RANGE)
            .or_else(|| self.options.first())
    }
}

impl Default for IncomeRangeCatalogue {
    fn default() -> Self {
        Self {
            options: BUILT_IN_RANGES
                .iter()
                .map(|(value, label)| IncomeRangeOption::new(*value, *label))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn built_in_catalogue_preselects_middle_bracket() {
        let catalogue = IncomeRangeCatalogue::default();
        let selected = catalogue.default_selection().expect("catalogue not empty");

        assert_eq!(selected.value(), DEFAULT_INCOME_RANGE);
        assert_eq!(catalogue.iter().count(), BUILT_IN_RANGES.len());
        assert_eq!(catalogue.label_for("1000000+"), Some("Above ₦1,000,000"));
    }

    #[rstest]
    #[case("50000-100000", true)]
    #[case("0-50000", true)]
    #[case(" 0-50000", false)]
    #[case("", false)]
    #[case("unknown", false)]
    fn membership_is_exact(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(IncomeRangeCatalogue::default().contains(value), expected);
    }

    #[rstest]
    fn custom_catalogue_falls_back_to_first_entry() {
        let catalogue = IncomeRangeCatalogue::from_json(
            r#"{"incomeRanges": [
                {"value": "band-a", "label": "Band A"},
                {"value": "band-b", "label": "Band B"}
            ]}"#,
        )
        .expect("catalogue parses");

        let selected = catalogue.default_selection().expect("catalogue not empty");
        assert_eq!(selected.value(), "band-a");
        assert!(!catalogue.contains(DEFAULT_INCOME_RANGE));
    }

    #[rstest]
    #[case(r#"{"incomeRanges": []}"#, IncomeRangeCatalogueError::Empty)]
    #[case(
        r#"{"incomeRanges": [{"value": "a", "label": "A"}, {"value": " ", "label": "B"}]}"#,
        IncomeRangeCatalogueError::BlankValue { index: 1 }
    )]
    #[case(
        r#"{"incomeRanges": [{"value": "a", "label": "A"}, {"value": "a", "label": "B"}]}"#,
        IncomeRangeCatalogueError::DuplicateValue { value: "a".to_owned() }
    )]
    fn rejects_invalid_catalogues(
        #[case] json: &str,
        #[case] expected: IncomeRangeCatalogueError,
    ) {
        assert_eq!(IncomeRangeCatalogue::from_json(json), Err(expected));
    }

    #[rstest]
    fn malformed_document_reports_parser_message() {
        let error = IncomeRangeCatalogue::from_json("[]").expect_err("array is not a catalogue");
        assert!(matches!(error, IncomeRangeCatalogueError::Malformed { .. }));
    }
}
