//! Attribute filter predicates.
//!
//! A filter is a triple of attribute name, operator and value(s). Each
//! operator has an arity contract (no value, single value, multiple values)
//! and each attribute type admits only a subset of the operators; both are
//! enforced when the filter is constructed, not when it is evaluated.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::models::attributes::AttributeType;

/// The supported filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    IsEmpty,
    IsNotEmpty,
    Equals,
    NotEquals,
    Contains,
    NotContains,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
}

impl FilterOperator {
    /// Operators that test for a missing value and take no comparand.
    pub fn accepts_no_value(self) -> bool {
        matches!(self, FilterOperator::IsEmpty | FilterOperator::IsNotEmpty)
    }

    /// Operators that compare against exactly one value.
    pub fn accepts_single_value(self) -> bool {
        matches!(
            self,
            FilterOperator::Equals
                | FilterOperator::NotEquals
                | FilterOperator::LessThan
                | FilterOperator::LessThanOrEquals
                | FilterOperator::GreaterThan
                | FilterOperator::GreaterThanOrEquals
        )
    }

    /// Operators that compare against a list of values.
    pub fn accepts_multiple_values(self) -> bool {
        matches!(self, FilterOperator::Contains | FilterOperator::NotContains)
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FilterOperator::IsEmpty => "is_empty",
            FilterOperator::IsNotEmpty => "is_not_empty",
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not_equals",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "not_contains",
            FilterOperator::LessThan => "less_than",
            FilterOperator::LessThanOrEquals => "less_than_or_equals",
            FilterOperator::GreaterThan => "greater_than",
            FilterOperator::GreaterThanOrEquals => "greater_than_or_equals",
        };
        write!(f, "{name}")
    }
}

/// A filter on a categorical attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCategoricalFilter")]
pub struct CategoricalFilter {
    attribute: String,
    operator: FilterOperator,
    values: Vec<String>,
}

impl CategoricalFilter {
    const SUPPORTED: [FilterOperator; 6] = [
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::Contains,
        FilterOperator::NotContains,
    ];

    pub fn new(
        attribute: impl Into<String>,
        operator: FilterOperator,
        values: Vec<String>,
    ) -> Result<Self, ConfigurationError> {
        let attribute = attribute.into();
        if !Self::SUPPORTED.contains(&operator) {
            return Err(ConfigurationError::UnsupportedOperator {
                attribute,
                operator,
                kind: AttributeType::Categorical,
            });
        }
        check_arity(&attribute, operator, values.len())?;
        Ok(Self {
            attribute,
            operator,
            values,
        })
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// A filter on a numerical attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNumericalFilter")]
pub struct NumericalFilter {
    attribute: String,
    operator: FilterOperator,
    value: Option<f64>,
}

impl NumericalFilter {
    const SUPPORTED: [FilterOperator; 8] = [
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::LessThan,
        FilterOperator::LessThanOrEquals,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanOrEquals,
    ];

    pub fn new(
        attribute: impl Into<String>,
        operator: FilterOperator,
        value: Option<f64>,
    ) -> Result<Self, ConfigurationError> {
        let attribute = attribute.into();
        if !Self::SUPPORTED.contains(&operator) {
            return Err(ConfigurationError::UnsupportedOperator {
                attribute,
                operator,
                kind: AttributeType::Numerical,
            });
        }
        check_arity(&attribute, operator, usize::from(value.is_some()))?;
        Ok(Self {
            attribute,
            operator,
            value,
        })
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

fn check_arity(
    attribute: &str,
    operator: FilterOperator,
    value_count: usize,
) -> Result<(), ConfigurationError> {
    let ok = if operator.accepts_no_value() {
        value_count == 0
    } else if operator.accepts_single_value() {
        value_count == 1
    } else {
        value_count >= 1
    };
    if ok {
        Ok(())
    } else {
        let expected = if operator.accepts_no_value() {
            "no value"
        } else if operator.accepts_single_value() {
            "exactly one value"
        } else {
            "at least one value"
        };
        Err(ConfigurationError::InvalidFilterArity {
            attribute: attribute.to_string(),
            operator,
            expected,
        })
    }
}

/// A filter on either kind of attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeFilter {
    Numerical(NumericalFilter),
    Categorical(CategoricalFilter),
}

impl AttributeFilter {
    pub fn attribute(&self) -> &str {
        match self {
            AttributeFilter::Categorical(f) => f.attribute(),
            AttributeFilter::Numerical(f) => f.attribute(),
        }
    }

    pub fn operator(&self) -> FilterOperator {
        match self {
            AttributeFilter::Categorical(f) => f.operator(),
            AttributeFilter::Numerical(f) => f.operator(),
        }
    }
}

impl From<CategoricalFilter> for AttributeFilter {
    fn from(filter: CategoricalFilter) -> Self {
        AttributeFilter::Categorical(filter)
    }
}

impl From<NumericalFilter> for AttributeFilter {
    fn from(filter: NumericalFilter) -> Self {
        AttributeFilter::Numerical(filter)
    }
}

#[derive(Deserialize)]
struct RawCategoricalFilter {
    attribute: String,
    operator: FilterOperator,
    #[serde(default)]
    values: Vec<String>,
}

impl TryFrom<RawCategoricalFilter> for CategoricalFilter {
    type Error = ConfigurationError;

    fn try_from(raw: RawCategoricalFilter) -> Result<Self, Self::Error> {
        CategoricalFilter::new(raw.attribute, raw.operator, raw.values)
    }
}

#[derive(Deserialize)]
struct RawNumericalFilter {
    attribute: String,
    operator: FilterOperator,
    #[serde(default)]
    value: Option<f64>,
}

impl TryFrom<RawNumericalFilter> for NumericalFilter {
    type Error = ConfigurationError;

    fn try_from(raw: RawNumericalFilter) -> Result<Self, Self::Error> {
        NumericalFilter::new(raw.attribute, raw.operator, raw.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorical_rejects_ordering_operators() {
        let err = CategoricalFilter::new(
            "gender",
            FilterOperator::LessThan,
            vec!["F".to_string()],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnsupportedOperator {
                kind: AttributeType::Categorical,
                ..
            }
        ));
    }

    #[test]
    fn test_numerical_rejects_membership_operators() {
        let err = NumericalFilter::new("age", FilterOperator::Contains, Some(5.0)).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnsupportedOperator {
                kind: AttributeType::Numerical,
                ..
            }
        ));
    }

    #[test]
    fn test_arity_is_checked_at_construction() {
        // equals needs exactly one value
        let err =
            CategoricalFilter::new("gender", FilterOperator::Equals, vec![]).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidFilterArity { .. }));

        let err = CategoricalFilter::new(
            "gender",
            FilterOperator::Equals,
            vec!["F".to_string(), "M".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidFilterArity { .. }));

        // is_empty takes no value
        let err = NumericalFilter::new("age", FilterOperator::IsEmpty, Some(1.0)).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidFilterArity { .. }));

        assert!(NumericalFilter::new("age", FilterOperator::IsEmpty, None).is_ok());
        assert!(
            CategoricalFilter::new("opo_id", FilterOperator::Contains, vec!["OPO1".into()])
                .is_ok()
        );
    }

    #[test]
    fn test_filter_from_json_enforces_invariants() {
        let filter: AttributeFilter = serde_json::from_str(
            r#"{"attribute": "age", "operator": "less_than", "value": 20}"#,
        )
        .unwrap();
        assert!(matches!(filter, AttributeFilter::Numerical(_)));

        let bad: Result<AttributeFilter, _> = serde_json::from_str(
            r#"{"attribute": "gender", "operator": "less_than", "values": ["F"]}"#,
        );
        assert!(bad.is_err());
    }
}
