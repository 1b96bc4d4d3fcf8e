//! Patient and process attribute descriptors.
//!
//! The attribute catalog is the source of truth for which operations a
//! column admits: categorical attributes carry their observed value set,
//! numerical attributes carry their observed domain. Disaggregation
//! attributes additionally carry the bin boundaries used to turn a
//! continuous domain into labeled intervals.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// The type of a patient or process attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Categorical,
    Numerical,
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeType::Categorical => write!(f, "categorical"),
            AttributeType::Numerical => write!(f, "numerical"),
        }
    }
}

/// A categorical attribute and its legal values, sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalAttribute {
    name: String,
    values: Vec<String>,
    #[serde(rename = "type")]
    kind: AttributeType,
}

impl CategoricalAttribute {
    pub fn new(name: impl Into<String>, mut values: Vec<String>) -> Self {
        values.sort();
        values.dedup();
        Self {
            name: name.into(),
            values,
            kind: AttributeType::Categorical,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// A numerical attribute and its observed domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericalAttribute {
    name: String,
    min: f64,
    max: f64,
    #[serde(rename = "type")]
    kind: AttributeType,
}

impl NumericalAttribute {
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            kind: AttributeType::Numerical,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// A patient or process attribute, either categorical or numerical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatientAttribute {
    Categorical(CategoricalAttribute),
    Numerical(NumericalAttribute),
}

impl PatientAttribute {
    pub fn name(&self) -> &str {
        match self {
            PatientAttribute::Categorical(a) => a.name(),
            PatientAttribute::Numerical(a) => a.name(),
        }
    }

    pub fn kind(&self) -> AttributeType {
        match self {
            PatientAttribute::Categorical(_) => AttributeType::Categorical,
            PatientAttribute::Numerical(_) => AttributeType::Numerical,
        }
    }
}

/// An attribute used to split results into groups.
///
/// Categorical attributes group by their own values and carry no bins.
/// Numerical attributes carry an ordered list of bin boundaries that
/// partition the domain into `len(bins) - 1` labeled `[lo, hi)` intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDisaggregationAttribute")]
pub struct DisaggregationAttribute {
    name: String,
    #[serde(rename = "type")]
    kind: AttributeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    bins: Option<Vec<f64>>,
}

impl DisaggregationAttribute {
    /// A categorical disaggregation attribute; groups by the raw values.
    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeType::Categorical,
            bins: None,
        }
    }

    /// A numerical disaggregation attribute with the given bin boundaries.
    pub fn numerical(
        name: impl Into<String>,
        bins: Vec<f64>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if bins.len() < 2 || bins.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigurationError::InvalidBins { attribute: name });
        }
        Ok(Self {
            name,
            kind: AttributeType::Numerical,
            bins: Some(bins),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttributeType {
        self.kind
    }

    /// The bin boundaries, optionally extended to ±infinity for display.
    pub fn bins(&self, include_infinities: bool) -> Result<Vec<f64>, ConfigurationError> {
        match (&self.kind, &self.bins) {
            (AttributeType::Numerical, Some(bins)) => {
                if bins.len() < 2 || bins.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(ConfigurationError::InvalidBins {
                        attribute: self.name.clone(),
                    });
                }
                let mut result = bins.clone();
                if include_infinities {
                    result.insert(0, f64::NEG_INFINITY);
                    result.push(f64::INFINITY);
                }
                Ok(result)
            }
            _ => Err(ConfigurationError::BinsOnCategorical {
                attribute: self.name.clone(),
            }),
        }
    }

    /// Labels for the intervals: `"{lo} - {hi}"` for interior bins, and
    /// `"< {first}"` / `"> {last}"` for the unbounded ones when requested.
    pub fn bin_labels(&self, include_infinities: bool) -> Result<Vec<String>, ConfigurationError> {
        let bins = self.bins(false)?;
        let mut labels: Vec<String> = bins
            .windows(2)
            .map(|w| format!("{} - {}", w[0], w[1]))
            .collect();
        if include_infinities {
            labels.insert(0, format!("< {}", bins[0]));
            labels.push(format!("> {}", bins[bins.len() - 1]));
        }
        Ok(labels)
    }
}

#[derive(Deserialize)]
struct RawDisaggregationAttribute {
    name: String,
    #[serde(rename = "type")]
    kind: AttributeType,
    #[serde(default)]
    bins: Option<Vec<f64>>,
}

impl TryFrom<RawDisaggregationAttribute> for DisaggregationAttribute {
    type Error = ConfigurationError;

    fn try_from(raw: RawDisaggregationAttribute) -> Result<Self, Self::Error> {
        match raw.kind {
            AttributeType::Categorical => Ok(DisaggregationAttribute::categorical(raw.name)),
            AttributeType::Numerical => {
                let bins = raw.bins.ok_or(ConfigurationError::InvalidBins {
                    attribute: raw.name.clone(),
                })?;
                DisaggregationAttribute::numerical(raw.name, bins)
            }
        }
    }
}
