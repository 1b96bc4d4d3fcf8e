//! Error types for the analytics engine.
//!
//! Two failure classes exist: [`ConfigurationError`] for malformed requests
//! (bad operator/attribute combinations, malformed bins, invalid graphs) and
//! [`LoadError`] for faults while ingesting the event log. Empty results and
//! missing attribute values are ordinary conditions, not errors.

use thiserror::Error;

use crate::models::attributes::AttributeType;
use crate::models::filters::FilterOperator;

/// A request-level configuration fault. These abort the single request and
/// are never silently defaulted.
//
// `Display`/`Error` are implemented by hand rather than via `#[derive(Error)]`
// because thiserror unconditionally treats the `DanglingEdge::source` field as
// the error source, and `String` does not implement `std::error::Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The operator is not legal for the attribute's declared type.
    UnsupportedOperator {
        attribute: String,
        operator: FilterOperator,
        kind: AttributeType,
    },

    /// The filter carries the wrong number of values for its operator.
    InvalidFilterArity {
        attribute: String,
        operator: FilterOperator,
        expected: &'static str,
    },

    /// Bin boundaries must be at least two strictly increasing numbers.
    InvalidBins { attribute: String },

    /// Bins were requested for a categorical attribute.
    BinsOnCategorical { attribute: String },

    /// A graph was constructed with a repeated node id.
    DuplicateNodeId(String),

    /// A graph edge references a node id that does not exist.
    DanglingEdge { source: String, target: String },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedOperator {
                attribute,
                operator,
                kind,
            } => write!(
                f,
                "operator `{operator}` is not supported for {kind} attribute `{attribute}`"
            ),
            Self::InvalidFilterArity {
                attribute,
                operator,
                expected,
            } => write!(
                f,
                "filter on `{attribute}` expects {expected} for operator `{operator}`"
            ),
            Self::InvalidBins { attribute } => write!(
                f,
                "bins for `{attribute}` must be at least two strictly increasing boundaries"
            ),
            Self::BinsOnCategorical { attribute } => {
                write!(f, "attribute `{attribute}` is categorical and carries no bins")
            }
            Self::DuplicateNodeId(id) => write!(f, "duplicate node id `{id}` in graph"),
            Self::DanglingEdge { source, target } => write!(
                f,
                "edge `{source}` -> `{target}` references a node that does not exist"
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// A fault while loading the event log or the configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read event log")]
    Io(#[from] std::io::Error),

    #[error("failed to parse event log")]
    Csv(#[from] csv::Error),

    #[error("failed to parse configuration")]
    Config(#[from] toml::de::Error),

    /// One of the three required log columns is absent.
    #[error("event log is missing required column `{0}`")]
    MissingColumn(&'static str),

    /// An activity name outside the closed vocabulary was encountered.
    #[error("unknown activity `{0}`")]
    UnknownActivity(String),

    #[error("invalid timestamp `{value}` in case `{case_id}`")]
    InvalidTimestamp { case_id: String, value: String },

    #[error("invalid numerical value `{value}` for attribute `{attribute}`")]
    InvalidNumber { attribute: String, value: String },
}
