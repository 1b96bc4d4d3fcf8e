//! Request objects consumed from the validation/schema collaborator.
//!
//! These arrive already shape-validated; the engines still defend their own
//! invariants (operator whitelists, bin monotonicity, graph construction).

use serde::{Deserialize, Serialize};

use crate::models::attributes::DisaggregationAttribute;
use crate::models::filters::AttributeFilter;

/// The KPIs that can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiType {
    /// Share of cases that follow the canonical happy path.
    HappyPathAdherence,
    /// Where case traces terminate, per activity.
    DropOut,
    /// Count of cases that deviate from the happy path.
    PermutedPathAdherence,
    /// Mean minutes from first Referral to first Procurement.
    BureaucraticDuration,
    /// Mean minutes from first Evaluation to first Approach.
    EvaluationToApproach,
    /// Mean minutes from first Authorization to first Procurement.
    AuthorizationToProcurement,
}

impl KpiType {
    /// Display name used for the resulting chart container.
    pub fn title(self) -> &'static str {
        match self {
            KpiType::HappyPathAdherence => "Happy path adherence",
            KpiType::DropOut => "Dropout rate",
            KpiType::PermutedPathAdherence => "Permuted path adherence",
            KpiType::BureaucraticDuration => "Bureaucratic duration",
            KpiType::EvaluationToApproach => "Evaluation to approach",
            KpiType::AuthorizationToProcurement => "Authorization to procurement",
        }
    }
}

/// The edge statistic of a de-jure graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DejureStatistic {
    /// Minimum duration between two activities, in minutes.
    Min,
    /// Maximum duration between two activities, in minutes.
    Max,
    /// Mean duration between two activities, in minutes.
    Mean,
    /// Median duration between two activities, in minutes.
    Median,
    /// Fraction of the source activity's occurrences that proceed to the target.
    Remain,
    /// Fraction of traces that terminate at the source activity.
    Drop,
}

/// A request for the variant list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantListRequest {
    #[serde(default)]
    pub filters: Vec<AttributeFilter>,
    pub disaggregation_attribute: DisaggregationAttribute,
}

/// A request for the distribution of an attribute over cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRequest {
    #[serde(default)]
    pub filters: Vec<AttributeFilter>,
    pub disaggregation_attribute: DisaggregationAttribute,
}

/// A request for a KPI, disaggregated and optionally split by a legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRequest {
    #[serde(default)]
    pub filters: Vec<AttributeFilter>,
    pub kpi: KpiType,
    pub disaggregation_attribute: DisaggregationAttribute,
    #[serde(default)]
    pub legend_attribute: Option<DisaggregationAttribute>,
}

/// A request for the directly-follows graph of the filtered log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DfgRequest {
    #[serde(default)]
    pub filters: Vec<AttributeFilter>,
}

/// A request for a de-jure graph with a chosen edge statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DejureGraphRequest {
    #[serde(default)]
    pub filters: Vec<AttributeFilter>,
    pub statistic: DejureStatistic,
    pub disaggregation_attribute: DisaggregationAttribute,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kpi_request_from_json() {
        let request: KpiRequest = serde_json::from_str(
            r#"{
                "filters": [
                    {"attribute": "age", "operator": "less_than", "value": 65}
                ],
                "kpi": "happy_path_adherence",
                "disaggregation_attribute": {"name": "gender", "type": "categorical"},
                "legend_attribute": {"name": "referral_year", "type": "categorical"}
            }"#,
        )
        .unwrap();

        assert_eq!(request.kpi, KpiType::HappyPathAdherence);
        assert_eq!(request.filters.len(), 1);
        assert_eq!(request.disaggregation_attribute.name(), "gender");
        assert!(request.legend_attribute.is_some());
    }

    #[test]
    fn test_filters_default_to_empty() {
        let request: DfgRequest = serde_json::from_str("{}").unwrap();
        assert!(request.filters.is_empty());
    }
}
