//! The process mining service facade.
//!
//! Owns the loaded event log and answers every analytics request. Each
//! operation runs the same pipeline: filter the log, resolve the
//! disaggregation (and legend) groupings, then hand the view to the
//! relevant engine.

use log::debug;

use crate::config::AnalyticsConfig;
use crate::error::{ConfigurationError, LoadError};
use crate::mining::binning::{bin_optional, create_bins};
use crate::mining::dejure::dejure_graph;
use crate::mining::dfg::frequency_graph;
use crate::mining::distribution::attribute_distribution;
use crate::mining::event_log::EventLog;
use crate::mining::filter::filter_log;
use crate::mining::kpi::compute_kpi;
use crate::mining::variants::variants_with_frequencies;
use crate::models::attributes::PatientAttribute;
use crate::models::charts::{DataSeries, Graph, MultiDataSeries, Variant};
use crate::models::requests::{
    DejureGraphRequest, DfgRequest, DistributionRequest, KpiRequest, VariantListRequest,
};

pub struct ProcessMiningService {
    event_log: EventLog,
    patient_attributes: Vec<PatientAttribute>,
    process_attributes: Vec<PatientAttribute>,
}

impl ProcessMiningService {
    /// Load the event log named by the configuration and derive the
    /// attribute catalogs.
    pub fn new(config: &AnalyticsConfig) -> Result<Self, LoadError> {
        let event_log = EventLog::from_csv_path(&config.event_log_path)?;
        Ok(Self::from_log(event_log))
    }

    /// Build the service around an already loaded log.
    pub fn from_log(event_log: EventLog) -> Self {
        let patient_attributes = event_log.patient_attributes();
        let process_attributes = event_log.process_attributes();
        Self {
            event_log,
            patient_attributes,
            process_attributes,
        }
    }

    pub fn get_patient_attributes(&self) -> &[PatientAttribute] {
        &self.patient_attributes
    }

    pub fn get_process_attributes(&self) -> &[PatientAttribute] {
        &self.process_attributes
    }

    /// The variants of the filtered log, with per-variant distributions of
    /// the disaggregation attribute.
    pub fn get_variants(
        &self,
        request: &VariantListRequest,
    ) -> Result<Vec<Variant>, ConfigurationError> {
        let filtered = filter_log(&self.event_log, &request.filters);
        let (view, grouping) = create_bins(&filtered, &request.disaggregation_attribute)?;
        debug!(
            "variant request: {} cases after {} filters",
            view.case_count(),
            request.filters.len()
        );
        Ok(variants_with_frequencies(&view, &grouping))
    }

    /// The distribution of an attribute over the cases of the filtered log.
    pub fn get_attribute_distribution(
        &self,
        request: &DistributionRequest,
    ) -> Result<DataSeries, ConfigurationError> {
        let filtered = filter_log(&self.event_log, &request.filters);
        let (view, grouping) = create_bins(&filtered, &request.disaggregation_attribute)?;
        Ok(attribute_distribution(&view, &grouping))
    }

    /// A KPI over the filtered log, disaggregated and optionally split by
    /// a legend attribute.
    pub fn get_kpi_data(
        &self,
        request: &KpiRequest,
    ) -> Result<MultiDataSeries, ConfigurationError> {
        let filtered = filter_log(&self.event_log, &request.filters);
        let (disaggregated, disaggregation) =
            create_bins(&filtered, &request.disaggregation_attribute)?;
        let (view, legend) = bin_optional(&disaggregated, request.legend_attribute.as_ref())?;
        Ok(compute_kpi(
            &view,
            request.kpi,
            &disaggregation,
            legend.as_ref(),
        ))
    }

    /// The directly-follows graph of the filtered log.
    pub fn get_dfg(&self, request: &DfgRequest) -> Result<Graph, ConfigurationError> {
        let filtered = filter_log(&self.event_log, &request.filters);
        frequency_graph(&filtered)
    }

    /// A de-jure graph of the filtered log, carrying the requested edge
    /// statistic.
    pub fn get_dejure_graph(
        &self,
        request: &DejureGraphRequest,
    ) -> Result<Graph, ConfigurationError> {
        let filtered = filter_log(&self.event_log, &request.filters);
        let (view, grouping) = create_bins(&filtered, &request.disaggregation_attribute)?;
        dejure_graph(&view, &grouping, request.statistic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::event_log::{Activity, AttributeValue, Event};
    use crate::models::attributes::DisaggregationAttribute;
    use chrono::{Duration, TimeZone, Utc};

    fn sample_service() -> ProcessMiningService {
        let t0 = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        let mut events = Vec::new();
        for (i, activity) in Activity::HAPPY_PATH.iter().enumerate() {
            events.push(
                Event::new("C1", *activity, t0 + Duration::hours(i as i64))
                    .with_attribute("gender", AttributeValue::Text("F".into())),
            );
        }
        events.push(
            Event::new("C2", Activity::Referral, t0)
                .with_attribute("gender", AttributeValue::Text("M".into())),
        );
        ProcessMiningService::from_log(EventLog::from_events(events))
    }

    #[test]
    fn test_variants_pipeline() {
        let service = sample_service();
        let request = VariantListRequest {
            filters: vec![],
            disaggregation_attribute: DisaggregationAttribute::categorical("gender"),
        };

        let variants = service.get_variants(&request).unwrap();
        assert_eq!(variants.len(), 2);
    }

    #[test]
    fn test_kpi_pipeline_with_numerical_disaggregation() {
        let service = sample_service();
        let result = service
            .get_kpi_data(&KpiRequest {
                filters: vec![],
                kpi: crate::models::requests::KpiType::DropOut,
                disaggregation_attribute: DisaggregationAttribute::numerical(
                    "case_size",
                    vec![0.0, 3.0, 10.0],
                )
                .unwrap(),
                legend_attribute: None,
            })
            .unwrap();
        assert_eq!(result.name, "Dropout rate");
        assert_eq!(result.series.len(), 2);
    }

    #[test]
    fn test_attribute_catalogs_derived_at_construction() {
        let service = sample_service();
        assert!(service
            .get_patient_attributes()
            .iter()
            .any(|attribute| attribute.name() == "gender"));
        assert!(service
            .get_process_attributes()
            .iter()
            .any(|attribute| attribute.name() == "end_activity"));
    }

    #[test]
    fn test_dfg_pipeline() {
        let service = sample_service();
        let graph = service.get_dfg(&DfgRequest { filters: vec![] }).unwrap();
        assert_eq!(graph.name, "DFG");
        assert_eq!(graph.nodes.len(), 6);
    }
}
