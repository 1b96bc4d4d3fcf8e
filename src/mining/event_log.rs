//! The in-memory event log and its ingestion.
//!
//! One [`Event`] is one row of the ETL collaborator's tabular output: case
//! id, activity, timestamp, plus the per-case attribute values replicated
//! onto every event of the case. Loading derives the per-case process
//! attributes (start/end activity, size, duration, variant) and replicates
//! them the same way, so filters and groupings treat them like any other
//! column.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::models::attributes::{
    AttributeType, CategoricalAttribute, NumericalAttribute, PatientAttribute,
};

/// Required log columns, named as the ETL collaborator writes them.
pub const CASE_ID_COLUMN: &str = "case:concept:name";
pub const ACTIVITY_COLUMN: &str = "concept:name";
pub const TIMESTAMP_COLUMN: &str = "time:timestamp";

/// Derived per-case process attribute columns.
pub const START_ACTIVITY: &str = "start_activity";
pub const END_ACTIVITY: &str = "end_activity";
pub const CASE_SIZE: &str = "case_size";
pub const CASE_DURATION: &str = "case_duration";
pub const VARIANT: &str = "variant";

/// The closed vocabulary of clinical activities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Activity {
    Referral,
    Evaluation,
    Approach,
    Authorization,
    Procurement,
    Transplant,
}

impl Activity {
    /// Every activity, in canonical process order.
    pub const ALL: [Activity; 6] = [
        Activity::Referral,
        Activity::Evaluation,
        Activity::Approach,
        Activity::Authorization,
        Activity::Procurement,
        Activity::Transplant,
    ];

    /// The canonical happy path: all six activities in process order.
    pub const HAPPY_PATH: [Activity; 6] = Activity::ALL;

    pub fn name(self) -> &'static str {
        match self {
            Activity::Referral => "Referral",
            Activity::Evaluation => "Evaluation",
            Activity::Approach => "Approach",
            Activity::Authorization => "Authorization",
            Activity::Procurement => "Procurement",
            Activity::Transplant => "Transplant",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Activity {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Referral" => Ok(Activity::Referral),
            "Evaluation" => Ok(Activity::Evaluation),
            "Approach" => Ok(Activity::Approach),
            "Authorization" => Ok(Activity::Authorization),
            "Procurement" => Ok(Activity::Procurement),
            "Transplant" => Ok(Activity::Transplant),
            other => Err(LoadError::UnknownActivity(other.to_string())),
        }
    }
}

/// A single attribute cell. Missing values are represented by absence from
/// the event's attribute map, not by a variant here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(_) => None,
        }
    }

    /// The chart label of this value.
    pub fn label(&self) -> String {
        match self {
            AttributeValue::Text(s) => s.clone(),
            AttributeValue::Number(n) => format!("{n}"),
        }
    }
}

/// One row of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub case_id: String,
    pub activity: Activity,
    pub timestamp: DateTime<Utc>,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Event {
    pub fn new(
        case_id: impl Into<String>,
        activity: Activity,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            activity,
            timestamp,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// The value of the named attribute column, if present.
    pub fn value(&self, attribute: &str) -> Option<&AttributeValue> {
        self.attributes.get(attribute)
    }
}

/// The immutable in-memory event log. Within each case, events are ordered
/// by timestamp; cases keep their order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Build a log from raw events: orders events within each case by
    /// timestamp and derives the per-case process attribute columns.
    pub fn from_events(events: Vec<Event>) -> Self {
        let mut case_order: Vec<String> = Vec::new();
        let mut by_case: HashMap<String, Vec<Event>> = HashMap::new();
        for event in events {
            if !by_case.contains_key(&event.case_id) {
                case_order.push(event.case_id.clone());
            }
            by_case.entry(event.case_id.clone()).or_default().push(event);
        }

        let mut ordered = Vec::new();
        for case_id in case_order {
            let mut case_events = by_case.remove(&case_id).unwrap_or_default();
            case_events.sort_by_key(|event| event.timestamp);
            derive_case_attributes(&mut case_events);
            ordered.extend(case_events);
        }

        Self { events: ordered }
    }

    /// Load the event log from a CSV file written by the ETL collaborator.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Load the event log from any CSV source.
    pub fn from_csv_reader(reader: impl Read) -> Result<Self, LoadError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let column = |name: &'static str| -> Result<usize, LoadError> {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or(LoadError::MissingColumn(name))
        };
        let case_idx = column(CASE_ID_COLUMN)?;
        let activity_idx = column(ACTIVITY_COLUMN)?;
        let timestamp_idx = column(TIMESTAMP_COLUMN)?;

        // Attribute columns are the schema'd patient attributes present in
        // the header; anything else in the file is ignored.
        let attribute_columns: Vec<(usize, &'static str, AttributeType)> =
            patient_attribute_schema()
                .iter()
                .filter_map(|(name, kind)| {
                    headers
                        .iter()
                        .position(|header| header == *name)
                        .map(|idx| (idx, *name, *kind))
                })
                .collect();

        let mut events = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let case_id = record.get(case_idx).unwrap_or_default().to_string();
            let activity: Activity = record.get(activity_idx).unwrap_or_default().parse()?;
            let raw_timestamp = record.get(timestamp_idx).unwrap_or_default();
            let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| {
                LoadError::InvalidTimestamp {
                    case_id: case_id.clone(),
                    value: raw_timestamp.to_string(),
                }
            })?;

            let mut event = Event::new(case_id, activity, timestamp);
            for (idx, name, kind) in &attribute_columns {
                let raw = record.get(*idx).unwrap_or_default();
                if raw.is_empty() {
                    continue;
                }
                let value = match kind {
                    AttributeType::Categorical => AttributeValue::Text(raw.to_string()),
                    AttributeType::Numerical => {
                        let number = raw.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
                            attribute: name.to_string(),
                            value: raw.to_string(),
                        })?;
                        AttributeValue::Number(number)
                    }
                };
                event.attributes.insert(name.to_string(), value);
            }
            events.push(event);
        }

        let log = Self::from_events(events);
        info!(
            "loaded event log: {} events across {} cases",
            log.len(),
            log.case_count()
        );
        Ok(log)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Cases in order of first appearance, each with its time-ordered events.
    pub fn cases(&self) -> Vec<(&str, Vec<&Event>)> {
        let mut order: Vec<&str> = Vec::new();
        let mut by_case: HashMap<&str, Vec<&Event>> = HashMap::new();
        for event in &self.events {
            let case_id = event.case_id.as_str();
            if !by_case.contains_key(case_id) {
                order.push(case_id);
            }
            by_case.entry(case_id).or_default().push(event);
        }
        order
            .into_iter()
            .map(|case_id| {
                let events = by_case.remove(case_id).unwrap_or_default();
                (case_id, events)
            })
            .collect()
    }

    /// Number of distinct cases in the view.
    pub fn case_count(&self) -> usize {
        self.events
            .iter()
            .map(|event| event.case_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Rewrite one attribute column in place. Internal helper for derived
    /// columns; callers clone the log first (copy-on-write).
    pub(crate) fn map_attribute<F>(&mut self, attribute: &str, mut transform: F)
    where
        F: FnMut(&AttributeValue) -> Option<AttributeValue>,
    {
        for event in &mut self.events {
            let mapped = event.value(attribute).and_then(&mut transform);
            match mapped {
                Some(value) => {
                    event.attributes.insert(attribute.to_string(), value);
                }
                None => {
                    event.attributes.remove(attribute);
                }
            }
        }
    }

    /// Keep only the events matched by the predicate.
    pub(crate) fn retain_view(&self, mut keep: impl FnMut(&Event) -> bool) -> EventLog {
        EventLog {
            events: self
                .events
                .iter()
                .filter(|event| keep(event))
                .cloned()
                .collect(),
        }
    }

    /// Derive the patient attribute catalog from the observed data.
    pub fn patient_attributes(&self) -> Vec<PatientAttribute> {
        self.derive_catalog(patient_attribute_schema())
    }

    /// Derive the process attribute catalog from the derived case columns.
    pub fn process_attributes(&self) -> Vec<PatientAttribute> {
        self.derive_catalog(process_attribute_schema())
    }

    fn derive_catalog(
        &self,
        schema: &[(&'static str, AttributeType)],
    ) -> Vec<PatientAttribute> {
        let mut attributes = Vec::new();
        for (name, kind) in schema {
            match kind {
                AttributeType::Categorical => {
                    let values: BTreeSet<String> = self
                        .events
                        .iter()
                        .filter_map(|event| event.value(name))
                        .map(|value| value.label())
                        .collect();
                    attributes.push(PatientAttribute::Categorical(CategoricalAttribute::new(
                        *name,
                        values.into_iter().collect(),
                    )));
                }
                AttributeType::Numerical => {
                    let numbers: Vec<f64> = self
                        .events
                        .iter()
                        .filter_map(|event| event.value(name))
                        .filter_map(|value| value.as_number())
                        .collect();
                    let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    if !numbers.is_empty() {
                        attributes.push(PatientAttribute::Numerical(NumericalAttribute::new(
                            *name, min, max,
                        )));
                    }
                }
            }
        }
        attributes
    }
}

/// The patient attributes the ETL collaborator writes, with their types.
pub fn patient_attribute_schema() -> &'static [(&'static str, AttributeType)] {
    &[
        ("opo_id", AttributeType::Categorical),
        ("hospital_id", AttributeType::Categorical),
        ("age", AttributeType::Numerical),
        ("gender", AttributeType::Categorical),
        ("race", AttributeType::Categorical),
        ("brain_death", AttributeType::Categorical),
        ("referral_year", AttributeType::Categorical),
        ("referral_day_of_week", AttributeType::Categorical),
        ("cause_of_death", AttributeType::Categorical),
        ("mechanism_of_death", AttributeType::Categorical),
        ("circumstances_of_death", AttributeType::Categorical),
        ("outcome_heart", AttributeType::Categorical),
        ("outcome_liver", AttributeType::Categorical),
        ("outcome_kidney_left", AttributeType::Categorical),
        ("outcome_kidney_right", AttributeType::Categorical),
        ("outcome_lung_left", AttributeType::Categorical),
        ("outcome_lung_right", AttributeType::Categorical),
        ("outcome_pancreas", AttributeType::Categorical),
    ]
}

/// The derived per-case process attributes, with their types.
pub fn process_attribute_schema() -> &'static [(&'static str, AttributeType)] {
    &[
        (START_ACTIVITY, AttributeType::Categorical),
        (END_ACTIVITY, AttributeType::Categorical),
        (CASE_SIZE, AttributeType::Numerical),
        (CASE_DURATION, AttributeType::Numerical),
        (VARIANT, AttributeType::Categorical),
    ]
}

/// Compute the derived case attributes and replicate them onto every event
/// of the case. `events` must already be time-ordered.
fn derive_case_attributes(events: &mut [Event]) {
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return;
    };
    let start = first.activity.name().to_string();
    let end = last.activity.name().to_string();
    let size = events.len() as f64;
    let duration = (last.timestamp - first.timestamp).num_seconds() as f64;
    let variant = events
        .iter()
        .map(|event| event.activity.name())
        .collect::<Vec<_>>()
        .join(" ");

    for event in events.iter_mut() {
        event
            .attributes
            .insert(START_ACTIVITY.to_string(), AttributeValue::Text(start.clone()));
        event
            .attributes
            .insert(END_ACTIVITY.to_string(), AttributeValue::Text(end.clone()));
        event
            .attributes
            .insert(CASE_SIZE.to_string(), AttributeValue::Number(size));
        event
            .attributes
            .insert(CASE_DURATION.to_string(), AttributeValue::Number(duration));
        event
            .attributes
            .insert(VARIANT.to_string(), AttributeValue::Text(variant.clone()));
    }
}

/// Parse an ISO-8601 timestamp, with or without an explicit offset.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_csv() -> String {
        let mut csv = String::from(
            "case:concept:name,concept:name,time:timestamp,age,gender,outcome_heart\n",
        );
        csv.push_str("C1,Referral,2019-01-01T00:00:00+00:00,39,F,Recovered\n");
        csv.push_str("C1,Evaluation,2019-01-01T01:00:00+00:00,39,F,Recovered\n");
        csv.push_str("C2,Evaluation,2018-06-01T08:30:00+00:00,15,M,\n");
        csv.push_str("C2,Referral,2018-06-01T08:00:00+00:00,15,M,\n");
        csv
    }

    #[test]
    fn test_load_orders_events_within_case() {
        let log = EventLog::from_csv_reader(sample_csv().as_bytes()).unwrap();
        let cases = log.cases();

        assert_eq!(cases.len(), 2);
        let (case_id, events) = &cases[1];
        assert_eq!(*case_id, "C2");
        // C2's rows arrive out of order in the file
        assert_eq!(events[0].activity, Activity::Referral);
        assert_eq!(events[1].activity, Activity::Evaluation);
    }

    #[test]
    fn test_load_derives_case_attributes() {
        let log = EventLog::from_csv_reader(sample_csv().as_bytes()).unwrap();
        let cases = log.cases();
        let (_, events) = &cases[0];

        for event in events {
            assert_eq!(
                event.value(START_ACTIVITY),
                Some(&AttributeValue::Text("Referral".to_string()))
            );
            assert_eq!(
                event.value(END_ACTIVITY),
                Some(&AttributeValue::Text("Evaluation".to_string()))
            );
            assert_eq!(event.value(CASE_SIZE), Some(&AttributeValue::Number(2.0)));
            assert_eq!(
                event.value(CASE_DURATION),
                Some(&AttributeValue::Number(3600.0))
            );
            assert_eq!(
                event.value(VARIANT),
                Some(&AttributeValue::Text("Referral Evaluation".to_string()))
            );
        }
    }

    #[test]
    fn test_missing_values_stay_missing() {
        let log = EventLog::from_csv_reader(sample_csv().as_bytes()).unwrap();
        let cases = log.cases();
        let (_, c2_events) = &cases[1];
        assert!(c2_events[0].value("outcome_heart").is_none());
    }

    #[test]
    fn test_load_from_file(){
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample_csv().as_bytes()).unwrap();

        let log = EventLog::from_csv_path(file.path()).unwrap();
        assert_eq!(log.len(), 4);
        assert_eq!(log.case_count(), 2);
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "case:concept:name,concept:name\nC1,Referral\n";
        let err = EventLog::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(TIMESTAMP_COLUMN)));
    }

    #[test]
    fn test_unknown_activity_is_rejected() {
        let csv = "case:concept:name,concept:name,time:timestamp\nC1,Biopsy,2019-01-01T00:00:00+00:00\n";
        let err = EventLog::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownActivity(_)));
    }

    #[test]
    fn test_patient_attribute_catalog() {
        let log = EventLog::from_csv_reader(sample_csv().as_bytes()).unwrap();
        let attributes = log.patient_attributes();

        let gender = attributes
            .iter()
            .find(|attr| attr.name() == "gender")
            .unwrap();
        match gender {
            PatientAttribute::Categorical(attr) => {
                assert_eq!(attr.values(), &["F".to_string(), "M".to_string()]);
            }
            PatientAttribute::Numerical(_) => panic!("gender must be categorical"),
        }

        let age = attributes.iter().find(|attr| attr.name() == "age").unwrap();
        match age {
            PatientAttribute::Numerical(attr) => {
                assert_eq!(attr.min(), 15.0);
                assert_eq!(attr.max(), 39.0);
            }
            PatientAttribute::Categorical(_) => panic!("age must be numerical"),
        }
    }

    #[test]
    fn test_process_attribute_catalog() {
        let log = EventLog::from_csv_reader(sample_csv().as_bytes()).unwrap();
        let attributes = log.process_attributes();

        let end = attributes
            .iter()
            .find(|attr| attr.name() == END_ACTIVITY)
            .unwrap();
        match end {
            PatientAttribute::Categorical(attr) => {
                assert_eq!(attr.values(), &["Evaluation".to_string()]);
            }
            PatientAttribute::Numerical(_) => panic!("end_activity must be categorical"),
        }
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2019-01-01T00:00:00+00:00").is_some());
        assert!(parse_timestamp("2019-01-01T00:00:00Z").is_some());
        assert!(parse_timestamp("2019-01-01T00:00:00").is_some());
        assert!(parse_timestamp("2019-01-01 00:00:00.123").is_some());
        assert!(parse_timestamp("not a time").is_none());
    }
}
