//! Chart-shaped result entities.
//!
//! All analytics produce one of the types here: a [`DataSeries`] (one x/y
//! sequence), a [`MultiDataSeries`] (several series under a legend), a
//! [`Graph`] (nodes and edges) or a list of [`Variant`]s. They are plain
//! data, serializable to JSON without further transformation.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::mining::event_log::Activity;

/// Weekday names in calendar order, used instead of the natural sort when
/// charting the referral weekday attribute.
const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Attribute names with a fixed, domain-specific x ordering.
fn fixed_order(attribute: &str) -> Option<&'static [&'static str]> {
    match attribute {
        "referral_day_of_week" => Some(&WEEKDAY_ORDER),
        _ => None,
    }
}

/// Compare two labels naturally: runs of digits compare by numeric value,
/// everything else by character. Makes "2 - 10" sort after "0 - 2".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ia = a.char_indices().peekable();
    let mut ib = b.char_indices().peekable();
    loop {
        match (ia.peek().copied(), ib.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some((pa, ca)), Some((pb, cb))) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let da = digit_run(a, pa);
                    let db = digit_run(b, pb);
                    let na = da.trim_start_matches('0');
                    let nb = db.trim_start_matches('0');
                    let ord = na.len().cmp(&nb.len()).then_with(|| na.cmp(nb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    for _ in 0..da.len() {
                        ia.next();
                    }
                    for _ in 0..db.len() {
                        ib.next();
                    }
                } else {
                    match ca.cmp(&cb) {
                        Ordering::Equal => {
                            ia.next();
                            ib.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }
}

fn digit_run(s: &str, start: usize) -> &str {
    let end = s[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map(|offset| start + offset)
        .unwrap_or(s.len());
    &s[start..end]
}

/// Sort chart labels for the given attribute: a registered fixed order when
/// one exists, the natural sort otherwise. Labels outside a fixed order
/// sort after it, naturally.
pub fn sort_labels(attribute: &str, labels: &mut [String]) {
    if let Some(order) = fixed_order(attribute) {
        let rank = |label: &str| {
            order
                .iter()
                .position(|known| *known == label)
                .unwrap_or(order.len())
        };
        labels.sort_by(|a, b| {
            rank(a)
                .cmp(&rank(b))
                .then_with(|| natural_cmp(a, b))
        });
    } else {
        labels.sort_by(|a, b| natural_cmp(a, b));
    }
}

/// One point of a data series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    pub x: String,
    pub y: f64,
}

/// A named, ordered sequence of (x, y) points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSeries {
    pub name: String,
    pub data: Vec<DataItem>,
}

impl DataSeries {
    /// Build a series from points in the given order.
    pub fn new(name: impl Into<String>, data: Vec<DataItem>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Build a series from label/value pairs, ordering the x axis by the
    /// sort rules registered for `sort_by` (or the series name by default).
    pub fn from_counts(
        name: impl Into<String>,
        data: Vec<(String, f64)>,
        sort_by: Option<&str>,
    ) -> Self {
        let name = name.into();
        let mut labels: Vec<String> = data.iter().map(|(x, _)| x.clone()).collect();
        let key = sort_by.unwrap_or(&name).to_string();
        sort_labels(&key, &mut labels);

        let data: Vec<DataItem> = labels
            .into_iter()
            .map(|x| {
                let y = data
                    .iter()
                    .find(|(label, _)| *label == x)
                    .map(|(_, y)| *y)
                    .unwrap_or(0.0);
                DataItem { x, y }
            })
            .collect();
        Self { name, data }
    }
}

/// Several data series grouped under one container, used when a result has
/// a legend dimension in addition to the x axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDataSeries {
    pub name: String,
    pub series: Vec<DataSeries>,
}

impl MultiDataSeries {
    pub fn new(name: impl Into<String>, series: Vec<DataSeries>) -> Self {
        Self {
            name: name.into(),
            series,
        }
    }
}

/// A node in a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value,
        }
    }
}

/// An edge in a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        label: Option<String>,
        value: Option<f64>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label,
            value,
        }
    }
}

/// A named node/edge graph. Node ids are unique and every edge endpoint
/// references an existing node; violations fail construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(
        name: impl Into<String>,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Result<Self, ConfigurationError> {
        let mut ids: HashSet<&str> = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !ids.insert(&node.id) {
                return Err(ConfigurationError::DuplicateNodeId(node.id.clone()));
            }
        }
        for edge in &edges {
            if !ids.contains(edge.source.as_str()) || !ids.contains(edge.target.as_str()) {
                return Err(ConfigurationError::DanglingEdge {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            nodes,
            edges,
        })
    }
}

/// A distinct activity sequence with its frequency and the distribution of
/// a grouping attribute across its cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub activities: Vec<Activity>,
    pub count: usize,
    pub frequency: f64,
    pub distribution: DataSeries,
    pub id: u64,
}

impl Variant {
    pub fn new(
        activities: Vec<Activity>,
        count: usize,
        frequency: f64,
        distribution: DataSeries,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        activities.hash(&mut hasher);
        let id = hasher.finish();
        Self {
            activities,
            count,
            frequency,
            distribution,
            id,
        }
    }
}
