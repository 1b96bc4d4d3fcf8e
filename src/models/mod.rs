//! Data entities shared across the analytics engines.

pub mod attributes;
pub mod charts;
pub mod filters;
pub mod requests;

pub use attributes::{
    AttributeType, CategoricalAttribute, DisaggregationAttribute, NumericalAttribute,
    PatientAttribute,
};
pub use charts::{DataItem, DataSeries, Edge, Graph, MultiDataSeries, Node, Variant};
pub use filters::{AttributeFilter, CategoricalFilter, FilterOperator, NumericalFilter};
pub use requests::{
    DejureGraphRequest, DejureStatistic, DfgRequest, DistributionRequest, KpiRequest, KpiType,
    VariantListRequest,
};
