//! The process mining engines.

pub mod binning;
pub mod dejure;
pub mod dfg;
pub mod distribution;
pub mod event_log;
pub mod filter;
pub mod kpi;
pub mod variants;

pub use binning::{bin_optional, create_bins, Grouping};
pub use event_log::{Activity, AttributeValue, Event, EventLog};
pub use filter::filter_log;
