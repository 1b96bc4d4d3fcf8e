//! # ORCHID Analytics
//!
//! Process mining analytics over the ORCHID organ donation referral log.
//!
//! This crate answers the analytical questions behind the ORCHID dashboard:
//! which paths referrals actually take, where they terminate, and how long
//! the steps between clinical activities take, disaggregated by patient and
//! process attributes.
//!
//! ## Architecture
//!
//! - [`models`]: attribute descriptors, filters and chart-shaped results
//! - [`mining`]: the engines (variants, distributions, DFG, de-jure, KPIs)
//! - [`service`]: the facade tying filtering, binning and the engines together
//! - [`config`]: service configuration
//!
//! ## Example
//!
//! ```no_run
//! use orchid_analytics::config::AnalyticsConfig;
//! use orchid_analytics::models::{DisaggregationAttribute, VariantListRequest};
//! use orchid_analytics::service::ProcessMiningService;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ProcessMiningService::new(&AnalyticsConfig::default())?;
//! let variants = service.get_variants(&VariantListRequest {
//!     filters: vec![],
//!     disaggregation_attribute: DisaggregationAttribute::categorical("gender"),
//! })?;
//! println!("{} variants", variants.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod mining;
pub mod models;
pub mod service;

pub use config::AnalyticsConfig;
pub use error::{ConfigurationError, LoadError};
pub use service::ProcessMiningService;
