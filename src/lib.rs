//! Food price monitoring engine.
//!
//! Loads commodity-price, undernourishment and affordability tables once,
//! then answers the filter/aggregation queries behind each dashboard chart.
//! [`dispatcher::Dispatcher`] tracks one session's selection and recomputes
//! only the views a change invalidates.
pub mod config;
pub mod dataset;
pub mod dispatcher;
pub mod drilldown;
pub mod engine;
pub mod error;
pub mod loader;
pub mod output;
pub mod selection;
pub mod types;
pub mod util;

pub use config::{MonitorConfig, QuerySettings};
pub use dataset::Datasets;
pub use dispatcher::{Dispatcher, View, ViewData};
pub use drilldown::DrillDown;
pub use engine::Engine;
pub use error::{MonitorError, Result};
pub use selection::{CommodityFilter, Selection, SelectionChange, SelectionField, YearRange};
