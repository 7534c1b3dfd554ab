//! Error types shared by the loader, configuration and dispatcher.
//!
//! Query operations never fail: empty selections and stale regions are
//! ordinary inputs. Errors only come from reading files or from building
//! a selection that breaks an invariant.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A table loaded without a single usable row.
    #[error("dataset `{0}` contains no usable rows")]
    EmptyDataset(&'static str),

    #[error("invalid year range: {min} > {max}")]
    InvalidYearRange { min: i32, max: i32 },

    #[error("unknown country: {0}")]
    UnknownCountry(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
