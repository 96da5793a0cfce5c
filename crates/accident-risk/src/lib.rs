//! Accident risk prediction over a pre-trained classifier.
//!
//! [`features`] builds the model's input row from a handful of request fields,
//! [`risk`] turns the model's output plus [`history`] into a tiered
//! assessment, and [`router`] serves both over HTTP from a shared, read-only
//! [`context::RiskContext`].

pub mod artifacts;
pub mod classifier;
pub mod config;
pub mod context;
pub mod error;
pub mod features;
pub mod history;
pub mod risk;
pub mod router;
pub mod telemetry;

pub use context::RiskContext;
pub use router::risk_router;
