//! Built-in report plugins

pub mod medlab;

pub use medlab::MedLabReport;
