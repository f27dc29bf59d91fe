//! CLI library components for the RxNorm graph pipeline.

pub mod logging;
pub mod pipeline;
pub mod report;
