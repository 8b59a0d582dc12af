pub mod metric_sender;
pub mod metrics;
