pub mod collector;
pub mod exporter;

pub use collector::GateMetrics;
pub use exporter::encode_text;
