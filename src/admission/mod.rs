//! Admission decision gate
//!
//! Filters pod deletion requests and hands the interesting ones to the
//! membership removal protocol.

pub mod gate;
pub mod types;

pub use gate::{Gate, Remover};
pub use types::{Decision, DeletionRequest, Evaluation, Operation, Verdict};
