//! Waveform signal-analysis core for the seismic monitoring pipeline.
//!
//! The crate holds the pieces of the waveform QC and enhancement chain that
//! compute over samples: state-of-health interval interpretation, repeated
//! amplitude detection and causal FIR filtering. Each algorithm is a pure
//! function over the shared [`model`] types; [`processing`] wraps them as
//! stages for the orchestration layer.

pub mod filter;
pub mod math;
pub mod model;
pub mod prelude;
pub mod processing;
pub mod qc;
pub mod telemetry;

pub use prelude::{ProcessingStage, StageConfig, StageError, StageInput, StageOutput, StageResult};
