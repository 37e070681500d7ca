use crate::filter::FilterDefinition;
use crate::model::ChannelSegment;
use crate::qc::{
    RepeatedAmplitudeMask, RepeatedAmplitudeParameters, SohQcMask, SohQcParameters, SohTimeline,
};

/// Shared configuration for each processing stage.
#[derive(Debug, Clone, Default)]
pub struct StageConfig {
    pub soh: SohQcParameters,
    pub repeated_amplitude: RepeatedAmplitudeParameters,
    pub filter: Option<FilterDefinition>,
}

/// Input payload for a processing stage. Each stage reads the field it needs
/// and reports a missing one as [`StageError::MissingArgument`].
#[derive(Debug, Clone, Default)]
pub struct StageInput {
    pub channel_segment: Option<ChannelSegment>,
    pub soh_timeline: Option<SohTimeline>,
}

/// Output produced by each stage.
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub soh_masks: Vec<SohQcMask>,
    pub repeated_amplitude_masks: Vec<RepeatedAmplitudeMask>,
    pub filtered_segment: Option<ChannelSegment>,
    pub metadata: StageMetadata,
}

/// Metadata used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub mask_count: Option<usize>,
    pub sample_count: Option<usize>,
    pub notes: Vec<String>,
}

/// Common error type for stage execution and model construction.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error("missing argument: {0}")]
    MissingArgument(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing object-oriented signal-processing stages.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()>;
    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput>;
    fn cleanup(&mut self);
}
