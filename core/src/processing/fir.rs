use crate::filter::{FilterDefinition, LinearFirFilter};
use crate::prelude::{
    ProcessingStage, StageConfig, StageError, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::telemetry::log::LogManager;

/// Stage producing a filtered channel segment.
pub struct FirFilterStage {
    definition: Option<FilterDefinition>,
    logger: LogManager,
}

impl FirFilterStage {
    pub fn new() -> Self {
        Self {
            definition: None,
            logger: LogManager::new("fir-filter"),
        }
    }
}

impl Default for FirFilterStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for FirFilterStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        let definition = config
            .filter
            .clone()
            .ok_or_else(|| StageError::MissingArgument("filter definition".into()))?;
        self.definition = Some(definition);
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let definition = self
            .definition
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;
        let segment = input
            .channel_segment
            .ok_or_else(|| StageError::MissingArgument("channel segment".into()))?;

        let filtered = LinearFirFilter::filter_segment(&segment, definition)?;
        let sample_count = filtered.sample_count();
        self.logger.record(&format!(
            "{} ({}): {} samples",
            filtered.name(),
            definition.description(),
            sample_count
        ));

        let metadata = StageMetadata {
            sample_count: Some(sample_count),
            notes: vec![format!("filtered by {}", definition.description())],
            ..Default::default()
        };

        Ok(StageOutput {
            filtered_segment: Some(filtered),
            metadata,
            ..Default::default()
        })
    }

    fn cleanup(&mut self) {
        self.definition = None;
    }
}
