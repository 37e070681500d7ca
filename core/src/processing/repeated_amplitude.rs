use crate::prelude::{
    ProcessingStage, StageConfig, StageError, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::qc::{merge_repeated_amplitude_masks, RepeatedAmplitudeDetector, RepeatedAmplitudeParameters};
use crate::telemetry::log::LogManager;

/// Stage flagging runs of repeated amplitudes in a channel segment.
pub struct RepeatedAmplitudeStage {
    config: Option<RepeatedAmplitudeParameters>,
    logger: LogManager,
}

impl RepeatedAmplitudeStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("repeated-amplitude"),
        }
    }
}

impl Default for RepeatedAmplitudeStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for RepeatedAmplitudeStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        config.repeated_amplitude.validate()?;
        self.config = Some(config.repeated_amplitude.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let params = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;
        let segment = input
            .channel_segment
            .ok_or_else(|| StageError::MissingArgument("channel segment".into()))?;

        let detected = RepeatedAmplitudeDetector::detect(
            &segment,
            params.min_repeated_samples,
            params.max_delta_from_start,
        )?;
        let detected_count = detected.len();
        let masks = merge_repeated_amplitude_masks(detected, params.mask_merge_threshold());
        self.logger.record(&format!(
            "segment {}: {} runs, {} masks after merge",
            segment.name(),
            detected_count,
            masks.len()
        ));

        let metadata = StageMetadata {
            mask_count: Some(masks.len()),
            sample_count: Some(segment.sample_count()),
            notes: vec![format!("{} repeated amplitude masks", masks.len())],
        };

        Ok(StageOutput {
            repeated_amplitude_masks: masks,
            metadata,
            ..Default::default()
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
