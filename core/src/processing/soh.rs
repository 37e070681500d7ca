use crate::prelude::{
    ProcessingStage, StageConfig, StageError, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::qc::{SohIntervalInterpreter, SohQcParameters};
use crate::telemetry::log::LogManager;

/// Stage turning a channel's SOH timeline into QC masks.
pub struct SohQcStage {
    config: Option<SohQcParameters>,
    logger: LogManager,
}

impl SohQcStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("soh-qc"),
        }
    }
}

impl Default for SohQcStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for SohQcStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        config.soh.validate()?;
        self.config = Some(config.soh.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let params = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;
        let timeline = input
            .soh_timeline
            .ok_or_else(|| StageError::MissingArgument("SOH timeline".into()))?;

        let subtype = timeline.subtype();
        if !params.should_create_masks(subtype) {
            self.logger
                .detail(&format!("mask creation disabled for {:?}", subtype));
            return Ok(StageOutput {
                metadata: StageMetadata {
                    mask_count: Some(0),
                    notes: vec![format!("{:?} masks disabled", subtype)],
                    ..Default::default()
                },
                ..Default::default()
            });
        }

        let timeline = timeline.with_merge_threshold(params.merge_threshold(subtype))?;
        let masks = SohIntervalInterpreter::interpret(&timeline)?;
        self.logger.record(&format!(
            "{:?} on channel {}: {} statuses, {} masks",
            subtype,
            timeline.channel_id(),
            timeline.statuses().len(),
            masks.len()
        ));

        let metadata = StageMetadata {
            mask_count: Some(masks.len()),
            notes: vec![format!("{} SOH masks", masks.len())],
            ..Default::default()
        };

        Ok(StageOutput {
            soh_masks: masks,
            metadata,
            ..Default::default()
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
