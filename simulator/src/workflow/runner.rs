use crate::generator::profile::ChannelData;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::warn;
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;
use wavecore::model::ChannelSegment;
use wavecore::prelude::{ProcessingStage, StageConfig, StageInput};
use wavecore::processing::{FirFilterStage, RepeatedAmplitudeStage, SohQcStage};
use wavecore::qc::{RepeatedAmplitudeMask, SohQcMask};
use wavecore::telemetry::MetricsRecorder;

pub struct ChannelResult {
    pub index: usize,
    pub channel_id: Uuid,
    pub soh_masks: Vec<SohQcMask>,
    pub repeated_amplitude_masks: Vec<RepeatedAmplitudeMask>,
    pub filtered_segment: Option<ChannelSegment>,
    pub notes: Vec<String>,
}

/// Result of one channel job, successful or not.
pub struct ChannelOutcome {
    pub index: usize,
    pub result: anyhow::Result<ChannelResult>,
}

#[derive(Clone)]
pub struct Runner {
    stage_config: StageConfig,
    metrics: Arc<MetricsRecorder>,
}

impl Runner {
    pub fn new(config: &WorkflowConfig) -> anyhow::Result<Self> {
        let stage_config = config
            .to_stage_config()
            .context("building stage configuration")?;
        Ok(Self {
            stage_config,
            metrics: Arc::new(MetricsRecorder::new()),
        })
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    pub fn execute(&self, channel: &ChannelData) -> anyhow::Result<ChannelResult> {
        let mut soh_stage = SohQcStage::new();
        soh_stage
            .initialize(&self.stage_config)
            .context("initializing SOH stage")?;
        let soh_output = soh_stage
            .execute(StageInput {
                soh_timeline: Some(channel.timeline.clone()),
                ..Default::default()
            })
            .context("executing SOH stage")?;
        soh_stage.cleanup();

        let mut amplitude_stage = RepeatedAmplitudeStage::new();
        amplitude_stage
            .initialize(&self.stage_config)
            .context("initializing repeated amplitude stage")?;
        let amplitude_output = amplitude_stage
            .execute(StageInput {
                channel_segment: Some(channel.segment.clone()),
                ..Default::default()
            })
            .context("executing repeated amplitude stage")?;
        amplitude_stage.cleanup();

        let mut notes = soh_output.metadata.notes;
        notes.extend(amplitude_output.metadata.notes);

        let filtered_segment = if self.stage_config.filter.is_some() {
            match self.filter(&channel.segment) {
                Ok((segment, filter_notes)) => {
                    notes.extend(filter_notes);
                    segment
                }
                Err(err) => {
                    warn!("channel {}: {:#}", channel.index, err);
                    notes.push(format!("filter skipped: {:#}", err));
                    None
                }
            }
        } else {
            None
        };

        self.metrics.record_masks(
            soh_output.soh_masks.len() + amplitude_output.repeated_amplitude_masks.len(),
        );

        Ok(ChannelResult {
            index: channel.index,
            channel_id: channel.segment.channel_id(),
            soh_masks: soh_output.soh_masks,
            repeated_amplitude_masks: amplitude_output.repeated_amplitude_masks,
            filtered_segment,
            notes,
        })
    }

    fn filter(
        &self,
        segment: &ChannelSegment,
    ) -> anyhow::Result<(Option<ChannelSegment>, Vec<String>)> {
        let mut filter_stage = FirFilterStage::new();
        filter_stage
            .initialize(&self.stage_config)
            .context("initializing FIR filter stage")?;
        let filter_output = filter_stage
            .execute(StageInput {
                channel_segment: Some(segment.clone()),
                ..Default::default()
            })
            .context("executing FIR filter stage")?;
        filter_stage.cleanup();
        Ok((filter_output.filtered_segment, filter_output.metadata.notes))
    }

    /// Runs every channel as a blocking job and returns outcomes ordered by
    /// channel index.
    pub async fn execute_all(&self, channels: Vec<ChannelData>) -> Vec<ChannelOutcome> {
        let mut jobs = JoinSet::new();
        for channel in channels {
            let runner = self.clone();
            jobs.spawn_blocking(move || ChannelOutcome {
                index: channel.index,
                result: runner
                    .execute(&channel)
                    .with_context(|| format!("processing channel {}", channel.index)),
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok(outcome) => {
                    match &outcome.result {
                        Ok(_) => self.metrics.record_processed(),
                        Err(err) => {
                            warn!("{:#}", err);
                            self.metrics.record_error();
                        }
                    }
                    outcomes.push(outcome);
                }
                Err(err) => {
                    warn!("channel job failed to complete: {}", err);
                    self.metrics.record_error();
                }
            }
        }

        outcomes.sort_by_key(|outcome| outcome.index);
        outcomes
    }
}
