use crate::workflow::runner::{ChannelOutcome, ChannelResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use wavecore::qc::{RepeatedAmplitudeMask, SohQcMask};
use wavecore::telemetry::MetricsSnapshot;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QcReport {
    pub generated_at: DateTime<Utc>,
    pub metrics: MetricsSnapshot,
    pub channels: Vec<ChannelReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelReport {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub soh_masks: Vec<SohQcMask>,
    pub repeated_amplitude_masks: Vec<RepeatedAmplitudeMask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_segment: Option<FilteredSummary>,
    pub notes: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredSummary {
    pub segment_id: Uuid,
    pub name: String,
    pub sample_count: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl QcReport {
    pub fn new(outcomes: Vec<ChannelOutcome>, metrics: MetricsSnapshot) -> Self {
        Self {
            generated_at: Utc::now(),
            metrics,
            channels: outcomes.into_iter().map(ChannelReport::from).collect(),
        }
    }

    pub fn failed_channels(&self) -> usize {
        self.channels.iter().filter(|c| c.error.is_some()).count()
    }
}

impl From<ChannelOutcome> for ChannelReport {
    fn from(outcome: ChannelOutcome) -> Self {
        match outcome.result {
            Ok(result) => ChannelReport::from(result),
            Err(err) => ChannelReport {
                index: outcome.index,
                channel_id: None,
                error: Some(format!("{:#}", err)),
                soh_masks: Vec::new(),
                repeated_amplitude_masks: Vec::new(),
                filtered_segment: None,
                notes: Vec::new(),
            },
        }
    }
}

impl From<ChannelResult> for ChannelReport {
    fn from(result: ChannelResult) -> Self {
        let filtered_segment = result.filtered_segment.map(|segment| FilteredSummary {
            segment_id: segment.id(),
            name: segment.name().to_string(),
            sample_count: segment.sample_count(),
            start_time: segment.start_time(),
            end_time: segment.end_time(),
        });

        ChannelReport {
            index: result.index,
            channel_id: Some(result.channel_id),
            error: None,
            soh_masks: result.soh_masks,
            repeated_amplitude_masks: result.repeated_amplitude_masks,
            filtered_segment,
            notes: result.notes,
        }
    }
}
