use crate::model::time::duration_seconds;
use crate::model::Waveform;
use crate::prelude::{StageError, StageResult};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Largest sample-rate difference, in Hz, between waveforms treated as one series.
pub const SAMPLE_RATE_TOLERANCE: f64 = 1.0e-7;
/// Gaps at or below this many samples are overlaps, not continuations.
pub const MIN_GAP_SAMPLE_COUNT: f64 = 0.5;
/// Gaps at or above this many samples leave at least one sample missing.
const MAX_GAP_SAMPLE_COUNT: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSegmentType {
    Acquired,
    Raw,
    DetectionBeam,
    FkBeam,
    Filter,
    Derived,
}

/// Named, typed aggregate of time-ordered waveforms for one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSegment {
    id: Uuid,
    channel_id: Uuid,
    name: String,
    segment_type: ChannelSegmentType,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    waveforms: Vec<Waveform>,
}

impl ChannelSegment {
    /// Creates a segment with a freshly assigned id.
    pub fn create(
        channel_id: Uuid,
        name: impl Into<String>,
        segment_type: ChannelSegmentType,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        waveforms: Vec<Waveform>,
    ) -> StageResult<Self> {
        Self::with_id(
            Uuid::new_v4(),
            channel_id,
            name,
            segment_type,
            start_time,
            end_time,
            waveforms,
        )
    }

    /// Rebuilds a segment that already has an identity.
    pub fn with_id(
        id: Uuid,
        channel_id: Uuid,
        name: impl Into<String>,
        segment_type: ChannelSegmentType,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        mut waveforms: Vec<Waveform>,
    ) -> StageResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StageError::InvalidArgument(
                "channel segment name must not be blank".to_string(),
            ));
        }
        if start_time >= end_time {
            return Err(StageError::InvalidArgument(format!(
                "channel segment start {} must precede end {}",
                start_time, end_time
            )));
        }

        waveforms.sort_by_key(Waveform::start_time);
        for waveform in &waveforms {
            if waveform.start_time() < start_time || waveform.end_time() > end_time {
                return Err(StageError::InvalidArgument(format!(
                    "waveform [{}, {}] lies outside channel segment [{}, {}]",
                    waveform.start_time(),
                    waveform.end_time(),
                    start_time,
                    end_time
                )));
            }
        }
        for pair in waveforms.windows(2) {
            if pair[1].start_time() <= pair[0].end_time() {
                return Err(StageError::InvalidArgument(format!(
                    "waveform starting {} overlaps waveform ending {}",
                    pair[1].start_time(),
                    pair[0].end_time()
                )));
            }
        }

        Ok(Self {
            id,
            channel_id,
            name,
            segment_type,
            start_time,
            end_time,
            waveforms,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn channel_id(&self) -> Uuid {
        self.channel_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn segment_type(&self) -> ChannelSegmentType {
        self.segment_type
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn waveforms(&self) -> &[Waveform] {
        &self.waveforms
    }

    pub fn sample_count(&self) -> usize {
        self.waveforms.iter().map(Waveform::sample_count).sum()
    }

    /// Returns a copy of this segment in which every chain of contiguous
    /// waveforms is concatenated into a single waveform.
    ///
    /// Two neighbours join when their rates differ by at most
    /// `sample_rate_tolerance` and the gap between them, in samples at the
    /// mean rate, lies strictly between `min_gap_sample_count` and 1.5.
    pub fn merge_waveforms(
        &self,
        sample_rate_tolerance: f64,
        min_gap_sample_count: f64,
    ) -> StageResult<ChannelSegment> {
        let mut merged: Vec<Waveform> = Vec::with_capacity(self.waveforms.len());
        for next in &self.waveforms {
            match merged.last_mut() {
                Some(previous)
                    if joins(previous, next, sample_rate_tolerance, min_gap_sample_count) =>
                {
                    *previous = previous.concat(next)?;
                }
                _ => merged.push(next.clone()),
            }
        }

        Self::with_id(
            self.id,
            self.channel_id,
            self.name.clone(),
            self.segment_type,
            self.start_time,
            self.end_time,
            merged,
        )
    }
}

/// Whether `next` continues `previous` as one sample series: same rate and
/// its first sample one sample period after the last sample of `previous`.
pub fn are_contiguous(previous: &Waveform, next: &Waveform) -> bool {
    joins(previous, next, SAMPLE_RATE_TOLERANCE, MIN_GAP_SAMPLE_COUNT)
}

fn joins(
    previous: &Waveform,
    next: &Waveform,
    sample_rate_tolerance: f64,
    min_gap_sample_count: f64,
) -> bool {
    if (previous.sample_rate() - next.sample_rate()).abs() > sample_rate_tolerance {
        return false;
    }
    let gap = gap_sample_count(previous, next);
    gap > min_gap_sample_count && gap < MAX_GAP_SAMPLE_COUNT
}

fn gap_sample_count(previous: &Waveform, next: &Waveform) -> f64 {
    let mean_rate = (previous.sample_rate() + next.sample_rate()) / 2.0;
    mean_rate * duration_seconds(next.start_time() - previous.end_time())
}
