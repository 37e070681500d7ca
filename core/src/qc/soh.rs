use crate::prelude::{StageError, StageResult};
use crate::qc::merge::should_bridge;
use crate::qc::{ChannelSohSubtype, QcMaskType, SohQcMask};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusState {
    Set,
    Unset,
    Missing,
}

impl From<bool> for StatusState {
    fn from(value: bool) -> Self {
        if value {
            StatusState::Set
        } else {
            StatusState::Unset
        }
    }
}

/// One interval of a channel's SOH timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    state: StatusState,
}

impl Status {
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        state: StatusState,
    ) -> StageResult<Self> {
        if start_time >= end_time {
            return Err(StageError::InvalidArgument(format!(
                "status start {} must precede end {}",
                start_time, end_time
            )));
        }
        Ok(Self {
            start_time,
            end_time,
            state,
        })
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn state(&self) -> StatusState {
        self.state
    }
}

/// Gap-free sequence of SOH statuses for one channel and one subtype.
#[derive(Debug, Clone, PartialEq)]
pub struct SohTimeline {
    channel_id: Uuid,
    mask_type: QcMaskType,
    subtype: ChannelSohSubtype,
    statuses: Vec<Status>,
    merge_threshold: Duration,
}

impl SohTimeline {
    pub fn new(
        channel_id: Uuid,
        mask_type: QcMaskType,
        subtype: ChannelSohSubtype,
        statuses: Vec<Status>,
        merge_threshold: Duration,
    ) -> StageResult<Self> {
        if subtype.mask_type() != mask_type {
            return Err(StageError::InvalidArgument(format!(
                "mask type {:?} and subtype {:?} are not a valid combination",
                mask_type, subtype
            )));
        }
        if merge_threshold < Duration::zero() {
            return Err(StageError::InvalidArgument(
                "SOH timeline merge threshold must not be negative".to_string(),
            ));
        }
        for pair in statuses.windows(2) {
            if pair[0].end_time != pair[1].start_time {
                return Err(StageError::InvalidArgument(format!(
                    "SOH statuses must be contiguous: status ending {} followed by status starting {}",
                    pair[0].end_time, pair[1].start_time
                )));
            }
        }

        Ok(Self {
            channel_id,
            mask_type,
            subtype,
            statuses,
            merge_threshold,
        })
    }

    /// Starts a timeline from boolean status reports. The mask type follows
    /// from `subtype`.
    pub fn builder(
        channel_id: Uuid,
        subtype: ChannelSohSubtype,
        first_start: DateTime<Utc>,
        first_end: DateTime<Utc>,
        first_state: bool,
        adjacent_threshold: Duration,
    ) -> StageResult<SohTimelineBuilder> {
        if adjacent_threshold < Duration::zero() {
            return Err(StageError::InvalidArgument(
                "SOH adjacent threshold must not be negative".to_string(),
            ));
        }
        let first = Status::new(first_start, first_end, first_state.into())?;
        let mut reports = BTreeMap::new();
        reports.insert(first_start, first);

        Ok(SohTimelineBuilder {
            channel_id,
            subtype,
            reports,
            adjacent_threshold,
            merge_threshold: Duration::zero(),
        })
    }

    pub fn channel_id(&self) -> Uuid {
        self.channel_id
    }

    pub fn mask_type(&self) -> QcMaskType {
        self.mask_type
    }

    pub fn subtype(&self) -> ChannelSohSubtype {
        self.subtype
    }

    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    pub fn merge_threshold(&self) -> Duration {
        self.merge_threshold
    }

    /// Same timeline with a different merge threshold.
    pub fn with_merge_threshold(&self, merge_threshold: Duration) -> StageResult<SohTimeline> {
        Self::new(
            self.channel_id,
            self.mask_type,
            self.subtype,
            self.statuses.clone(),
            merge_threshold,
        )
    }
}

/// Collects status reports in any order and produces a [`SohTimeline`].
#[derive(Debug, Clone)]
pub struct SohTimelineBuilder {
    channel_id: Uuid,
    subtype: ChannelSohSubtype,
    reports: BTreeMap<DateTime<Utc>, Status>,
    adjacent_threshold: Duration,
    merge_threshold: Duration,
}

impl SohTimelineBuilder {
    pub fn add_status_change(
        &mut self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        state: bool,
    ) -> StageResult<()> {
        let status = Status::new(start_time, end_time, state.into())?;
        match self.reports.get(&start_time) {
            Some(existing) if *existing != status => Err(StageError::InvalidArgument(format!(
                "two different SOH statuses reported for {}",
                start_time
            ))),
            _ => {
                self.reports.insert(start_time, status);
                Ok(())
            }
        }
    }

    pub fn merge_threshold(mut self, merge_threshold: Duration) -> Self {
        self.merge_threshold = merge_threshold;
        self
    }

    /// Reports further apart than the adjacent threshold get a MISSING status
    /// between them. Nearer reports are joined edge to edge and repeated
    /// states collapse into one status. A report nested inside a status of
    /// another state splits it, and the outer state resumes after it.
    pub fn build(self) -> StageResult<SohTimeline> {
        let mut reports = self.reports.into_values();
        let mut statuses = Vec::new();

        if let Some(mut current) = reports.next() {
            for next in reports {
                if next.start_time - current.end_time > self.adjacent_threshold {
                    push_status(&mut statuses, current);
                    push_status(&mut statuses, Status {
                        start_time: current.end_time,
                        end_time: next.start_time,
                        state: StatusState::Missing,
                    });
                    current = next;
                } else if next.state != current.state {
                    let resumed = (next.end_time < current.end_time).then(|| Status {
                        start_time: next.end_time,
                        end_time: current.end_time,
                        state: current.state,
                    });
                    current.end_time = next.start_time;
                    if current.start_time < current.end_time {
                        push_status(&mut statuses, current);
                    }
                    current = next;
                    if let Some(rest) = resumed {
                        push_status(&mut statuses, current);
                        current = rest;
                    }
                } else if next.end_time > current.end_time {
                    current.end_time = next.end_time;
                }
            }
            push_status(&mut statuses, current);
        }

        SohTimeline::new(
            self.channel_id,
            self.subtype.mask_type(),
            self.subtype,
            statuses,
            self.merge_threshold,
        )
    }
}

fn push_status(statuses: &mut Vec<Status>, status: Status) {
    match statuses.last_mut() {
        Some(last) if last.state == status.state && last.end_time == status.start_time => {
            last.end_time = status.end_time;
        }
        _ => statuses.push(status),
    }
}

/// Turns a SOH timeline into mask intervals.
pub struct SohIntervalInterpreter;

impl SohIntervalInterpreter {
    /// One mask per run of SET statuses. MISSING statuses are skipped over;
    /// runs split by UNSET are joined only when the gap passes
    /// [`should_bridge`] against the timeline's merge threshold.
    pub fn interpret(timeline: &SohTimeline) -> StageResult<Vec<SohQcMask>> {
        let mut masks = Vec::new();
        let mut open: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
        let mut unset_since_open = false;

        for status in timeline.statuses() {
            match status.state {
                StatusState::Missing => {}
                StatusState::Unset => unset_since_open = open.is_some(),
                StatusState::Set => {
                    open = match open {
                        None => Some((status.start_time, status.end_time)),
                        Some((start, end))
                            if !unset_since_open
                                || should_bridge(
                                    status.start_time - end,
                                    timeline.merge_threshold,
                                ) =>
                        {
                            Some((start, status.end_time))
                        }
                        Some((start, end)) => {
                            masks.push(mask_for(timeline, start, end)?);
                            Some((status.start_time, status.end_time))
                        }
                    };
                    unset_since_open = false;
                }
            }
        }

        if let Some((start, end)) = open {
            masks.push(mask_for(timeline, start, end)?);
        }
        Ok(masks)
    }
}

fn mask_for(
    timeline: &SohTimeline,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> StageResult<SohQcMask> {
    SohQcMask::new(timeline.mask_type, timeline.subtype, start, end)
}
