use crate::model::time::offset_for_sample;
use crate::prelude::{StageError, StageResult};
use chrono::{DateTime, Utc};

/// Contiguous, uniformly sampled run of samples.
///
/// `end_time` is the instant of the last sample, so a waveform with a single
/// sample starts and ends at the same instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    sample_rate: f64,
    values: Vec<f64>,
}

impl Waveform {
    /// Creates a waveform with an explicit end time.
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        sample_rate: f64,
        values: Vec<f64>,
    ) -> StageResult<Self> {
        validate_sample_rate(sample_rate)?;
        if end_time < start_time {
            return Err(StageError::InvalidArgument(format!(
                "waveform end time {} precedes start time {}",
                end_time, start_time
            )));
        }

        Ok(Self {
            start_time,
            end_time,
            sample_rate,
            values,
        })
    }

    /// Creates a waveform whose end time is the time of its last sample.
    pub fn with_inferred_end_time(
        start_time: DateTime<Utc>,
        sample_rate: f64,
        values: Vec<f64>,
    ) -> StageResult<Self> {
        validate_sample_rate(sample_rate)?;
        let end_time = start_time + offset_for_sample(values.len().saturating_sub(1), sample_rate);
        Self::new(start_time, end_time, sample_rate, values)
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn sample_count(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_sample(&self) -> Option<f64> {
        self.values.first().copied()
    }

    /// Time of the sample at `index`, which must lie in `[0, sample_count - 1]`.
    pub fn time_for_sample(&self, index: usize) -> StageResult<DateTime<Utc>> {
        if index >= self.values.len() {
            return Err(StageError::InvalidArgument(format!(
                "sample index {} outside waveform of {} samples",
                index,
                self.values.len()
            )));
        }
        Ok(self.sample_time(index))
    }

    pub(crate) fn sample_time(&self, index: usize) -> DateTime<Utc> {
        self.start_time + offset_for_sample(index, self.sample_rate)
    }

    /// Joins `next` onto the end of this waveform, keeping this waveform's
    /// start time and sample rate.
    pub fn concat(&self, next: &Waveform) -> StageResult<Waveform> {
        let mut values = Vec::with_capacity(self.values.len() + next.values.len());
        values.extend_from_slice(&self.values);
        values.extend_from_slice(&next.values);
        Waveform::new(self.start_time, next.end_time, self.sample_rate, values)
    }
}

fn validate_sample_rate(sample_rate: f64) -> StageResult<()> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(StageError::InvalidArgument(format!(
            "waveform sample rate must be positive, got {}",
            sample_rate
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time::from_epoch_seconds;
    use chrono::Duration;

    #[test]
    fn inferred_end_time_lands_on_last_sample() {
        let waveform =
            Waveform::with_inferred_end_time(from_epoch_seconds(0.0), 20.0, vec![0.0; 6]).unwrap();
        assert_eq!(
            waveform.end_time() - waveform.start_time(),
            Duration::milliseconds(250)
        );
        assert_eq!(waveform.sample_count(), 6);
    }

    #[test]
    fn empty_waveform_ends_where_it_starts() {
        let start = from_epoch_seconds(5.0);
        let waveform = Waveform::with_inferred_end_time(start, 40.0, Vec::new()).unwrap();
        assert_eq!(waveform.end_time(), start);
        assert!(waveform.is_empty());
        assert_eq!(waveform.first_sample(), None);
    }

    #[test]
    fn rejects_non_positive_sample_rate() {
        let start = from_epoch_seconds(0.0);
        assert!(matches!(
            Waveform::with_inferred_end_time(start, 0.0, vec![1.0]),
            Err(StageError::InvalidArgument(_))
        ));
        assert!(Waveform::new(start, start, f64::NAN, vec![1.0]).is_err());
    }

    #[test]
    fn rejects_end_before_start() {
        let result = Waveform::new(
            from_epoch_seconds(10.0),
            from_epoch_seconds(9.0),
            1.0,
            vec![1.0, 2.0],
        );
        assert!(matches!(result, Err(StageError::InvalidArgument(_))));
    }

    #[test]
    fn time_for_sample_checks_bounds() {
        let waveform =
            Waveform::with_inferred_end_time(from_epoch_seconds(0.0), 2.0, vec![0.0; 3]).unwrap();
        assert_eq!(waveform.time_for_sample(2).unwrap(), from_epoch_seconds(1.0));
        assert!(waveform.time_for_sample(3).is_err());
    }

    #[test]
    fn concat_keeps_first_start_and_last_end() {
        let first =
            Waveform::with_inferred_end_time(from_epoch_seconds(0.0), 10.0, vec![1.0, 2.0])
                .unwrap();
        let second =
            Waveform::with_inferred_end_time(from_epoch_seconds(0.2), 10.0, vec![3.0]).unwrap();
        let joined = first.concat(&second).unwrap();
        assert_eq!(joined.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(joined.start_time(), first.start_time());
        assert_eq!(joined.end_time(), second.end_time());
        assert_eq!(joined.sample_rate(), 10.0);
    }
}
