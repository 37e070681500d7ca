use chrono::{DateTime, Duration, Utc};

pub const NANOS_PER_SECOND: f64 = 1.0e9;

/// Converts fractional seconds to a nanosecond-resolution duration.
/// Sub-nanosecond remainders are truncated.
pub fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::nanoseconds((seconds * NANOS_PER_SECOND) as i64)
}

pub fn duration_seconds(duration: Duration) -> f64 {
    match duration.num_nanoseconds() {
        Some(nanos) => nanos as f64 / NANOS_PER_SECOND,
        None => duration.num_milliseconds() as f64 / 1.0e3,
    }
}

/// Offset of sample `index` from the first sample of a series sampled at
/// `sample_rate` Hz.
pub fn offset_for_sample(index: usize, sample_rate: f64) -> Duration {
    Duration::nanoseconds((index as f64 * NANOS_PER_SECOND / sample_rate) as i64)
}

pub fn from_epoch_seconds(seconds: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos((seconds * NANOS_PER_SECOND) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_offsets_truncate_to_nanoseconds() {
        assert_eq!(offset_for_sample(2, 2.0), Duration::seconds(1));
        assert_eq!(offset_for_sample(1, 3.0), Duration::nanoseconds(333_333_333));
        assert_eq!(offset_for_sample(0, 40.0), Duration::zero());
    }

    #[test]
    fn seconds_round_trip_through_durations() {
        let duration = seconds_to_duration(10.5);
        assert_eq!(duration, Duration::milliseconds(10_500));
        assert_eq!(duration_seconds(duration), 10.5);
        assert_eq!(
            from_epoch_seconds(10.5) - from_epoch_seconds(0.0),
            Duration::milliseconds(10_500)
        );
    }
}
