use crate::model::{are_contiguous, ChannelSegment, Waveform};
use crate::prelude::{StageError, StageResult};
use crate::qc::RepeatedAmplitudeMask;
use chrono::{DateTime, Utc};

/// Finds runs of samples that stay within a fixed distance of the run's
/// first sample.
pub struct RepeatedAmplitudeDetector;

struct Run {
    reference: f64,
    start_time: DateTime<Utc>,
    last_time: DateTime<Utc>,
    length: usize,
}

impl RepeatedAmplitudeDetector {
    /// Runs continue across waveform boundaries only when the next waveform
    /// is contiguous with the previous one.
    pub fn detect(
        segment: &ChannelSegment,
        min_repeated_samples: usize,
        max_delta_from_start: f64,
    ) -> StageResult<Vec<RepeatedAmplitudeMask>> {
        if min_repeated_samples <= 1 {
            return Err(StageError::InvalidArgument(format!(
                "min repeated samples must be > 1, got {}",
                min_repeated_samples
            )));
        }
        if !(max_delta_from_start >= 0.0) {
            return Err(StageError::InvalidArgument(format!(
                "max delta from start must be >= 0.0, got {}",
                max_delta_from_start
            )));
        }

        let mut masks = Vec::new();
        let mut run: Option<Run> = None;
        let mut previous: Option<&Waveform> = None;

        for waveform in segment.waveforms().iter().filter(|w| !w.is_empty()) {
            if let Some(previous) = previous {
                if !are_contiguous(previous, waveform) {
                    close(run.take(), segment, min_repeated_samples, &mut masks)?;
                }
            }

            for (index, &value) in waveform.values().iter().enumerate() {
                let time = waveform.sample_time(index);
                match run.as_mut() {
                    Some(open) if (value - open.reference).abs() <= max_delta_from_start => {
                        open.last_time = time;
                        open.length += 1;
                    }
                    _ => {
                        close(run.take(), segment, min_repeated_samples, &mut masks)?;
                        run = Some(Run {
                            reference: value,
                            start_time: time,
                            last_time: time,
                            length: 1,
                        });
                    }
                }
            }
            previous = Some(waveform);
        }

        close(run, segment, min_repeated_samples, &mut masks)?;
        Ok(masks)
    }
}

fn close(
    run: Option<Run>,
    segment: &ChannelSegment,
    min_repeated_samples: usize,
    masks: &mut Vec<RepeatedAmplitudeMask>,
) -> StageResult<()> {
    if let Some(run) = run {
        if run.length >= min_repeated_samples {
            masks.push(RepeatedAmplitudeMask::new(
                run.start_time,
                run.last_time,
                segment.channel_id(),
                segment.id(),
            )?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time::from_epoch_seconds;
    use crate::model::ChannelSegmentType;
    use uuid::Uuid;

    const RATE: f64 = 2.0;

    fn waveform(start_secs: f64, values: Vec<f64>) -> Waveform {
        Waveform::with_inferred_end_time(from_epoch_seconds(start_secs), RATE, values).unwrap()
    }

    fn segment(waveforms: Vec<Waveform>) -> ChannelSegment {
        let end = waveforms
            .iter()
            .map(Waveform::end_time)
            .max()
            .unwrap_or_else(|| from_epoch_seconds(1.0));
        ChannelSegment::create(
            Uuid::new_v4(),
            "BHZ raw",
            ChannelSegmentType::Raw,
            from_epoch_seconds(0.0),
            end,
            waveforms,
        )
        .unwrap()
    }

    fn two_runs() -> Vec<f64> {
        vec![
            0.0, 0.0, 0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 80.0, 80.0, 0.0, 1.0,
            2.0, 3.0, 4.0, 5.0, 6.0, 7.0,
        ]
    }

    fn bounds(masks: &[RepeatedAmplitudeMask]) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        masks
            .iter()
            .map(|mask| (mask.start_time(), mask.end_time()))
            .collect()
    }

    #[test]
    fn slow_drift_within_tolerance_masks_whole_waveform() {
        let values = (0..21).map(|i| i as f64 / 25.0).collect();
        let segment = segment(vec![waveform(0.0, values)]);

        let masks = RepeatedAmplitudeDetector::detect(&segment, 3, 1.0).unwrap();
        assert_eq!(
            bounds(&masks),
            vec![(from_epoch_seconds(0.0), from_epoch_seconds(10.0))]
        );
        assert_eq!(masks[0].channel_id(), segment.channel_id());
        assert_eq!(masks[0].channel_segment_id(), segment.id());
    }

    #[test]
    fn tight_tolerance_finds_nothing() {
        let values = (0..21).map(|i| i as f64 / 25.0).collect();
        let segment = segment(vec![waveform(0.0, values)]);
        let masks = RepeatedAmplitudeDetector::detect(&segment, 3, 0.001).unwrap();
        assert!(masks.is_empty());
    }

    #[test]
    fn finds_two_separate_runs() {
        let segment = segment(vec![waveform(0.0, two_runs())]);
        let masks = RepeatedAmplitudeDetector::detect(&segment, 3, 0.5).unwrap();
        assert_eq!(
            bounds(&masks),
            vec![
                (from_epoch_seconds(0.0), from_epoch_seconds(1.0)),
                (from_epoch_seconds(5.0), from_epoch_seconds(6.0)),
            ]
        );
    }

    #[test]
    fn scans_every_waveform_of_the_segment() {
        let segment = segment(vec![waveform(0.0, two_runs()), waveform(10.5, two_runs())]);

        let masks = RepeatedAmplitudeDetector::detect(&segment, 2, 1.0e-7).unwrap();
        let expected: Vec<_> = [0usize, 10, 21, 31]
            .iter()
            .map(|&first| {
                (
                    from_epoch_seconds(first as f64 / RATE),
                    from_epoch_seconds((first + 2) as f64 / RATE),
                )
            })
            .collect();
        assert_eq!(bounds(&masks), expected);

        let none = RepeatedAmplitudeDetector::detect(&segment, 4, 1.0e-7).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn run_continues_across_contiguous_boundary() {
        let contiguous = segment(vec![
            waveform(0.0, vec![3.0, 3.0]),
            waveform(1.0, vec![3.0, 3.0]),
        ]);
        let masks = RepeatedAmplitudeDetector::detect(&contiguous, 4, 0.0).unwrap();
        assert_eq!(
            bounds(&masks),
            vec![(from_epoch_seconds(0.0), from_epoch_seconds(1.5))]
        );

        let gapped = segment(vec![
            waveform(0.0, vec![3.0, 3.0]),
            waveform(2.0, vec![3.0, 3.0]),
        ]);
        let masks = RepeatedAmplitudeDetector::detect(&gapped, 4, 0.0).unwrap();
        assert!(masks.is_empty());
    }

    #[test]
    fn empty_segment_yields_nothing() {
        let masks = RepeatedAmplitudeDetector::detect(&segment(Vec::new()), 2, 0.0).unwrap();
        assert!(masks.is_empty());
    }

    #[test]
    fn rejects_out_of_domain_parameters() {
        let segment = segment(vec![waveform(0.0, two_runs())]);
        assert!(matches!(
            RepeatedAmplitudeDetector::detect(&segment, 1, 0.5),
            Err(StageError::InvalidArgument(_))
        ));
        assert!(matches!(
            RepeatedAmplitudeDetector::detect(&segment, 3, -0.1),
            Err(StageError::InvalidArgument(_))
        ));
        assert!(RepeatedAmplitudeDetector::detect(&segment, 3, f64::NAN).is_err());
    }
}
