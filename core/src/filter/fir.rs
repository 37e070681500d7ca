use crate::filter::FilterDefinition;
use crate::math::ConvolutionHelper;
use crate::model::{
    ChannelSegment, ChannelSegmentType, Waveform, MIN_GAP_SAMPLE_COUNT, SAMPLE_RATE_TOLERANCE,
};
use crate::prelude::{StageError, StageResult};

/// Applies a FIR filter's feedforward coefficients to a channel segment.
pub struct LinearFirFilter;

impl LinearFirFilter {
    /// Merges the segment's waveforms into one series and convolves it with
    /// the definition's b coefficients. The output keeps the merged series'
    /// bounds, sample rate and length.
    pub fn filter(segment: &ChannelSegment, definition: &FilterDefinition) -> StageResult<Waveform> {
        if !definition.is_fir() {
            return Err(StageError::InvalidArgument(format!(
                "only FIR filtering is implemented, {} is {:?}",
                definition.name(),
                definition.design().filter_type
            )));
        }

        let first = segment.waveforms().first().ok_or_else(|| {
            StageError::InvalidArgument(format!(
                "channel segment {} has no waveforms to filter",
                segment.name()
            ))
        })?;
        let sample_rate = first.sample_rate();
        if segment
            .waveforms()
            .iter()
            .any(|w| (w.sample_rate() - sample_rate).abs() > SAMPLE_RATE_TOLERANCE)
        {
            return Err(StageError::InvalidArgument(format!(
                "channel segment {} mixes sample rates",
                segment.name()
            )));
        }
        if !definition.accepts_sample_rate(sample_rate) {
            let (low, high) = definition.sample_rate_window();
            return Err(StageError::InvalidArgument(format!(
                "sample rate {} outside filter {} window [{}, {}]",
                sample_rate,
                definition.name(),
                low,
                high
            )));
        }

        let merged = segment.merge_waveforms(SAMPLE_RATE_TOLERANCE, MIN_GAP_SAMPLE_COUNT)?;
        let waveform = match merged.waveforms() {
            [single] => single,
            many => {
                return Err(StageError::InvalidArgument(format!(
                    "channel segment {} is not contiguous: {} waveforms after merge",
                    segment.name(),
                    many.len()
                )))
            }
        };

        let values = ConvolutionHelper::causal(waveform.values(), definition.b_coefficients());
        Waveform::new(
            waveform.start_time(),
            waveform.end_time(),
            waveform.sample_rate(),
            values,
        )
    }

    /// Wraps [`LinearFirFilter::filter`] output in a new FILTER segment named
    /// `<segment>/<filter>`.
    pub fn filter_segment(
        segment: &ChannelSegment,
        definition: &FilterDefinition,
    ) -> StageResult<ChannelSegment> {
        let waveform = Self::filter(segment, definition)?;
        ChannelSegment::create(
            segment.channel_id(),
            format!("{}/{}", segment.name(), definition.name()),
            ChannelSegmentType::Filter,
            segment.start_time(),
            segment.end_time(),
            vec![waveform],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::definition::tests::design;
    use crate::filter::FilterType;
    use crate::model::time::from_epoch_seconds;
    use chrono::Duration;
    use uuid::Uuid;

    const COEFFICIENTS: [f64; 6] = [5.5, 4.4, 3.3, 2.2, 1.1, -6.6];
    const IMPULSE: [f64; 6] = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];

    fn definition(filter_type: FilterType) -> FilterDefinition {
        FilterDefinition::new(
            "Detection filter",
            "causal band pass",
            design(filter_type),
            vec![1.0],
            COEFFICIENTS.to_vec(),
        )
        .unwrap()
    }

    fn waveform(start_secs: f64, rate: f64) -> Waveform {
        Waveform::with_inferred_end_time(from_epoch_seconds(start_secs), rate, IMPULSE.to_vec())
            .unwrap()
    }

    fn segment(waveforms: Vec<Waveform>) -> ChannelSegment {
        let start = waveforms[0].start_time();
        let end = waveforms[waveforms.len() - 1].end_time();
        ChannelSegment::create(
            Uuid::new_v4(),
            "BHZ raw",
            ChannelSegmentType::Raw,
            start,
            end,
            waveforms,
        )
        .unwrap()
    }

    #[test]
    fn impulse_returns_coefficients() {
        let input = waveform(0.0, 20.0);
        let output =
            LinearFirFilter::filter(&segment(vec![input.clone()]), &definition(FilterType::FirHamming))
                .unwrap();
        assert_eq!(output.values(), &COEFFICIENTS);
        assert_eq!(output.start_time(), input.start_time());
        assert_eq!(output.end_time(), input.end_time());
        assert_eq!(output.sample_rate(), input.sample_rate());
        assert_eq!(output.sample_count(), input.sample_count());
    }

    #[test]
    fn merges_contiguous_waveforms_before_filtering() {
        let first = waveform(0.0, 20.0);
        let next_start = first.end_time() + Duration::milliseconds(50);
        let second =
            Waveform::with_inferred_end_time(next_start, 20.0, IMPULSE.to_vec()).unwrap();
        let segment = segment(vec![first.clone(), second.clone()]);

        let output = LinearFirFilter::filter(&segment, &definition(FilterType::FirHamming)).unwrap();
        let expected: Vec<f64> = COEFFICIENTS.iter().chain(COEFFICIENTS.iter()).copied().collect();
        assert_eq!(output.values(), expected.as_slice());
        assert_eq!(output.start_time(), first.start_time());
        assert_eq!(output.end_time(), second.end_time());
        assert_eq!(output.sample_rate(), 20.0);
        assert_eq!(output.sample_count(), segment.sample_count());
    }

    #[test]
    fn rejects_iir_definitions() {
        let result = LinearFirFilter::filter(
            &segment(vec![waveform(0.0, 20.0)]),
            &definition(FilterType::IirButterworth),
        );
        assert!(matches!(result, Err(StageError::InvalidArgument(_))));
    }

    #[test]
    fn rejects_sample_rate_outside_filter_window() {
        let result = LinearFirFilter::filter(
            &segment(vec![waveform(0.0, 40.0)]),
            &definition(FilterType::FirHamming),
        );
        assert!(matches!(result, Err(StageError::InvalidArgument(_))));
    }

    #[test]
    fn rejects_gapped_and_mixed_rate_segments() {
        let gapped = segment(vec![waveform(0.0, 20.0), waveform(1.0, 20.0)]);
        assert!(LinearFirFilter::filter(&gapped, &definition(FilterType::FirHamming)).is_err());

        let mixed = segment(vec![waveform(0.0, 20.0), waveform(1.0, 20.5)]);
        assert!(LinearFirFilter::filter(&mixed, &definition(FilterType::FirHamming)).is_err());
    }

    #[test]
    fn rejects_segment_without_waveforms() {
        let empty = ChannelSegment::create(
            Uuid::new_v4(),
            "BHZ raw",
            ChannelSegmentType::Raw,
            from_epoch_seconds(0.0),
            from_epoch_seconds(1.0),
            Vec::new(),
        )
        .unwrap();
        assert!(matches!(
            LinearFirFilter::filter(&empty, &definition(FilterType::FirHamming)),
            Err(StageError::InvalidArgument(_))
        ));
    }

    #[test]
    fn filter_segment_builds_new_filter_segment() {
        let input = segment(vec![waveform(0.0, 20.0)]);
        let output =
            LinearFirFilter::filter_segment(&input, &definition(FilterType::FirHamming)).unwrap();
        assert_ne!(output.id(), input.id());
        assert_eq!(output.channel_id(), input.channel_id());
        assert_eq!(output.name(), "BHZ raw/Detection filter");
        assert_eq!(output.segment_type(), ChannelSegmentType::Filter);
        assert_eq!(output.waveforms().len(), 1);
        assert_eq!(output.start_time(), input.start_time());
    }
}
