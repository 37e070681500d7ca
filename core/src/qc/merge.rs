use crate::qc::RepeatedAmplitudeMask;
use chrono::Duration;

/// Whether two mask intervals separated by `gap` are reported as one.
///
/// A negative gap (overlap) always bridges.
pub fn should_bridge(gap: Duration, threshold: Duration) -> bool {
    gap <= threshold
}

/// Coalesces masks of the same channel whose gap passes [`should_bridge`].
/// The result is ordered by channel, then start time.
pub fn merge_repeated_amplitude_masks(
    mut masks: Vec<RepeatedAmplitudeMask>,
    threshold: Duration,
) -> Vec<RepeatedAmplitudeMask> {
    masks.sort_by_key(|mask| (mask.channel_id(), mask.start_time()));

    let mut merged: Vec<RepeatedAmplitudeMask> = Vec::with_capacity(masks.len());
    for mask in masks {
        match merged.last_mut() {
            Some(open)
                if open.channel_id() == mask.channel_id()
                    && should_bridge(mask.start_time() - open.end_time(), threshold) =>
            {
                open.extend_to(mask.end_time());
            }
            _ => merged.push(mask),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time::from_epoch_seconds;
    use uuid::Uuid;

    fn mask(channel: Uuid, start: f64, end: f64) -> RepeatedAmplitudeMask {
        RepeatedAmplitudeMask::new(
            from_epoch_seconds(start),
            from_epoch_seconds(end),
            channel,
            Uuid::nil(),
        )
        .unwrap()
    }

    #[test]
    fn bridges_up_to_and_including_threshold() {
        let threshold = Duration::seconds(5);
        assert!(should_bridge(Duration::seconds(4), threshold));
        assert!(should_bridge(Duration::seconds(5), threshold));
        assert!(!should_bridge(Duration::seconds(6), threshold));
        assert!(should_bridge(Duration::seconds(-1), Duration::zero()));
    }

    #[test]
    fn merges_close_masks_per_channel() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let masks = vec![
            mask(a, 10.0, 12.0),
            mask(a, 0.0, 2.0),
            mask(a, 2.5, 4.0),
            mask(b, 4.5, 6.0),
        ];

        let merged = merge_repeated_amplitude_masks(masks, Duration::seconds(1));
        let a_masks: Vec<_> = merged.iter().filter(|m| m.channel_id() == a).collect();
        assert_eq!(a_masks.len(), 2);
        assert_eq!(a_masks[0].start_time(), from_epoch_seconds(0.0));
        assert_eq!(a_masks[0].end_time(), from_epoch_seconds(4.0));
        assert_eq!(a_masks[1].start_time(), from_epoch_seconds(10.0));
        assert_eq!(merged.iter().filter(|m| m.channel_id() == b).count(), 1);
    }

    #[test]
    fn zero_threshold_merges_only_touching_masks() {
        let channel = Uuid::new_v4();
        let masks = vec![
            mask(channel, 0.0, 2.0),
            mask(channel, 2.0, 3.0),
            mask(channel, 3.5, 4.0),
        ];
        let merged = merge_repeated_amplitude_masks(masks, Duration::zero());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].end_time(), from_epoch_seconds(3.0));
    }
}
