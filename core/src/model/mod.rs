pub mod channel_segment;
pub mod time;
pub mod waveform;

pub use channel_segment::{
    are_contiguous, ChannelSegment, ChannelSegmentType, MIN_GAP_SAMPLE_COUNT,
    SAMPLE_RATE_TOLERANCE,
};
pub use waveform::Waveform;
