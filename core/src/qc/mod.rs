//! Quality-control mask producers and their parameters.

pub mod mask;
pub mod merge;
pub mod params;
pub mod repeated_amplitude;
pub mod soh;

pub use mask::{
    ChannelSohSubtype, QcMaskType, RepeatedAmplitudeMask, SohQcMask, REPEATED_AMPLITUDE_RATIONALE,
};
pub use merge::{merge_repeated_amplitude_masks, should_bridge};
pub use params::{RepeatedAmplitudeParameters, SohQcParameters, SohSubtypeOverride};
pub use repeated_amplitude::RepeatedAmplitudeDetector;
pub use soh::{SohIntervalInterpreter, SohTimeline, SohTimelineBuilder, Status, StatusState};
