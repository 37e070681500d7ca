pub mod fir;
pub mod repeated_amplitude;
pub mod soh;

pub use fir::FirFilterStage;
pub use repeated_amplitude::RepeatedAmplitudeStage;
pub use soh::SohQcStage;
