pub mod definition;
pub mod fir;

pub use definition::{
    FilterCausality, FilterDefinition, FilterDesign, FilterPassBandType, FilterSource, FilterType,
};
pub use fir::LinearFirFilter;
