use crate::prelude::{StageError, StageResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    FirHamming,
    IirButterworth,
}

impl FilterType {
    pub fn is_fir(self) -> bool {
        matches!(self, FilterType::FirHamming)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterPassBandType {
    LowPass,
    HighPass,
    BandPass,
    BandReject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterSource {
    System,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterCausality {
    Causal,
    NonCausal,
}

/// Descriptive parameters of a filter, everything except its coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDesign {
    pub filter_type: FilterType,
    pub pass_band: FilterPassBandType,
    pub low_frequency_hz: f64,
    pub high_frequency_hz: f64,
    pub order: u32,
    pub source: FilterSource,
    pub causality: FilterCausality,
    pub zero_phase: bool,
    pub sample_rate: f64,
    pub sample_rate_tolerance: f64,
    pub group_delay_secs: f64,
}

/// A linear filter: design metadata plus feedback (`a`) and feedforward
/// (`b`) coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDefinition {
    name: String,
    description: String,
    design: FilterDesign,
    a_coefficients: Vec<f64>,
    b_coefficients: Vec<f64>,
}

impl FilterDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        design: FilterDesign,
        a_coefficients: Vec<f64>,
        b_coefficients: Vec<f64>,
    ) -> StageResult<Self> {
        if !(design.low_frequency_hz < design.high_frequency_hz) {
            return invalid("filter low frequency must be below high frequency");
        }
        if design.low_frequency_hz < 0.0 || design.high_frequency_hz < 0.0 {
            return invalid("filter frequencies must be >= 0.0");
        }
        if design.order == 0 {
            return invalid("filter order must be > 0");
        }
        if !(design.sample_rate >= 0.0) {
            return invalid("filter sample rate must be >= 0.0");
        }
        if !(design.sample_rate_tolerance >= 0.0) {
            return invalid("filter sample rate tolerance must be >= 0.0");
        }
        if a_coefficients.is_empty() {
            return invalid("filter requires at least one a coefficient");
        }
        if b_coefficients.is_empty() {
            return invalid("filter requires at least one b coefficient");
        }

        Ok(Self {
            name: name.into(),
            description: description.into(),
            design,
            a_coefficients,
            b_coefficients,
        })
    }

    /// FIR filters have the single feedback coefficient `1.0`.
    pub fn fir(
        name: impl Into<String>,
        description: impl Into<String>,
        design: FilterDesign,
        b_coefficients: Vec<f64>,
    ) -> StageResult<Self> {
        Self::new(name, description, design, vec![1.0], b_coefficients)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn design(&self) -> &FilterDesign {
        &self.design
    }

    pub fn a_coefficients(&self) -> &[f64] {
        &self.a_coefficients
    }

    pub fn b_coefficients(&self) -> &[f64] {
        &self.b_coefficients
    }

    pub fn is_fir(&self) -> bool {
        self.design.filter_type.is_fir()
    }

    pub fn sample_rate_window(&self) -> (f64, f64) {
        (
            self.design.sample_rate - self.design.sample_rate_tolerance,
            self.design.sample_rate + self.design.sample_rate_tolerance,
        )
    }

    pub fn accepts_sample_rate(&self, sample_rate: f64) -> bool {
        let (low, high) = self.sample_rate_window();
        sample_rate >= low && sample_rate <= high
    }
}

fn invalid<T>(message: &str) -> StageResult<T> {
    Err(StageError::InvalidArgument(message.to_string()))
}
