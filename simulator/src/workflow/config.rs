use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use wavecore::filter::{
    FilterCausality, FilterDefinition, FilterDesign, FilterPassBandType, FilterSource, FilterType,
};
use wavecore::prelude::StageConfig;
use wavecore::qc::{RepeatedAmplitudeParameters, SohQcParameters};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub channels: usize,
    pub generator: GeneratorConfig,
    pub soh: SohQcParameters,
    pub repeated_amplitude: RepeatedAmplitudeParameters,
    pub filter: Option<FilterConfig>,
}

/// Filter as written in a workflow file: design metadata plus b coefficients.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilterConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub design: FilterDesign,
    pub coefficients: Vec<f64>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            channels: 4,
            generator: GeneratorConfig::default(),
            soh: SohQcParameters::default(),
            repeated_amplitude: RepeatedAmplitudeParameters::default(),
            filter: Some(FilterConfig::default()),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            name: "avg5".into(),
            description: "5 point causal moving average".into(),
            design: FilterDesign {
                filter_type: FilterType::FirHamming,
                pass_band: FilterPassBandType::LowPass,
                low_frequency_hz: 0.0,
                high_frequency_hz: 8.0,
                order: 5,
                source: FilterSource::System,
                causality: FilterCausality::Causal,
                zero_phase: false,
                sample_rate: 40.0,
                sample_rate_tolerance: 0.5,
                group_delay_secs: 0.05,
            },
            coefficients: vec![0.2; 5],
        }
    }
}

impl FilterConfig {
    pub fn to_definition(&self) -> anyhow::Result<FilterDefinition> {
        FilterDefinition::fir(
            self.name.clone(),
            self.description.clone(),
            self.design.clone(),
            self.coefficients.clone(),
        )
        .with_context(|| format!("building filter definition {}", self.name))
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(channels: usize, seed: u64) -> Self {
        let mut config = Self {
            channels,
            ..Default::default()
        };
        config.generator.seed = seed;
        config
    }

    pub fn to_stage_config(&self) -> anyhow::Result<StageConfig> {
        let filter = self
            .filter
            .as_ref()
            .map(FilterConfig::to_definition)
            .transpose()?;

        Ok(StageConfig {
            soh: self.soh.clone(),
            repeated_amplitude: self.repeated_amplitude.clone(),
            filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wavecore::qc::ChannelSohSubtype;

    #[test]
    fn config_from_args_produces_stage_config() {
        let cfg = WorkflowConfig::from_args(2, 7);
        assert_eq!(cfg.generator.seed, 7);
        let stage_config = cfg.to_stage_config().unwrap();
        assert_eq!(stage_config.filter.unwrap().b_coefficients().len(), 5);
        assert_eq!(stage_config.repeated_amplitude.min_repeated_samples, 3);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"channels: 3
generator:
  sample_rate: 20.0
  flatline_samples: 8
soh:
  merge_threshold_secs: 5.0
  overrides:
    CLIPPED:
      create_masks: false
repeated_amplitude:
  min_repeated_samples: 4
  max_delta_from_start: 0.01
filter:
  name: avg2
  design:
    filterType: FIR_HAMMING
    passBand: LOW_PASS
    lowFrequencyHz: 0.0
    highFrequencyHz: 5.0
    order: 2
    source: USER
    causality: CAUSAL
    zeroPhase: false
    sampleRate: 20.0
    sampleRateTolerance: 0.5
    groupDelaySecs: 0.025
  coefficients: [0.5, 0.5]
",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.channels, 3);
        assert_eq!(cfg.generator.sample_rate, 20.0);
        assert_eq!(cfg.generator.samples_per_waveform, 400);
        assert!(!cfg.soh.should_create_masks(ChannelSohSubtype::Clipped));
        assert_eq!(cfg.repeated_amplitude.min_repeated_samples, 4);

        let stage_config = cfg.to_stage_config().unwrap();
        let filter = stage_config.filter.unwrap();
        assert_eq!(filter.name(), "avg2");
        assert!(filter.accepts_sample_rate(20.0));
    }

    #[test]
    fn invalid_filter_is_reported() {
        let mut cfg = WorkflowConfig::default();
        if let Some(filter) = cfg.filter.as_mut() {
            filter.coefficients.clear();
        }
        assert!(cfg.to_stage_config().is_err());
    }
}
