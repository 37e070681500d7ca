use crate::model::time::seconds_to_duration;
use crate::prelude::{StageError, StageResult};
use crate::qc::ChannelSohSubtype;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// SOH mask creation settings with per-subtype overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SohQcParameters {
    pub create_masks: bool,
    pub merge_threshold_secs: f64,
    pub overrides: HashMap<ChannelSohSubtype, SohSubtypeOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SohSubtypeOverride {
    pub create_masks: Option<bool>,
    pub merge_threshold_secs: Option<f64>,
}

impl Default for SohQcParameters {
    fn default() -> Self {
        Self {
            create_masks: true,
            merge_threshold_secs: 0.0,
            overrides: HashMap::new(),
        }
    }
}

impl SohQcParameters {
    pub fn validate(&self) -> StageResult<()> {
        check_threshold("SOH merge threshold", self.merge_threshold_secs)?;
        for (subtype, entry) in &self.overrides {
            if let Some(secs) = entry.merge_threshold_secs {
                check_threshold(&format!("{:?} merge threshold", subtype), secs)?;
            }
        }
        Ok(())
    }

    pub fn should_create_masks(&self, subtype: ChannelSohSubtype) -> bool {
        self.overrides
            .get(&subtype)
            .and_then(|entry| entry.create_masks)
            .unwrap_or(self.create_masks)
    }

    pub fn merge_threshold(&self, subtype: ChannelSohSubtype) -> Duration {
        let secs = self
            .overrides
            .get(&subtype)
            .and_then(|entry| entry.merge_threshold_secs)
            .unwrap_or(self.merge_threshold_secs);
        seconds_to_duration(secs)
    }
}

/// Repeated-amplitude detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatedAmplitudeParameters {
    pub min_repeated_samples: usize,
    pub max_delta_from_start: f64,
    pub mask_merge_threshold_secs: f64,
}

impl Default for RepeatedAmplitudeParameters {
    fn default() -> Self {
        Self {
            min_repeated_samples: 3,
            max_delta_from_start: 0.0,
            mask_merge_threshold_secs: 0.0,
        }
    }
}

impl RepeatedAmplitudeParameters {
    pub fn validate(&self) -> StageResult<()> {
        if self.min_repeated_samples <= 1 {
            return Err(StageError::InvalidArgument(format!(
                "min repeated samples must be > 1, got {}",
                self.min_repeated_samples
            )));
        }
        if !(self.max_delta_from_start >= 0.0) {
            return Err(StageError::InvalidArgument(format!(
                "max delta from start must be >= 0.0, got {}",
                self.max_delta_from_start
            )));
        }
        check_threshold("mask merge threshold", self.mask_merge_threshold_secs)
    }

    pub fn mask_merge_threshold(&self) -> Duration {
        seconds_to_duration(self.mask_merge_threshold_secs)
    }
}

fn check_threshold(what: &str, secs: f64) -> StageResult<()> {
    if secs.is_finite() && secs >= 0.0 {
        Ok(())
    } else {
        Err(StageError::InvalidArgument(format!(
            "{} must be a non-negative number of seconds, got {}",
            what, secs
        )))
    }
}
