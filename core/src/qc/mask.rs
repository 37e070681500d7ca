use crate::prelude::{StageError, StageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const REPEATED_AMPLITUDE_RATIONALE: &str =
    "System created repeated adjacent amplitude values mask";

/// Data-quality category carried by a QC mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QcMaskType {
    SensorProblem,
    StationProblem,
    Calibration,
    StationSecurity,
    Timing,
    RepeatedAdjacentAmplitudeValue,
    RepairableGap,
    LongGap,
    Spike,
}

/// Acquired state-of-health condition that can raise a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelSohSubtype {
    DeadSensorChannel,
    ZeroedData,
    Clipped,
    MainPowerFailure,
    BackupPowerUnstable,
    CalibrationUnderway,
    DigitizerAnalogInputShorted,
    DigitizerCalibrationLoopBack,
    EquipmentHousingOpen,
    DigitizingEquipmentOpen,
    VaultDoorOpened,
    AuthenticationSealBroken,
    EquipmentMoved,
    ClockDifferentialTooLarge,
    GpsReceiverOff,
    GpsReceiverUnlocked,
    DataTimeGpsSynchronizationTimeDeltaOverThreshold,
    ClockDifferentialOverThreshold,
}

impl ChannelSohSubtype {
    pub const ALL: [ChannelSohSubtype; 18] = [
        ChannelSohSubtype::DeadSensorChannel,
        ChannelSohSubtype::ZeroedData,
        ChannelSohSubtype::Clipped,
        ChannelSohSubtype::MainPowerFailure,
        ChannelSohSubtype::BackupPowerUnstable,
        ChannelSohSubtype::CalibrationUnderway,
        ChannelSohSubtype::DigitizerAnalogInputShorted,
        ChannelSohSubtype::DigitizerCalibrationLoopBack,
        ChannelSohSubtype::EquipmentHousingOpen,
        ChannelSohSubtype::DigitizingEquipmentOpen,
        ChannelSohSubtype::VaultDoorOpened,
        ChannelSohSubtype::AuthenticationSealBroken,
        ChannelSohSubtype::EquipmentMoved,
        ChannelSohSubtype::ClockDifferentialTooLarge,
        ChannelSohSubtype::GpsReceiverOff,
        ChannelSohSubtype::GpsReceiverUnlocked,
        ChannelSohSubtype::DataTimeGpsSynchronizationTimeDeltaOverThreshold,
        ChannelSohSubtype::ClockDifferentialOverThreshold,
    ];

    /// Text attached to masks raised for this condition.
    pub fn rationale(self) -> &'static str {
        match self {
            ChannelSohSubtype::DeadSensorChannel => "System created: dead sensor channel",
            ChannelSohSubtype::ZeroedData => "System created: zeroed data",
            ChannelSohSubtype::Clipped => "System created: clipped data",
            ChannelSohSubtype::MainPowerFailure => "System created: main power failure",
            ChannelSohSubtype::BackupPowerUnstable => "System created: backup power unstable",
            ChannelSohSubtype::CalibrationUnderway => "System created: calibration underway",
            ChannelSohSubtype::DigitizerAnalogInputShorted => {
                "System created: digitizer analog input shorted"
            }
            ChannelSohSubtype::DigitizerCalibrationLoopBack => {
                "System created: digitizer calibration loop back"
            }
            ChannelSohSubtype::EquipmentHousingOpen => "System created: equipment housing open",
            ChannelSohSubtype::DigitizingEquipmentOpen => {
                "System created: digitizing equipment open"
            }
            ChannelSohSubtype::VaultDoorOpened => "System created: vault door opened",
            ChannelSohSubtype::AuthenticationSealBroken => {
                "System created: authentication seal broken"
            }
            ChannelSohSubtype::EquipmentMoved => "System created: equipment moved",
            ChannelSohSubtype::ClockDifferentialTooLarge => {
                "System created: clock differential too large"
            }
            ChannelSohSubtype::GpsReceiverOff => "System created: GPS receiver off",
            ChannelSohSubtype::GpsReceiverUnlocked => "System created: GPS receiver unlocked",
            ChannelSohSubtype::DataTimeGpsSynchronizationTimeDeltaOverThreshold => {
                "System created: data time - time of last GPS synchronization > threshold"
            }
            ChannelSohSubtype::ClockDifferentialOverThreshold => {
                "System created: clock differential in microseconds > threshold"
            }
        }
    }

    /// The only mask type a timeline of this subtype may carry.
    pub fn mask_type(self) -> QcMaskType {
        match self {
            ChannelSohSubtype::DeadSensorChannel
            | ChannelSohSubtype::ZeroedData
            | ChannelSohSubtype::Clipped => QcMaskType::SensorProblem,
            ChannelSohSubtype::MainPowerFailure | ChannelSohSubtype::BackupPowerUnstable => {
                QcMaskType::StationProblem
            }
            ChannelSohSubtype::CalibrationUnderway
            | ChannelSohSubtype::DigitizerAnalogInputShorted
            | ChannelSohSubtype::DigitizerCalibrationLoopBack => QcMaskType::Calibration,
            ChannelSohSubtype::EquipmentHousingOpen
            | ChannelSohSubtype::DigitizingEquipmentOpen
            | ChannelSohSubtype::VaultDoorOpened
            | ChannelSohSubtype::AuthenticationSealBroken
            | ChannelSohSubtype::EquipmentMoved => QcMaskType::StationSecurity,
            ChannelSohSubtype::ClockDifferentialTooLarge
            | ChannelSohSubtype::GpsReceiverOff
            | ChannelSohSubtype::GpsReceiverUnlocked
            | ChannelSohSubtype::DataTimeGpsSynchronizationTimeDeltaOverThreshold
            | ChannelSohSubtype::ClockDifferentialOverThreshold => QcMaskType::Timing,
        }
    }
}

/// Interval raised by the SOH interval interpreter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SohQcMask {
    mask_type: QcMaskType,
    subtype: ChannelSohSubtype,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl SohQcMask {
    pub fn new(
        mask_type: QcMaskType,
        subtype: ChannelSohSubtype,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> StageResult<Self> {
        validate_interval("SOH QC mask", start_time, end_time)?;
        Ok(Self {
            mask_type,
            subtype,
            start_time,
            end_time,
        })
    }

    pub fn mask_type(&self) -> QcMaskType {
        self.mask_type
    }

    pub fn subtype(&self) -> ChannelSohSubtype {
        self.subtype
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn rationale(&self) -> &'static str {
        self.subtype.rationale()
    }
}

/// Interval covering a run of near-constant samples on one channel segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatedAmplitudeMask {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    channel_id: Uuid,
    channel_segment_id: Uuid,
}

impl RepeatedAmplitudeMask {
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        channel_id: Uuid,
        channel_segment_id: Uuid,
    ) -> StageResult<Self> {
        validate_interval("repeated amplitude mask", start_time, end_time)?;
        Ok(Self {
            start_time,
            end_time,
            channel_id,
            channel_segment_id,
        })
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn channel_id(&self) -> Uuid {
        self.channel_id
    }

    pub fn channel_segment_id(&self) -> Uuid {
        self.channel_segment_id
    }

    pub fn mask_type(&self) -> QcMaskType {
        QcMaskType::RepeatedAdjacentAmplitudeValue
    }

    pub fn rationale(&self) -> &'static str {
        REPEATED_AMPLITUDE_RATIONALE
    }

    pub(crate) fn extend_to(&mut self, end_time: DateTime<Utc>) {
        if end_time > self.end_time {
            self.end_time = end_time;
        }
    }
}

fn validate_interval(
    what: &str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> StageResult<()> {
    if start_time < end_time {
        Ok(())
    } else {
        Err(StageError::InvalidArgument(format!(
            "{} start {} must precede end {}",
            what, start_time, end_time
        )))
    }
}
