use anyhow::Context;
use chrono::Duration;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use uuid::Uuid;
use wavecore::model::time::{from_epoch_seconds, offset_for_sample, seconds_to_duration};
use wavecore::model::{ChannelSegment, ChannelSegmentType, Waveform};
use wavecore::qc::{ChannelSohSubtype, SohTimeline};

/// Samples left out between waveforms when a gap is requested.
const GAP_SAMPLES: usize = 10;

/// Configuration for generating synthetic channel data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub sample_rate: f64,
    pub samples_per_waveform: usize,
    pub waveforms_per_segment: usize,
    /// Leave a gap after this waveform index.
    pub gap_after_waveform: Option<usize>,
    pub flatline_samples: usize,
    pub amplitude: f64,
    pub frequency: f64,
    pub noise: f64,
    pub seed: u64,
    pub start_epoch_secs: f64,
    pub soh_reports: usize,
    pub soh_report_secs: f64,
    pub soh_adjacent_threshold_secs: f64,
    pub set_probability: f64,
    pub dropout_probability: f64,
    pub subtype: ChannelSohSubtype,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 40.0,
            samples_per_waveform: 400,
            waveforms_per_segment: 3,
            gap_after_waveform: None,
            flatline_samples: 20,
            amplitude: 1.0,
            frequency: 1.5,
            noise: 0.05,
            seed: 0,
            start_epoch_secs: 1_500_000_000.0,
            soh_reports: 30,
            soh_report_secs: 10.0,
            soh_adjacent_threshold_secs: 5.0,
            set_probability: 0.25,
            dropout_probability: 0.05,
            subtype: ChannelSohSubtype::Clipped,
        }
    }
}

/// One synthetic channel: raw samples plus its SOH history.
#[derive(Debug, Clone)]
pub struct ChannelData {
    pub index: usize,
    pub segment: ChannelSegment,
    pub timeline: SohTimeline,
}

pub fn build_channels(config: &GeneratorConfig, count: usize) -> anyhow::Result<Vec<ChannelData>> {
    (0..count)
        .map(|index| {
            build_channel(config, index)
                .with_context(|| format!("generating synthetic channel {}", index))
        })
        .collect()
}

pub fn build_channel(config: &GeneratorConfig, index: usize) -> anyhow::Result<ChannelData> {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index as u64));
    let channel_id = Uuid::from_u128(rng.gen());
    let segment = build_segment(config, index, channel_id, &mut rng)?;
    let timeline = build_timeline(config, channel_id, &mut rng)?;

    Ok(ChannelData {
        index,
        segment,
        timeline,
    })
}

fn build_segment(
    config: &GeneratorConfig,
    index: usize,
    channel_id: Uuid,
    rng: &mut StdRng,
) -> anyhow::Result<ChannelSegment> {
    let origin = from_epoch_seconds(config.start_epoch_secs);
    let samples = config.samples_per_waveform.max(2);
    let phase_offset = index as f64 * 0.25;

    let mut cursor = 0usize;
    let mut waveforms = Vec::with_capacity(config.waveforms_per_segment.max(1));
    for waveform_index in 0..config.waveforms_per_segment.max(1) {
        let mut values: Vec<f64> = (cursor..cursor + samples)
            .map(|n| {
                let t = n as f64 / config.sample_rate;
                let jitter = if config.noise > 0.0 {
                    rng.gen_range(-config.noise..config.noise)
                } else {
                    0.0
                };
                config.amplitude * (2.0 * PI * config.frequency * t + phase_offset).sin() + jitter
            })
            .collect();
        if waveform_index == 0 && config.flatline_samples > 1 {
            let begin = samples / 2;
            let end = (begin + config.flatline_samples).min(samples);
            let level = values[begin];
            values[begin..end].fill(level);
        }

        let start = origin + offset_for_sample(cursor, config.sample_rate);
        waveforms.push(
            Waveform::with_inferred_end_time(start, config.sample_rate, values)
                .context("building synthetic waveform")?,
        );

        cursor += samples;
        if config.gap_after_waveform == Some(waveform_index) {
            cursor += GAP_SAMPLES;
        }
    }

    let end = waveforms
        .last()
        .map(Waveform::end_time)
        .context("synthetic segment has no waveforms")?;
    ChannelSegment::create(
        channel_id,
        format!("CH{:02}/raw", index),
        ChannelSegmentType::Raw,
        origin,
        end,
        waveforms,
    )
    .context("building synthetic channel segment")
}

fn build_timeline(
    config: &GeneratorConfig,
    channel_id: Uuid,
    rng: &mut StdRng,
) -> anyhow::Result<SohTimeline> {
    let origin = from_epoch_seconds(config.start_epoch_secs);
    let report = seconds_to_duration(config.soh_report_secs);
    let set_probability = config.set_probability.clamp(0.0, 1.0);
    let dropout_probability = config.dropout_probability.clamp(0.0, 1.0);

    let mut builder = SohTimeline::builder(
        channel_id,
        config.subtype,
        origin,
        origin + report,
        rng.gen_bool(set_probability),
        seconds_to_duration(config.soh_adjacent_threshold_secs),
    )
    .context("starting synthetic SOH timeline")?;

    for n in 1..config.soh_reports.max(1) {
        if rng.gen_bool(dropout_probability) {
            continue;
        }
        let start = origin + report * n as i32;
        builder
            .add_status_change(start, start + report, rng.gen_bool(set_probability))
            .context("adding synthetic SOH report")?;
    }

    builder.build().context("building synthetic SOH timeline")
}

/// Duration covered by a generated segment, used for summaries.
pub fn segment_span(segment: &ChannelSegment) -> Duration {
    segment.end_time() - segment.start_time()
}
