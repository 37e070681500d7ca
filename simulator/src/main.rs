use anyhow::Context;
use clap::Parser;
use generator::profile::{build_channels, segment_span};
use log::info;
use report::model::QcReport;
use report::writer::write_report;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use wavecore::model::time::duration_seconds;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline waveform QC workflow driver")]
struct Args {
    /// Print a per-channel summary after the run
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 4)]
    channels: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Where to write the JSON report
    #[arg(long, default_value = "tools/data/qc_report.json")]
    report: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.channels, args.seed)
    };

    let channels = build_channels(&workflow_config.generator, workflow_config.channels)?;
    for channel in &channels {
        info!(
            "channel {} spans {:.3}s in {} waveforms",
            channel.index,
            duration_seconds(segment_span(&channel.segment)),
            channel.segment.waveforms().len()
        );
    }

    let runner = Runner::new(&workflow_config)?;
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime for channel jobs")?;
    let outcomes = runtime.block_on(runner.execute_all(channels));

    let report = QcReport::new(outcomes, runner.metrics().snapshot());
    write_report(&args.report, &report)?;
    info!("wrote QC report to {}", args.report.display());

    if args.offline {
        for channel in &report.channels {
            match &channel.error {
                Some(error) => println!("channel {} -> failed: {}", channel.index, error),
                None => println!(
                    "channel {} -> soh masks {}, repeated amplitude masks {}, filtered samples {}",
                    channel.index,
                    channel.soh_masks.len(),
                    channel.repeated_amplitude_masks.len(),
                    channel
                        .filtered_segment
                        .as_ref()
                        .map_or(0, |summary| summary.sample_count)
                ),
            }
        }
        println!(
            "Offline run -> processed {}, failed {}, masks {}",
            report.metrics.processed,
            report.failed_channels(),
            report.metrics.masks
        );
    }

    Ok(())
}
