//! scale-player - write a C major scale to a MIDI file and play it live
//!
//! Run with: cargo run
//!
//! The reported computation time covers building the sequence and writing
//! the file only. Playback runs in real time (about four seconds) and is
//! deliberately left out of the measurement.

use std::time::Instant;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use scale_player::{playback, write_smf, ScaleConfig};
use tracing::info;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    // Logs go to stderr so stdout carries only the summary lines
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = ScaleConfig::default();
    config.validate().wrap_err("invalid configuration")?;

    let start = Instant::now();
    let sequence = config
        .build_sequence()
        .wrap_err("failed to build note sequence")?;
    write_smf(&sequence, &config.output_path)
        .wrap_err_with(|| format!("failed to write {}", config.output_path.display()))?;
    let computation_time = start.elapsed();

    let report = playback::play_on(config.sink, &sequence).wrap_err("playback failed")?;
    info!(
        events = report.events_sent,
        scheduled = ?report.scheduled,
        elapsed = ?report.elapsed,
        "done"
    );

    println!(
        "Computation time: {:.8} seconds",
        computation_time.as_secs_f64()
    );
    println!(
        "C major scale played directly! Check '{}' for reference.",
        config.output_path.display()
    );
    Ok(())
}
