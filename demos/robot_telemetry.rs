//! Explicit table with criteria-gated logging and two sinks
//!
//! Logs a drivetrain table on every sixth tick to a CSV file and the console,
//! and swaps one loggable halfway through.
//!
//! Run with: cargo run --example robot_telemetry

use rust_tick_logger::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Tick Logger - Robot Telemetry Example ===\n");

    let mut logger = Logger::builder()
        .default_sink(shared_sink(FileSink::new("./logs")))
        .build();

    let tick = Arc::new(AtomicI64::new(0));

    let mut table = Table::new(
        shared_sink(FileSink::new("./logs")),
        "Drivetrain",
        LoggingMode::Criteria,
        &["Status", "Enabled", "Encoder", "Speed"],
        vec![
            types::varchar(),
            types::boolean(),
            types::int(),
            types::decimal(),
        ],
    )?;

    // Only log when the tick is a multiple of 6
    let even = Arc::clone(&tick);
    table.add_logging_criteria(move || even.load(Ordering::Relaxed) % 2 == 0);
    let third = Arc::clone(&tick);
    table.add_logging_criteria(move || third.load(Ordering::Relaxed) % 3 == 0);

    let enc = Arc::clone(&tick);
    let spd = Arc::clone(&tick);
    table.set_loggers(vec![
        Loggable::constant("cruising"),
        Loggable::new(|| true),
        Loggable::new(move || (enc.load(Ordering::Relaxed) * 42 % 4096) as i32),
        Loggable::new(move || (spd.load(Ordering::Relaxed) as f64 / 10.0).sin()),
    ])?;

    logger.add_table(table);

    #[cfg(feature = "console")]
    {
        if let Some(table) = logger.get_table_mut("Drivetrain") {
            table.add_output_method(shared_sink(ConsoleSink::new()))?;
        }
    }

    for i in 0..100 {
        tick.store(i, Ordering::Relaxed);
        logger.tick();
        if i == 50 {
            if let Some(table) = logger.get_table_mut("Drivetrain") {
                table.set_logger("Status", Loggable::constant("braking"))?;
            }
        }
    }

    logger.flush()?;

    let metrics = logger.metrics();
    println!(
        "\nticks: {}, rows: {}, dropped: {}",
        metrics.ticks(),
        metrics.total_logged(),
        metrics.dropped_count()
    );
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
