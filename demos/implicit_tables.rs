//! Implicit tables built column by column before the first tick
//!
//! Run with: cargo run --example implicit_tables

use rust_tick_logger::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Tick Logger - Implicit Tables Example ===\n");

    let mut logger = Logger::builder()
        .default_sink(shared_sink(JsonSink::new("./logs")))
        .implicit_mode(LoggingMode::Automatic)
        .on_error(Arc::new(|table, err| {
            eprintln!("table {} skipped a row: {}", table, err.chain());
        }))
        .build();

    let mut heading = 0.0_f64;
    logger.add_column("Gyro", "Heading", types::decimal(), Loggable::new(move || {
        heading = (heading + 7.5) % 360.0;
        heading
    }))?;
    logger.add_column("Gyro", "Calibrated", types::boolean(), Loggable::new(|| true))?;

    // Faults every fifth sample; those rows are dropped and reported
    let mut samples = 0;
    logger.add_column("Battery", "Voltage", types::decimal(), Loggable::fallible(move || {
        samples += 1;
        if samples % 5 == 0 {
            Err("brownout")
        } else {
            Ok(12.6 - samples as f64 * 0.01)
        }
    }))?;
    logger.set_table_output("Battery", shared_sink(FileSink::new("./logs")))?;

    for _ in 0..20 {
        logger.tick();
    }

    // Schema is frozen once logging has started
    if let Err(err) = logger.add_column("Gyro", "Pitch", types::decimal(), Loggable::new(|| 0.0)) {
        println!("rejected late column: {}", err);
    }

    logger.flush()?;
    println!("tables: {:?}", logger.table_names());
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
