use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pipeline_risk::ExampleGenerator;

/// Write a synthetic pipeline-failure CSV for trying out the app.
#[derive(Debug, Parser)]
#[command(name = "generate_sample", version)]
struct Args {
    /// Number of data rows to generate.
    #[arg(long, default_value_t = 1000)]
    rows: usize,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Destination CSV file.
    #[arg(long, default_value = "example_pipeline.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut generator = ExampleGenerator::new(args.rows);
    generator.seed = args.seed;
    let text = generator.generate()?;

    std::fs::write(&args.output, text)
        .with_context(|| format!("writing {}", args.output.display()))?;

    log::info!("Generated {} rows", args.rows);
    println!("Wrote {} rows to {}", args.rows, args.output.display());
    Ok(())
}
