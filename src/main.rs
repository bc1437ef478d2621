use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use csvnorm::NormalizerConfig;
use csvnorm::report::render_text;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Infer a normalized relational schema and SQL DDL from a CSV file.
#[derive(Debug, Parser)]
#[command(name = "csvnorm", version, about)]
struct Cli {
    /// Input CSV file
    input: PathBuf,

    /// Output file for the SQL script (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print an analysis report to stderr
    #[arg(long, value_enum)]
    report: Option<ReportFormat>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Single-column redundancy threshold (percent)
    #[arg(long)]
    single_threshold: Option<f64>,

    /// Identifier-combination redundancy threshold (percent)
    #[arg(long)]
    combination_threshold: Option<f64>,

    /// Rows sampled for type inference and sample data
    #[arg(long)]
    max_sample_rows: Option<usize>,

    /// Emit sample INSERT statements
    #[arg(long)]
    sample_data: bool,

    /// Emit detail views for entities with relationships
    #[arg(long)]
    views: bool,
}

impl Cli {
    fn load_config(&self) -> Result<NormalizerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                NormalizerConfig::from_json(&json)
                    .with_context(|| format!("Invalid configuration in {}", path.display()))?
            }
            None => NormalizerConfig::default(),
        };
        if let Some(value) = self.single_threshold {
            config.redundancy_threshold_single_column = value;
        }
        if let Some(value) = self.combination_threshold {
            config.redundancy_threshold_combination = value;
        }
        if let Some(value) = self.max_sample_rows {
            config.max_sample_rows = value;
        }
        config.emit_sample_data |= self.sample_data;
        config.emit_views |= self.views;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    let input = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let result = csvnorm::normalize_with(&input, &config)
        .with_context(|| format!("Failed to normalize {}", cli.input.display()))?;

    match cli.report {
        Some(ReportFormat::Text) => eprint!("{}", render_text(&result)),
        Some(ReportFormat::Json) => eprintln!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        ),
        None => {}
    }

    match &cli.output {
        Some(path) => fs::write(path, &result.sql_script)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", result.sql_script),
    }
    Ok(())
}
