use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use mirrorseed::{cleaner, pipeline, MirrorseedConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "mirrorseed", about = "Trim whitespace from every CSV cell and log the output hash")]
struct Cli {
    /// CSV file to clean
    #[arg(required_unless_present = "dump_config")]
    input: Option<PathBuf>,

    /// Where to write the cleaned CSV
    #[arg(required_unless_present = "dump_config")]
    output: Option<PathBuf>,

    /// Path to config file (TOML)
    #[arg(long, default_value = "mirrorseed.toml")]
    config: PathBuf,

    /// Directory for all ledgers (overrides ledgers.dir)
    #[arg(long)]
    ledger_dir: Option<PathBuf>,

    /// Dump default config as TOML and exit
    #[arg(long, default_value_t = false)]
    dump_config: bool,

    /// Clean only; do not run the echo pipeline
    #[arg(long, default_value_t = false)]
    skip_pipeline: bool,

    /// Log output format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.dump_config {
        println!("{}", MirrorseedConfig::default().to_toml());
        return Ok(());
    }

    init_tracing(cli.log_format);

    let (Some(input), Some(output)) = (cli.input, cli.output) else {
        unreachable!("clap requires INPUT and OUTPUT unless --dump-config");
    };

    let mut config = MirrorseedConfig::load(&cli.config);
    if let Some(dir) = cli.ledger_dir {
        config.ledgers.dir = dir;
    }

    cleaner::clean(&input, &output, &config.ledgers.fingerprint_log_path())
        .with_context(|| format!("cleaning {} into {}", input.display(), output.display()))?;

    if !cli.skip_pipeline {
        pipeline::run(&config, &input);
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "mirrorseed=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}
