use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use sales_etl::{
    client::AuthType,
    cli::{BucketSource, Destination, load_policy, run_bucket, run_local},
    etl::PipelineReport,
};
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Sales ETL: clean raw sales CSV extracts and append them to the sales table
#[derive(Parser)]
#[command(name = "sales-etl", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source credentials from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// YAML cleaning policy (placeholder text, null markers, date formats)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a local CSV file and load it
    Local {
        /// Path to the CSV file
        path: PathBuf,

        /// Print the cleaned records as NDJSON instead of loading them
        #[arg(long)]
        dry_run: bool,
    },

    /// Clean every CSV object in a bucket and load them
    Bucket {
        /// Bucket name
        bucket: String,

        /// Only objects whose key starts with this prefix
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Object store base URL, defaults to OBJECT_STORE_ENDPOINT
        #[arg(long, conflicts_with = "dir")]
        endpoint: Option<String>,

        /// Read buckets from subdirectories of this local directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Auth kind for the object store, detected from the environment by default
        #[arg(short, long, value_enum, conflicts_with = "dir")]
        auth: Option<AuthType>,

        /// Print the cleaned records as NDJSON instead of loading them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = dotenvy::from_filename(&cli.env)
        && !e.not_found()
    {
        return Err(e.into());
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    let policy = load_policy(cli.config.as_deref())?;

    let mut report = PipelineReport::default();
    let result = match cli.command {
        Commands::Local { path, dry_run } => {
            log::info!("Running sales job on {}", path.display().bright_black());
            let destination = Destination::from_env(dry_run)?;
            run_local(&path, &policy, destination, &mut report).await
        }
        Commands::Bucket {
            bucket,
            prefix,
            endpoint,
            dir,
            auth,
            dry_run,
        } => {
            log::info!(
                "Running sales job on bucket {} with prefix '{}'",
                bucket.cyan(),
                prefix.bright_black()
            );
            let source = match dir {
                Some(dir) => BucketSource::Directory(dir),
                None => BucketSource::Http { endpoint, auth },
            };
            let destination = Destination::from_env(dry_run)?;
            run_bucket(&bucket, &prefix, source, &policy, destination, &mut report).await
        }
    };

    print_summary(&report, result.is_ok());
    result
}

fn print_summary(report: &PipelineReport, succeeded: bool) {
    match succeeded {
        true => eprintln!(
            "{} {} record(s) from {} batch(es), {} loaded",
            "✓".green(),
            report.records.cyan(),
            report.batches.cyan(),
            report.loaded.green()
        ),
        false => eprintln!(
            "{} job failed after extracting {} batch(es), nothing loaded",
            "✗".red(),
            report.batches.cyan()
        ),
    }
    for failure in &report.failures {
        eprintln!("{} skipped {}", "✗".red(), failure.bright_black());
    }
}
