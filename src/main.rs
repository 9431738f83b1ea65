mod bold;
mod cse;
mod locale;
mod pipeline;
mod table;

pub const USER_AGENT: &str = concat!("serp-bold/", env!("CARGO_PKG_VERSION"));

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::{error, info, warn};

use cse::{CseClient, Credentials};
use locale::{Country, Language, Locale};
use pipeline::{EnrichmentPipeline, FailurePolicy};
use table::Table;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Per-request timeout covering connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Enrich a CSV of search queries with the top 3 SERP titles and the bolded
/// terms Google highlights in result snippets.
///
/// Credentials are read from `GOOGLE_API_KEY` and `CUSTOM_SEARCH_ENGINE_ID`.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// CSV file whose first column holds the queries
    #[arg(required_unless_present = "list_locales")]
    input: Option<PathBuf>,

    /// Write the enriched CSV here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Country to geolocate results to
    #[arg(long, value_enum, default_value_t)]
    country: Country,

    /// Language to restrict results to
    #[arg(long, value_enum, default_value_t)]
    language: Language,

    /// Keep processing when a row's search fails, leaving that row empty
    #[arg(long)]
    keep_going: bool,

    /// Print the selectable countries and languages, then exit
    #[arg(long)]
    list_locales: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("serp_bold=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    run(cli)
        .await
        .inspect_err(|e| error!("{e}"))
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.list_locales {
        print!("{}", locale::describe_options());
        return Ok(());
    }
    let Some(input) = cli.input else {
        return Err("no input file given".into());
    };

    let credentials = Credentials::from_env()?;
    let locale = Locale::new(cli.country, cli.language);
    let policy = if cli.keep_going {
        FailurePolicy::Isolate
    } else {
        FailurePolicy::Abort
    };

    let table = Table::read_from(BufReader::new(File::open(&input)?))?;
    info!(
        input = %input.display(),
        rows = table.len(),
        columns = table.headers().len(),
        %locale,
        "starting enrichment"
    );
    if table.is_empty() {
        warn!("input has a header row but no data rows");
    }

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let client = CseClient::new(http, credentials).with_strict_errors(cli.keep_going);
    let pipeline = EnrichmentPipeline::new(client, locale).with_policy(policy);

    let report = pipeline.process(table).await?;

    info!(
        rows = report.table.len(),
        searched = report.searched,
        skipped = report.skipped,
        failed = report.failed_rows.len(),
        "enrichment complete"
    );

    match cli.output {
        Some(path) => {
            report.table.write_to(BufWriter::new(File::create(&path)?))?;
            info!(output = %path.display(), "wrote enriched table");
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            report.table.write_to(&mut lock)?;
            lock.flush()?;
        }
    }

    Ok(())
}
