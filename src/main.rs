use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use reqwest::Client;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use rankgrid::{
    build_matrix, build_report,
    fetch::{fetch_rank_table, Platform, SheetSource},
    process::{group_rank_columns, load_rank_csv_path, DateParser, RawTable},
    range::RangeRequest,
    report::trend,
    Config, ReportMode,
};

#[derive(Parser)]
#[command(name = "rankgrid")]
#[command(about = "Keyword rank buckets and movement from a wide rank sheet")]
#[command(version)]
struct Cli {
    /// YAML config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging for rankgrid
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SourceArgs {
    /// CSV export of the rank sheet
    #[arg(long, conflicts_with = "sheet_url", required_unless_present = "sheet_url")]
    csv: Option<PathBuf>,

    /// Google Sheet share URL; the platform's tab is downloaded as CSV
    #[arg(long)]
    sheet_url: Option<String>,

    #[arg(long, value_enum, default_value_t = Platform::Android)]
    platform: Platform,
}

#[derive(Args)]
struct DateArgs {
    /// Single end date: buckets on it, movement against the date before it
    #[arg(long, conflicts_with_all = ["start", "end", "preset", "latest", "previous"])]
    end_date: Option<String>,

    /// Range start (inclusive), with --end
    #[arg(long, requires = "end", conflicts_with_all = ["preset", "latest", "previous"])]
    start: Option<String>,

    /// Range end (inclusive), with --start
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Named range such as "Last 30 days"
    #[arg(long, conflicts_with_all = ["latest", "previous"])]
    preset: Option<String>,

    /// Comparison: latest date, with --previous
    #[arg(long, requires = "previous")]
    latest: Option<String>,

    /// Comparison: previous date, with --latest
    #[arg(long, requires = "latest")]
    previous: Option<String>,
}

impl DateArgs {
    /// `None` when no date flag was given.
    fn mode(&self, parser: &DateParser) -> Result<Option<ReportMode>> {
        let mode = match (
            &self.end_date,
            &self.start,
            &self.end,
            &self.preset,
            &self.latest,
            &self.previous,
        ) {
            (Some(end), ..) => ReportMode::EndDate {
                end: parser.parse_user(end)?,
            },
            (None, Some(start), Some(end), ..) => ReportMode::Range {
                request: RangeRequest::Between {
                    start: parser.parse_user(start)?,
                    end: parser.parse_user(end)?,
                },
            },
            (None, None, None, Some(preset), ..) => ReportMode::Range {
                request: RangeRequest::Preset(preset.clone()),
            },
            (None, None, None, None, Some(latest), Some(previous)) => ReportMode::Compare {
                latest: parser.parse_user(latest)?,
                previous: parser.parse_user(previous)?,
            },
            (None, None, None, None, None, None) => return Ok(None),
            _ => bail!("incomplete date selection; see --help"),
        };
        Ok(Some(mode))
    }
}

#[derive(Subcommand)]
enum Command {
    /// Bucket and movement summary
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        dates: DateArgs,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Rank history of one keyword
    Trend {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        dates: DateArgs,
        #[arg(long)]
        keyword: String,
        #[arg(long)]
        json: bool,
    },
    /// Show how rank column headers resolved to dates
    Headers {
        #[command(flatten)]
        source: SourceArgs,
    },
}

async fn load_table(source: &SourceArgs, config: &Config) -> Result<RawTable> {
    match (&source.csv, &source.sheet_url) {
        (Some(path), _) => load_rank_csv_path(path),
        (None, Some(url)) => {
            let sheet = SheetSource::from_url(url, source.platform, &config.sheet)?;
            info!(platform = %source.platform, sheet = %sheet.sheet_id, "fetching sheet");
            fetch_rank_table(&Client::new(), &sheet).await
        }
        (None, None) => bail!("one of --csv or --sheet-url is required"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ─── 1) init logging ─────────────────────────────────────────────
    let default_filter = if cli.verbose {
        "warn,rankgrid=debug"
    } else {
        "warn,rankgrid=info"
    };
    let env =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr) // stdout is for the report
        .init();

    // ─── 2) config ───────────────────────────────────────────────────
    let config = Config::load_or_default(cli.config.as_deref())?;
    let today: NaiveDate = chrono::Local::now().date_naive();

    match cli.command {
        Command::Report {
            source,
            dates,
            json,
        } => {
            let mode = dates.mode(&config.user_date_parser())?;
            let table = load_table(&source, &config).await?;
            let matrix = build_matrix(&table, &config);

            let mode = mode.unwrap_or_else(|| match matrix.latest_date() {
                Some(end) => ReportMode::EndDate { end },
                None => ReportMode::Range {
                    request: RangeRequest::Between {
                        start: NaiveDate::MIN,
                        end: NaiveDate::MAX,
                    },
                },
            });
            let report = build_report(&matrix, &mode, &config, today);

            if json {
                println!("{}", serde_json::to_string_pretty(&report.to_json())?);
            } else {
                print!("{}", report);
            }
        }

        Command::Trend {
            source,
            dates,
            keyword,
            json,
        } => {
            let request = match dates.mode(&config.user_date_parser())? {
                Some(mode) => mode.trend_request(),
                None => RangeRequest::Between {
                    start: NaiveDate::MIN,
                    end: NaiveDate::MAX,
                },
            };
            let table = load_table(&source, &config).await?;
            let matrix = build_matrix(&table, &config);
            let points = trend(&matrix, &keyword, &request, &config, today)
                .with_context(|| format!("trend for `{}`", keyword))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                println!("Rank trend for {}", keyword.trim());
                for p in &points {
                    match p.rank {
                        Some(rank) => println!("  {}  {:>4}", p.date.format("%m-%d-%Y"), rank),
                        None => println!("  {}  {:>4}", p.date.format("%m-%d-%Y"), "-"),
                    }
                }
            }
        }

        Command::Headers { source } => {
            let table = load_table(&source, &config).await?;
            let groups = group_rank_columns(
                table.rank_columns(config.metadata_column_count),
                &config.date_parser(),
            );

            println!("{} dates from rank columns", groups.len());
            for (date, columns) in groups.iter() {
                let headers: Vec<String> = columns
                    .iter()
                    .map(|&c| format!("{:?}", table.headers[c]))
                    .collect();
                println!("  {}  <- {}", date.format("%m-%d-%Y"), headers.join(", "));
            }
            if !groups.excluded().is_empty() {
                println!("{} excluded headers", groups.excluded().len());
                for ex in groups.excluded() {
                    println!("  column {:>3}: {:?}", ex.column, ex.header);
                }
            }
        }
    }

    Ok(())
}
