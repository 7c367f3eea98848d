mod display;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use revlens_client::{
    ClassifierClient, ColumnHints, DEFAULT_BASE_URL, FileSubmission, SubmissionRequest,
    TextSubmission, submit,
};
use revlens_core::{FlagKind, LabelTable, Session};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Log level used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG: &str = "info";

/// Review quality & relevancy checker
#[derive(Parser, Debug)]
#[command(name = "revlens", version, about)]
struct Cli {
    /// Classification backend base URL
    #[arg(long, env = "REVLENS_BACKEND_URL", default_value = DEFAULT_BASE_URL, global = true)]
    backend: String,

    /// Print the session view as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Map an extra backend label to a flag (e.g. "Spam=advertisement"); repeatable
    #[arg(long = "label-alias", value_name = "LABEL=FLAG", value_parser = parse_alias, global = true)]
    label_aliases: Vec<(String, FlagKind)>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a single pasted review
    Text {
        /// Review text
        text: String,
        #[arg(long)]
        place: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Classify every review in a CSV or Excel file
    File {
        path: PathBuf,
        #[command(flatten)]
        columns: ColumnArgs,
        /// Show details for the review with this id
        #[arg(long)]
        select: Option<String>,
    },
    /// Check the backend is up and its model is loaded
    Ping,
}

#[derive(Args, Debug)]
struct ColumnArgs {
    /// Column holding the review text
    #[arg(long)]
    text_column: Option<String>,
    #[arg(long)]
    place_column: Option<String>,
    #[arg(long)]
    user_column: Option<String>,
    #[arg(long)]
    timestamp_column: Option<String>,
}

impl From<ColumnArgs> for ColumnHints {
    fn from(a: ColumnArgs) -> Self {
        Self {
            text: a.text_column,
            place: a.place_column,
            user: a.user_column,
            timestamp: a.timestamp_column,
        }
    }
}

fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG))
}

fn parse_alias(s: &str) -> Result<(String, FlagKind), String> {
    let (label, flag) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected LABEL=FLAG, got '{s}'"))?;
    if label.is_empty() {
        return Err("label must not be empty".to_string());
    }
    let kind = flag.parse::<FlagKind>().map_err(|e| e.to_string())?;
    Ok((label.to_string(), kind))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("revlens v{}", env!("CARGO_PKG_VERSION"));
    let client = ClassifierClient::new(cli.backend);

    let (request, select) = match cli.command {
        Command::Ping => {
            let health = client
                .ping()
                .await
                .with_context(|| format!("pinging {}", client.base_url()))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                print!("{}", display::render_health(client.base_url(), &health, chrono::Utc::now()));
            }
            return Ok(());
        }
        Command::Text {
            text,
            place,
            user,
            timestamp,
        } => {
            let text = TextSubmission {
                text,
                place,
                user,
                timestamp,
            };
            (
                SubmissionRequest {
                    text: Some(text),
                    file: None,
                },
                None,
            )
        }
        Command::File {
            path,
            columns,
            select,
        } => {
            let file = FileSubmission {
                path,
                columns: columns.into(),
            };
            (
                SubmissionRequest {
                    text: None,
                    file: Some(file),
                },
                select,
            )
        }
    };

    let labels = cli
        .label_aliases
        .into_iter()
        .fold(LabelTable::default(), |table, (label, kind)| table.with_alias(label, kind));
    let mut session = Session::with_labels(labels);

    let outcome = submit(&client, &mut session, request).await;

    if let Some(id) = select
        && !session.select(&id)
    {
        warn!(id = %id, "no review with that id in this batch");
    }

    let view = session.view();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if outcome.is_ok() {
        display::print_session(&view, std::io::stdout().is_terminal());
    }

    let count = outcome.context("analysis failed")?;
    info!(count, "done");
    Ok(())
}
