use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use autoform::mail::{DeliveryMetadata, Notifier, SmtpNotifier};
use autoform::server::{self, TriggerState};
use autoform::{ChromeLauncher, FieldOutcome, FormConfig, FormSession, InputRecord, MismatchPolicy};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill and submit the form once, saving a confirmation screenshot
    Fill(FillArgs),
    /// Send the submission email once
    Notify {
        /// JSON file overriding the default delivery metadata
        #[arg(long)]
        metadata: Option<PathBuf>,
    },
    /// Serve the HTTP trigger for the submission email
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 5000)]
        port: u16,
        /// JSON file overriding the default delivery metadata
        #[arg(long)]
        metadata: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct FillArgs {
    /// JSON record: {"values": [...], "address": "..."}
    #[arg(long)]
    record: Option<PathBuf>,
    /// Answer for the next question, in form order (repeatable)
    #[arg(long = "value", value_name = "VALUE")]
    values: Vec<String>,
    /// Text for the address area
    #[arg(long)]
    address: Option<String>,
    /// Where to write the confirmation screenshot
    #[arg(long)]
    artifact: Option<PathBuf>,
    /// Show the browser window
    #[arg(long)]
    headful: bool,
    /// Abort when the record and the form differ in length
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Fill(args) => fill(args).await,
        Command::Notify { metadata } => notify(metadata).await,
        Command::Serve {
            host,
            port,
            metadata,
        } => serve(host, port, metadata).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_metadata(path: Option<PathBuf>) -> autoform::Result<DeliveryMetadata> {
    match path {
        Some(path) => DeliveryMetadata::load(path),
        None => Ok(DeliveryMetadata::default()),
    }
}

async fn fill(args: FillArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut record = match args.record {
        Some(path) => InputRecord::load(path)?,
        None => InputRecord::new(Vec::<String>::new()),
    };
    record.values.extend(args.values);
    if let Some(address) = args.address {
        record.address = address;
    }
    if record.is_empty() {
        return Err("no answers given; pass --record or --value".into());
    }

    let mut config = FormConfig::from_env();
    if let Some(path) = args.artifact {
        config = config.artifact_path(path);
    }
    if args.strict {
        config = config.mismatch(MismatchPolicy::Strict);
    }

    let launcher = ChromeLauncher::builder().headless(!args.headful).build();
    let report = FormSession::new(launcher, config).run(&record).await?;

    for field in &report.fields {
        let outcome = match &field.outcome {
            FieldOutcome::Filled { value } => format!("filled with {value:?}"),
            FieldOutcome::TimedOut => "timed out".to_string(),
            FieldOutcome::Failed(reason) => format!("failed: {reason}"),
            FieldOutcome::Skipped => "skipped".to_string(),
        };
        println!("field {} ({:?}, {:?}): {outcome}", field.ordinal, field.role, field.strategy);
    }
    if let Some(ref address) = report.address {
        println!("address: {address:?}");
    }
    if let Some(ref artifact) = report.artifact {
        println!("confirmation saved to {} ({} bytes)", artifact.path.display(), artifact.bytes);
    }

    match report.failure {
        Some(e) => {
            eprintln!("run failed: {e}");
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

async fn notify(metadata: Option<PathBuf>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let metadata = load_metadata(metadata)?;
    let message = SmtpNotifier.deliver(&metadata).await?;
    println!("{message}");
    Ok(ExitCode::SUCCESS)
}

async fn serve(
    host: String,
    port: u16,
    metadata: Option<PathBuf>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let metadata = load_metadata(metadata)?;
    let state = TriggerState::new(Arc::new(SmtpNotifier), metadata);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "trigger endpoint listening");
    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(ExitCode::SUCCESS)
}
