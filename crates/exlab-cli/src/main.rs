//! Command-line front end for the experiment service.
//!
//! Each invocation plays one screen of the workflow: authenticate, upload a
//! dataset, configure and submit a run, then inspect results or history.
//! The credential and active dataset id persist in a session file between
//! invocations (`EXLAB_STATE_DIR`, default `.exlab`).

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use exlab_client::prelude::*;
use exlab_client::init_observability;

#[derive(Parser)]
#[command(name = "exlab")]
#[command(about = "Run supervised-learning experiments against a remote training service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the bearer credential.
    Login { email: String, password: String },
    /// Register a new account, then log in separately.
    Register { email: String, password: String },
    /// Drop the stored credential and dataset reference.
    Logout,
    /// Upload a CSV/XLSX dataset and make it the active dataset.
    Upload {
        /// Path to the dataset file.
        file: PathBuf,
    },
    /// Configure and submit a training run on the active dataset.
    Run {
        /// Target column to predict.
        #[arg(long)]
        target: String,
        /// Comma-separated feature columns. Defaults to every other column
        /// when the dataset schema is available.
        #[arg(long)]
        features: Option<String>,
        /// Test split fraction, clamped to 0.1..=0.9.
        #[arg(long)]
        split: Option<f64>,
        /// Algorithm override; otherwise the recommendation applies.
        #[arg(long)]
        algorithm: Option<String>,
    },
    /// Show one run's status, metrics, and plots.
    Results {
        id: String,
        /// Write the rendered report document to this path.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write decoded plot images into this directory.
        #[arg(long)]
        plots: Option<PathBuf>,
    },
    /// List all runs, newest first.
    History,
}

fn session_path() -> PathBuf {
    let dir = std::env::var("EXLAB_STATE_DIR").unwrap_or_else(|_| ".exlab".to_string());
    PathBuf::from(dir).join("session.json")
}

fn workflow_for(screen: Screen) -> Result<ExperimentWorkflow, ClientError> {
    let store = SessionStore::open(session_path());
    let navigator = Arc::new(MemoryNavigator::starting_at(screen));
    let transport = Arc::new(ReqwestTransport::new(ServiceConfig::from_env())?);
    let gateway = ApiGateway::new(transport, store, navigator.clone());
    Ok(ExperimentWorkflow::new(gateway, navigator))
}

fn band_marker(band: QualityBand) -> &'static str {
    match band {
        QualityBand::Good => "good",
        QualityBand::Middling => "middling",
        QualityBand::Poor => "poor",
    }
}

fn print_record(record: &RunRecord) {
    println!("run {}", record.id);
    println!("  status:    {}", record.status);
    if let Some(algorithm) = record.algorithm.as_deref() {
        println!("  algorithm: {}", algorithm.replace('_', " "));
    }
    if let Some(target) = record.target.as_deref() {
        println!("  target:    {target}");
    }
    if let Some(created) = record.created_at {
        println!("  created:   {}", created.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if !record.has_result() {
        println!("  no result yet");
        return;
    }
    if let Some(metrics) = record.metrics.as_ref() {
        println!("  metrics:");
        for (name, value) in metrics {
            if name == "r2" {
                let band = band_marker(exlab_client::band_for_r2(*value));
                println!("    {name}: {value:.4} ({band})");
            } else {
                println!("    {name}: {value:.4}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_observability();
    let cli = Cli::parse();

    match cli.command {
        Command::Login { email, password } => {
            let workflow = workflow_for(Screen::Auth)?;
            workflow.login(&email, &password).await?;
            println!("logged in as {email}");
        }
        Command::Register { email, password } => {
            let workflow = workflow_for(Screen::Auth)?;
            workflow.register(&email, &password).await?;
            println!("registered {email}; run `exlab login` next");
        }
        Command::Logout => {
            let workflow = workflow_for(Screen::Auth)?;
            workflow.logout();
            println!("logged out");
        }
        Command::Upload { file } => {
            let workflow = workflow_for(Screen::Upload)?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| ClientError::validation("dataset path has no file name"))?
                .to_string();
            let bytes = std::fs::read(&file)?;
            let dataset_id = workflow.upload_dataset(&file_name, bytes).await?;
            println!("uploaded {file_name}, dataset id {dataset_id}");
        }
        Command::Run {
            target,
            features,
            split,
            algorithm,
        } => {
            let workflow = workflow_for(Screen::Configure)?;
            let context = workflow.configure_context().await;
            let mut draft = context.draft;
            let dtypes = context
                .schema
                .as_ref()
                .map(|schema| schema.dtypes.clone())
                .unwrap_or_default();

            if let Some(rec) = draft.set_target(&target, &dtypes) {
                println!("mode: {} (recommended: {})", rec.mode, rec.algorithm);
                let offered = context.catalog.names_for(rec.mode).join(", ");
                println!("available algorithms: {offered}");
            }
            match (features, context.schema.as_ref()) {
                (Some(list), _) => draft.set_features_from_list(&list),
                (None, Some(schema)) => {
                    for column in &schema.columns {
                        draft.add_feature(column.clone());
                    }
                }
                (None, None) => {}
            }
            if let Some(split) = split {
                draft.set_split(split);
            }
            if let Some(algorithm) = algorithm {
                draft.set_algorithm(algorithm);
            }

            let run_id = workflow.submit(&draft).await?;
            println!("run {run_id} submitted; `exlab results {run_id}` to inspect");
        }
        Command::Results { id, report, plots } => {
            let workflow = workflow_for(Screen::Results(id.clone()))?;
            let record = workflow.run_results(&id).await?;
            print_record(&record);

            if let Some(dir) = plots {
                std::fs::create_dir_all(&dir)?;
                for (index, image) in record.decode_plots()?.iter().enumerate() {
                    let path = dir.join(format!("plot_{index}.png"));
                    std::fs::write(&path, image)?;
                    println!("wrote {}", path.display());
                }
            }
            if let Some(path) = report {
                let body = workflow.download_report(&id).await?;
                std::fs::write(&path, &body)?;
                println!("wrote {}", path.display());
            }
        }
        Command::History => {
            let workflow = workflow_for(Screen::History)?;
            let records = workflow.run_history().await?;
            if records.is_empty() {
                println!("no runs yet; upload a dataset and submit one");
                return Ok(());
            }
            for record in &records {
                let target = record.target.as_deref().unwrap_or("-");
                let r2 = record
                    .metric("r2")
                    .map(|v| format!("{v:.3}"))
                    .unwrap_or_else(|| "-".to_string());
                let created = record
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<8} {:<10} {:<16} r2={:<8} {}",
                    record.id, record.status, target, r2, created
                );
            }
        }
    }
    Ok(())
}
