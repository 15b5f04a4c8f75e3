//! HybridCrypt command-line client: run the key exchange and file encryption
//! workflow against a remote service, step by step or interactively.

use anyhow::{bail, ensure, Context, Result};
use clap::{Parser, Subcommand};
use hybridcrypt_contract::EncryptionMode;
use hybridcrypt_core::{
    config::ClientConfig,
    logging,
    perf::{self, PerformanceReport, TableRow},
    workflow::{
        self, ArtifactKind, WorkflowLevel, WorkflowReport, RESET_CONFIRMATION, RESET_DONE,
    },
    AlertKind, HybridResult, WorkflowCoordinator, WorkflowSettings,
};
use hybridcrypt_http::HttpGateway;
use log::debug;
use schemars::schema_for;
use serde_json::to_string_pretty;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod session;

fn load_cli_config(explicit: Option<&Path>, service_url: Option<String>) -> Result<ClientConfig> {
    let path = ClientConfig::resolve_path(explicit);
    let mut config = ClientConfig::load_or_bootstrap(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;

    if let Some(url) = service_url {
        config.service.base_url = url;
    }
    for issue in config.validate() {
        eprintln!("warning: {issue}");
    }
    debug!(
        "using service {} (config {})",
        config.service.base_url,
        config.path.display()
    );
    Ok(config)
}

fn build_gateway(config: &ClientConfig) -> Result<HttpGateway> {
    HttpGateway::new(&config.service.base_url, config.service_timeout())
        .with_context(|| format!("invalid service URL `{}`", config.service.base_url))
}

/// Top-level command-line options shared by every subcommand.
#[derive(Parser, Debug)]
#[command(
    name = "hybridcrypt",
    version,
    about = "Guided key generation, key exchange, and AES-192 file encryption against a HybridCrypt service."
)]
struct Cli {
    /// Path to the client configuration file (defaults to HYBRIDCRYPT_CONFIG or the user config dir).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the service base URL for this invocation.
    #[arg(long)]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate fresh keypairs for Alice and Bob.
    GenerateKeys {
        /// Print the full public keys as well.
        #[arg(long)]
        show_keys: bool,
    },

    /// Run the key exchange and derive the shared AES-192 key.
    ExchangeKeys,

    /// Upload a file and encrypt it.
    Encrypt {
        file: PathBuf,

        /// Block mode: gcm or cbc (defaults to workflow.default_mode).
        #[arg(long)]
        mode: Option<EncryptionMode>,

        /// Download the encrypted artifact afterwards.
        #[arg(long)]
        download: bool,

        /// Directory for downloaded artifacts.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Upload an encrypted package and decrypt it.
    Decrypt {
        file: PathBuf,

        /// Download the decrypted artifact afterwards.
        #[arg(long)]
        download: bool,

        /// Directory for downloaded artifacts.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Fetch an artifact produced by the service.
    Download {
        filename: String,

        /// Directory to write the artifact into.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show aggregated statistics and the operation log.
    Performance {
        /// Print the raw snapshot as JSON.
        #[arg(long)]
        json: bool,

        /// Also write a text bundle (HYBRIDCRYPT_EXPORT_DIR or Downloads unless --export-dir is set).
        #[arg(long)]
        export: bool,

        /// Directory for the exported bundle.
        #[arg(long, requires = "export")]
        export_dir: Option<PathBuf>,
    },

    /// Delete all keys, artifacts, and logs held by the service.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Run all four steps on one file without pausing.
    Walkthrough {
        file: PathBuf,

        #[arg(long)]
        mode: Option<EncryptionMode>,

        /// Directory for downloaded artifacts.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Interactive session with step navigation and timed auto-advance.
    Session,

    /// Print the JSON schema of the configuration file.
    ConfigSchema,

    /// Validate a configuration file.
    ConfigCheck {
        /// File to check (defaults to the resolved configuration path).
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,
    },
}

/// Entry point: parse arguments and surface errors with an exit code.
fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    logging::init("warn");
    let cli = Cli::parse();

    match cli.command {
        Commands::ConfigSchema => {
            let schema = schema_for!(ClientConfig);
            println!("{}", to_string_pretty(&schema)?);
            return Ok(());
        }
        Commands::ConfigCheck { file } => {
            let path = file.unwrap_or_else(|| ClientConfig::resolve_path(cli.config.as_deref()));
            let cfg = ClientConfig::load(&path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            let issues = cfg.validate();
            if issues.is_empty() {
                println!(
                    "Configuration valid (service={}, auto-advance={}ms, mode={}).",
                    cfg.service.base_url,
                    cfg.workflow.auto_advance_ms,
                    cfg.workflow.default_mode.as_str()
                );
                return Ok(());
            }
            for issue in &issues {
                println!("  [WARN] {issue}");
            }
            bail!("{} configuration issue(s) found", issues.len());
        }
        command => {
            let config = load_cli_config(cli.config.as_deref(), cli.service_url)?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            runtime.block_on(dispatch(command, config))
        }
    }
}

async fn dispatch(command: Commands, config: ClientConfig) -> Result<()> {
    let gateway = build_gateway(&config)?;
    let mut coordinator = WorkflowCoordinator::new(WorkflowSettings::from(&config));

    match command {
        Commands::GenerateKeys { show_keys } => {
            let outcome = coordinator.generate_keys(&gateway).await;
            print_panel(&coordinator.panels().keys.ready().map(|keys| keys.lines()));
            settle(outcome)?;
            if show_keys {
                let (alice, bob) = coordinator.panels().public_keys();
                println!("\nAlice public key:\n{alice}\n\nBob public key:\n{bob}");
            }
        }
        Commands::ExchangeKeys => {
            let outcome = coordinator.perform_key_exchange(&gateway).await;
            print_panel(&coordinator.panels().exchange.ready().map(|ex| ex.lines()));
            settle(outcome)?;
        }
        Commands::Encrypt {
            file,
            mode,
            download,
            out,
        } => {
            coordinator.set_encryption_mode(mode.unwrap_or(config.workflow.default_mode));
            let selected = coordinator.select_encrypt_file(&file)?;
            println!("{}", selected.describe());
            let outcome = coordinator.encrypt_file(&gateway).await;
            print_panel(&coordinator.panels().encryption.ready().map(|enc| enc.lines()));
            settle(outcome)?;
            if download {
                let dir = out.unwrap_or_else(|| config.download_dir());
                fetch_artifact(&coordinator, &gateway, ArtifactKind::Encrypted, &dir).await?;
            }
        }
        Commands::Decrypt {
            file,
            download,
            out,
        } => {
            let selected = coordinator.select_decrypt_file(&file)?;
            println!("{}", selected.describe());
            let outcome = coordinator.decrypt_file(&gateway).await;
            print_panel(&coordinator.panels().decryption.ready().map(|dec| dec.lines()));
            settle(outcome)?;
            if download {
                let dir = out.unwrap_or_else(|| config.download_dir());
                fetch_artifact(&coordinator, &gateway, ArtifactKind::Decrypted, &dir).await?;
            }
        }
        Commands::Download { filename, out } => {
            let dir = out.unwrap_or_else(|| config.download_dir());
            let saved = workflow::download_artifact(&gateway, &filename, &dir)
                .await
                .map_err(inline)?;
            println!(
                "Saved {} ({} bytes)\n  sha256 {}",
                saved.path.display(),
                saved.size,
                saved.sha256
            );
        }
        Commands::Performance {
            json,
            export,
            export_dir,
        } => {
            let report = perf::load_performance(&gateway).await.map_err(inline)?;
            if json {
                println!("{}", to_string_pretty(&report.snapshot)?);
            } else {
                print_performance(&report);
            }
            if export {
                let bundle = perf::bundle_snapshot(&report, export_dir)
                    .context("failed to write performance bundle")?;
                println!("Performance bundle written to {}", bundle.display());
            }
        }
        Commands::Reset { yes } => {
            let confirmed = yes || confirm(RESET_CONFIRMATION)?;
            if settle(coordinator.reset_system(&gateway, confirmed).await)? {
                println!("{} {RESET_DONE}", AlertKind::Success.tag());
            } else {
                println!("Reset aborted.");
            }
        }
        Commands::Walkthrough { file, mode, out } => {
            ensure!(file.is_file(), "{} is not a readable file", file.display());
            if let Some(mode) = mode {
                coordinator.set_encryption_mode(mode);
            }
            let dir = out.unwrap_or_else(|| config.download_dir());
            let report = workflow::walkthrough(&mut coordinator, &gateway, &file, &dir).await?;
            print_report(report);
        }
        Commands::Session => {
            session::run(&config, &gateway, &mut coordinator).await?;
        }
        Commands::ConfigSchema | Commands::ConfigCheck { .. } => {
            bail!("configuration commands do not contact the service")
        }
    }

    coordinator.teardown();
    Ok(())
}

/// Failures carry the same prefix the result panels use.
pub(crate) fn inline(err: hybridcrypt_core::HybridError) -> anyhow::Error {
    anyhow::anyhow!(err.inline_message())
}

pub(crate) fn settle<T>(outcome: HybridResult<T>) -> Result<T> {
    outcome.map_err(inline)
}

pub(crate) async fn fetch_artifact(
    coordinator: &WorkflowCoordinator,
    gateway: &HttpGateway,
    kind: ArtifactKind,
    dir: &Path,
) -> Result<()> {
    let Some(name) = coordinator.artifact(kind) else {
        bail!("no artifact available yet; run the matching step first");
    };
    let saved = workflow::download_artifact(gateway, name, dir)
        .await
        .map_err(inline)?;
    println!(
        "Saved {} ({} bytes)\n  sha256 {}",
        saved.path.display(),
        saved.size,
        saved.sha256
    );
    Ok(())
}

/// Ask a yes/no question on the terminal; anything but `y`/`yes` declines.
fn confirm(question: &str) -> Result<bool> {
    println!("{question}");
    print!("Proceed? [y/N] ");
    io::stdout().flush().ok();
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub(crate) fn print_panel(lines: &Option<Vec<String>>) {
    if let Some(lines) = lines {
        for line in lines {
            println!("  {line}");
        }
    }
}

pub(crate) fn print_performance(report: &PerformanceReport) {
    println!("Performance");
    for card in &report.view.cards {
        println!("  {:<18} {}", card.title, card.value);
    }
    println!("\nAverages");
    for (title, seconds) in perf::averages(&report.snapshot.statistics) {
        println!("  {title:<18} {seconds:.6}s");
    }
    println!("\nLog");
    for row in &report.view.rows {
        match row {
            TableRow::Entry(row) => println!(
                "  {:<32} {:<40} {}",
                row.operation, row.details, row.timestamp
            ),
            TableRow::Placeholder(text) => println!("  {text}"),
        }
    }
}

/// Pretty-print a workflow report so humans can follow along.
fn print_report(report: WorkflowReport) {
    println!("{}", report.title);
    for event in report.events {
        println!("  [{}] {}", level_tag(event.level), event.message);
    }
}

/// Short tag used when printing workflow severity levels.
fn level_tag(level: WorkflowLevel) -> &'static str {
    match level {
        WorkflowLevel::Info => "INFO",
        WorkflowLevel::Success => "OK",
        WorkflowLevel::Warn => "WARN",
    }
}
