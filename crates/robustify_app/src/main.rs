mod clipboard;
mod config;
mod effects;
mod input;
mod render;
mod session;

use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use robustify_core::{AppState, HrefField, LdnStatus, Msg, RunPhase};
use robustify_engine::{write_atomic, EngineHandle, RobustifyRecord};
use robustify_logging::robustify_info;

use crate::clipboard::SystemClipboard;
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::render::{render_page, TerminalRenderer};
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "robustify", version, about = "Turn the links of a document into robust links")]
struct Cli {
    /// Config file (default: ./robustify.ron when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the robustify server
    #[arg(long, global = true)]
    server: Option<String>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log destination: terminal, file or both
    #[arg(long, global = true)]
    log_to: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Robustify URLs and stream the results
    Run(RunArgs),
    /// Fetch, preview or send the Linked Data Notification of a document
    Ldn {
        #[command(subcommand)]
        action: LdnAction,
    },
    /// Print the stored URI-R to URI-M records of a document
    Mappings {
        #[arg(long)]
        key: String,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Document key (the hash of the PDF)
    #[arg(long)]
    key: String,

    /// URLs to robustify; each argument becomes one row
    uris: Vec<String>,

    /// File with one row of whitespace-separated URLs per line ('-' for stdin)
    #[arg(long)]
    uris_file: Option<PathBuf>,

    /// Robustify only this row (0-based) instead of every row
    #[arg(long)]
    row: Option<usize>,

    /// Write the results page to this HTML file
    #[arg(long)]
    html: Option<PathBuf>,

    /// Copy every URI-R or URI-M link to the clipboard after the run
    #[arg(long, value_enum)]
    copy: Option<CopyField>,

    /// Keep only the shortest of URLs that contain one another
    #[arg(long)]
    drop_overlapping: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CopyField {
    UriR,
    UriM,
}

impl From<CopyField> for HrefField {
    fn from(field: CopyField) -> Self {
        match field {
            CopyField::UriR => HrefField::UriR,
            CopyField::UriM => HrefField::UriM,
        }
    }
}

#[derive(Subcommand, Debug)]
enum LdnAction {
    /// Print the LDN
    Get(LdnArgs),
    /// Fetch the LDN and print the URL of its preview page
    Preview(LdnArgs),
    /// Deliver the LDN to the LD server's inbox
    Send(LdnArgs),
}

#[derive(Args, Debug)]
struct LdnArgs {
    #[arg(long)]
    key: String,

    /// LD server URL (falls back to `ld_server_url` in the config)
    #[arg(long)]
    ld_server: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(destination) = cli.log_to {
        config.log_destination = destination;
    }
    robustify_logging::initialize(
        config.log_destination()?,
        config.log_level()?,
        &config.log_file,
    );
    robustify_info!("Using robustify server {}", config.server_url);

    let engine = EngineHandle::new(config.client_settings()?)?;
    let runner = EffectRunner::new(engine, Box::new(SystemClipboard::default()));

    match cli.cmd {
        Commands::Run(args) => run(runner, &config, args),
        Commands::Ldn { action } => ldn(runner, &config, action),
        Commands::Mappings { key } => mappings(runner, &config, &key),
    }
}

fn terminal_session(state: AppState, runner: EffectRunner) -> Session<Stdout> {
    Session::new(state, runner, TerminalRenderer::new(io::stdout()))
}

fn run(runner: EffectRunner, config: &AppConfig, args: RunArgs) -> Result<()> {
    let mut filter = config.row_filter()?;
    filter.drop_overlapping |= args.drop_overlapping;
    let build = input::collect_rows(&args.uris, args.uris_file.as_deref(), &filter)?;
    let row_count = build.rows.len();
    let mut session = terminal_session(AppState::with_rows(&args.key, build.rows), runner);

    match args.row {
        Some(row) if row >= row_count => bail!("row {row} does not exist ({row_count} rows)"),
        Some(row) => session.dispatch(Msg::RobustifyGroup { row })?,
        None => {
            session.dispatch(Msg::SelectAllToggled(true))?;
            session.dispatch(Msg::RobustifySelected)?;
        }
    }
    let phase = session.wait_for_run()?;

    if let Some(field) = args.copy {
        session.dispatch(Msg::CopyAllClicked {
            field: field.into(),
        })?;
    }
    if let Some(path) = &args.html {
        write_page(&session, path)?;
    }

    match phase {
        RunPhase::Failed => Err(anyhow!(
            "robustify failed: {}",
            session
                .view()
                .last_error
                .unwrap_or_else(|| "unknown error".to_string())
        )),
        _ => Ok(()),
    }
}

fn write_page(session: &Session<Stdout>, path: &Path) -> Result<()> {
    let page = render_page(&session.view(), &Utc::now().to_rfc3339());
    let written = write_atomic(path, &page)
        .with_context(|| format!("writing {}", path.display()))?;
    robustify_info!("Wrote results page {}", written.display());
    Ok(())
}

fn ldn(runner: EffectRunner, config: &AppConfig, action: LdnAction) -> Result<()> {
    let (args, request) = match action {
        LdnAction::Get(args) => (args, Msg::LdnRequested),
        LdnAction::Preview(args) => (args, Msg::LdnPreviewRequested),
        LdnAction::Send(args) => (args, Msg::LdnSendRequested),
    };
    let ld_server = args
        .ld_server
        .or_else(|| config.ld_server_url.clone())
        .unwrap_or_default();

    let mut session = terminal_session(AppState::new(&args.key), runner);
    session.dispatch(Msg::LdServerUrlChanged(ld_server))?;
    if matches!(request, Msg::LdnPreviewRequested) {
        // Previewing needs the LDN text first.
        session.dispatch(Msg::LdnRequested)?;
        if session.wait_for_ldn()? != LdnStatus::Loaded {
            return ldn_outcome(&mut session);
        }
    }
    session.dispatch(request)?;
    ldn_outcome(&mut session)
}

fn ldn_outcome(session: &mut Session<Stdout>) -> Result<()> {
    match session.wait_for_ldn()? {
        LdnStatus::Failed(message) => bail!("LDN request failed: {message}"),
        LdnStatus::Idle => bail!("LDN request was not sent"),
        _ => Ok(()),
    }
}

fn mappings(mut runner: EffectRunner, config: &AppConfig, key: &str) -> Result<()> {
    let timeout = Duration::from_secs(config.request_timeout_secs.max(1) + 5);
    let mappings = runner
        .fetch_mappings(key, timeout)
        .map_err(|message| anyhow!("fetching mappings failed: {message}"))?;

    for (uri, record) in &mappings {
        match record {
            RobustifyRecord::Passed { href_uri_m, .. } => {
                println!("PASS {uri}\n  URI-M: {href_uri_m}")
            }
            RobustifyRecord::Failed { error, .. } => {
                println!("FAIL {uri}\n  Error: {error}")
            }
        }
    }
    println!("{} records", mappings.len());
    Ok(())
}
