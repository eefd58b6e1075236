mod cli;
mod config;
mod form;
mod identity;
mod journal;
mod render;
mod session;
mod store;
mod user;
mod view;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster", about = "Manage the users of a REST collection")]
pub struct Args {
    #[arg(
        short = 'c',
        long = "command",
        value_name = "LINE",
        action = clap::ArgAction::Append,
        help = "Run a command and exit (repeatable, run in order)"
    )]
    pub commands: Vec<String>,

    #[arg(long, env = "ROSTER_BASE_URL", help = "Base URL of the REST service")]
    pub base_url: Option<String>,

    #[arg(long, env = "ROSTER_RESOURCE", help = "Collection path under the base URL")]
    pub resource: Option<String>,

    #[arg(long, value_name = "MS", help = "Request timeout in milliseconds")]
    pub timeout_ms: Option<u64>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Session journal directory")]
    pub journal_dir: Option<PathBuf>,

    #[arg(long, help = "Do not write a session journal")]
    pub no_journal: bool,

    #[arg(long, help = "Print the effective configuration and exit")]
    pub show_config: bool,

    #[arg(long, help = "Enable tracing of requests and identity changes")]
    pub trace: bool,

    #[arg(long, help = "Debug output (print settings at startup)")]
    pub debug: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load()?
    };

    // CLI flags and env override files
    if let Some(base_url) = &args.base_url {
        cfg.remote.base_url = base_url.clone();
    }
    if let Some(resource) = &args.resource {
        cfg.remote.resource = resource.clone();
    }
    if args.timeout_ms.is_some() {
        cfg.remote.timeout_ms = args.timeout_ms;
    }
    if let Some(dir) = &args.journal_dir {
        cfg.journal.dir = dir.clone();
    }
    if args.no_journal {
        cfg.journal.enabled = false;
    }

    if let Err(errors) = cfg.validate() {
        for e in &errors {
            eprintln!("Config error {}", e);
        }
        return Err(anyhow::anyhow!(
            "Invalid configuration ({} errors)",
            errors.len()
        ));
    }

    if args.show_config {
        print!("{}", toml::to_string_pretty(&cfg)?);
        return Ok(());
    }

    if args.debug {
        eprintln!("[DEBUG] Base URL: {}", cfg.remote.base_url);
        eprintln!("[DEBUG] Resource: {}", cfg.remote.resource);
        eprintln!("[DEBUG] Timeout: {:?}", cfg.remote.timeout_ms);
        eprintln!(
            "[DEBUG] Journal: {}",
            if cfg.journal.enabled {
                cfg.journal.dir.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    let journal = if cfg.journal.enabled {
        let mut journal =
            journal::Journal::create(&cfg.journal.dir, &session_id, &cfg.remote.base_url)?;
        journal.session_start(&cfg.remote.resource)?;
        Some(journal)
    } else {
        None
    };

    let store = store::RemoteStore::from_config(&cfg.remote);
    let ctx = cli::Context {
        config: cfg,
        session_id,
        session: RefCell::new(session::Session::new(store)),
        journal: RefCell::new(journal),
        tracing: RefCell::new(args.trace),
    };

    // A failed initial fetch leaves the list empty; the user can `refresh`.
    if let Err(e) = cli::refresh(&ctx) {
        cli::report_error(&ctx, &cli::Command::Refresh, &e);
    }

    if args.commands.is_empty() {
        cli::run_repl(ctx)
    } else {
        cli::run_once(&ctx, &args.commands)
    }
}
