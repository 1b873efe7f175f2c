use chrono::Local;
use clap::{ArgGroup, Parser};
use env_logger::Env;
use log::debug;
use omni_autonomous_agent::{
    app_dirs::AppDirs, find_writable_target, install, view::View, AgentError, FileSessionStore,
    SessionStatus, SessionStore,
};
use std::{env, error::Error, process};

const DUMMY_REQUEST: &str = "Dummy session — testing omni-autonomous-agent";
const DUMMY_MINUTES: i64 = 60;

/// autonomous session manager for AI agents
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "omni-autonomous-agent",
    version,
    about,
    long_about = "Tracks a single time-boxed task session and shows a live countdown to its deadline."
)]
#[clap(group(
    ArgGroup::new("command")
        .required(true)
        .args(["add", "dummy", "status", "cancel", "install"])
))]
pub struct Cli {
    /// register a new session
    #[clap(long, requires_all = ["request", "duration"])]
    add: bool,

    /// register a dummy session for testing
    #[clap(long)]
    dummy: bool,

    /// show session status
    #[clap(long)]
    status: bool,

    /// cancel the active session
    #[clap(long, alias = "clear")]
    cancel: bool,

    /// install to PATH
    #[clap(long)]
    install: bool,

    /// task request (required with --add)
    #[clap(short = 'R', long, value_name = "REQUEST")]
    request: Option<String>,

    /// duration in minutes (required with --add)
    #[clap(short = 'D', long, value_name = "MINUTES", allow_negative_numbers = true)]
    duration: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add { request: String, duration: i64 },
    Dummy,
    Status,
    Cancel,
    Install,
}

impl Cli {
    fn action(self) -> Action {
        match (self.request, self.duration) {
            (Some(request), Some(duration)) if self.add => Action::Add { request, duration },
            _ if self.dummy => Action::Dummy,
            _ if self.cancel => Action::Cancel,
            _ if self.install => Action::Install,
            _ => Action::Status,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let action = Cli::parse().action();
    debug!("running {action:?}");

    if let Err(e) = run(action) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(action: Action) -> Result<(), Box<dyn Error>> {
    let store = FileSessionStore::new();
    let mut view = View::stdout();

    match action {
        Action::Add { request, duration } => {
            let record = store.create(&request, duration)?;
            view.session_registered(&record)?;
        }
        Action::Dummy => {
            let record = store.create(DUMMY_REQUEST, DUMMY_MINUTES)?;
            view.session_registered(&record)?;
        }
        Action::Status => {
            let status = store
                .load()
                .map(|record| SessionStatus::compute(&record, Local::now().naive_local()));
            view.status(status.as_ref())?;
        }
        Action::Cancel => {
            let existed = store.clear()?;
            view.cancelled(existed)?;
        }
        Action::Install => {
            let target = find_writable_target(&AppDirs::install_candidates())
                .ok_or(AgentError::NoWritableInstallTarget)?;
            let source =
                env::current_exe().map_err(AgentError::io("resolve", "current executable"))?;
            let result = install(&source, &target, env::var_os("PATH").as_deref())?;
            view.installed(&result, &target)?;
        }
    }
    Ok(())
}
