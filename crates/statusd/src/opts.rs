use clap::Parser;

/// Struct that gets generated from `RawOpt`.
#[derive(Debug, PartialEq)]
pub struct Opt {
    pub log_debug: bool,
    pub no_daemonize: bool,
    pub action: Action,
}

#[derive(Parser, Debug, PartialEq)]
#[command(name = "statusd", version, about)]
struct RawOpt {
    /// Write out debug logs. (To read the logs, run `statusd logs`).
    #[arg(long = "debug", global = true)]
    log_debug: bool,

    /// Keep the daemon attached to the terminal instead of forking into the
    /// background.
    #[arg(long = "no-daemonize", global = true)]
    no_daemonize: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(clap::Subcommand, Debug, PartialEq)]
pub enum Action {
    /// Start the statusd daemon.
    #[command(name = "daemon", alias = "d")]
    Daemon,

    /// Send a numeric update request to the running daemon.
    #[command(name = "send", alias = "s")]
    Send {
        /// Index into the daemon's request table.
        id: u32,
    },

    /// Ask the running daemon to shut down (same as `send 0`).
    #[command(name = "kill", alias = "k")]
    Kill,

    /// Print and watch the statusd logs.
    #[command(name = "logs")]
    Logs,
}

impl Opt {
    pub fn from_env() -> Self {
        let raw: RawOpt = RawOpt::parse();
        raw.into()
    }
}

impl From<RawOpt> for Opt {
    fn from(raw: RawOpt) -> Self {
        let RawOpt { log_debug, no_daemonize, action } = raw;
        Opt { log_debug, no_daemonize, action }
    }
}
