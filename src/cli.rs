mod connection;
mod report;
mod watch;

use std::time::Duration;

use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

pub use self::{connection::ConnectionArgs, report::ReportCommand};
use crate::{prelude::*, tui};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// Increase logging verbosity (`-v` info, `-vv` debug, `-vvv` trace).
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[clap(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub const fn max_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    pub async fn run(self) -> Result {
        let api = self.connection.try_build()?;
        match self.command {
            Command::Report(command) => {
                let output = command.render(&api, Local::now()).await?;
                println!("{output}");
            }
            Command::Watch(args) => {
                watch::run(&api, args.interval.into()).await?;
            }
            Command::Tui(args) => {
                tui::run(&api, args.refresh()).await?;
            }
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Command {
    #[command(flatten)]
    Report(ReportCommand),

    /// Live power monitor, redrawn until Ctrl+C.
    #[clap(name = "watch")]
    Watch(WatchArgs),

    /// Full-screen dashboard.
    #[clap(name = "tui")]
    Tui(TuiArgs),
}

#[derive(Parser)]
pub struct WatchArgs {
    /// Refresh interval, for example: `30s` or `1m`.
    #[clap(short, long, default_value = "30s", env = "OCTOPUS_WATCH_INTERVAL")]
    pub interval: humantime::Duration,
}

#[derive(Parser)]
pub struct TuiArgs {
    /// Data refresh interval, for example: `60s` or `5m`.
    #[clap(short, long, default_value = "60s", env = "OCTOPUS_TUI_REFRESH")]
    pub refresh: humantime::Duration,
}

impl TuiArgs {
    #[must_use]
    pub fn refresh(&self) -> Duration {
        self.refresh.into()
    }
}
