#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod prelude;
mod quantity;
mod render;
mod tables;
mod tui;

use clap::{Parser, crate_version};

use crate::{cli::Args, prelude::*};

/// Per-user settings, loaded after the working directory's `.env`.
const USER_ENV_FILE: &str = ".octopus.env";

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(USER_ENV_FILE));
    }

    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(args.max_level())
        .without_time()
        .compact()
        .init();
    info!(version = crate_version!(), "starting…");

    args.run().await
}
