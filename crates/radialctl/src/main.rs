#![warn(missing_docs)]

//! Entry point for the `radialctl` binary.

mod check;
mod cli;
mod error;
mod send;

use std::{path::Path, process};

use clap::Parser;
use radial_config::Config;
use tokio::runtime;
use tracing::{error, info};

use crate::{
    cli::{Cli, Commands},
    error::Result,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli { log, command } = Cli::parse();
    logging::init(&log);
    let rt = runtime::Builder::new_current_thread().enable_time().build()?;

    match command {
        Commands::Check(args) => {
            let cfg = load_config(args.config.as_deref())?;
            check::run(rt.handle(), &cfg, &args.ctx.context())
        }
        Commands::Send(args) => {
            let cfg = load_config(args.config.as_deref())?;
            send::run(&rt, &cfg, &args)
        }
        Commands::Default => {
            print!("{}", Config::default().to_ron()?);
            Ok(())
        }
    }
}

/// Load `path`, or the per-user config if present, or the defaults.
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(p) = path {
        return Ok(radial_config::load_from_path(p)?);
    }
    let p = radial_config::default_config_path();
    if p.exists() {
        Ok(radial_config::load_from_path(&p)?)
    } else {
        info!(path = %p.display(), "config_missing_using_defaults");
        Ok(Config::default())
    }
}
