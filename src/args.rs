//! This module defines the command line arguments Plenum accepts.

use std::path::PathBuf;

use termcolor::ColorChoice;

use crate::{cmd, db::cmd::DbCommand};


#[derive(Debug, clap::Parser)]
#[clap(about = "Backend of the Plenum event portal.")]
pub(crate) struct Args {
    #[clap(subcommand)]
    pub(crate) cmd: Command,

    /// Whether to use colors and other escape sequences in the terminal
    /// output.
    #[clap(long, global = true, value_enum, default_value = "auto")]
    pub(crate) color: ColorOption,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Command {
    /// Checks the configuration, the DB connection and the API to find
    /// problems in Plenum's environment.
    ///
    /// Useful for updates as you can catch many errors early, without
    /// touching the running process. Exits with 0 if everything is Ok, and
    /// with 1 otherwise.
    Check {
        #[clap(flatten)]
        shared: Shared,
    },

    /// Database operations.
    Db {
        #[clap(subcommand)]
        cmd: DbCommand,

        #[clap(flatten)]
        shared: Shared,
    },

    /// Outputs a template for the configuration file (which includes
    /// descriptions of all options).
    WriteConfig {
        /// Target file. If not specified, the template is written to stdout.
        target: Option<PathBuf>,
    },

    /// Exports the API as GraphQL schema.
    ExportApiSchema {
        #[clap(flatten)]
        args: cmd::export_api_schema::Args,
    },
}

#[derive(Debug, clap::Args)]
pub(crate) struct Shared {
    /// Path to the configuration file. If this is not specified, Plenum will
    /// try opening `config.toml` or `/etc/plenum/config.toml`.
    #[clap(short, long)]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum ColorOption {
    Auto,
    Always,
    Never,
}

impl Args {
    pub(crate) fn color_choice(&self) -> ColorChoice {
        match self.color {
            ColorOption::Auto => ColorChoice::Auto,
            ColorOption::Always => ColorChoice::Always,
            ColorOption::Never => ColorChoice::Never,
        }
    }
}
