//! Exports the GraphQL API schema. The schema file is what API clients
//! compile their queries against.

use std::path::PathBuf;

use crate::prelude::*;


#[derive(Debug, clap::Args)]
pub(crate) struct Args {
    /// Target file. If not specified, the schema is printed to stdout.
    pub(crate) target: Option<PathBuf>,
}

pub(crate) fn run(args: &Args) -> Result<()> {
    let schema = crate::api::root_node().as_sdl();

    match &args.target {
        Some(target) => {
            std::fs::write(target, schema)
                .context(format!("failed to write schema to '{}'", target.display()))?;
            info!("Wrote API schema to '{}'", target.display());
        }
        None => println!("{schema}"),
    }

    Ok(())
}
