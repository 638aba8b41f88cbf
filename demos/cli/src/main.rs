//! # iam-import
//!
//! Imports the users listed in a CSV file into the library realm and assigns
//! each of them its realm role. Safe to re-run against the same file.
//!

use clap::Parser;

use commands::Opts;
mod commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err.into());
        }
    }
    env_logger::init();
    let opts: Opts = Opts::parse();
    opts.run().await?;
    Ok(())
}
