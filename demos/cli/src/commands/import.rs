//! # import command
//!
//! Loads the CSV, authenticates once and provisions every row in file order.
//!
use std::io::Write;

use library_iam::import::Importer;

use crate::commands::Opts;

impl Opts {
    pub async fn run(self) -> anyhow::Result<()> {
        let importer = Importer::from_env(&self.env_prefix, self.realm.as_deref())?;
        let mut out: Box<dyn Write> = if self.quiet {
            Box::new(std::io::sink())
        } else {
            Box::new(std::io::stdout().lock())
        };
        let report = importer.run(&self.file, &mut out).await?;
        log::info!("{report}");
        Ok(())
    }
}
