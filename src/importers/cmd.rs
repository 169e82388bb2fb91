use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::ConfigArgs;
use crate::filespec::{self, FileSpec};
use crate::importers::asn_csv::AsnCsv;
use crate::importers::importer::StatementImporter;
use crate::importers::util::expand_inputs;
use crate::payees::prompt::TerminalPrompter;

#[derive(Debug, Args)]
pub struct Command {
    /// The journal file to write to (overwrites any existing file). "-" writes
    /// to stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: FileSpec,
    #[command(flatten)]
    config: ConfigArgs,
    /// Do not ask for unknown payees, use them as they appear in the
    /// statement.
    #[arg(long = "non-interactive")]
    non_interactive: bool,
    /// Statement files, or directories to search for them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

impl Command {
    pub fn run(&self) -> Result<()> {
        let mut importer = AsnCsv::new(self.config.load()?, TerminalPrompter::new());
        if self.non_interactive {
            importer = importer.non_interactive();
        }

        let mut directives = Vec::new();
        for path in expand_inputs(&self.inputs)? {
            if !importer.identify(&path) {
                log::info!("Skipping {:?}, not claimed by {}", path, importer.name());
                continue;
            }
            log::info!("Extracting {:?} with {}", path, importer.name());
            directives.extend(importer.extract(&path)?);
        }

        filespec::write_journal_file(&self.output, &directives)
    }
}
