use std::fmt::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::ConfigArgs;
use crate::filespec::{self, FileSpec};
use crate::filing;
use crate::importers::asn_csv::AsnCsv;
use crate::importers::importer::StatementImporter;
use crate::importers::util::expand_inputs;
use crate::payees::prompt::TerminalPrompter;

#[derive(Debug, Args)]
pub struct IdentifyCommand {
    #[command(flatten)]
    config: ConfigArgs,
    /// Statement files, or directories to search for them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

impl IdentifyCommand {
    pub fn run(&self) -> Result<()> {
        let importer = AsnCsv::new(self.config.load()?, TerminalPrompter::new());
        let report = identify_report(&importer, &expand_inputs(&self.inputs)?)?;
        filespec::write_file(&FileSpec::Stdio, &report)
    }
}

/// Describes each file as the importer sees it. A claimed file whose filing
/// details cannot be derived is reported with its error, and the remaining
/// files are still described.
fn identify_report(importer: &dyn StatementImporter, paths: &[PathBuf]) -> Result<String> {
    let mut report = String::new();
    for path in paths {
        if !importer.identify(path) {
            writeln!(report, "{}: not claimed", path.display())?;
            continue;
        }
        writeln!(report, "{}: {}", path.display(), importer.name())?;
        writeln!(report, "  account: {}", importer.file_account(path))?;
        match importer
            .file_date(path)
            .and_then(|date| Ok((date, importer.file_name(path)?)))
        {
            Ok((date, name)) => {
                writeln!(report, "  date: {}", date)?;
                writeln!(report, "  name: {}", name)?;
            }
            Err(e) => {
                log::warn!("Cannot file {:?}: {:#}", path, e);
                writeln!(report, "  error: {:#}", e)?;
            }
        }
    }
    Ok(report)
}

#[derive(Debug, Args)]
pub struct FileCommand {
    #[command(flatten)]
    config: ConfigArgs,
    /// Root of the documents tree to file statements into.
    #[arg(short = 'd', long = "destination")]
    destination: PathBuf,
    /// Only print where statements would be filed.
    #[arg(long = "dry-run")]
    dry_run: bool,
    /// Statement files, or directories to search for them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

impl FileCommand {
    pub fn run(&self) -> Result<()> {
        let importer = AsnCsv::new(self.config.load()?, TerminalPrompter::new());

        let mut report = String::new();
        for path in expand_inputs(&self.inputs)? {
            if !importer.identify(&path) {
                log::info!("Skipping {:?}, not claimed by {}", path, importer.name());
                continue;
            }
            let dest = filing::destination(&importer, &self.destination, &path)?;
            if self.dry_run {
                writeln!(report, "{} -> {}", path.display(), dest.display())?;
            } else {
                filing::file_statement(&path, &dest)?;
            }
        }

        filespec::write_file(&FileSpec::Stdio, &report)
    }
}
