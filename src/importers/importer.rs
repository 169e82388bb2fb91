use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::directive::Directive;

/// An importer of one kind of bank statement file.
pub trait StatementImporter {
    /// Human readable name of the importer.
    fn name(&self) -> &'static str;

    /// Returns true if the file at `path` is a statement this importer reads.
    fn identify(&self, path: &Path) -> bool;

    /// The name to file the statement under, without any date prefix.
    fn file_name(&self, path: &Path) -> Result<String>;

    /// The account that the statement belongs to.
    fn file_account(&self, path: &Path) -> String;

    /// The date of the statement.
    fn file_date(&self, path: &Path) -> Result<NaiveDate>;

    /// Reads the directives from the statement.
    fn extract(&mut self, path: &Path) -> Result<Vec<Directive>>;
}
