//! Archiving of statement files into a documents tree organized by account,
//! e.g. `documents/Assets/ASN/Checking/2021-02-01.asn_<name>.csv`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::importers::importer::StatementImporter;

pub mod cmd;

/// Separator between account name components.
const ACCOUNT_SEPARATOR: char = ':';

/// Where the statement at `path` is filed under `root`.
pub fn destination(
    importer: &dyn StatementImporter,
    root: &Path,
    path: &Path,
) -> Result<PathBuf> {
    let mut dest = root.to_path_buf();
    for component in importer.file_account(path).split(ACCOUNT_SEPARATOR) {
        dest.push(component);
    }
    dest.push(format!(
        "{}.{}",
        importer.file_date(path)?.format("%Y-%m-%d"),
        importer.file_name(path)?
    ));
    Ok(dest)
}

/// Copies the statement to its destination. Never overwrites.
pub fn file_statement(src: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        bail!("not filing {:?}, {:?} already exists", src, dest);
    }
    if let Some(dir) = dest.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating directory {:?}", dir))?;
    }
    fs::copy(src, dest).with_context(|| format!("copying {:?} to {:?}", src, dest))?;
    log::info!("Filed {:?} as {:?}", src, dest);
    Ok(())
}
