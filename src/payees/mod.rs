//! Persistent cache of resolved payee names and posting accounts, keyed by
//! the raw counterparty string that a bank statement provides.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use serde_derive::Deserialize;

use crate::importers::util::csv::check_column;

pub mod prompt;
pub mod resolver;

const RAW_COLUMN: &str = "RAW";
const BC_COLUMN: &str = "BC";
const POSTING_COLUMN: &str = "POSTING";

/// A single row of the cache file.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct PayeeEntry {
    /// Lookup key.
    #[serde(rename = "RAW")]
    pub raw: String,
    /// Resolved payee name.
    #[serde(rename = "BC")]
    pub bc: String,
    /// Resolved account for the balancing posting. Empty if none.
    #[serde(rename = "POSTING", default)]
    pub posting: String,
}

/// The cache as loaded from disk. Rows keep their file order, and lookups
/// resolve to the first row having the key.
#[derive(Clone, Debug, Default)]
pub struct PayeeTable {
    entries: Vec<PayeeEntry>,
    index: HashMap<String, usize>,
    /// Modification time of the file when it was read.
    loaded_mtime: Option<SystemTime>,
}

impl PayeeTable {
    pub fn from_entries(entries: Vec<PayeeEntry>) -> Self {
        let mut table = Self::default();
        for entry in entries {
            table.push(entry);
        }
        table
    }

    /// Reads the cache file at `path`. A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        let loaded_mtime = modified_time(path);
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Writing new cache {:?}", path);
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("opening payee cache {:?}", path));
            }
        };
        let entries =
            Self::read_entries(file).with_context(|| format!("reading payee cache {:?}", path))?;
        log::debug!("Loaded {} payee cache entries from {:?}", entries.len(), path);
        let mut table = Self::from_entries(entries);
        table.loaded_mtime = loaded_mtime;
        Ok(table)
    }

    fn read_entries<R: Read>(reader: R) -> Result<Vec<PayeeEntry>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        check_column(RAW_COLUMN, &headers)?;
        check_column(BC_COLUMN, &headers)?;

        let mut entries = Vec::new();
        for result in rdr.deserialize() {
            let entry: PayeeEntry = result?;
            entries.push(entry);
        }
        Ok(entries)
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.first(key).map(|entry| entry.bc.as_str())
    }

    pub fn lookup_posting(&self, key: &str) -> Option<&str> {
        self.first(key).map(|entry| entry.posting.as_str())
    }

    #[cfg(test)] // Currently only used in tests.
    pub fn entries(&self) -> &[PayeeEntry] {
        &self.entries
    }

    fn first(&self, key: &str) -> Option<&PayeeEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    fn push(&mut self, entry: PayeeEntry) {
        self.index
            .entry(entry.raw.clone())
            .or_insert(self.entries.len());
        self.entries.push(entry);
    }

    /// Rewrites the cache file with this table's rows followed by the pending
    /// additions. Does nothing if there are no pending additions.
    ///
    /// The previous file is kept as `<path>.old`. If the file changed on disk
    /// since it was loaded, its current rows are used as the base instead of
    /// this table's, and only pending keys that it lacks are appended.
    pub fn persist(&self, path: &Path, pending: &PendingPayees) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }

        let mut merged = if modified_time(path) != self.loaded_mtime {
            log::warn!(
                "Payee cache {:?} changed on disk since it was read, merging into it",
                path
            );
            Self::load(path)?
        } else {
            self.clone()
        };
        for (raw, bc) in pending.iter() {
            if merged.index.contains_key(raw) {
                continue;
            }
            merged.push(PayeeEntry {
                raw: raw.to_string(),
                bc: bc.to_string(),
                posting: String::new(),
            });
        }

        if path.exists() {
            let backup = backup_path(path);
            fs::copy(path, &backup)
                .with_context(|| format!("backing up payee cache to {:?}", backup))?;
        }
        merged
            .write_to(path)
            .with_context(|| format!("writing payee cache {:?}", path))?;
        log::info!(
            "Wrote {} new entries to payee cache {:?}",
            pending.len(),
            path
        );
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut wtr = csv::Writer::from_writer(tmp.as_file_mut());
            wtr.write_record(["", RAW_COLUMN, BC_COLUMN, POSTING_COLUMN])?;
            for (i, entry) in self.entries.iter().enumerate() {
                let i = i.to_string();
                wtr.write_record([
                    i.as_str(),
                    entry.raw.as_str(),
                    entry.bc.as_str(),
                    entry.posting.as_str(),
                ])?;
            }
            wtr.flush()?;
        }
        tmp.persist(path)?;
        Ok(())
    }
}

/// Payees resolved during one import run, in the order they were first seen.
#[derive(Debug, Default)]
pub struct PendingPayees {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl PendingPayees {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    /// Sets the value for `key`, keeping its original position if it was
    /// already present.
    pub fn insert(&mut self, key: String, value: String) {
        match self.index.get(&key).copied() {
            Some(i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

pub fn backup_path(path: &Path) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(".old");
    PathBuf::from(s)
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
