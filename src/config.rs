//! Settings of the ASN importer, read from a RON file and/or flags.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_derive::Deserialize;

use crate::filespec::FileSpec;

/// Settings that every ASN importer command needs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AsnConfig {
    /// Account that statements are imported into, e.g. `Assets:ASN:Checking`.
    pub account_root: String,
    /// Bank account number. Its last 10 digits start statement file names.
    pub account_no: String,
    /// CSV file caching resolved payees.
    pub payee_map: PathBuf,
}

/// Contents of a config file. Empty values are treated as missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    account_root: String,
    account_no: String,
    payee_map: PathBuf,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// RON file to read settings from, e.g.
    /// `(account_root: "Assets:ASN", account_no: "NL12ASNB1234567890",
    /// payee_map: "payees.csv")`. Flags take precedence over it.
    #[arg(long = "config")]
    config: Option<FileSpec>,
    /// Account that statements are imported into.
    #[arg(long = "account-root")]
    account_root: Option<String>,
    /// Bank account number that statements belong to.
    #[arg(long = "account-no")]
    account_no: Option<String>,
    /// CSV file caching resolved payees. Created if missing.
    #[arg(long = "payee-map")]
    payee_map: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<AsnConfig> {
        let file: ConfigFile = match &self.config {
            Some(spec) => {
                let reader = spec.reader()?;
                ron::de::from_reader(reader).with_context(|| format!("parsing config {}", spec))?
            }
            None => ConfigFile::default(),
        };
        merge(file, self)
    }
}

fn merge(file: ConfigFile, args: &ConfigArgs) -> Result<AsnConfig> {
    let config = AsnConfig {
        account_root: args.account_root.clone().unwrap_or(file.account_root),
        account_no: args.account_no.clone().unwrap_or(file.account_no),
        payee_map: args.payee_map.clone().unwrap_or(file.payee_map),
    };
    if config.account_root.is_empty() {
        bail!("no account root given (--account-root or account_root in --config)");
    }
    if config.account_no.is_empty() {
        bail!("no account number given (--account-no or account_no in --config)");
    }
    if config.payee_map.as_os_str().is_empty() {
        bail!("no payee cache given (--payee-map or payee_map in --config)");
    }
    log::debug!("Using {:?}", config);
    Ok(config)
}
