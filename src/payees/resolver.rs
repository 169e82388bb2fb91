use anyhow::Result;

use crate::importers::asn_csv::record::RawRow;
use crate::payees::prompt::{PromptRequest, Prompter};
use crate::payees::{PayeeTable, PendingPayees};

/// Answer that skips the current payee.
const ANSWER_SKIP: &str = "s";
/// Answer that skips this and all further unknown payees in the run.
const ANSWER_SKIP_ALL: &str = "S";
/// Answer that stops the import.
const ANSWER_QUIT: &str = "q";
/// Answer that keeps the payee as it is, and caches it as such.
const ANSWER_PRESERVE: &str = "=";

/// The cache key for a row: the counterparty account if present, otherwise
/// the payee, otherwise the raw description.
pub fn resolution_key<'a>(row: &'a RawRow, payee: &'a str) -> &'a str {
    if !row.contra_account.is_empty() {
        &row.contra_account
    } else if !payee.is_empty() {
        payee
    } else {
        &row.description
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resolution {
    /// Use this payee name.
    Payee(String),
    /// Keep the normalized payee.
    Skip,
    /// Stop importing. The current row is dropped.
    Abort,
}

/// Resolves payees for one import run.
///
/// Answers given by the operator are remembered for the rest of the run, and
/// collected for adding to the cache once the run completes.
pub struct Resolver<'a, P: Prompter> {
    table: &'a PayeeTable,
    pending: PendingPayees,
    prompter: P,
    skip_all: bool,
}

impl<'a, P: Prompter> Resolver<'a, P> {
    pub fn new(table: &'a PayeeTable, prompter: P) -> Self {
        Self {
            table,
            pending: PendingPayees::default(),
            prompter,
            skip_all: false,
        }
    }

    /// Starts the run as if the operator had already asked to skip all
    /// unknown payees.
    pub fn skipping_all(mut self) -> Self {
        self.skip_all = true;
        self
    }

    pub fn resolve(&mut self, payee: &str, row: &RawRow) -> Result<Resolution> {
        let key = resolution_key(row, payee);

        if let Some(bc) = self.table.lookup(key) {
            return Ok(Resolution::Payee(bc.to_string()));
        }
        if let Some(value) = self.pending.get(key) {
            return Ok(Resolution::Payee(value.to_string()));
        }
        if self.skip_all {
            return Ok(Resolution::Skip);
        }

        let request = PromptRequest {
            date: row.txn_date.clone(),
            payee: payee.to_string(),
            contra_account: row.contra_account.clone(),
            amount: format!("{}{}", row.txn_comm, row.amount),
            narration: row.description.clone(),
            key: key.to_string(),
        };
        let answer = self.prompter.prompt(&request)?;

        let value = match answer.as_str() {
            ANSWER_SKIP_ALL => {
                self.skip_all = true;
                return Ok(Resolution::Skip);
            }
            ANSWER_SKIP => return Ok(Resolution::Skip),
            ANSWER_QUIT => return Ok(Resolution::Abort),
            ANSWER_PRESERVE => payee.to_string(),
            _ => answer.clone(),
        };
        if !key.is_empty() {
            log::info!("Adding {} -> {}", key, value);
            self.pending.insert(key.to_string(), value.clone());
        }
        Ok(Resolution::Payee(value))
    }

    #[cfg(test)] // Currently only used in tests.
    pub fn pending(&self) -> &PendingPayees {
        &self.pending
    }

    pub fn into_pending(self) -> PendingPayees {
        self.pending
    }
}
