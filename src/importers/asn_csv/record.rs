use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_derive::Deserialize;

use crate::directive::Amount;

/// Format of dates within the CSV file.
const DATE_FORMAT: &str = "%d-%m-%Y";

/// One row of an ASN Bank CSV export. The file has no header row, so fields
/// are deserialized by position, in this order.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct RawRow {
    pub txn_date: String,
    pub account: String,
    pub contra_account: String,
    pub payee: String,
    pub address: String,
    pub zipcode: String,
    pub city: String,
    pub account_comm: String,
    pub balance_before: String,
    pub txn_comm: String,
    pub amount: String,
    pub book_date: String,
    pub comm_date: String,
    pub intern_code: String,
    pub global_code: String,
    pub id: String,
    pub reference: String,
    pub description: String,
    pub copy_id: String,
}

impl RawRow {
    pub fn date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.txn_date, DATE_FORMAT)
            .with_context(|| format!("parsing transaction date {:?}", self.txn_date))
    }

    /// The signed amount of the transaction.
    pub fn transaction_amount(&self) -> Result<Amount> {
        parse_amount(&self.amount, &self.txn_comm)
            .with_context(|| format!("parsing transaction amount {:?}", self.amount))
    }

    /// The account balance before the transaction.
    pub fn balance_before(&self) -> Result<Amount> {
        parse_amount(&self.balance_before, &self.account_comm)
            .with_context(|| format!("parsing balance {:?}", self.balance_before))
    }
}

fn parse_amount(number: &str, currency: &str) -> Result<Amount> {
    let number = Decimal::from_str(number.trim())?;
    Ok(Amount::new(number, currency))
}
