//! Beancount directives produced by importers, and their text rendering.

use std::fmt;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Flag of a transaction that has cleared.
pub const FLAG_OKAY: char = '*';

/// A quantity of a single currency or commodity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Amount {
    pub number: Decimal,
    pub currency: String,
}

impl Amount {
    pub fn new<S: Into<String>>(number: Decimal, currency: S) -> Self {
        Self {
            number,
            currency: currency.into(),
        }
    }

    /// Adds two amounts of the same currency.
    pub fn checked_add(&self, other: &Amount) -> Result<Amount> {
        if self.currency != other.currency {
            bail!(
                "cannot add amounts of different currencies: {} and {}",
                self,
                other
            );
        }
        Ok(Amount::new(self.number + other.number, self.currency.clone()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{} {}", self.number, self.currency)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetaValue {
    String(String),
    Integer(i64),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use MetaValue::*;
        match self {
            String(s) => write_quoted(f, s),
            Integer(i) => write!(f, "{}", i),
        }
    }
}

/// Ordered key/value metadata attached to a directive.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Metadata(pub Vec<(String, MetaValue)>);

impl Metadata {
    pub fn with_str<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.0.push((key.into(), MetaValue::String(value.into())));
        self
    }

    pub fn with_int<K: Into<String>>(mut self, key: K, value: i64) -> Self {
        self.0.push((key.into(), MetaValue::Integer(value)));
        self
    }

    fn write_lines(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        for (key, value) in &self.0 {
            writeln!(f, "  {}: {}", key, value)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Posting {
    pub account: String,
    /// `None` leaves the amount to be inferred by balancing the transaction.
    pub amount: Option<Amount>,
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(&self.account)?;
        if let Some(amount) = &self.amount {
            write!(f, "  {}", amount)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub flag: char,
    pub payee: Option<String>,
    pub narration: String,
    pub meta: Metadata,
    pub postings: Vec<Posting>,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{} {} ", self.date.format("%Y-%m-%d"), self.flag)?;
        if let Some(payee) = &self.payee {
            write_quoted(f, payee)?;
            f.write_str(" ")?;
        }
        write_quoted(f, &self.narration)?;
        writeln!(f)?;
        self.meta.write_lines(f)?;
        for p in &self.postings {
            writeln!(f, "  {}", p)?;
        }
        Ok(())
    }
}

/// Asserts the balance of an account at the start of the given date.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Balance {
    pub date: NaiveDate,
    pub account: String,
    pub amount: Amount,
    pub meta: Metadata,
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(
            f,
            "{} balance {}  {}",
            self.date.format("%Y-%m-%d"),
            self.account,
            self.amount
        )?;
        self.meta.write_lines(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Directive {
    Transaction(Transaction),
    Balance(Balance),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use Directive::*;
        match self {
            Transaction(trn) => trn.fmt(f),
            Balance(bal) => bal.fmt(f),
        }
    }
}

/// Renders directives as journal text, separated by blank lines.
pub fn format_journal(directives: &[Directive]) -> String {
    directives
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join("\n")
}

fn write_quoted(f: &mut fmt::Formatter, s: &str) -> Result<(), fmt::Error> {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' | '\\' => write!(f, "\\{}", c)?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

pub struct TransactionBuilder {
    trn: Transaction,
}

impl TransactionBuilder {
    pub fn new<S: Into<String>>(date: NaiveDate, narration: S) -> Self {
        TransactionBuilder {
            trn: Transaction {
                date,
                flag: FLAG_OKAY,
                payee: None,
                narration: narration.into(),
                meta: Metadata::default(),
                postings: vec![],
            },
        }
    }

    /// Sets the payee. An empty payee is left unset.
    pub fn payee<S: Into<String>>(mut self, payee: S) -> Self {
        let payee = payee.into();
        self.trn.payee = if payee.is_empty() { None } else { Some(payee) };
        self
    }

    pub fn meta(mut self, meta: Metadata) -> Self {
        self.trn.meta = meta;
        self
    }

    pub fn posting<S: Into<String>>(mut self, account: S, amount: Option<Amount>) -> Self {
        self.trn.postings.push(Posting {
            account: account.into(),
            amount,
        });
        self
    }

    pub fn build(self) -> Transaction {
        self.trn
    }
}
