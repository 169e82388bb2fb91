//! Importer for CSV statements exported by ASN Bank.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::AsnConfig;
use crate::directive::{Amount, Balance, Directive, Metadata, Transaction, TransactionBuilder};
use crate::importers::importer::StatementImporter;
use crate::importers::util::basename;
use crate::importers::util::csv::{deserialize_next_record, ReadError};
use crate::payees::prompt::Prompter;
use crate::payees::resolver::{resolution_key, Resolution, Resolver};
use crate::payees::PayeeTable;
use crate::tags::{SOURCE_FILE_KEY, SOURCE_ROW_KEY};

pub mod normalize;
pub mod record;

use normalize::normalize;
use record::RawRow;

const IMPORTER_NAME: &str = "ASN Bank CSV Importer";

/// Number of leading account number digits in a statement file name.
const ACCOUNT_PREFIX_LEN: usize = 10;

/// Format of the date within a statement file name.
const FILE_DATE_FORMAT: &str = "%d%m%Y";

/// Prefix of the name that statements are filed under.
const FILE_NAME_PREFIX: &str = "asn_";

pub struct AsnCsv<P: Prompter> {
    config: AsnConfig,
    prompter: P,
    interactive: bool,
}

impl<P: Prompter> AsnCsv<P> {
    pub fn new(config: AsnConfig, prompter: P) -> Self {
        Self {
            config,
            prompter,
            interactive: true,
        }
    }

    /// Never prompts. Payees missing from the cache are used as they are.
    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }
}

/// The last transaction built in a run, for the closing balance.
struct LastTransaction {
    date: NaiveDate,
    amount: Amount,
    balance_before: Amount,
    index: usize,
}

impl<P: Prompter> StatementImporter for AsnCsv<P> {
    fn name(&self) -> &'static str {
        IMPORTER_NAME
    }

    fn identify(&self, path: &Path) -> bool {
        lazy_static! {
            static ref FILE_NAME_RX: Regex =
                Regex::new(r"^[0-9]{10}_[0-9]{8}_[0-9]{6}.*\.csv$").unwrap();
        }
        let name = match basename(path) {
            Some(name) => name,
            None => return false,
        };
        FILE_NAME_RX.is_match(name)
            && &name[..ACCOUNT_PREFIX_LEN] == last_chars(&self.config.account_no, ACCOUNT_PREFIX_LEN)
    }

    fn file_name(&self, path: &Path) -> Result<String> {
        let name = basename(path).with_context(|| format!("no file name in {:?}", path))?;
        Ok(format!("{}{}", FILE_NAME_PREFIX, name))
    }

    fn file_account(&self, _path: &Path) -> String {
        self.config.account_root.clone()
    }

    fn file_date(&self, path: &Path) -> Result<NaiveDate> {
        let name = basename(path).with_context(|| format!("no file name in {:?}", path))?;
        let segment = name
            .split('_')
            .nth(1)
            .ok_or_else(|| ReadError::bad_file_format("no date in statement file name"))?;
        NaiveDate::parse_from_str(segment, FILE_DATE_FORMAT)
            .with_context(|| format!("parsing date {:?} of statement {:?}", segment, path))
    }

    fn extract(&mut self, path: &Path) -> Result<Vec<Directive>> {
        let table = PayeeTable::load(&self.config.payee_map)?;
        let mut resolver = Resolver::new(&table, &mut self.prompter);
        if !self.interactive {
            resolver = resolver.skipping_all();
        }

        let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
        let mut csv_rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(file);
        let mut csv_records = csv_rdr.records();

        let source = path.display().to_string();
        let mut directives = Vec::new();
        let mut last: Option<LastTransaction> = None;

        for index in 0.. {
            let row: RawRow = match deserialize_next_record(&mut csv_records)
                .with_context(|| format!("reading row {} of {:?}", index, path))?
            {
                Some(row) => row,
                None => break,
            };

            let (payee, narration) = normalize(&row);
            let resolved = match resolver.resolve(&payee, &row)? {
                Resolution::Payee(resolved) => resolved,
                Resolution::Skip => payee.clone(),
                Resolution::Abort => {
                    log::info!("Import of {:?} stopped at row {}", path, index);
                    break;
                }
            };

            let meta = Metadata::default()
                .with_str(SOURCE_FILE_KEY, source.as_str())
                .with_int(SOURCE_ROW_KEY, index as i64);
            let trn = build_transaction(
                &self.config.account_root,
                &table,
                &row,
                &payee,
                resolved,
                narration,
                meta,
            )
            .with_context(|| format!("row {} of {:?}", index, path))?;

            last = Some(LastTransaction {
                date: trn.date,
                amount: primary_amount(&trn)?,
                balance_before: row.balance_before()?,
                index,
            });
            directives.push(Directive::Transaction(trn));
        }

        if let Some(last) = last {
            let meta = Metadata::default()
                .with_str(SOURCE_FILE_KEY, source.as_str())
                .with_int(SOURCE_ROW_KEY, last.index as i64);
            directives.push(Directive::Balance(closing_balance(
                &self.config.account_root,
                last,
                meta,
            )?));
        }

        let pending = resolver.into_pending();
        table.persist(&self.config.payee_map, &pending)?;

        log::info!(
            "Extracted {} directives from {:?}",
            directives.len(),
            path
        );
        Ok(directives)
    }
}

/// Builds the transaction for a row. `payee` is the normalized payee that the
/// cache key is chosen from, `resolved` the payee name to use.
fn build_transaction(
    account: &str,
    table: &PayeeTable,
    row: &RawRow,
    payee: &str,
    resolved: String,
    narration: String,
    meta: Metadata,
) -> Result<Transaction> {
    let mut builder = TransactionBuilder::new(row.date()?, narration)
        .payee(resolved)
        .meta(meta)
        .posting(account, Some(row.transaction_amount()?));

    let key = resolution_key(row, payee);
    if let Some(peer_account) = table.lookup_posting(key).filter(|a| !a.is_empty()) {
        builder = builder.posting(peer_account, None);
    }

    Ok(builder.build())
}

fn primary_amount(trn: &Transaction) -> Result<Amount> {
    trn.postings
        .first()
        .and_then(|p| p.amount.clone())
        .ok_or_else(|| ReadError::bad_file_format("transaction without amount").into())
}

/// The balance after the last transaction, asserted on the following day.
fn closing_balance(account: &str, last: LastTransaction, meta: Metadata) -> Result<Balance> {
    let date = last
        .date
        .succ_opt()
        .with_context(|| format!("no date follows {}", last.date))?;
    Ok(Balance {
        date,
        account: account.to_string(),
        amount: last.amount.checked_add(&last.balance_before)?,
        meta,
    })
}

/// The last `n` characters of `s`, or all of `s` if it is shorter.
fn last_chars(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    s.char_indices()
        .nth(count - n)
        .map_or(s, |(i, _)| &s[i..])
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;
    use test_case::test_case;

    use crate::assert_journal_eq;
    use crate::payees::backup_path;
    use crate::payees::prompt::ScriptedPrompter;

    const STATEMENT_NAME: &str = "1234567890_01022021_000001.csv";

    struct Fixture {
        dir: TempDir,
        statement: PathBuf,
        payee_map: PathBuf,
    }

    impl Fixture {
        fn new(rows: &str, payees: Option<&str>) -> Self {
            let dir = TempDir::new().unwrap();
            let statement = dir.path().join(STATEMENT_NAME);
            fs::write(&statement, textwrap::dedent(rows).trim_start()).unwrap();
            let payee_map = dir.path().join("payees.csv");
            if let Some(payees) = payees {
                fs::write(&payee_map, textwrap::dedent(payees).trim_start()).unwrap();
            }
            Self {
                dir,
                statement,
                payee_map,
            }
        }

        fn importer<'p>(
            &self,
            prompter: &'p mut ScriptedPrompter,
        ) -> AsnCsv<&'p mut ScriptedPrompter> {
            AsnCsv::new(config("NL12ASNB1234567890", &self.payee_map), prompter)
        }

        fn source(&self) -> String {
            self.statement.display().to_string()
        }
    }

    fn config(account_no: &str, payee_map: &Path) -> AsnConfig {
        AsnConfig {
            account_root: "Assets:ASN:Checking".to_string(),
            account_no: account_no.to_string(),
            payee_map: payee_map.to_path_buf(),
        }
    }

    const THREE_ROWS: &str = "
        01-02-2021,NL12ASNB1234567890,NL01BANK0000000001,LANDLORD BV,,,,EUR,1000.00,EUR,-500.00,01-02-2021,01-02-2021,010,IOB,1,,'Rent february',1
        02-02-2021,NL12ASNB1234567890,,,,,,EUR,500.00,EUR,-12.50,02-02-2021,02-02-2021,010,BEA,2,,'STORE>BOUGHT GROCERIES',1
        03-02-2021,NL12ASNB1234567890,NL02BANK0000000002,EMPLOYER,,,,EUR,487.50,EUR,+2000.00,03-02-2021,03-02-2021,010,IOB,3,,'Salary',1
        ";

    const THREE_PAYEES: &str = "
        ,RAW,BC,POSTING
        0,NL01BANK0000000001,Landlord,Expenses:Rent
        1,STORE,Corner Store,Expenses:Groceries
        2,NL02BANK0000000002,Employer,
        ";

    #[test]
    fn test_extract_all_cached() {
        let f = Fixture::new(THREE_ROWS, Some(THREE_PAYEES));
        let mut prompter = ScriptedPrompter::new(&[]);
        let got = f.importer(&mut prompter).extract(&f.statement).unwrap();

        let want = format!(
            r#"
            2021-02-01 * "Landlord" "Rent february"
              source-file: "{src}"
              source-row: 0
              Assets:ASN:Checking  -500.00 EUR
              Expenses:Rent

            2021-02-02 * "Corner Store" "BOUGHT GROCERIES"
              source-file: "{src}"
              source-row: 1
              Assets:ASN:Checking  -12.50 EUR
              Expenses:Groceries

            2021-02-03 * "Employer" "Salary"
              source-file: "{src}"
              source-row: 2
              Assets:ASN:Checking  2000.00 EUR

            2021-02-04 balance Assets:ASN:Checking  2487.50 EUR
              source-file: "{src}"
              source-row: 2
            "#,
            src = f.source()
        );
        let want = textwrap::dedent(&want);
        assert_journal_eq!(want.trim_start(), got);
        assert!(prompter.requests.is_empty());
        // Nothing new, so the cache is untouched.
        assert!(!backup_path(&f.payee_map).exists());
    }

    #[test]
    fn test_extract_quit_on_second_row() {
        let f = Fixture::new(THREE_ROWS, None);
        let mut prompter = ScriptedPrompter::new(&["Landlord", "q"]);
        let got = f.importer(&mut prompter).extract(&f.statement).unwrap();

        let want = format!(
            r#"
            2021-02-01 * "Landlord" "Rent february"
              source-file: "{src}"
              source-row: 0
              Assets:ASN:Checking  -500.00 EUR

            2021-02-02 balance Assets:ASN:Checking  500.00 EUR
              source-file: "{src}"
              source-row: 0
            "#,
            src = f.source()
        );
        let want = textwrap::dedent(&want);
        assert_journal_eq!(want.trim_start(), got);
        assert_eq!(2, prompter.requests.len());
        assert_eq!("STORE", prompter.requests[1].key);

        // The answer given before quitting is kept.
        let table = PayeeTable::load(&f.payee_map).unwrap();
        assert_eq!(Some("Landlord"), table.lookup("NL01BANK0000000001"));
        assert_eq!(1, table.entries().len());
    }

    #[test]
    fn test_extract_quit_on_first_row_has_no_balance() {
        let f = Fixture::new(THREE_ROWS, None);
        let mut prompter = ScriptedPrompter::new(&["q"]);
        let got = f.importer(&mut prompter).extract(&f.statement).unwrap();
        assert!(got.is_empty());
        assert!(!f.payee_map.exists());
    }

    #[test]
    fn test_extract_prompts_and_caches() {
        let f = Fixture::new(THREE_ROWS, None);
        let mut prompter = ScriptedPrompter::new(&["Landlord", "=", "s"]);
        let got = f.importer(&mut prompter).extract(&f.statement).unwrap();

        let payees: Vec<Option<&str>> = got
            .iter()
            .filter_map(|d| match d {
                Directive::Transaction(trn) => Some(trn.payee.as_deref()),
                Directive::Balance(_) => None,
            })
            .collect();
        assert_eq!(
            vec![Some("Landlord"), Some("STORE"), Some("Employer")],
            payees
        );

        assert_eq!(
            ",RAW,BC,POSTING\n0,NL01BANK0000000001,Landlord,\n1,STORE,STORE,\n",
            fs::read_to_string(&f.payee_map).unwrap()
        );
    }

    #[test]
    fn test_extract_non_interactive() {
        let f = Fixture::new(THREE_ROWS, None);
        let mut prompter = ScriptedPrompter::new(&[]);
        let got = f
            .importer(&mut prompter)
            .non_interactive()
            .extract(&f.statement)
            .unwrap();
        assert_eq!(4, got.len());
        assert!(prompter.requests.is_empty());
        assert!(!f.payee_map.exists());
    }

    #[test]
    fn test_extract_single_row_has_balance() {
        let f = Fixture::new(
            "01-02-2021,NL12ASNB1234567890,,,,,,EUR,10.00,EUR,0.05,01-02-2021,01-02-2021,010,RNT,1,,'Rente',1\n",
            None,
        );
        let mut prompter = ScriptedPrompter::new(&[]);
        let got = f
            .importer(&mut prompter)
            .non_interactive()
            .extract(&f.statement)
            .unwrap();
        assert_eq!(2, got.len());
        match &got[1] {
            Directive::Balance(bal) => {
                assert_eq!(NaiveDate::from_ymd_opt(2021, 2, 2), Some(bal.date));
                assert_eq!("10.05 EUR", bal.amount.to_string());
            }
            other => panic!("got {:?}, want balance", other),
        }
    }

    #[test]
    fn test_extract_bad_date_fails() {
        let f = Fixture::new(
            "2021-02-01,NL12ASNB1234567890,,,,,,EUR,10.00,EUR,0.05,01-02-2021,01-02-2021,010,RNT,1,,'Rente',1\n",
            None,
        );
        let mut prompter = ScriptedPrompter::new(&[]);
        assert!(f
            .importer(&mut prompter)
            .non_interactive()
            .extract(&f.statement)
            .is_err());
    }

    #[test]
    fn test_extract_short_row_fails() {
        let f = Fixture::new("01-02-2021,NL12ASNB1234567890,,\n", None);
        let mut prompter = ScriptedPrompter::new(&[]);
        assert!(f
            .importer(&mut prompter)
            .non_interactive()
            .extract(&f.statement)
            .is_err());
    }

    #[test_case("1234567890_01022021_000001.csv", "NL12ASNB1234567890" => true; "matching_account")]
    #[test_case("1234567890_01022021_000001.csv", "NL12ASNB9999999999" => false; "other_account")]
    #[test_case("1234567890_01022021_000001_copy.csv", "1234567890" => true; "suffix")]
    #[test_case("1234567890_01022021_000001.csv.bak", "1234567890" => false; "not_csv")]
    #[test_case("1234567890_0102202_000001.csv", "1234567890" => false; "short_date")]
    #[test_case("1234567890_01022021_000001.csv", "567890" => false; "short_account_number")]
    #[test_case("x1234567890_01022021_000001.csv", "1234567890" => false; "leading_garbage")]
    fn test_identify(name: &str, account_no: &str) -> bool {
        let importer = AsnCsv::new(
            config(account_no, Path::new("payees.csv")),
            ScriptedPrompter::new(&[]),
        );
        importer.identify(&Path::new("/statements").join(name))
    }

    #[test]
    fn test_file_metadata() {
        let importer = AsnCsv::new(
            config("NL12ASNB1234567890", Path::new("payees.csv")),
            ScriptedPrompter::new(&[]),
        );
        let path = Path::new("/statements").join(STATEMENT_NAME);
        assert_eq!(
            "asn_1234567890_01022021_000001.csv",
            importer.file_name(&path).unwrap()
        );
        assert_eq!("Assets:ASN:Checking", importer.file_account(&path));
        assert_eq!(
            NaiveDate::from_ymd_opt(2021, 2, 1),
            importer.file_date(&path).ok()
        );
        assert!(importer.file_date(Path::new("nodate.csv")).is_err());
        assert!(importer
            .file_date(Path::new("1234567890_31022021_000001.csv"))
            .is_err());
    }

    #[test]
    fn test_golden() {
        let mut importer = AsnCsv::new(
            config(
                "NL12ASNB1234567890",
                Path::new("testdata/importers/asn_payees.csv"),
            ),
            ScriptedPrompter::new(&[]),
        );
        crate::importers::testutil::golden_test(
            &mut importer,
            Path::new("testdata/importers/1234567890_15032021_000002.csv"),
            "asn_csv.golden",
        );
    }

    #[test_case("NL12ASNB1234567890", 10 => "1234567890"; "longer")]
    #[test_case("12345", 10 => "12345"; "shorter")]
    #[test_case("", 10 => ""; "empty")]
    fn test_last_chars(s: &str, n: usize) -> String {
        last_chars(s, n).to_string()
    }
}
