pub mod asn_csv;
pub mod cmd;
pub mod importer;
pub mod util;

#[cfg(test)]
mod testutil;
