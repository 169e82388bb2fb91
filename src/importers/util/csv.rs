use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("bad file format: {reason}")]
    BadFileFormat { reason: &'static str },
    #[error("missing column {want:?} in header record {got:?}")]
    MissingColumn { want: &'static str, got: Vec<String> },
}

impl ReadError {
    pub fn bad_file_format(reason: &'static str) -> ReadError {
        ReadError::BadFileFormat { reason }
    }
}

/// Checks that the header record names the given column.
pub fn check_column(want: &'static str, headers: &csv::StringRecord) -> Result<(), ReadError> {
    if headers.iter().any(|h| h == want) {
        Ok(())
    } else {
        Err(ReadError::MissingColumn {
            want,
            got: headers.iter().map(str::to_string).collect(),
        })
    }
}

/// Deserializes the next record, if any.
pub fn deserialize_next_record<T, R>(
    csv_records: &mut csv::StringRecordsIter<R>,
) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
    R: std::io::Read,
{
    match csv_records.next() {
        Some(Ok(str_record)) => Ok(Some(str_record.deserialize(None)?)),
        Some(Err(e)) => Err(e.into()),
        None => Ok(None),
    }
}
