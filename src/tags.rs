/// Key for a metadata value on a directive that specifies the file it was
/// imported from.
pub const SOURCE_FILE_KEY: &str = "source-file";
/// Key for a metadata value on a directive holding the zero-based index of the
/// input row it was imported from. Together with `SOURCE_FILE_KEY` this
/// identifies the directive upon re-import.
pub const SOURCE_ROW_KEY: &str = "source-row";
