use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod csv;

/// The final component of the path, if it is valid UTF-8.
pub fn basename(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Expands the given paths into statement files. Files are kept as given,
/// directories are searched recursively for CSV files.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let dir = input
            .to_str()
            .with_context(|| format!("directory {:?} is not valid UTF-8", input))?;
        let pattern = format!("{}/**/*.csv", glob::Pattern::escape(dir));
        for entry in glob::glob(&pattern)? {
            files.push(entry?);
        }
    }
    Ok(files)
}
