use parser::Grid;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("grid is not a JSON array of string rows: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads a grid either as JSON (`[["MOVE|1", ""], ...]`) or in the
/// comma/tab separated text format. JSON is picked by the `.json`
/// extension or a leading `[`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Grid, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;

    let is_json = path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
        || text.trim_start().starts_with('[');

    if is_json {
        from_json(&text)
    } else {
        Ok(Grid::from_text(&text))
    }
}

pub fn from_json(text: &str) -> Result<Grid, Error> {
    let rows: Vec<Vec<String>> = serde_json::from_str(text)?;
    Ok(Grid::new(rows))
}
