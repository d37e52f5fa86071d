use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::{fs, io};

use crate::error::{LanggError, Result};

/// Reads a whole text file into memory.
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Reads a file and returns its whitespace-separated words, one per line.
pub(crate) fn read_words<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	Ok(read_file(filename)?.split_whitespace().map(str::to_owned).collect())
}

/// Reads a persisted tree collection.
///
/// # Errors
/// Returns `MissingOrUnreadablePersistedFile` if `path` is not a file or
/// cannot be read.
pub(crate) fn read_persisted<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
	let path = path.as_ref();
	if !path.is_file() {
		return Err(LanggError::MissingOrUnreadablePersistedFile {
			path: path.to_path_buf(),
			reason: "no such file".to_owned(),
		});
	}
	fs::read(path).map_err(|e| LanggError::MissingOrUnreadablePersistedFile {
		path: path.to_path_buf(),
		reason: e.to_string(),
	})
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/english.txt"` → `"english"`
/// - `"english.txt"` → `"english"`
pub(crate) fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Builds a tree name from its source files: stems joined with `_`.
///
/// Example: `["a/english.txt", "b/french.dict"]` → `"english_french"`
pub(crate) fn tree_name<P: AsRef<Path>>(sources: &[P]) -> io::Result<String> {
	let stems = sources.iter().map(get_filename).collect::<io::Result<Vec<_>>>()?;
	Ok(stems.join("_"))
}
