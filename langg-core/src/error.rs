use std::path::PathBuf;

/// Errors surfaced by tree construction, persistence and translation.
#[derive(Debug, thiserror::Error)]
pub enum LanggError {
	/// A tree was required but the collection holds none.
	#[error("tree collection contains no trees")]
	EmptyTreeCollection,

	#[error("tree index {index} specified not in collection of {len} trees")]
	TreeIndexOutOfRange { index: usize, len: usize },

	/// Neither direct text, input files nor stdin was selected.
	#[error("unknown input source: expected text, input files or stdin")]
	UnknownInputSource,

	#[error("missing or unreadable persisted file {}: {reason}", path.display())]
	MissingOrUnreadablePersistedFile { path: PathBuf, reason: String },

	/// Internal invariant violation: a tokenizer step consumed nothing.
	#[error("tokenization stalled at character {position} of {line:?}")]
	TokenizationStall { position: usize, line: String },

	/// The root of the tree has no children, a walk could never emit a character.
	#[error("tree '{name}' has no nodes to walk")]
	EmptyTree { name: String },

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error("binary encoding error: {0}")]
	Binary(#[from] postcard::Error),

	#[error("json encoding error: {0}")]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LanggError>;
