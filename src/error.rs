use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	#[error("configuration error: {0}")]
	Config(String),

	#[error("could not open database {path}: {source}")]
	Connection {
		path: String,
		source: rusqlite::Error,
	},

	#[error("schema error on table {table}: {source}")]
	Schema {
		table: &'static str,
		source: rusqlite::Error,
	},

	#[error("could not read {}: {source}", .path.display())]
	Read { path: PathBuf, source: csv::Error },

	#[error("{}:{line}: invalid {field} {value:?}: {reason}", .path.display())]
	Parse {
		path: PathBuf,
		line: u64,
		field: &'static str,
		value: String,
		reason: String,
	},

	#[error("integrity violation in {table} for {key}: {source}")]
	Integrity {
		table: &'static str,
		key: String,
		source: rusqlite::Error,
	},

	#[error("failed to load {table}: {source}")]
	Load {
		table: &'static str,
		source: rusqlite::Error,
	},

	#[error("query {query} failed: {source}")]
	Query {
		query: &'static str,
		source: rusqlite::Error,
	},

	#[error("could not render chart {chart}: {message}")]
	Render { chart: String, message: String },

	#[error("could not write {target}: {source}")]
	Output {
		target: String,
		source: std::io::Error,
	},
}

impl Error {
	/// Classifies an insert failure: constraint violations become
	/// [`Error::Integrity`], anything else is a generic load failure.
	pub(crate) fn from_insert(table: &'static str, key: String, source: rusqlite::Error) -> Self {
		match source.sqlite_error_code() {
			Some(rusqlite::ErrorCode::ConstraintViolation) => {
				Error::Integrity { table, key, source }
			}
			_ => Error::Load { table, source },
		}
	}

	pub(crate) fn query(query: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
		move |source| Error::Query { query, source }
	}
}
