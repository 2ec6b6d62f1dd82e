use std::path::PathBuf;

use crate::error::{Error, Result};

pub const MEMORY_DATABASE: &str = ":memory:";

pub const DEFAULT_TOP_PLAYERS: usize = 10;
pub const DEFAULT_TOP_COUNTRIES: usize = 10;
pub const DEFAULT_DECISIVE_MARGIN: i64 = 2;

/// Everything a run needs, handed explicitly to each stage.
#[derive(Debug, Clone)]
pub struct Config {
	/// SQLite database file holding the tournament tables, or `:memory:`.
	pub database: String,
	pub data_dir: PathBuf,
	/// `None` disables chart rendering.
	pub chart_dir: Option<PathBuf>,
	pub top_players: usize,
	pub top_countries: usize,
	pub decisive_margin: i64,
}

impl Config {
	pub fn new(database: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
		Config {
			database: database.into(),
			data_dir: data_dir.into(),
			chart_dir: None,
			top_players: DEFAULT_TOP_PLAYERS,
			top_countries: DEFAULT_TOP_COUNTRIES,
			decisive_margin: DEFAULT_DECISIVE_MARGIN,
		}
	}

	pub fn validate(&self) -> Result<()> {
		if self.database.trim().is_empty() {
			return Err(Error::Config("database location must not be empty".into()));
		}
		if self.top_players == 0 {
			return Err(Error::Config("top player count must be at least 1".into()));
		}
		if self.top_countries == 0 {
			return Err(Error::Config("top country count must be at least 1".into()));
		}
		if self.decisive_margin < 0 {
			return Err(Error::Config(format!(
				"decisive margin must not be negative, got {}",
				self.decisive_margin
			)));
		}
		Ok(())
	}

	pub fn is_in_memory(&self) -> bool {
		self.database == MEMORY_DATABASE
	}

	pub fn input_path(&self, file_name: &str) -> PathBuf {
		self.data_dir.join(file_name)
	}
}
