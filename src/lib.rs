//! Tournament statistics: loads team, player, match and performance CSVs into
//! SQLite, runs a fixed set of ranking queries and charts the results.

pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod load;
pub mod queries;

use std::path::PathBuf;

use rusqlite::Connection;

pub use config::Config;
pub use error::{Error, Result};
pub use load::LoadSummary;
pub use queries::Report;

#[derive(Debug)]
pub struct RunOutput {
	pub summary: LoadSummary,
	pub report: Report,
	pub charts: Vec<PathBuf>,
}

/// Rebuilds the schema, loads every table, runs the queries and renders the
/// charts if a chart directory is configured.
pub fn run_pipeline(conn: &mut Connection, config: &Config) -> Result<RunOutput> {
	config.validate()?;

	db::rebuild_schema(conn)?;
	let summary = load::load_all(conn, config)?;
	let report = queries::run_all(conn, config)?;

	let charts = match &config.chart_dir {
		Some(dir) => chart::render_all(&report, dir, config.top_countries)?,
		None => Vec::new(),
	};

	Ok(RunOutput {
		summary,
		report,
		charts,
	})
}
