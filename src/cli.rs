use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{Config, DEFAULT_DECISIVE_MARGIN, DEFAULT_TOP_COUNTRIES, DEFAULT_TOP_PLAYERS};

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Load tournament CSVs into SQLite and chart the standings",
	long_about = None
)]
pub struct Cli {
	/// SQLite database file, or `:memory:`
	#[arg(long, env = "TOURNEY_DATABASE", value_name = "PATH")]
	pub database: String,

	/// Where the text report goes (stdout if omitted)
	#[arg(short, long, value_name = "FILE")]
	pub output: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Rebuild the schema, load every CSV, run the queries and draw the charts
	Run(RunArgs),
	/// Print the report for an already loaded database
	Print {
		#[arg(long, default_value_t = DEFAULT_TOP_PLAYERS)]
		top_players: usize,
		#[arg(long, default_value_t = DEFAULT_DECISIVE_MARGIN)]
		decisive_margin: i64,
	},
}

#[derive(Args)]
pub struct RunArgs {
	/// Directory holding teams.csv, players.csv, matches.csv and performance.csv
	#[arg(long, env = "TOURNEY_DATA_DIR", value_name = "DIR", default_value = ".")]
	pub data_dir: PathBuf,

	#[arg(long, env = "TOURNEY_CHART_DIR", value_name = "DIR", default_value = "charts")]
	pub chart_dir: PathBuf,

	#[arg(long)]
	pub no_charts: bool,

	#[arg(long, default_value_t = DEFAULT_TOP_PLAYERS)]
	pub top_players: usize,

	/// Countries shown before the rest are grouped as "Other"
	#[arg(long, default_value_t = DEFAULT_TOP_COUNTRIES)]
	pub top_countries: usize,

	#[arg(long, default_value_t = DEFAULT_DECISIVE_MARGIN)]
	pub decisive_margin: i64,
}

impl RunArgs {
	pub fn into_config(self, database: String) -> Config {
		Config {
			database,
			data_dir: self.data_dir,
			chart_dir: (!self.no_charts).then_some(self.chart_dir),
			top_players: self.top_players,
			top_countries: self.top_countries,
			decisive_margin: self.decisive_margin,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn run_defaults() {
		let cli = Cli::try_parse_from(["tourney-stats", "--database", "stats.db", "run"]).unwrap();
		assert_eq!(cli.database, "stats.db");
		let Commands::Run(args) = cli.command else {
			panic!("expected run");
		};
		let config = args.into_config(cli.database);
		assert_eq!(config.data_dir, PathBuf::from("."));
		assert_eq!(config.chart_dir, Some(PathBuf::from("charts")));
		assert_eq!(config.top_countries, DEFAULT_TOP_COUNTRIES);
	}

	#[test]
	fn no_charts_clears_chart_dir() {
		let cli = Cli::try_parse_from([
			"tourney-stats",
			"--database",
			":memory:",
			"run",
			"--data-dir",
			"data",
			"--no-charts",
			"--top-players",
			"5",
		])
		.unwrap();
		let Commands::Run(args) = cli.command else {
			panic!("expected run");
		};
		let config = args.into_config(cli.database);
		assert_eq!(config.chart_dir, None);
		assert_eq!(config.top_players, 5);
		assert_eq!(config.data_dir, PathBuf::from("data"));
	}

	#[test]
	fn print_subcommand() {
		let cli =
			Cli::try_parse_from(["tourney-stats", "--database", "stats.db", "print"]).unwrap();
		assert!(matches!(
			cli.command,
			Commands::Print {
				top_players: DEFAULT_TOP_PLAYERS,
				..
			}
		));
	}
}
