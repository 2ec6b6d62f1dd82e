use std::{
	fs::File,
	io::{self, Write},
	process::ExitCode,
};

use clap::Parser;
use tourney_stats::{
	chart::format_report,
	cli::{Cli, Commands},
	db, queries, run_pipeline, Config, Error, Result,
};

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
		.target(env_logger::Target::Stderr)
		.init();

	let cli = Cli::parse();

	match run(cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			log::error!("{e}");
			ExitCode::FAILURE
		}
	}
}

fn run(cli: Cli) -> Result<()> {
	let report = match cli.command {
		Commands::Run(args) => {
			let config = args.into_config(cli.database);
			let mut conn = db::open_database(&config)?;
			let output = run_pipeline(&mut conn, &config)?;

			log::info!(
				"loaded {} teams, {} players, {} matches, {} performances",
				output.summary.teams,
				output.summary.players,
				output.summary.matches,
				output.summary.performances
			);
			output.report
		}
		Commands::Print {
			top_players,
			decisive_margin,
		} => {
			let mut config = Config::new(cli.database, ".");
			config.top_players = top_players;
			config.decisive_margin = decisive_margin;
			config.validate()?;

			let conn = db::open_database(&config)?;
			queries::run_all(&conn, &config)?
		}
	};

	let mut out = match cli.output.as_deref() {
		Some(path) => {
			let file = File::create(path).map_err(|e| output_error(path.display(), e))?;
			Box::new(file) as Box<dyn Write>
		}
		None => Box::new(io::stdout()) as Box<dyn Write>,
	};

	out.write_all(format_report(&report).as_bytes())
		.map_err(|e| output_error("report", e))
}

fn output_error(target: impl ToString, source: io::Error) -> Error {
	Error::Output {
		target: target.to_string(),
		source,
	}
}
