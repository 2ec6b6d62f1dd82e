mod common;

use std::fs;

use tourney_stats::{chart, db, run_pipeline, Config, Error};

#[test]
fn rerun_produces_identical_report() {
	let dir = common::fixture_dir();
	let config = common::memory_config(dir.path());
	let mut conn = db::open_database(&config).unwrap();

	let first = run_pipeline(&mut conn, &config).unwrap();
	let second = run_pipeline(&mut conn, &config).unwrap();

	assert_eq!(first.summary, second.summary);
	assert_eq!(first.report, second.report);
	assert_eq!(
		chart::format_report(&first.report),
		chart::format_report(&second.report)
	);
	assert!(first.charts.is_empty());
}

#[test]
fn rerun_against_a_file_database() {
	let data = common::fixture_dir();
	let store = tempfile::TempDir::new().unwrap();
	let path = store.path().join("tournament.db");
	let config = Config::new(path.to_string_lossy(), data.path());

	let first = {
		let mut conn = db::open_database(&config).unwrap();
		run_pipeline(&mut conn, &config).unwrap()
	};
	let mut conn = db::open_database(&config).unwrap();
	let second = run_pipeline(&mut conn, &config).unwrap();

	assert_eq!(first.report, second.report);
	assert_eq!(second.summary.performances, 16);
}

#[test]
fn charts_are_written_for_every_query() {
	let data = common::fixture_dir();
	let out = tempfile::TempDir::new().unwrap();
	let mut config = common::memory_config(data.path());
	config.chart_dir = Some(out.path().join("charts"));

	let mut conn = db::open_database(&config).unwrap();
	let output = run_pipeline(&mut conn, &config).unwrap();

	assert_eq!(output.charts.len(), 6);
	for path in &output.charts {
		let svg = fs::read_to_string(path).unwrap();
		assert!(svg.contains("<svg"), "{} is not an svg", path.display());
	}
	assert!(out.path().join("charts").join("players_by_country.svg").exists());
}

#[test]
fn country_pie_folds_the_tail_into_other() {
	let data = common::fixture_dir();
	let mut config = common::memory_config(data.path());
	config.top_countries = 2;

	let mut conn = db::open_database(&config).unwrap();
	let output = run_pipeline(&mut conn, &config).unwrap();

	let slices = chart::collapse_other(&output.report.players_by_country, config.top_countries);
	assert_eq!(
		slices,
		vec![
			("France".to_string(), 2),
			("Russia".to_string(), 2),
			(chart::OTHER_LABEL.to_string(), 3),
		]
	);
}

#[test]
fn invalid_config_stops_before_loading() {
	let data = common::fixture_dir();
	let mut config = common::memory_config(data.path());
	config.top_players = 0;

	let mut conn = db::open_database(&config).unwrap();
	assert!(matches!(
		run_pipeline(&mut conn, &config),
		Err(Error::Config(_))
	));
}

#[test]
fn failed_load_surfaces_the_stage() {
	let data = common::fixture_dir();
	fs::write(
		data.path().join("performance.csv"),
		"matchID,playerID,kills,deaths,assists,rating\n100,10,lots,1,1,1.00\n",
	)
	.unwrap();
	let config = common::memory_config(data.path());

	let mut conn = db::open_database(&config).unwrap();
	let err = run_pipeline(&mut conn, &config).unwrap_err();
	let message = err.to_string();
	assert!(message.contains("performance.csv:2"), "{message}");
	assert!(message.contains("kills"), "{message}");
}
