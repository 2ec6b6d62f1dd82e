use std::{io, path::Path};

use rusqlite::{params, Connection, Statement};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::data::{
	Match, Performance, Player, RawMatch, RawPerformance, RawPlayer, RawTeam, RowContext, Team,
};
use crate::db::Table;
use crate::error::{Error, Result};

/// A typed row that can be read from its CSV file and inserted into its
/// table.
pub trait Record: Sized {
	const TABLE: Table;
	const FILE_NAME: &'static str;
	const INSERT_SQL: &'static str;

	type Raw: DeserializeOwned;

	fn from_raw(raw: Self::Raw, ctx: &RowContext) -> Result<Self>;

	fn insert(&self, stmt: &mut Statement) -> rusqlite::Result<usize>;

	/// Key columns, used to identify the row in error messages.
	fn key(&self) -> String;
}

impl Record for Team {
	const TABLE: Table = Table::Team;
	const FILE_NAME: &'static str = "teams.csv";
	const INSERT_SQL: &'static str = "INSERT INTO Team (teamID, name, region, ranking)
		 VALUES (?1, ?2, ?3, ?4);";

	type Raw = RawTeam;

	fn from_raw(raw: RawTeam, ctx: &RowContext) -> Result<Self> {
		Team::from_raw(raw, ctx)
	}

	fn insert(&self, stmt: &mut Statement) -> rusqlite::Result<usize> {
		stmt.execute(params![self.id, self.name, self.region, self.ranking])
	}

	fn key(&self) -> String {
		format!("teamID={}", self.id)
	}
}

impl Record for Player {
	const TABLE: Table = Table::Player;
	const FILE_NAME: &'static str = "players.csv";
	const INSERT_SQL: &'static str = "INSERT INTO Player
		 (playerID, teamID, username, country, role, details, overall_rating)
		 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);";

	type Raw = RawPlayer;

	fn from_raw(raw: RawPlayer, ctx: &RowContext) -> Result<Self> {
		Player::from_raw(raw, ctx)
	}

	fn insert(&self, stmt: &mut Statement) -> rusqlite::Result<usize> {
		stmt.execute(params![
			self.id,
			self.team_id,
			self.username,
			self.country,
			self.role,
			self.details,
			self.overall_rating,
		])
	}

	fn key(&self) -> String {
		format!("playerID={} (teamID={})", self.id, self.team_id)
	}
}

impl Record for Match {
	const TABLE: Table = Table::Match;
	const FILE_NAME: &'static str = "matches.csv";
	const INSERT_SQL: &'static str = "INSERT INTO \"Match\"
		 (matchID, map, date, duration, type_info, match_type, stage,
		  team1ID, team2ID, team1_score, team2_score)
		 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);";

	type Raw = RawMatch;

	fn from_raw(raw: RawMatch, ctx: &RowContext) -> Result<Self> {
		Match::from_raw(raw, ctx)
	}

	fn insert(&self, stmt: &mut Statement) -> rusqlite::Result<usize> {
		stmt.execute(params![
			self.id,
			self.map,
			self.date,
			self.duration,
			self.type_info,
			self.match_type,
			self.stage,
			self.team1_id,
			self.team2_id,
			self.team1_score,
			self.team2_score,
		])
	}

	fn key(&self) -> String {
		format!("matchID={} (team1ID={}, team2ID={})", self.id, self.team1_id, self.team2_id)
	}
}

impl Record for Performance {
	const TABLE: Table = Table::Performance;
	const FILE_NAME: &'static str = "performance.csv";
	const INSERT_SQL: &'static str = "INSERT INTO Performance
		 (matchID, playerID, kills, deaths, assists, rating, details)
		 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);";

	type Raw = RawPerformance;

	fn from_raw(raw: RawPerformance, ctx: &RowContext) -> Result<Self> {
		Performance::from_raw(raw, ctx)
	}

	fn insert(&self, stmt: &mut Statement) -> rusqlite::Result<usize> {
		stmt.execute(params![
			self.match_id,
			self.player_id,
			self.kills,
			self.deaths,
			self.assists,
			self.rating,
			self.details,
		])
	}

	fn key(&self) -> String {
		format!("matchID={}, playerID={}", self.match_id, self.player_id)
	}
}

/// Rows inserted per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
	pub teams: usize,
	pub players: usize,
	pub matches: usize,
	pub performances: usize,
}

/// Parses every data row of a CSV stream. `path` only labels errors.
pub fn parse_records<R: Record, I: io::Read>(
	mut reader: csv::Reader<I>,
	path: &Path,
) -> Result<Vec<R>> {
	let read_error = |source| Error::Read {
		path: path.to_path_buf(),
		source,
	};

	let headers = reader.headers().map_err(read_error)?.clone();
	let mut records = Vec::new();

	for result in reader.records() {
		let row = result.map_err(read_error)?;
		let line = row.position().map_or(0, |p| p.line());
		let raw: R::Raw = row.deserialize(Some(&headers)).map_err(read_error)?;

		records.push(R::from_raw(raw, &RowContext { path, line })?);
	}

	Ok(records)
}

pub fn read_records<R: Record>(path: &Path) -> Result<Vec<R>> {
	let reader = csv::ReaderBuilder::new()
		.has_headers(true)
		.from_path(path)
		.map_err(|source| Error::Read {
			path: path.to_path_buf(),
			source,
		})?;

	parse_records(reader, path)
}

/// Inserts all records in one transaction. Nothing is committed if any row
/// fails.
pub fn insert_records<R: Record>(conn: &mut Connection, records: &[R]) -> Result<usize> {
	let table = R::TABLE.name();
	let load_error = |source| Error::Load { table, source };

	let tx = conn.transaction().map_err(load_error)?;
	{
		let mut stmt = tx.prepare_cached(R::INSERT_SQL).map_err(load_error)?;
		for record in records {
			record
				.insert(&mut stmt)
				.map_err(|source| Error::from_insert(table, record.key(), source))?;
		}
	}
	tx.commit().map_err(load_error)?;

	Ok(records.len())
}

pub fn load_table<R: Record>(conn: &mut Connection, config: &Config) -> Result<usize> {
	let path = config.input_path(R::FILE_NAME);
	let records = read_records::<R>(&path)?;
	let count = insert_records(conn, &records)?;

	log::info!("loaded {count} rows into {} from {}", R::TABLE.name(), path.display());
	Ok(count)
}

/// Loads Team, Player, Match and Performance, in that order.
pub fn load_all(conn: &mut Connection, config: &Config) -> Result<LoadSummary> {
	Ok(LoadSummary {
		teams: load_table::<Team>(conn, config)?,
		players: load_table::<Player>(conn, config)?,
		matches: load_table::<Match>(conn, config)?,
		performances: load_table::<Performance>(conn, config)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse<R: Record>(input: &str) -> Result<Vec<R>> {
		let reader = csv::ReaderBuilder::new().from_reader(input.as_bytes());
		parse_records(reader, Path::new("test.csv"))
	}

	#[test]
	fn columns_are_matched_by_header() {
		let teams: Vec<Team> = parse("ranking,name,teamID\n3,Spirit,7\n,FaZe,8\n").unwrap();
		assert_eq!(teams.len(), 2);
		assert_eq!(teams[0].id, 7);
		assert_eq!(teams[0].name, "Spirit");
		assert_eq!(teams[0].ranking, Some(3));
		assert_eq!(teams[1].ranking, None);
		assert_eq!(teams[1].region, None);
	}

	#[test]
	fn missing_optional_column_is_null() {
		let players: Vec<Player> = parse("playerID,teamID,username\n1,7,donk\n").unwrap();
		assert_eq!(players[0].country, None);
		assert_eq!(players[0].details, "");
		assert_eq!(players[0].overall_rating, None);
	}

	#[test]
	fn parse_error_carries_line_number() {
		let result: Result<Vec<Team>> = parse("teamID,name\n1,NaVi\nx,G2\n");
		match result {
			Err(Error::Parse { line, field, .. }) => {
				assert_eq!(line, 3);
				assert_eq!(field, "teamID");
			}
			other => panic!("expected parse error, got {other:?}"),
		}
	}

	#[test]
	fn ragged_row_is_a_read_error() {
		let result: Result<Vec<Team>> = parse("teamID,name\n1,NaVi,extra\n");
		assert!(matches!(result, Err(Error::Read { .. })));
	}
}
