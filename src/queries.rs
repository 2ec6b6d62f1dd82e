//! Read-only aggregate queries over a fully loaded tournament.
//!
//! Ratings are stored in hundredths; every mean is converted back to rating
//! units before it leaves this module. All orderings are total so repeated
//! runs over the same data produce identical output.

use rusqlite::{params, Connection, Row};

use crate::config::Config;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRating {
	pub username: String,
	pub avg_rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapRating {
	/// `None` for matches loaded without a map.
	pub map: Option<String>,
	pub avg_rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamWinRate {
	pub name: String,
	pub matches_played: i64,
	pub wins: i64,
	/// Percentage, rounded to two decimals.
	pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryBest {
	pub country: String,
	pub username: String,
	pub avg_rating: f64,
	pub total_kills: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCount {
	pub country: String,
	pub players: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisiveMatch {
	pub match_id: i64,
	pub map: Option<String>,
	pub team1_score: i64,
	pub team2_score: i64,
}

impl DecisiveMatch {
	pub fn margin(&self) -> i64 {
		(self.team1_score - self.team2_score).abs()
	}
}

/// Every result set of one run, in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
	pub top_players: Vec<PlayerRating>,
	pub rating_by_map: Vec<MapRating>,
	pub team_win_rates: Vec<TeamWinRate>,
	pub best_per_country: Vec<CountryBest>,
	pub players_by_country: Vec<CountryCount>,
	pub decisive_matches: Vec<DecisiveMatch>,
}

fn mean_rating(row: &Row, idx: usize) -> rusqlite::Result<f64> {
	Ok(row.get::<_, f64>(idx)? / 100.0)
}

pub fn top_players(conn: &Connection, limit: usize) -> Result<Vec<PlayerRating>> {
	let mut stmt = conn
		.prepare_cached(
			"SELECT p.username,
			        AVG(perf.rating) AS avg_rating
			 FROM Player p
			 JOIN Performance perf ON p.playerID = perf.playerID
			 GROUP BY p.playerID, p.username
			 ORDER BY avg_rating DESC, p.username ASC, p.playerID ASC
			 LIMIT ?1;",
		)
		.map_err(Error::query("top_players"))?;

	let limit = i64::try_from(limit).unwrap_or(i64::MAX);
	let rows = stmt
		.query_map(params![limit], |row| {
			Ok(PlayerRating {
				username: row.get(0)?,
				avg_rating: mean_rating(row, 1)?,
			})
		})
		.map_err(Error::query("top_players"))?;

	rows.collect::<rusqlite::Result<Vec<_>>>()
		.map_err(Error::query("top_players"))
}

pub fn avg_rating_by_map(conn: &Connection) -> Result<Vec<MapRating>> {
	let mut stmt = conn
		.prepare_cached(
			"SELECT m.map,
			        AVG(perf.rating) AS avg_rating
			 FROM \"Match\" m
			 JOIN Performance perf ON m.matchID = perf.matchID
			 GROUP BY m.map
			 ORDER BY avg_rating DESC, m.map IS NULL, m.map ASC;",
		)
		.map_err(Error::query("avg_rating_by_map"))?;

	let rows = stmt
		.query_map([], |row| {
			Ok(MapRating {
				map: row.get(0)?,
				avg_rating: mean_rating(row, 1)?,
			})
		})
		.map_err(Error::query("avg_rating_by_map"))?;

	rows.collect::<rusqlite::Result<Vec<_>>>()
		.map_err(Error::query("avg_rating_by_map"))
}

/// Each match is counted once from each side. Ties and matches with a
/// missing score count as played but not won.
pub fn team_win_rates(conn: &Connection) -> Result<Vec<TeamWinRate>> {
	let mut stmt = conn
		.prepare_cached(
			"SELECT t.name,
			        COUNT(*) AS matches_played,
			        SUM(CASE WHEN s.team_score > s.opp_score THEN 1 ELSE 0 END) AS wins,
			        ROUND(100.0 * SUM(CASE WHEN s.team_score > s.opp_score THEN 1 ELSE 0 END)
			              / COUNT(*), 2) AS win_rate
			 FROM (
			     SELECT team1ID AS teamID, team1_score AS team_score, team2_score AS opp_score
			     FROM \"Match\"
			     UNION ALL
			     SELECT team2ID AS teamID, team2_score AS team_score, team1_score AS opp_score
			     FROM \"Match\"
			 ) s
			 JOIN Team t ON t.teamID = s.teamID
			 GROUP BY t.teamID, t.name
			 ORDER BY win_rate DESC, wins DESC, t.name ASC, t.teamID ASC;",
		)
		.map_err(Error::query("team_win_rates"))?;

	let rows = stmt
		.query_map([], |row| {
			Ok(TeamWinRate {
				name: row.get(0)?,
				matches_played: row.get(1)?,
				wins: row.get(2)?,
				win_rate: row.get(3)?,
			})
		})
		.map_err(Error::query("team_win_rates"))?;

	rows.collect::<rusqlite::Result<Vec<_>>>()
		.map_err(Error::query("team_win_rates"))
}

/// The single strongest player of every country that has one, ranked by mean
/// rating, then total kills, then username. Missing kills add nothing.
pub fn best_player_per_country(conn: &Connection) -> Result<Vec<CountryBest>> {
	let mut stmt = conn
		.prepare_cached(
			"WITH per_player AS (
			     SELECT p.country,
			            p.username,
			            AVG(perf.rating) AS avg_rating,
			            COALESCE(SUM(perf.kills), 0) AS total_kills
			     FROM Player p
			     JOIN Performance perf ON p.playerID = perf.playerID
			     WHERE p.country IS NOT NULL AND p.country <> ''
			     GROUP BY p.playerID, p.country, p.username
			 ),
			 ranked AS (
			     SELECT country,
			            username,
			            avg_rating,
			            total_kills,
			            ROW_NUMBER() OVER (
			                PARTITION BY country
			                ORDER BY avg_rating DESC, total_kills DESC, username ASC
			            ) AS rn
			     FROM per_player
			 )
			 SELECT country, username, avg_rating, total_kills
			 FROM ranked
			 WHERE rn = 1
			 ORDER BY avg_rating DESC, country ASC;",
		)
		.map_err(Error::query("best_player_per_country"))?;

	let rows = stmt
		.query_map([], |row| {
			Ok(CountryBest {
				country: row.get(0)?,
				username: row.get(1)?,
				avg_rating: mean_rating(row, 2)?,
				total_kills: row.get(3)?,
			})
		})
		.map_err(Error::query("best_player_per_country"))?;

	rows.collect::<rusqlite::Result<Vec<_>>>()
		.map_err(Error::query("best_player_per_country"))
}

pub fn player_count_by_country(conn: &Connection) -> Result<Vec<CountryCount>> {
	let mut stmt = conn
		.prepare_cached(
			"SELECT country,
			        COUNT(*) AS player_count
			 FROM Player
			 WHERE country IS NOT NULL AND country <> ''
			 GROUP BY country
			 ORDER BY player_count DESC, country ASC;",
		)
		.map_err(Error::query("player_count_by_country"))?;

	let rows = stmt
		.query_map([], |row| {
			Ok(CountryCount {
				country: row.get(0)?,
				players: row.get(1)?,
			})
		})
		.map_err(Error::query("player_count_by_country"))?;

	rows.collect::<rusqlite::Result<Vec<_>>>()
		.map_err(Error::query("player_count_by_country"))
}

/// Matches won by at least `margin` rounds, by match id.
pub fn decisive_matches(conn: &Connection, margin: i64) -> Result<Vec<DecisiveMatch>> {
	let mut stmt = conn
		.prepare_cached(
			"SELECT matchID, map, team1_score, team2_score
			 FROM \"Match\"
			 WHERE ABS(team1_score - team2_score) >= ?1
			 ORDER BY matchID;",
		)
		.map_err(Error::query("decisive_matches"))?;

	let rows = stmt
		.query_map(params![margin], |row| {
			Ok(DecisiveMatch {
				match_id: row.get(0)?,
				map: row.get(1)?,
				team1_score: row.get(2)?,
				team2_score: row.get(3)?,
			})
		})
		.map_err(Error::query("decisive_matches"))?;

	rows.collect::<rusqlite::Result<Vec<_>>>()
		.map_err(Error::query("decisive_matches"))
}

pub fn run_all(conn: &Connection, config: &Config) -> Result<Report> {
	let report = Report {
		top_players: top_players(conn, config.top_players)?,
		rating_by_map: avg_rating_by_map(conn)?,
		team_win_rates: team_win_rates(conn)?,
		best_per_country: best_player_per_country(conn)?,
		players_by_country: player_count_by_country(conn)?,
		decisive_matches: decisive_matches(conn, config.decisive_margin)?,
	};

	log::info!(
		"queries complete: {} top players, {} maps, {} teams, {} countries",
		report.top_players.len(),
		report.rating_by_map.len(),
		report.team_win_rates.len(),
		report.players_by_country.len()
	);
	Ok(report)
}
