use rusqlite::Connection;

use crate::config::Config;
use crate::error::{Error, Result};

/// The four tournament tables, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
	Team,
	Player,
	Match,
	Performance,
}

impl Table {
	pub const ALL: [Table; 4] = [Table::Team, Table::Player, Table::Match, Table::Performance];

	pub fn name(self) -> &'static str {
		match self {
			Table::Team => "Team",
			Table::Player => "Player",
			Table::Match => "Match",
			Table::Performance => "Performance",
		}
	}

	fn ddl(self) -> &'static str {
		match self {
			Table::Team => TEAM_SQL,
			Table::Player => PLAYER_SQL,
			Table::Match => MATCH_SQL,
			Table::Performance => PERFORMANCE_SQL,
		}
	}
}

pub fn open_database(config: &Config) -> Result<Connection> {
	let opened = if config.is_in_memory() {
		Connection::open_in_memory()
	} else {
		Connection::open(&config.database)
	};
	let conn = opened.map_err(|source| Error::Connection {
		path: config.database.clone(),
		source,
	})?;

	conn.execute_batch("PRAGMA foreign_keys = ON;")
		.map_err(|source| Error::Connection {
			path: config.database.clone(),
			source,
		})?;

	log::debug!("opened database {}", config.database);
	Ok(conn)
}

/// Drops every tournament table, dependents first. Safe to call on an empty
/// database.
pub fn reset_schema(conn: &mut Connection) -> Result<()> {
	let tx = conn.transaction().map_err(|source| Error::Schema {
		table: Table::Team.name(),
		source,
	})?;

	for table in Table::ALL.iter().rev() {
		tx.execute(&format!("DROP TABLE IF EXISTS \"{}\";", table.name()), [])
			.map_err(|source| Error::Schema {
				table: table.name(),
				source,
			})?;
	}

	tx.commit().map_err(|source| Error::Schema {
		table: Table::Team.name(),
		source,
	})
}

/// Creates Team, Player, Match and Performance in one transaction. Fails if
/// any of them already exists.
pub fn create_tables(conn: &mut Connection) -> Result<()> {
	let tx = conn.transaction().map_err(|source| Error::Schema {
		table: Table::Team.name(),
		source,
	})?;

	for table in Table::ALL {
		tx.execute(table.ddl(), []).map_err(|source| Error::Schema {
			table: table.name(),
			source,
		})?;
	}

	tx.commit().map_err(|source| Error::Schema {
		table: Table::Performance.name(),
		source,
	})
}

pub fn rebuild_schema(conn: &mut Connection) -> Result<()> {
	reset_schema(conn)?;
	create_tables(conn)?;
	log::info!("schema rebuilt");
	Ok(())
}

pub fn row_count(conn: &Connection, table: Table) -> Result<i64> {
	conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\";", table.name()), [], |row| {
		row.get(0)
	})
	.map_err(Error::query("row_count"))
}

// Ratings are stored in hundredths; the CHECKs mirror DECIMAL(4,2).

const TEAM_SQL: &str = "CREATE TABLE Team (
	teamID  INTEGER PRIMARY KEY,
	name    TEXT    NOT NULL,
	region  TEXT,
	ranking INTEGER
);";

const PLAYER_SQL: &str = "CREATE TABLE Player (
	playerID       INTEGER PRIMARY KEY,
	teamID         INTEGER NOT NULL
	                       REFERENCES Team (teamID),
	username       TEXT    NOT NULL,
	country        TEXT,
	role           TEXT,
	details        TEXT    NOT NULL
	                       DEFAULT '',
	overall_rating INTEGER CHECK (overall_rating BETWEEN -9999 AND 9999)
);";

const MATCH_SQL: &str = "CREATE TABLE \"Match\" (
	matchID     INTEGER PRIMARY KEY,
	map         TEXT,
	date        TEXT,
	duration    INTEGER,
	type_info   TEXT,
	match_type  TEXT,
	stage       TEXT,
	team1ID     INTEGER NOT NULL
	                    REFERENCES Team (teamID),
	team2ID     INTEGER NOT NULL
	                    REFERENCES Team (teamID),
	team1_score INTEGER,
	team2_score INTEGER
);";

const PERFORMANCE_SQL: &str = "CREATE TABLE Performance (
	matchID  INTEGER NOT NULL
	                 REFERENCES \"Match\" (matchID),
	playerID INTEGER NOT NULL
	                 REFERENCES Player (playerID),
	kills    INTEGER,
	deaths   INTEGER,
	assists  INTEGER,
	rating   INTEGER NOT NULL
	                 CHECK (rating BETWEEN -9999 AND 9999),
	details  TEXT    NOT NULL
	                 DEFAULT '',
	PRIMARY KEY (matchID, playerID)
);";
