mod common;

use tourney_stats::{
	config::MEMORY_DATABASE,
	db::{self, Table},
	Config, Error,
};

#[test]
fn all_tables_exist() {
	let conn = common::empty_db();
	for table in Table::ALL {
		let exists: bool = conn
			.query_row(
				"SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
				[table.name()],
				|row| row.get(0),
			)
			.unwrap();
		assert!(exists, "table '{}' should exist", table.name());
		assert_eq!(db::row_count(&conn, table).unwrap(), 0);
	}
}

#[test]
fn foreign_keys_enabled() {
	let conn = common::empty_db();
	let fk: i32 = conn
		.query_row("PRAGMA foreign_keys", [], |row| row.get(0))
		.unwrap();
	assert_eq!(fk, 1);
}

#[test]
fn create_twice_is_a_schema_error() {
	let mut conn = common::empty_db();
	match db::create_tables(&mut conn) {
		Err(Error::Schema { table, .. }) => assert_eq!(table, "Team"),
		other => panic!("expected schema error, got {other:?}"),
	}
}

#[test]
fn reset_is_idempotent() {
	let config = Config::new(MEMORY_DATABASE, ".");
	let mut conn = db::open_database(&config).unwrap();
	db::reset_schema(&mut conn).unwrap();
	db::reset_schema(&mut conn).unwrap();
	db::create_tables(&mut conn).unwrap();
	db::rebuild_schema(&mut conn).unwrap();
	db::rebuild_schema(&mut conn).unwrap();
}

#[test]
fn reset_discards_previous_rows() {
	let mut conn = common::empty_db();
	conn.execute("INSERT INTO Team (teamID, name) VALUES (1, 'Vitality')", [])
		.unwrap();
	assert_eq!(db::row_count(&conn, Table::Team).unwrap(), 1);

	db::rebuild_schema(&mut conn).unwrap();
	assert_eq!(db::row_count(&conn, Table::Team).unwrap(), 0);
}

#[test]
fn file_database_survives_reopen() {
	let dir = tempfile::TempDir::new().unwrap();
	let path = dir.path().join("stats.db");
	let config = Config::new(path.to_string_lossy(), dir.path());

	{
		let mut conn = db::open_database(&config).unwrap();
		db::rebuild_schema(&mut conn).unwrap();
	}

	let conn = db::open_database(&config).unwrap();
	assert_eq!(db::row_count(&conn, Table::Performance).unwrap(), 0);
}

#[test]
fn unreachable_database_is_a_connection_error() {
	let dir = tempfile::TempDir::new().unwrap();
	let path = dir.path().join("missing").join("nested").join("stats.db");
	let config = Config::new(path.to_string_lossy(), dir.path());

	assert!(matches!(
		db::open_database(&config),
		Err(Error::Connection { .. })
	));
}
