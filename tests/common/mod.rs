#![allow(dead_code)]

use std::{fs, path::Path};

use rusqlite::Connection;
use tempfile::TempDir;
use tourney_stats::{config::MEMORY_DATABASE, db, Config};

pub const TEAMS: &str = "\
teamID,name,region,ranking
1,Vitality,Europe,1
2,Spirit,CIS,2
3,FaZe,Europe,
4,MOUZ,Europe,5
";

pub const PLAYERS: &str = "\
playerID,teamID,username,country,role,details,overall_rating
10,1,ZywOo,France,AWPer,,1.30
11,1,apEX,France,IGL,\"Captain, veteran\",1.02
20,2,donk,Russia,Rifler,,1.35
21,2,sh1ro,Russia,AWPer,,1.20
30,3,ropz,Estonia,Lurker,,1.15
31,3,karrigan,Denmark,IGL,,
40,4,torzsi,Hungary,AWPer,,1.10
41,4,xertioN,,Rifler,,1.05
";

pub const MATCHES: &str = "\
matchID,map,date,duration,type_info,match_type,stage,team1ID,team2ID,team1_score,team2_score
100,Mirage,2024-06-01,45,bo3,playoff,Quarterfinal,1,2,13,7
101,Inferno,2024-06-02,50,bo3,playoff,Quarterfinal,3,4,10,13
102,Mirage,2024-06-03,60,bo3,playoff,Semifinal,1,4,16,14
103,Nuke,2024-06-04,,bo1,group,Group A,2,3,13,13
";

pub const PERFORMANCE: &str = "\
matchID,playerID,kills,deaths,assists,rating,details
100,10,25,12,5,1.50,
100,11,15,14,8,1.00,
100,20,20,18,3,1.10,
100,21,12,16,2,0.80,
101,30,22,15,4,1.25,
101,31,10,17,9,0.75,
101,40,18,14,6,1.20,
101,41,16,15,5,1.05,
102,10,30,14,6,1.70,ace on B site
102,11,14,16,7,0.90,
102,40,20,18,4,1.00,
102,41,19,17,3,1.10,
103,20,28,15,4,1.60,
103,21,17,16,3,1.00,
103,30,21,19,5,1.10,
103,31,12,18,10,0.70,
";

pub fn write_inputs(dir: &Path, teams: &str, players: &str, matches: &str, performance: &str) {
	fs::write(dir.join("teams.csv"), teams).unwrap();
	fs::write(dir.join("players.csv"), players).unwrap();
	fs::write(dir.join("matches.csv"), matches).unwrap();
	fs::write(dir.join("performance.csv"), performance).unwrap();
}

/// A data directory holding the standard four-team fixture.
pub fn fixture_dir() -> TempDir {
	let dir = TempDir::new().unwrap();
	write_inputs(dir.path(), TEAMS, PLAYERS, MATCHES, PERFORMANCE);
	dir
}

pub fn memory_config(data_dir: &Path) -> Config {
	Config::new(MEMORY_DATABASE, data_dir)
}

/// In-memory database with an empty schema.
pub fn empty_db() -> Connection {
	let config = Config::new(MEMORY_DATABASE, ".");
	let mut conn = db::open_database(&config).unwrap();
	db::rebuild_schema(&mut conn).unwrap();
	conn
}

pub fn assert_close(actual: f64, expected: f64) {
	assert!(
		(actual - expected).abs() < 1e-9,
		"expected {expected}, got {actual}"
	);
}
