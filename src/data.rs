use std::{fmt, path::Path, str::FromStr};

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fixed-point value with two fraction digits, kept as hundredths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(i64);

impl Rating {
	pub const MAX_HUNDREDTHS: i64 = 9999;

	pub fn from_hundredths(hundredths: i64) -> Option<Self> {
		(hundredths.unsigned_abs() <= Self::MAX_HUNDREDTHS as u64).then_some(Rating(hundredths))
	}

	pub fn hundredths(self) -> i64 {
		self.0
	}

	pub fn to_decimal(self) -> Decimal {
		Decimal::new(self.0, 2)
	}

	pub fn as_f64(self) -> f64 {
		self.0 as f64 / 100.0
	}
}

impl FromStr for Rating {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		let value = Decimal::from_str(s.trim()).map_err(|e| e.to_string())?;
		let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
		rounded.rescale(2);

		i64::try_from(rounded.mantissa())
			.ok()
			.and_then(Rating::from_hundredths)
			.ok_or_else(|| format!("{value} is outside -99.99..=99.99"))
	}
}

impl fmt::Display for Rating {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_decimal())
	}
}

impl ToSql for Rating {
	fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
		Ok(ToSqlOutput::from(self.0))
	}
}

impl FromSql for Rating {
	fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
		let hundredths = i64::column_result(value)?;
		Rating::from_hundredths(hundredths).ok_or(FromSqlError::OutOfRange(hundredths))
	}
}

/// A validated calendar date that keeps the text it was read from. The
/// stored value is that text, not a reformatted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDate {
	date: NaiveDate,
	text: String,
}

impl MatchDate {
	pub fn date(&self) -> NaiveDate {
		self.date
	}

	pub fn as_str(&self) -> &str {
		&self.text
	}
}

impl FromStr for MatchDate {
	type Err = chrono::ParseError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		let text = s.trim();
		Ok(MatchDate {
			date: NaiveDate::parse_from_str(text, DATE_FORMAT)?,
			text: text.to_string(),
		})
	}
}

impl ToSql for MatchDate {
	fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
		Ok(ToSqlOutput::from(self.text.as_str()))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
	pub id: i64,
	pub name: String,
	pub region: Option<String>,
	pub ranking: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
	pub id: i64,
	pub team_id: i64,
	pub username: String,
	pub country: Option<String>,
	pub role: Option<String>,
	pub details: String,
	pub overall_rating: Option<Rating>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
	pub id: i64,
	pub map: Option<String>,
	pub date: Option<MatchDate>,
	pub duration: Option<i64>,
	pub type_info: Option<String>,
	pub match_type: Option<String>,
	pub stage: Option<String>,
	pub team1_id: i64,
	pub team2_id: i64,
	pub team1_score: Option<i64>,
	pub team2_score: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
	pub match_id: i64,
	pub player_id: i64,
	pub kills: Option<i64>,
	pub deaths: Option<i64>,
	pub assists: Option<i64>,
	pub rating: Rating,
	pub details: String,
}

// Raw rows straight from the CSV headers. A missing column and an empty cell
// both arrive as `None`.

#[derive(Debug, Default, Deserialize)]
pub struct RawTeam {
	#[serde(rename = "teamID")]
	pub team_id: Option<String>,
	pub name: Option<String>,
	pub region: Option<String>,
	pub ranking: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPlayer {
	#[serde(rename = "playerID")]
	pub player_id: Option<String>,
	#[serde(rename = "teamID")]
	pub team_id: Option<String>,
	pub username: Option<String>,
	pub country: Option<String>,
	pub role: Option<String>,
	pub details: Option<String>,
	pub overall_rating: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawMatch {
	#[serde(rename = "matchID")]
	pub match_id: Option<String>,
	pub map: Option<String>,
	pub date: Option<String>,
	pub duration: Option<String>,
	pub type_info: Option<String>,
	pub match_type: Option<String>,
	pub stage: Option<String>,
	#[serde(rename = "team1ID")]
	pub team1_id: Option<String>,
	#[serde(rename = "team2ID")]
	pub team2_id: Option<String>,
	pub team1_score: Option<String>,
	pub team2_score: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPerformance {
	#[serde(rename = "matchID")]
	pub match_id: Option<String>,
	#[serde(rename = "playerID")]
	pub player_id: Option<String>,
	pub kills: Option<String>,
	pub deaths: Option<String>,
	pub assists: Option<String>,
	pub rating: Option<String>,
	pub details: Option<String>,
}

/// Where a record came from, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
	pub path: &'a Path,
	pub line: u64,
}

impl RowContext<'_> {
	fn invalid(&self, field: &'static str, value: &str, reason: impl ToString) -> Error {
		Error::Parse {
			path: self.path.to_path_buf(),
			line: self.line,
			field,
			value: value.to_string(),
			reason: reason.to_string(),
		}
	}

	fn present(value: Option<String>) -> Option<String> {
		value.filter(|v| !v.is_empty())
	}

	pub fn required_int(&self, field: &'static str, value: Option<String>) -> Result<i64> {
		match Self::present(value) {
			Some(v) => v.trim().parse().map_err(|e| self.invalid(field, &v, e)),
			None => Err(self.invalid(field, "", "missing required value")),
		}
	}

	pub fn optional_int(&self, field: &'static str, value: Option<String>) -> Result<Option<i64>> {
		Self::present(value)
			.map(|v| v.trim().parse().map_err(|e| self.invalid(field, &v, e)))
			.transpose()
	}

	pub fn required_rating(&self, field: &'static str, value: Option<String>) -> Result<Rating> {
		match Self::present(value) {
			Some(v) => v.parse().map_err(|e| self.invalid(field, &v, e)),
			None => Err(self.invalid(field, "", "missing required value")),
		}
	}

	pub fn optional_rating(
		&self,
		field: &'static str,
		value: Option<String>,
	) -> Result<Option<Rating>> {
		Self::present(value)
			.map(|v| v.parse().map_err(|e| self.invalid(field, &v, e)))
			.transpose()
	}

	pub fn optional_date(
		&self,
		field: &'static str,
		value: Option<String>,
	) -> Result<Option<MatchDate>> {
		Self::present(value)
			.map(|v| v.parse().map_err(|e| self.invalid(field, &v, e)))
			.transpose()
	}

	pub fn required_text(&self, field: &'static str, value: Option<String>) -> Result<String> {
		Self::present(value).ok_or_else(|| self.invalid(field, "", "missing required value"))
	}

	pub fn optional_text(value: Option<String>) -> Option<String> {
		Self::present(value)
	}

	pub fn free_text(value: Option<String>) -> String {
		value.unwrap_or_default()
	}
}

impl Team {
	pub fn from_raw(raw: RawTeam, ctx: &RowContext) -> Result<Self> {
		Ok(Team {
			id: ctx.required_int("teamID", raw.team_id)?,
			name: ctx.required_text("name", raw.name)?,
			region: RowContext::optional_text(raw.region),
			ranking: ctx.optional_int("ranking", raw.ranking)?,
		})
	}
}

impl Player {
	pub fn from_raw(raw: RawPlayer, ctx: &RowContext) -> Result<Self> {
		Ok(Player {
			id: ctx.required_int("playerID", raw.player_id)?,
			team_id: ctx.required_int("teamID", raw.team_id)?,
			username: ctx.required_text("username", raw.username)?,
			country: RowContext::optional_text(raw.country),
			role: RowContext::optional_text(raw.role),
			details: RowContext::free_text(raw.details),
			overall_rating: ctx.optional_rating("overall_rating", raw.overall_rating)?,
		})
	}
}

impl Match {
	pub fn from_raw(raw: RawMatch, ctx: &RowContext) -> Result<Self> {
		Ok(Match {
			id: ctx.required_int("matchID", raw.match_id)?,
			map: RowContext::optional_text(raw.map),
			date: ctx.optional_date("date", raw.date)?,
			duration: ctx.optional_int("duration", raw.duration)?,
			type_info: RowContext::optional_text(raw.type_info),
			match_type: RowContext::optional_text(raw.match_type),
			stage: RowContext::optional_text(raw.stage),
			team1_id: ctx.required_int("team1ID", raw.team1_id)?,
			team2_id: ctx.required_int("team2ID", raw.team2_id)?,
			team1_score: ctx.optional_int("team1_score", raw.team1_score)?,
			team2_score: ctx.optional_int("team2_score", raw.team2_score)?,
		})
	}
}

impl Performance {
	pub fn from_raw(raw: RawPerformance, ctx: &RowContext) -> Result<Self> {
		Ok(Performance {
			match_id: ctx.required_int("matchID", raw.match_id)?,
			player_id: ctx.required_int("playerID", raw.player_id)?,
			kills: ctx.optional_int("kills", raw.kills)?,
			deaths: ctx.optional_int("deaths", raw.deaths)?,
			assists: ctx.optional_int("assists", raw.assists)?,
			rating: ctx.required_rating("rating", raw.rating)?,
			details: RowContext::free_text(raw.details),
		})
	}
}
