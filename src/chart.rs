use std::{
	fs, io,
	path::{Path, PathBuf},
};

use plotters::drawing::DrawingAreaErrorKind;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::{Error, Result};
use crate::queries::{CountryCount, Report};

pub const OTHER_LABEL: &str = "Other";

type DrawResult = std::result::Result<(), DrawingAreaErrorKind<io::Error>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
	pub label: String,
	pub value: f64,
}

pub struct BarChart<'a> {
	pub title: &'a str,
	pub x_desc: &'a str,
	pub y_desc: &'a str,
	/// Fraction digits printed above each bar.
	pub precision: usize,
	pub bars: Vec<Bar>,
}

/// Keeps the first `top_n` countries and folds the remainder into a single
/// "Other" slice. The slice is omitted when nothing was folded.
pub fn collapse_other(rows: &[CountryCount], top_n: usize) -> Vec<(String, i64)> {
	let split = top_n.min(rows.len());
	let (top, rest) = rows.split_at(split);

	let mut slices: Vec<(String, i64)> = top
		.iter()
		.map(|row| (row.country.clone(), row.players))
		.collect();

	let other: i64 = rest.iter().map(|row| row.players).sum();
	if other > 0 {
		slices.push((OTHER_LABEL.to_string(), other));
	}

	slices
}

fn map_label(map: &Option<String>) -> String {
	map.clone().unwrap_or_else(|| "(unknown)".to_string())
}

pub fn bar_charts(report: &Report) -> Vec<(&'static str, BarChart<'static>)> {
	vec![
		(
			"top_players.svg",
			BarChart {
				title: "Top Players by Average Rating",
				x_desc: "Player",
				y_desc: "Avg Rating",
				precision: 2,
				bars: report
					.top_players
					.iter()
					.map(|row| Bar {
						label: row.username.clone(),
						value: row.avg_rating,
					})
					.collect(),
			},
		),
		(
			"rating_by_map.svg",
			BarChart {
				title: "Average Rating by Map",
				x_desc: "Map",
				y_desc: "Avg Rating",
				precision: 2,
				bars: report
					.rating_by_map
					.iter()
					.map(|row| Bar {
						label: map_label(&row.map),
						value: row.avg_rating,
					})
					.collect(),
			},
		),
		(
			"team_win_rates.svg",
			BarChart {
				title: "Team Win Rates",
				x_desc: "Team",
				y_desc: "Win Rate (%)",
				precision: 2,
				bars: report
					.team_win_rates
					.iter()
					.map(|row| Bar {
						label: row.name.clone(),
						value: row.win_rate,
					})
					.collect(),
			},
		),
		(
			"best_player_per_country.svg",
			BarChart {
				title: "Best Player per Country (by Avg Rating)",
				x_desc: "Country",
				y_desc: "Avg Rating",
				precision: 2,
				bars: report
					.best_per_country
					.iter()
					.map(|row| Bar {
						label: format!("{} ({})", row.country, row.username),
						value: row.avg_rating,
					})
					.collect(),
			},
		),
		(
			"decisive_matches.svg",
			BarChart {
				title: "Decisive Matches",
				x_desc: "Match",
				y_desc: "Score Difference",
				precision: 0,
				bars: report
					.decisive_matches
					.iter()
					.map(|row| Bar {
						label: format!("M{} ({})", row.match_id, map_label(&row.map)),
						value: row.margin() as f64,
					})
					.collect(),
			},
		),
	]
}

fn draw_bars(path: &Path, chart: &BarChart) -> DrawResult {
	let root = SVGBackend::new(path, (1024, 640)).into_drawing_area();
	root.fill(&WHITE)?;

	let bars = &chart.bars;
	let max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
	let min = bars.iter().map(|b| b.value).fold(0.0_f64, f64::min);
	let headroom = (max - min).max(1.0) * 0.15;
	let low = if min < 0.0 { min - headroom } else { 0.0 };
	let count = bars.len().max(1) as u32;

	let mut ctx = ChartBuilder::on(&root)
		.caption(chart.title, ("sans-serif", 28))
		.margin(16)
		.x_label_area_size(60)
		.y_label_area_size(60)
		.build_cartesian_2d((0u32..count).into_segmented(), low..(max + headroom))?;

	ctx.configure_mesh()
		.disable_x_mesh()
		.x_desc(chart.x_desc)
		.y_desc(chart.y_desc)
		.x_labels(bars.len().max(1))
		.x_label_formatter(&|v| match v {
			SegmentValue::CenterOf(i) => bars
				.get(*i as usize)
				.map(|b| b.label.clone())
				.unwrap_or_default(),
			_ => String::new(),
		})
		.draw()?;

	ctx.draw_series(bars.iter().enumerate().map(|(i, bar)| {
		let x = i as u32;
		let mut rect = Rectangle::new(
			[(SegmentValue::Exact(x), 0.0), (SegmentValue::Exact(x + 1), bar.value)],
			Palette99::pick(i).filled(),
		);
		rect.set_margin(0, 0, 6, 6);
		rect
	}))?;

	let value_style =
		TextStyle::from(("sans-serif", 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
	ctx.draw_series(bars.iter().enumerate().map(|(i, bar)| {
		Text::new(
			format!("{:.*}", chart.precision, bar.value),
			(SegmentValue::CenterOf(i as u32), bar.value),
			value_style.clone(),
		)
	}))?;

	root.present()
}

fn draw_pie(path: &Path, title: &str, slices: &[(String, i64)]) -> DrawResult {
	let root = SVGBackend::new(path, (960, 720)).into_drawing_area();
	root.fill(&WHITE)?;
	let area = root.titled(title, ("sans-serif", 28))?;

	let total: i64 = slices.iter().map(|(_, n)| n).sum();
	if total <= 0 {
		return root.present();
	}

	let (w, h) = area.dim_in_pixel();
	let center = (w as i32 / 2, h as i32 / 2);
	let radius = f64::from(w.min(h)) * 0.36;

	let sizes: Vec<f64> = slices.iter().map(|(_, n)| *n as f64).collect();
	let colors: Vec<RGBColor> = (0..slices.len())
		.map(|i| {
			let (r, g, b) = Palette99::COLORS[i % Palette99::COLORS.len()];
			RGBColor(r, g, b)
		})
		.collect();
	let labels: Vec<String> = slices
		.iter()
		.map(|(label, count)| format!("{label} ({count})"))
		.collect();

	let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
	pie.start_angle(-90.0);
	pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
	pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
	area.draw(&pie)?;

	root.present()
}

fn render_error(chart: &Path) -> impl FnOnce(DrawingAreaErrorKind<io::Error>) -> Error + '_ {
	move |e| Error::Render {
		chart: chart.display().to_string(),
		message: e.to_string(),
	}
}

/// Writes one SVG per query into `dir` and returns the written paths.
pub fn render_all(report: &Report, dir: &Path, top_countries: usize) -> Result<Vec<PathBuf>> {
	fs::create_dir_all(dir).map_err(|e| Error::Render {
		chart: dir.display().to_string(),
		message: e.to_string(),
	})?;

	let mut written = Vec::new();

	for (file_name, chart) in bar_charts(report) {
		let path = dir.join(file_name);
		draw_bars(&path, &chart).map_err(render_error(&path))?;
		written.push(path);
	}

	let path = dir.join("players_by_country.svg");
	let slices = collapse_other(&report.players_by_country, top_countries);
	draw_pie(&path, "Player Ratio by Country", &slices).map_err(render_error(&path))?;
	written.push(path);

	log::info!("wrote {} charts to {}", written.len(), dir.display());
	Ok(written)
}

/// Plain-text rendition of every result set.
pub fn format_report(report: &Report) -> String {
	let mut string = String::new();

	string.push_str("# Top Players by Average Rating\n```");
	for (rank, row) in report.top_players.iter().enumerate() {
		string.push_str(&format!("\n{}: {} - {:.2}", rank + 1, row.username, row.avg_rating));
	}

	string.push_str("\n```\n\n# Average Rating by Map\n```");
	for (rank, row) in report.rating_by_map.iter().enumerate() {
		let map = map_label(&row.map);
		string.push_str(&format!("\n{}: {map} - {:.2}", rank + 1, row.avg_rating));
	}

	string.push_str("\n```\n\n# Team Win Rates\n```");
	for (rank, row) in report.team_win_rates.iter().enumerate() {
		string.push_str(&format!(
			"\n{}: {} - {:.2}% ({}/{})",
			rank + 1,
			row.name,
			row.win_rate,
			row.wins,
			row.matches_played
		));
	}

	string.push_str("\n```\n\n# Best Player per Country\n```");
	for (rank, row) in report.best_per_country.iter().enumerate() {
		string.push_str(&format!(
			"\n{}: {} - {} {:.2} ({} kills)",
			rank + 1,
			row.country,
			row.username,
			row.avg_rating,
			row.total_kills
		));
	}

	string.push_str("\n```\n\n# Players by Country\n```");
	for (rank, row) in report.players_by_country.iter().enumerate() {
		string.push_str(&format!("\n{}: {} - {}", rank + 1, row.country, row.players));
	}

	string.push_str("\n```\n\n# Decisive Matches\n```");
	for row in &report.decisive_matches {
		string.push_str(&format!(
			"\nM{} ({}): {}-{}",
			row.match_id,
			map_label(&row.map),
			row.team1_score,
			row.team2_score
		));
	}
	string.push_str("\n```\n");

	string
}
