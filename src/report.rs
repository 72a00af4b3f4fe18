use std::cmp::Ordering;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use smartstring::alias::{String as SmartString};

use super::config::Paths;
use super::plot;
use super::series::doubling_days;
use super::store::Store;


/// Columns the comparison table can be sorted on, descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
	Max,
	MaxDay,
	Today,
	Deaths,
	PercentDeaths,
	Last,
	NewCases,
	PercentGrowth,
	DoubleDays,
}

pub static SORTABLE_COLUMNS: &'static [&'static str] = &[
	"Max", "Max-Day", "Today", "Deaths", "%Deaths", "Last", "New Cases", "%growth", "Double Days",
];

impl SortColumn {
	pub fn parse(name: &str) -> Option<Self> {
		match name {
			"Max" => Some(Self::Max),
			"Max-Day" => Some(Self::MaxDay),
			"Today" => Some(Self::Today),
			"Deaths" => Some(Self::Deaths),
			"%Deaths" => Some(Self::PercentDeaths),
			"Last" => Some(Self::Last),
			"New Cases" => Some(Self::NewCases),
			"%growth" => Some(Self::PercentGrowth),
			"Double Days" => Some(Self::DoubleDays),
			_ => None,
		}
	}

	pub fn header(&self) -> &'static str {
		match self {
			Self::Max => "Max",
			Self::MaxDay => "Max-Day",
			Self::Today => "Today",
			Self::Deaths => "Deaths",
			Self::PercentDeaths => "%Deaths",
			Self::Last => "Last",
			Self::NewCases => "New Cases",
			Self::PercentGrowth => "%growth",
			Self::DoubleDays => "Double Days",
		}
	}
}


/// Per-country digest for the comparison table.
///
/// `cases` is the trailing window; `percent` and `doubling` can be shorter
/// than `diff` because zero denominators and zero growth entries are
/// dropped, not zero-filled, on this path.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySummary {
	pub name: SmartString,
	pub max_cases: u64,
	pub max_day: usize,
	pub today_cases: u64,
	pub today_death: u64,
	pub percent_deaths: Option<f64>,
	pub cases: Vec<u64>,
	pub diff: Vec<i64>,
	pub percent: Vec<f64>,
	pub doubling: Vec<f64>,
}

pub fn summarize(store: &Store, days: usize) -> Vec<CountrySummary> {
	let mut result = Vec::with_capacity(store.countries.len());
	for (name, record) in store.countries.iter() {
		let confirmed = &record.confirmed;
		if confirmed.is_empty() {
			info!("country {} has no data", name);
			continue
		}
		let today_cases = *confirmed.last().expect("non-empty confirmed series");
		let today_death = record.death.last().copied().unwrap_or(0);
		let percent_deaths = if today_cases != 0 {
			Some(100.0 * today_death as f64 / today_cases as f64)
		} else {
			None
		};

		// first occurrence of the maximum, 1-based
		let mut max_cases = confirmed[0];
		let mut max_day = 1;
		for (i, v) in confirmed.iter().enumerate() {
			if *v > max_cases {
				max_cases = *v;
				max_day = i + 1;
			}
		}

		let window = &confirmed[confirmed.len().saturating_sub(days)..];
		let cases = window.to_vec();
		let diff: Vec<i64> = window.windows(2)
			.map(|w| w[1] as i64 - w[0] as i64)
			.collect();
		let percent: Vec<f64> = diff.iter().enumerate()
			.filter(|(i, _)| window[*i] != 0)
			.map(|(i, d)| 100.0 * *d as f64 / window[i] as f64)
			.collect();
		let doubling: Vec<f64> = percent.iter()
			.filter(|p| **p != 0.0)
			.map(|p| doubling_days(*p))
			.collect();

		result.push(CountrySummary{
			name: name.clone(),
			max_cases,
			max_day,
			today_cases,
			today_death,
			percent_deaths,
			cases,
			diff,
			percent,
			doubling,
		});
	}
	result
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
	a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn cmp_f64_slices(a: &[f64], b: &[f64]) -> Ordering {
	for (x, y) in a.iter().zip(b.iter()) {
		match cmp_f64(*x, *y) {
			Ordering::Equal => (),
			other => return other,
		}
	}
	a.len().cmp(&b.len())
}

/// Sort descending by the selected column. "New Cases" orders by the most
/// recent delta only; the other list-valued columns compare lexicographically.
pub fn sort_summaries(rows: &mut Vec<CountrySummary>, col: SortColumn) {
	match col {
		SortColumn::Max => rows.sort_by(|a, b| b.max_cases.cmp(&a.max_cases)),
		SortColumn::MaxDay => rows.sort_by(|a, b| b.max_day.cmp(&a.max_day)),
		SortColumn::Today => rows.sort_by(|a, b| b.today_cases.cmp(&a.today_cases)),
		SortColumn::Deaths => rows.sort_by(|a, b| b.today_death.cmp(&a.today_death)),
		SortColumn::PercentDeaths => rows.sort_by(|a, b| cmp_f64(
			b.percent_deaths.unwrap_or(f64::NEG_INFINITY),
			a.percent_deaths.unwrap_or(f64::NEG_INFINITY),
		)),
		SortColumn::Last => rows.sort_by(|a, b| b.cases.cmp(&a.cases)),
		SortColumn::NewCases => rows.sort_by(|a, b| {
			b.diff.last().copied().unwrap_or(0).cmp(&a.diff.last().copied().unwrap_or(0))
		}),
		SortColumn::PercentGrowth => rows.sort_by(|a, b| cmp_f64_slices(&b.percent, &a.percent)),
		SortColumn::DoubleDays => rows.sort_by(|a, b| cmp_f64_slices(&b.doubling, &a.doubling)),
	}
}


/// Fixed-width rendering of headers plus rows; columns are padded to the
/// widest cell and right-aligned.
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
	let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
	for row in rows {
		for (i, cell) in row.iter().enumerate() {
			if i < widths.len() && cell.len() > widths[i] {
				widths[i] = cell.len();
			}
		}
	}
	let mut out = String::new();
	for (i, h) in headers.iter().enumerate() {
		if i > 0 {
			out.push_str("  ");
		}
		out.push_str(&format!("{:>1$}", h, widths[i]));
	}
	out.push('\n');
	for (i, w) in widths.iter().enumerate() {
		if i > 0 {
			out.push_str("  ");
		}
		out.push_str(&"-".repeat(*w));
	}
	out.push('\n');
	for row in rows {
		for (i, cell) in row.iter().enumerate() {
			if i > 0 {
				out.push_str("  ");
			}
			out.push_str(&format!("{:>1$}", cell, widths[i]));
		}
		out.push('\n');
	}
	out
}

fn join_counts(values: &[u64]) -> String {
	values.iter()
		.map(|v| format!("{:>7}", v))
		.collect::<Vec<_>>()
		.join(",")
}

fn join_deltas(values: &[i64]) -> String {
	values.iter()
		.map(|v| format!("{:>7}", v))
		.collect::<Vec<_>>()
		.join(",")
}

fn join_floats(values: &[f64]) -> String {
	values.iter()
		.map(|v| format!("{:>3.0}", v))
		.collect::<Vec<_>>()
		.join(", ")
}

fn summary_row(index: usize, s: &CountrySummary) -> Vec<String> {
	vec![
		format!("{}", index + 1),
		s.name.to_string(),
		s.max_cases.to_string(),
		s.max_day.to_string(),
		s.today_cases.to_string(),
		s.today_death.to_string(),
		match s.percent_deaths {
			Some(p) => format!("{:.0}", p),
			None => "NaN".to_string(),
		},
		join_counts(&s.cases),
		join_deltas(&s.diff),
		join_floats(&s.percent),
		join_floats(&s.doubling),
	]
}

/// The `report table` command. A missing or malformed store is reported and
/// produces no output.
pub fn print_table(paths: &Paths, sort_col: &str, days: usize, row_limit: usize) -> Result<(), Box<dyn Error>> {
	let store = match Store::load(paths.db_file()) {
		Ok(store) => store,
		Err(e) => {
			warn!("failed to load store from {}: {}", paths.db_file().display(), e);
			return Ok(())
		},
	};
	let col = match SortColumn::parse(sort_col) {
		Some(col) => col,
		None => {
			warn!(
				"sort column should match one of {:?}, defaulting to Max",
				SORTABLE_COLUMNS,
			);
			SortColumn::Max
		},
	};

	let mut summaries = summarize(&store, days);
	sort_summaries(&mut summaries, col);
	if row_limit > 0 {
		summaries.truncate(row_limit);
	}

	let mut headers: Vec<String> = vec!["idx".into(), "Country".into()];
	for name in SORTABLE_COLUMNS.iter() {
		let mut h = match *name {
			"Last" => format!("Last {} days", days),
			other => other.to_string(),
		};
		if *name == col.header() {
			h.push('*');
		}
		headers.push(h);
	}
	let rows: Vec<Vec<String>> = summaries.iter().enumerate()
		.map(|(i, s)| summary_row(i, s))
		.collect();

	println!("From date: {} to date: {}", store.metadata.start, store.metadata.end);
	let limit = if row_limit > 0 {
		row_limit.to_string()
	} else {
		"all rows".to_string()
	};
	println!("Sort column: {} Number of rows: {}", col.header(), limit);
	println!();
	print!("{}", format_table(&headers, &rows));
	Ok(())
}


fn skip_leading_zeroes(series: &[u64]) -> Vec<u64> {
	match series.iter().position(|v| *v > 0) {
		Some(i) => series[i..].to_vec(),
		None => Vec::new(),
	}
}

/// The `report plot` command: comparison plot of one or more countries,
/// each series starting at its first non-zero entry.
pub fn compare_plot(paths: &Paths, countries: &[String], file: Option<&Path>) -> Result<(), Box<dyn Error>> {
	let store = match Store::load(paths.db_file()) {
		Ok(store) => store,
		Err(e) => {
			warn!("failed to load store from {}: {}", paths.db_file().display(), e);
			return Ok(())
		},
	};

	let mut selected = Vec::new();
	for country in countries {
		match store.countries.get(country.as_str()) {
			None => println!("Country: {} not found", country),
			Some(record) => selected.push((
				country.clone(),
				skip_leading_zeroes(&record.confirmed),
				skip_leading_zeroes(&record.death),
			)),
		}
	}
	if selected.is_empty() {
		warn!("none of the requested countries are in the store");
		return Ok(())
	}

	let end_label = store.metadata.end.to_string();
	let path = resolve_plot_path(paths, file, &end_label, countries);
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}
	plot::comparison(&path, &end_label, &selected)?;
	println!("Saved plot: {}", path.display());
	Ok(())
}

fn resolve_plot_path(paths: &Paths, file: Option<&Path>, end_label: &str, countries: &[String]) -> PathBuf {
	let default_name = || {
		let mut names: Vec<String> = countries.iter()
			.map(|c| c.replace(' ', "-"))
			.collect();
		names.sort();
		format!("{}_{}.png", end_label, names.join("_"))
	};
	match file {
		Some(f) if f.is_dir() => f.join(default_name()),
		Some(f) => f.to_path_buf(),
		None => paths.plot_dir().join(default_name()),
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use super::super::store::Metadata;
	use chrono::NaiveDate;

	fn store_with(entries: &[(&str, Vec<u64>, Vec<u64>)]) -> Store {
		let dates: Vec<NaiveDate> = (1..=entries[0].1.len() as u32)
			.map(|d| NaiveDate::from_ymd(2020, 1, d))
			.collect();
		let mut store = Store::new(Metadata::from_dates(&dates));
		for (name, confirmed, death) in entries {
			assert!(store.store(Some(name), None, None, confirmed, death));
		}
		store
	}

	#[test]
	fn summarize_digests_each_country() {
		let store = store_with(&[("A", vec![1, 5, 5, 4], vec![0, 0, 1, 1])]);
		let summaries = summarize(&store, 3);
		assert_eq!(summaries.len(), 1);
		let s = &summaries[0];
		assert_eq!(s.max_cases, 5);
		assert_eq!(s.max_day, 2); // first occurrence
		assert_eq!(s.today_cases, 4);
		assert_eq!(s.today_death, 1);
		assert_eq!(s.percent_deaths, Some(25.0));
		assert_eq!(s.cases, vec![5, 5, 4]);
		assert_eq!(s.diff, vec![0, -1]);
	}

	#[test]
	fn percent_deaths_is_nan_on_zero_cases() {
		let store = store_with(&[("A", vec![0, 0], vec![0, 0])]);
		let summaries = summarize(&store, 2);
		assert_eq!(summaries[0].percent_deaths, None);
		assert_eq!(summary_row(0, &summaries[0])[6], "NaN");
	}

	#[test]
	fn window_shorter_series_are_tolerated() {
		let store = store_with(&[("A", vec![3, 9], vec![0, 0])]);
		let summaries = summarize(&store, 5);
		assert_eq!(summaries[0].cases, vec![3, 9]);
		assert_eq!(summaries[0].diff, vec![6]);
	}

	#[test]
	fn zero_denominators_shrink_percent_not_zero_fill() {
		let store = store_with(&[("A", vec![0, 4, 4], vec![0, 0, 0])]);
		let summaries = summarize(&store, 3);
		// first delta has a zero leading value, second has zero growth
		assert_eq!(summaries[0].percent, vec![0.0]);
		assert!(summaries[0].doubling.is_empty());
	}

	#[test]
	fn new_cases_sorts_by_most_recent_delta() {
		let store = store_with(&[
			("A", vec![0, 50, 60], vec![0, 0, 0]),
			("B", vec![0, 5, 45], vec![0, 0, 0]),
		]);
		// A's deltas are [50, 10], B's are [5, 40]; B must rank first
		let mut summaries = summarize(&store, 3);
		sort_summaries(&mut summaries, SortColumn::NewCases);
		assert_eq!(summaries[0].name, "B");
		assert_eq!(summaries[1].name, "A");
		// while Max ranks A first
		sort_summaries(&mut summaries, SortColumn::Max);
		assert_eq!(summaries[0].name, "A");
	}

	#[test]
	fn unknown_sort_column_has_no_mapping() {
		assert_eq!(SortColumn::parse("Max"), Some(SortColumn::Max));
		assert_eq!(SortColumn::parse("New Cases"), Some(SortColumn::NewCases));
		assert_eq!(SortColumn::parse("bogus"), None);
	}

	#[test]
	fn leading_zeroes_are_trimmed_for_plots() {
		assert_eq!(skip_leading_zeroes(&[0, 0, 3, 0, 4]), vec![3, 0, 4]);
		assert_eq!(skip_leading_zeroes(&[0, 0]), Vec::<u64>::new());
	}

	#[test]
	fn format_table_pads_to_the_widest_cell() {
		let headers = vec!["a".to_string(), "bb".to_string()];
		let rows = vec![vec!["100".to_string(), "1".to_string()]];
		let out = format_table(&headers, &rows);
		let lines: Vec<&str> = out.lines().collect();
		assert_eq!(lines[0], "  a  bb");
		assert_eq!(lines[1], "---  --");
		assert_eq!(lines[2], "100   1");
	}
}
