use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use chrono::NaiveDate;

use log::{info, warn};

use super::config::Paths;
use super::ioutil::magic_open;
use super::jhu::{self, CaseRow, RowKind, WideTable};
use super::plot;
use super::series;
use super::store::{Metadata, Store, StoreError};


/// Countries whose provincial rows are summed into a single country-level
/// series before the per-row pass, so that the country total exists even
/// though the source never reports a country-only row for them.
pub static ROLLUP_COUNTRIES: &'static [&'static str] = &["Canada", "China", "Australia"];


#[derive(Debug)]
pub enum ProcessError {
	Io(io::Error),
	Table(jhu::TableError),
	Store(StoreError),
}

impl fmt::Display for ProcessError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Io(e) => fmt::Display::fmt(e, f),
			Self::Table(e) => write!(f, "failed to parse raw data: {}", e),
			Self::Store(e) => fmt::Display::fmt(e, f),
		}
	}
}

impl From<io::Error> for ProcessError {
	fn from(err: io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<jhu::TableError> for ProcessError {
	fn from(err: jhu::TableError) -> Self {
		Self::Table(err)
	}
}

impl From<StoreError> for ProcessError {
	fn from(err: StoreError) -> Self {
		Self::Store(err)
	}
}

impl std::error::Error for ProcessError {}


#[derive(Debug)]
enum RowSkip {
	NoDeathRow,
	AmbiguousDeathRow,
	Rejected,
}

impl fmt::Display for RowSkip {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::NoDeathRow => f.write_str("no matching row in the deaths table"),
			Self::AmbiguousDeathRow => f.write_str("multiple matching rows in the deaths table"),
			Self::Rejected => f.write_str("rejected by the store"),
		}
	}
}


fn title_preamble(date: NaiveDate) -> String {
	date.format("%Y%m%d").to_string()
}

fn is_city_row(row: &CaseRow) -> bool {
	match row.kind() {
		RowKind::City{..} => true,
		_ => false,
	}
}

fn sum_rows<'x, I: Iterator<Item = &'x CaseRow>>(rows: I, len: usize) -> Vec<u64> {
	let mut total = vec![0u64; len];
	for row in rows {
		for (slot, v) in total.iter_mut().zip(row.counts.iter()) {
			*slot += *v;
		}
	}
	total
}

/// The deaths table is cross-referenced by exact (country, raw province)
/// equality; anything but exactly one match tolerably fails the row.
fn find_death_row<'x>(
		deaths: &'x WideTable,
		country: &str,
		province: Option<&str>,
) -> Result<&'x CaseRow, RowSkip> {
	let mut matches = deaths.rows.iter().filter(|r| {
		r.country == country && r.province.as_deref() == province
	});
	match (matches.next(), matches.next()) {
		(Some(row), None) => Ok(row),
		(None, _) => Err(RowSkip::NoDeathRow),
		(Some(_), Some(_)) => Err(RowSkip::AmbiguousDeathRow),
	}
}

fn emit_region_plot(plot_dir: Option<&Path>, preamble: &str, title: &str, data: &[u64]) {
	let dir = match plot_dir {
		Some(dir) => dir,
		None => return,
	};
	let derived = series::derive(data);
	let path = dir.join(format!("{}-{}.png", preamble, title));
	// a failed render must not cost us the region's store entry
	if let Err(e) = plot::region_panels(&path, title, data, &derived.diff, &derived.percent) {
		warn!("failed to render {}: {}", path.display(), e);
	}
}

fn rollup_country(
		country: &str,
		confirmed: &WideTable,
		deaths: &WideTable,
		store: &mut Store,
		plot_dir: Option<&Path>,
		preamble: &str,
) {
	info!("processing roll-up country: {}", country);
	// city rows would be double counted below their province rows
	let confirmed_rows = confirmed.rows.iter()
		.filter(|r| r.country == country && !is_city_row(r));
	let death_rows = deaths.rows.iter()
		.filter(|r| r.country == country && !is_city_row(r));
	let confirmed_total = sum_rows(confirmed_rows, confirmed.dates.len());
	let death_total = sum_rows(death_rows, deaths.dates.len());
	if confirmed_total.iter().all(|v| *v == 0) {
		warn!("roll-up country {} has no confirmed rows", country);
	}
	emit_region_plot(plot_dir, preamble, country, &confirmed_total);
	store.store(Some(country), None, None, &confirmed_total, &death_total);
}

fn process_row(
		row: &CaseRow,
		deaths: &WideTable,
		store: &mut Store,
		plot_dir: Option<&Path>,
		preamble: &str,
) -> Result<(), RowSkip> {
	let (province, city, title) = match row.kind() {
		RowKind::CountryOnly => (None, None, row.country.clone()),
		RowKind::Province(p) => (Some(p), None, format!("{}_{}", row.country, p.trim())),
		RowKind::City{city, province} => (
			Some(province),
			Some(city),
			format!("{}_{}_{}", row.country, province, city),
		),
	};
	let death_row = find_death_row(deaths, &row.country, row.province.as_deref())?;
	emit_region_plot(plot_dir, preamble, &title, &row.counts);
	if !store.store(Some(&row.country), province, city, &row.counts, &death_row.counts) {
		return Err(RowSkip::Rejected)
	}
	Ok(())
}

/// Rebuild the nested store from the two parsed snapshots.
///
/// The accumulator is created here and returned; no row failure aborts the
/// pass. When `plot_dir` is given, a three-panel image per region is emitted
/// along the way, named from the snapshot's last date.
pub fn build_store(confirmed: &WideTable, deaths: &WideTable, plot_dir: Option<&Path>) -> Store {
	let metadata = Metadata::from_dates(&confirmed.dates);
	let preamble = title_preamble(confirmed.last_date());
	let mut store = Store::new(metadata);

	for country in ROLLUP_COUNTRIES {
		rollup_country(country, confirmed, deaths, &mut store, plot_dir, &preamble);
	}
	for row in confirmed.rows.iter() {
		match process_row(row, deaths, &mut store, plot_dir, &preamble) {
			Ok(()) => (),
			Err(e) => warn!(
				"skipping row for country {:?} province {:?}: {}",
				row.country, row.province, e,
			),
		}
	}
	store
}

/// The `process` command: parse the raw snapshots, rebuild the store with
/// per-region plots, and persist it, overwriting any previous document.
pub fn process_world(paths: &Paths) -> Result<Store, ProcessError> {
	let confirmed = jhu::load_table(magic_open(paths.confirmed_csv())?)?;
	let deaths = jhu::load_table(magic_open(paths.deaths_csv())?)?;
	let plot_dir = paths.plot_dir();
	fs::create_dir_all(&plot_dir)?;
	let store = build_store(&confirmed, &deaths, Some(&plot_dir));
	store.save(paths.db_file())?;
	info!("persisted {} countries to {}", store.countries.len(), paths.db_file().display());
	Ok(store)
}


#[cfg(test)]
mod tests {
	use super::*;
	use super::super::jhu::load_table;

	static CONFIRMED: &'static str = "\
Province/State,Country/Region,Lat,Long,1/1/20,1/2/20,1/3/20
Ontario,Canada,45.0,-75.0,10,15,20
Quebec,Canada,46.8,-71.2,1,2,3
,Iceland,64.9,-19.0,0,1,2
california,US,36.7,-119.4,7,8,9
\"Los Angeles, california\",US,34.0,-118.2,2,3,4
,Orphania,0.0,0.0,5,6,7
";

	static DEATHS: &'static str = "\
Province/State,Country/Region,Lat,Long,1/1/20,1/2/20,1/3/20
Ontario,Canada,45.0,-75.0,0,1,1
Quebec,Canada,46.8,-71.2,0,0,1
,Iceland,64.9,-19.0,0,0,0
california,US,36.7,-119.4,0,0,2
\"Los Angeles, california\",US,34.0,-118.2,0,1,1
";

	fn tables() -> (WideTable, WideTable) {
		(
			load_table(CONFIRMED.as_bytes()).unwrap(),
			load_table(DEATHS.as_bytes()).unwrap(),
		)
	}

	#[test]
	fn example_row_lands_under_its_province() {
		let (confirmed, deaths) = tables();
		let store = build_store(&confirmed, &deaths, None);
		let ontario = &store.countries["Canada"].provinces["Ontario"];
		assert_eq!(ontario.confirmed, vec![10, 15, 20]);
		assert_eq!(ontario.death, vec![0, 1, 1]);
		let derived = series::derive(&ontario.confirmed);
		assert_eq!(derived.diff, vec![5, 5]);
		assert!((derived.percent[0] - 100.0 / 3.0).abs() < 1e-9);
		assert!((derived.percent[1] - 25.0).abs() < 1e-9);
	}

	#[test]
	fn rollup_sums_non_city_rows() {
		let (confirmed, deaths) = tables();
		let store = build_store(&confirmed, &deaths, None);
		let canada = &store.countries["Canada"];
		assert_eq!(canada.confirmed, vec![11, 17, 23]);
		assert_eq!(canada.death, vec![0, 1, 2]);
		assert_eq!(canada.provinces.len(), 2);
	}

	#[test]
	fn city_rows_nest_below_normalized_provinces() {
		let (confirmed, deaths) = tables();
		let store = build_store(&confirmed, &deaths, None);
		let us = &store.countries["US"];
		let ca = &us.provinces["CA"];
		assert_eq!(ca.confirmed, vec![7, 8, 9]);
		assert_eq!(ca.cities["Los Angeles"].confirmed, vec![2, 3, 4]);
		assert_eq!(ca.cities["Los Angeles"].death, vec![0, 1, 1]);
	}

	#[test]
	fn rows_without_a_death_match_are_skipped() {
		let (confirmed, deaths) = tables();
		let store = build_store(&confirmed, &deaths, None);
		assert!(!store.countries.contains_key("Orphania"));
		// the rest of the pass still ran
		assert!(store.countries.contains_key("Iceland"));
	}

	#[test]
	fn metadata_covers_the_header_dates() {
		let (confirmed, deaths) = tables();
		let store = build_store(&confirmed, &deaths, None);
		assert_eq!(store.metadata.start, NaiveDate::from_ymd(2020, 1, 1));
		assert_eq!(store.metadata.end, NaiveDate::from_ymd(2020, 1, 3));
		assert_eq!(store.metadata.dates.len(), 3);
	}
}
