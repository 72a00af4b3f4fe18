use std::fmt;
use std::io;

use chrono::NaiveDate;

use log::warn;


/// Leading identifying columns before the date columns start:
/// `Province/State, Country/Region, Lat, Long`.
pub const META_COLUMNS: usize = 4;

static DATE_FORMAT: &'static str = "%m/%d/%y";


#[derive(Debug)]
pub enum TableError {
	Csv(csv::Error),
	MissingDateColumns,
	BadDateHeader(String),
}

impl fmt::Display for TableError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Csv(e) => fmt::Display::fmt(e, f),
			Self::MissingDateColumns => f.write_str("table has no date columns"),
			Self::BadDateHeader(col) => write!(f, "malformed date header column {:?}", col),
		}
	}
}

impl From<csv::Error> for TableError {
	fn from(err: csv::Error) -> Self {
		Self::Csv(err)
	}
}

impl std::error::Error for TableError {}


#[derive(Debug, Clone)]
enum RowError {
	ShortRow{ncolumns: usize},
	BadCount{column: usize, value: String},
}

impl fmt::Display for RowError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::ShortRow{ncolumns} => write!(f, "row has only {} columns", ncolumns),
			Self::BadCount{column, value} => write!(f, "unparseable count {:?} in column {}", value, column),
		}
	}
}


/// One wide-format row: a cumulative count per date column for one
/// (country, province?) tuple. An absent province field is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRow {
	pub province: Option<String>,
	pub country: String,
	pub lat: f64,
	pub lon: f64,
	pub counts: Vec<u64>,
}

/// Shape of a row, derived from its province field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind<'x> {
	CountryOnly,
	Province(&'x str),
	City{city: &'x str, province: &'x str},
}

impl CaseRow {
	/// Classify the row: no province field at all, a plain province name, or
	/// a `"City, Province"` pair (split on the first comma, city first).
	pub fn kind(&self) -> RowKind {
		match &self.province {
			None => RowKind::CountryOnly,
			Some(p) => match p.split_once(',') {
				None => RowKind::Province(p.as_str()),
				Some((city, province)) => RowKind::City{
					city: city.trim(),
					province: province.trim(),
				},
			},
		}
	}
}


/// A parsed snapshot: the shared date axis plus one row per region.
#[derive(Debug, Clone)]
pub struct WideTable {
	pub dates: Vec<NaiveDate>,
	pub rows: Vec<CaseRow>,
}

impl WideTable {
	pub fn last_date(&self) -> NaiveDate {
		*self.dates.last().expect("table without date columns")
	}
}


/// Parse a wide-format CSV snapshot.
///
/// A malformed date header fails the whole load; malformed data rows are
/// logged and skipped so that one bad region never aborts the pass.
pub fn load_table<R: io::Read>(r: R) -> Result<WideTable, TableError> {
	let mut rdr = csv::Reader::from_reader(r);
	let headers = rdr.headers()?.clone();
	if headers.len() <= META_COLUMNS {
		return Err(TableError::MissingDateColumns)
	}
	let mut dates = Vec::with_capacity(headers.len() - META_COLUMNS);
	for col in headers.iter().skip(META_COLUMNS) {
		let date = NaiveDate::parse_from_str(col, DATE_FORMAT)
			.map_err(|_| TableError::BadDateHeader(col.into()))?;
		dates.push(date);
	}

	let mut rows = Vec::new();
	for (i, rec) in rdr.records().enumerate() {
		let rec = match rec {
			Ok(rec) => rec,
			Err(e) => {
				warn!("skipping unreadable row {}: {}", i + 1, e);
				continue
			},
		};
		match parse_row(&rec, dates.len()) {
			Ok(row) => rows.push(row),
			Err(e) => warn!("skipping malformed row {}: {}", i + 1, e),
		}
	}
	Ok(WideTable{dates, rows})
}

fn parse_row(rec: &csv::StringRecord, ndates: usize) -> Result<CaseRow, RowError> {
	if rec.len() != META_COLUMNS + ndates {
		return Err(RowError::ShortRow{ncolumns: rec.len()})
	}
	let province = match rec[0].trim() {
		"" => None,
		p => Some(p.to_string()),
	};
	let country = rec[1].trim().to_string();
	let lat = rec[2].trim().parse::<f64>().unwrap_or(0.0);
	let lon = rec[3].trim().parse::<f64>().unwrap_or(0.0);

	let mut counts = Vec::with_capacity(ndates);
	for (column, field) in rec.iter().enumerate().skip(META_COLUMNS) {
		let field = field.trim();
		if field.is_empty() {
			counts.push(0);
			continue
		}
		// the source occasionally formats counts as floats
		let v = field.parse::<f64>().map_err(|_| RowError::BadCount{
			column,
			value: field.to_string(),
		})?;
		counts.push(v as u64);
	}
	Ok(CaseRow{province, country, lat, lon, counts})
}
