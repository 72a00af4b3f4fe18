use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use log::{debug, warn};

use scraper::{ElementRef, Html, Selector};

use super::fetch::FetchError;
use super::series::{doubling_days, DOUBLING_SENTINEL};


pub static REPORT_URL: &'static str = "https://www.ottawapublichealth.ca/en/reports-research-and-statistics/la-maladie-coronavirus-covid-19.aspx";

static DATE_FORMAT: &'static str = "%m/%d/%Y";


/// One scraped calendar day: cumulative total plus the derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct OttawaRow {
	pub date: NaiveDate,
	pub total: u64,
	pub new_cases: i64,
	pub percent: f64,
	pub doubling: f64,
}


#[derive(Debug)]
pub enum ScrapeError {
	MissingTables{found: usize},
}

impl fmt::Display for ScrapeError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::MissingTables{found} => write!(f, "expected two datatables in the report page, found {}", found),
		}
	}
}

impl std::error::Error for ScrapeError {}


/// Fetch the public-health report page and persist the HTML verbatim.
pub fn fetch_report(client: &reqwest::blocking::Client, dest: &Path) -> Result<(), FetchError> {
	debug!("fetching Ottawa report page at {}", REPORT_URL);
	let resp = client.get(REPORT_URL).send()?;
	if resp.status() != reqwest::StatusCode::OK {
		return Err(FetchError::Status(resp.status()))
	}
	let text = resp.text()?;
	if let Some(parent) = dest.parent() {
		fs::create_dir_all(parent)?;
	}
	fs::write(dest, text)?;
	debug!("saved Ottawa report to {}", dest.display());
	Ok(())
}

/// Extract the data rows of one report table as trimmed cell text, skipping
/// the `titlerow` header rows.
fn table_rows(table: &ElementRef) -> Vec<Vec<String>> {
	let row_sel = Selector::parse("tbody tr.row, tbody tr.altrow").expect("static selector");
	let cell_sel = Selector::parse("td").expect("static selector");
	table.select(&row_sel).map(|tr| {
		tr.select(&cell_sel)
			.map(|td| td.text().collect::<String>().trim().to_string())
			.collect()
	}).collect()
}

/// Parse the persisted report page.
///
/// The page carries exactly two `<table class="datatable">` elements in
/// document order: daily new cases first, cumulative totals second. Only the
/// cumulative table feeds the derivation; rows that fail to parse are logged
/// and skipped.
pub fn parse_report(html: &str) -> Result<Vec<OttawaRow>, ScrapeError> {
	let doc = Html::parse_document(html);
	let table_sel = Selector::parse("table.datatable").expect("static selector");
	let tables: Vec<_> = doc.select(&table_sel).collect();
	if tables.len() < 2 {
		return Err(ScrapeError::MissingTables{found: tables.len()})
	}
	let cumulative = table_rows(&tables[1]);
	Ok(derive_rows(&cumulative))
}

/// Per-day derivation over the cumulative-total rows: delta against the
/// previous day (zero for the first), percent growth guarded against a zero
/// total, and rounded doubling days with the fixed sentinel on non-positive
/// growth.
pub fn derive_rows(raw: &[Vec<String>]) -> Vec<OttawaRow> {
	let mut result = Vec::with_capacity(raw.len());
	let mut previous: Option<i64> = None;
	for cells in raw {
		if cells.len() < 2 {
			warn!("skipping short report row: {:?}", cells);
			continue
		}
		let date = match NaiveDate::parse_from_str(&cells[0], DATE_FORMAT) {
			Ok(date) => date,
			Err(e) => {
				warn!("skipping report row with unparseable date {:?}: {}", cells[0], e);
				continue
			},
		};
		let total = match cells[1].replace(",", "").parse::<i64>() {
			Ok(v) => v,
			Err(e) => {
				warn!("skipping report row with unparseable total {:?}: {}", cells[1], e);
				continue
			},
		};
		let new_cases = match previous {
			Some(prev) => total - prev,
			None => 0,
		};
		previous = Some(total);
		let percent = if total != 0 {
			100.0 * new_cases as f64 / total as f64
		} else {
			0.0
		};
		let doubling = match doubling_days(percent) {
			v if v == DOUBLING_SENTINEL => v,
			v => v.round(),
		};
		result.push(OttawaRow{
			date,
			total: total.max(0) as u64,
			new_cases,
			percent,
			doubling,
		});
	}
	result
}


#[cfg(test)]
mod tests {
	use super::*;

	fn report_page() -> String {
		let daily = "\
<table class=\"datatable\"><tbody>
<tr class=\"titlerow\"><td>Date</td><td>New</td></tr>
<tr class=\"row\"><td>01/01/2020</td><td>100</td></tr>
<tr class=\"altrow\"><td>01/02/2020</td><td>20</td></tr>
<tr class=\"row\"><td>01/03/2020</td><td>30</td></tr>
</tbody></table>";
		let cumulative = "\
<table class=\"datatable\"><tbody>
<tr class=\"titlerow\"><td>Date</td><td>Total</td></tr>
<tr class=\"row\"><td>01/01/2020</td><td>100</td></tr>
<tr class=\"altrow\"><td>01/02/2020</td><td>120</td></tr>
<tr class=\"row\"><td>01/03/2020</td><td>150</td></tr>
</tbody></table>";
		format!("<html><body><h1>Report</h1>{}{}</body></html>", daily, cumulative)
	}

	#[test]
	fn parses_the_cumulative_table() {
		let rows = parse_report(&report_page()).unwrap();
		assert_eq!(rows.len(), 3);

		assert_eq!(rows[0].date, NaiveDate::from_ymd(2020, 1, 1));
		assert_eq!(rows[0].total, 100);
		assert_eq!(rows[0].new_cases, 0);
		assert_eq!(rows[0].percent, 0.0);
		assert_eq!(rows[0].doubling, DOUBLING_SENTINEL);

		assert_eq!(rows[1].total, 120);
		assert_eq!(rows[1].new_cases, 20);
		assert!((rows[1].percent - 100.0 * 20.0 / 120.0).abs() < 1e-9);
		assert_eq!(rows[1].doubling, 4.0);

		assert_eq!(rows[2].total, 150);
		assert_eq!(rows[2].new_cases, 30);
		assert!((rows[2].percent - 20.0).abs() < 1e-9);
		assert_eq!(rows[2].doubling, 4.0);
	}

	#[test]
	fn single_datatable_is_an_error() {
		let html = "<table class=\"datatable\"><tbody></tbody></table>";
		match parse_report(html) {
			Err(ScrapeError::MissingTables{found}) => assert_eq!(found, 1),
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn bad_rows_are_skipped() {
		let raw = vec![
			vec!["01/01/2020".to_string(), "1,000".to_string()],
			vec!["not a date".to_string(), "1100".to_string()],
			vec!["01/03/2020".to_string(), "1200".to_string()],
		];
		let rows = derive_rows(&raw);
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[0].total, 1000);
		// the delta bridges the skipped row
		assert_eq!(rows[1].new_cases, 200);
	}
}
