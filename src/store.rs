use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use chrono::NaiveDate;

use log::warn;

use serde::{Deserialize, Serialize};

use smartstring::alias::{String as SmartString};

use super::us_states::us_state_abbrev;


/// Date axis shared by every series in the store: all series have the same
/// length and are aligned position-by-position to `dates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
	pub start: NaiveDate,
	pub end: NaiveDate,
	pub dates: Vec<NaiveDate>,
}

impl Metadata {
	pub fn from_dates(dates: &[NaiveDate]) -> Self {
		Self{
			start: *dates.first().expect("metadata requires at least one date"),
			end: *dates.last().expect("metadata requires at least one date"),
			dates: dates.to_vec(),
		}
	}
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
	pub name: SmartString,
	pub confirmed: Vec<u64>,
	pub death: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceRecord {
	pub name: SmartString,
	pub confirmed: Vec<u64>,
	pub death: Vec<u64>,
	pub cities: HashMap<SmartString, CityRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
	pub name: SmartString,
	pub confirmed: Vec<u64>,
	pub death: Vec<u64>,
	pub provinces: HashMap<SmartString, ProvinceRecord>,
}


/// Nested country → province → city store, persisted as one JSON document
/// with `metadata` and one top-level entry per country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
	pub metadata: Metadata,
	#[serde(flatten)]
	pub countries: HashMap<SmartString, CountryRecord>,
}

#[derive(Debug)]
pub enum StoreError {
	Io(io::Error),
	Format(serde_json::Error),
}

impl fmt::Display for StoreError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Io(e) => fmt::Display::fmt(e, f),
			Self::Format(e) => write!(f, "malformed store document: {}", e),
		}
	}
}

impl From<io::Error> for StoreError {
	fn from(err: io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for StoreError {
	fn from(err: serde_json::Error) -> Self {
		Self::Format(err)
	}
}

impl std::error::Error for StoreError {}


impl Store {
	pub fn new(metadata: Metadata) -> Self {
		Self{
			metadata,
			countries: HashMap::new(),
		}
	}

	/// Merge one region's series pair into the store.
	///
	/// Creates records on first sight and overwrites their series
	/// unconditionally on every later call for the same key (last write
	/// wins). A country record created implicitly by a province or city call
	/// starts out with that call's series and is overwritten if a
	/// country-level call arrives later. Calls without a country, or with an
	/// empty confirmed or death slice, are rejected without mutation.
	///
	/// US province names are normalized through the state abbreviation
	/// table; the record keeps the trimmed original spelling as its `name`.
	///
	/// Returns whether the store was mutated.
	pub fn store(
			&mut self,
			country: Option<&str>,
			province: Option<&str>,
			city: Option<&str>,
			confirmed: &[u64],
			death: &[u64],
	) -> bool {
		let country = match country.map(|c| c.trim()) {
			Some(c) if !c.is_empty() => c,
			_ => {
				warn!("store requires a country to be specified");
				return false
			},
		};
		if confirmed.is_empty() {
			warn!("store requires confirmed data; none given for {}", country);
			return false
		}
		if death.is_empty() {
			warn!("store requires death data; none given for {}", country);
			return false
		}

		let country_record = self.countries.entry(country.into()).or_insert_with(|| CountryRecord{
			name: country.into(),
			confirmed: confirmed.to_vec(),
			death: death.to_vec(),
			provinces: HashMap::new(),
		});
		let province = match province.map(|p| p.trim()) {
			Some(p) => p,
			None => {
				country_record.confirmed = confirmed.to_vec();
				country_record.death = death.to_vec();
				return true
			},
		};

		let province_key: SmartString = if country == "US" {
			us_state_abbrev(province).unwrap_or(province).into()
		} else {
			province.into()
		};
		let province_record = country_record.provinces.entry(province_key).or_insert_with(|| ProvinceRecord{
			name: province.into(),
			confirmed: confirmed.to_vec(),
			death: death.to_vec(),
			cities: HashMap::new(),
		});
		let city = match city.map(|c| c.trim()) {
			Some(c) => c,
			None => {
				province_record.confirmed = confirmed.to_vec();
				province_record.death = death.to_vec();
				return true
			},
		};

		let city_record = province_record.cities.entry(city.into()).or_insert_with(|| CityRecord{
			name: city.into(),
			confirmed: confirmed.to_vec(),
			death: death.to_vec(),
		});
		city_record.confirmed = confirmed.to_vec();
		city_record.death = death.to_vec();
		true
	}

	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
		let path = path.as_ref();
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		let f = fs::File::create(path)?;
		serde_json::to_writer_pretty(io::BufWriter::new(f), self)?;
		Ok(())
	}

	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
		let f = fs::File::open(path)?;
		Ok(serde_json::from_reader(io::BufReader::new(f))?)
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn test_metadata() -> Metadata {
		Metadata::from_dates(&[
			NaiveDate::from_ymd(2020, 1, 1),
			NaiveDate::from_ymd(2020, 1, 2),
			NaiveDate::from_ymd(2020, 1, 3),
		])
	}

	fn sample_store() -> Store {
		let mut store = Store::new(test_metadata());
		assert!(store.store(Some("Canada"), Some("Ontario"), None, &[10, 15, 20], &[0, 1, 1]));
		assert!(store.store(Some("Iceland"), None, None, &[0, 1, 2], &[0, 0, 0]));
		assert!(store.store(Some("Canada"), Some("Ontario"), Some("Toronto"), &[4, 5, 6], &[0, 0, 1]));
		store
	}

	#[test]
	fn rejects_missing_country_and_empty_series() {
		let mut store = sample_store();
		let before = store.clone();
		assert!(!store.store(None, None, None, &[1], &[0]));
		assert!(!store.store(Some("  "), None, None, &[1], &[0]));
		assert!(!store.store(Some("Iceland"), None, None, &[], &[0]));
		assert!(!store.store(Some("Iceland"), None, None, &[1], &[]));
		assert_eq!(store, before);
	}

	#[test]
	fn nested_records_end_up_under_their_parents() {
		let store = sample_store();
		let canada = &store.countries["Canada"];
		// implicit country record initialized from the first province call
		assert_eq!(canada.confirmed, vec![10, 15, 20]);
		let ontario = &canada.provinces["Ontario"];
		assert_eq!(ontario.confirmed, vec![10, 15, 20]);
		assert_eq!(ontario.death, vec![0, 1, 1]);
		assert_eq!(ontario.cities["Toronto"].confirmed, vec![4, 5, 6]);
	}

	#[test]
	fn last_write_wins_per_key() {
		let mut store = sample_store();
		assert!(store.store(Some("Canada"), None, None, &[100, 150, 200], &[1, 2, 3]));
		assert_eq!(store.countries["Canada"].confirmed, vec![100, 150, 200]);
		// the province record is untouched by the country-level write
		assert_eq!(store.countries["Canada"].provinces["Ontario"].confirmed, vec![10, 15, 20]);
		assert!(store.store(Some("Canada"), Some("Ontario"), None, &[11, 16, 21], &[0, 1, 2]));
		assert_eq!(store.countries["Canada"].provinces["Ontario"].confirmed, vec![11, 16, 21]);
	}

	#[test]
	fn us_provinces_are_normalized() {
		let mut store = Store::new(test_metadata());
		assert!(store.store(Some("US"), Some("california"), None, &[1, 2, 3], &[0, 0, 0]));
		assert!(store.store(Some("US"), Some(" Unorganized Territory "), None, &[4, 5, 6], &[0, 0, 1]));
		let us = &store.countries["US"];
		assert_eq!(us.provinces["CA"].name, "california");
		assert_eq!(us.provinces["Unorganized Territory"].confirmed, vec![4, 5, 6]);
		// non-US countries bypass the table
		assert!(store.store(Some("Canada"), Some("california"), None, &[1, 2, 3], &[0, 0, 0]));
		assert!(store.countries["Canada"].provinces.contains_key("california"));
	}

	#[test]
	fn json_round_trip_is_identity() {
		let store = sample_store();
		let doc = serde_json::to_string(&store).unwrap();
		let restored: Store = serde_json::from_str(&doc).unwrap();
		assert_eq!(restored, store);
	}

	#[test]
	fn persisted_document_round_trips_through_disk() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("db").join("db.json");
		let store = sample_store();
		store.save(&path).unwrap();
		let restored = Store::load(&path).unwrap();
		assert_eq!(restored, store);
	}

	#[test]
	fn document_layout_matches_the_report_contract() {
		let store = sample_store();
		let doc: serde_json::Value = serde_json::to_value(&store).unwrap();
		assert!(doc.get("metadata").is_some());
		assert_eq!(doc["metadata"]["start"], "2020-01-01");
		assert_eq!(doc["metadata"]["end"], "2020-01-03");
		assert_eq!(doc["Canada"]["provinces"]["Ontario"]["confirmed"][2], 20);
	}
}
