use std::fmt;
use std::fs;
use std::io;
use std::time::Duration;

use std::path::Path;

use log::{debug, info};

use reqwest;

use super::config::Paths;


// source https://github.com/CSSEGISandData/COVID-19/tree/master/csse_covid_19_data/csse_covid_19_time_series
pub static URL_CONFIRMED: &'static str = "https://github.com/CSSEGISandData/COVID-19/raw/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_confirmed_global.csv";
pub static URL_DEATHS: &'static str = "https://github.com/CSSEGISandData/COVID-19/raw/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_deaths_global.csv";

// remote fetches are bounded; the sources occasionally hang
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);


#[derive(Debug)]
pub enum FetchError {
	Request(reqwest::Error),
	Status(reqwest::StatusCode),
	Io(io::Error),
}

impl fmt::Display for FetchError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Request(e) => fmt::Display::fmt(e, f),
			Self::Status(code) => write!(f, "unexpected response status {}", code),
			Self::Io(e) => write!(f, "failed to persist fetched data: {}", e),
		}
	}
}

impl From<reqwest::Error> for FetchError {
	fn from(err: reqwest::Error) -> Self {
		Self::Request(err)
	}
}

impl From<io::Error> for FetchError {
	fn from(err: io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::error::Error for FetchError {}


pub fn client() -> Result<reqwest::blocking::Client, FetchError> {
	Ok(reqwest::blocking::Client::builder()
		.timeout(FETCH_TIMEOUT)
		.build()?)
}

/// GET `url` and write the body wholesale to `dest`.
pub fn download(client: &reqwest::blocking::Client, url: &str, dest: &Path) -> Result<(), FetchError> {
	debug!("downloading {} to {}", url, dest.display());
	let resp = client.get(url).send()?;
	if !resp.status().is_success() {
		return Err(FetchError::Status(resp.status()))
	}
	let body = resp.bytes()?;
	fs::write(dest, &body)?;
	Ok(())
}

/// Replace the raw-data directory with freshly downloaded confirmed and
/// deaths snapshots. The old snapshot is removed first, so an interrupted
/// download leaves no data directory behind.
pub fn download_world_data(paths: &Paths) -> Result<(), FetchError> {
	super::ioutil::ensure_empty_dir(paths.indata_dir())?;
	let client = client()?;
	download(&client, URL_CONFIRMED, &paths.confirmed_csv())?;
	download(&client, URL_DEATHS, &paths.deaths_csv())?;
	info!("fetched raw data into {}", paths.indata_dir().display());
	Ok(())
}
