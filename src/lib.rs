pub mod config;
pub mod fetch;
pub mod jhu;
pub mod ottawa;
pub mod plot;
pub mod process;
pub mod report;
pub mod series;
pub mod store;
mod ioutil;
mod us_states;

pub use config::*;
pub use fetch::{download_world_data, FetchError};
pub use ioutil::magic_open;
pub use jhu::{CaseRow, RowKind, TableError, WideTable};
pub use ottawa::{OttawaRow, ScrapeError};
pub use process::{build_store, process_world, ROLLUP_COUNTRIES};
pub use report::{summarize, CountrySummary, SortColumn};
pub use series::{derive, doubling_days, rolling_mean, Derived, DOUBLING_SENTINEL};
pub use store::{CityRecord, CountryRecord, Metadata, ProvinceRecord, Store, StoreError};
pub use us_states::us_state_abbrev;
