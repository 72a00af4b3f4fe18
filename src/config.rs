use std::env;
use std::path::PathBuf;


/// Layout of the working directory.
///
/// All commands share one root (the `COVID_ROOT` environment variable,
/// defaulting to the current directory): raw snapshots live in `indata/`,
/// rendered images in `plots/` and the persisted store in `db/db.json`.
#[derive(Debug, Clone)]
pub struct Paths {
	root: PathBuf,
}

impl Paths {
	pub fn new<P: Into<PathBuf>>(root: P) -> Self {
		Self{root: root.into()}
	}

	pub fn from_env() -> Self {
		match env::var_os("COVID_ROOT") {
			Some(root) => Self::new(PathBuf::from(root)),
			None => Self::new("."),
		}
	}

	pub fn indata_dir(&self) -> PathBuf {
		self.root.join("indata")
	}

	pub fn confirmed_csv(&self) -> PathBuf {
		self.indata_dir().join("covid19_confirmed.csv")
	}

	pub fn deaths_csv(&self) -> PathBuf {
		self.indata_dir().join("covid19_deaths.csv")
	}

	pub fn ottawa_html(&self) -> PathBuf {
		self.indata_dir().join("ottawa.html")
	}

	pub fn plot_dir(&self) -> PathBuf {
		self.root.join("plots")
	}

	pub fn db_dir(&self) -> PathBuf {
		self.root.join("db")
	}

	pub fn db_file(&self) -> PathBuf {
		self.db_dir().join("db.json")
	}
}
