use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use log::{info, warn};

use covidtrack::{download_world_data, process_world, report, Paths};


/// Process world covid data from the Johns Hopkins data set: load the raw
/// snapshots, build the store and plots, and generate reports.
#[derive(Parser)]
#[command(name = "covid")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Get raw covid-19 data from Johns Hopkins
	Load,
	/// Process world data creating db and plots
	Process,
	/// Generate reports from the persisted db
	Report {
		#[command(subcommand)]
		command: ReportCommand,
	},
}

#[derive(Subcommand)]
enum ReportCommand {
	/// Print the per-country comparison table
	Table {
		/// Select the column name to sort on
		#[arg(long, default_value = "Max")]
		sort_col: String,
		/// Show the last N days and N-1 new-case columns
		#[arg(long, default_value_t = 3)]
		days: usize,
		/// The number of table rows to display (0 shows all)
		#[arg(long, default_value_t = 0)]
		rows: usize,
	},
	/// Plot confirmed cases and deaths of one or more countries
	Plot {
		#[arg(required = true)]
		countries: Vec<String>,
		/// Save the plot at the specified directory or file
		#[arg(long)]
		file: Option<PathBuf>,
	},
}

fn main() -> Result<(), Box<dyn Error>> {
	pretty_env_logger::init();
	let cli = Cli::parse();
	let paths = Paths::from_env();

	match cli.command {
		Commands::Load => {
			println!("Loading data from website...");
			// fetch failures leave the previous run unusable but must not
			// take down a wrapping batch job
			match download_world_data(&paths) {
				Ok(()) => println!("DONE"),
				Err(e) => warn!("failed to fetch raw data: {}", e),
			}
		},
		Commands::Process => {
			let store = process_world(&paths)?;
			info!("processed {} countries", store.countries.len());
		},
		Commands::Report{command} => match command {
			ReportCommand::Table{sort_col, days, rows} => {
				report::print_table(&paths, &sort_col, days, rows)?;
			},
			ReportCommand::Plot{countries, file} => {
				report::compare_plot(&paths, &countries, file.as_deref())?;
			},
		},
	}
	Ok(())
}
