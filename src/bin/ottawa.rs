use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use log::warn;

use covidtrack::{fetch, ottawa, plot, report, Paths};


/// Report on Ottawa Public Health covid data scraped from the public report
/// page.
#[derive(Parser)]
#[command(name = "ottawa")]
struct Cli {
	/// Use the previously persisted page instead of fetching
	#[arg(long)]
	offline: bool,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the per-day table
	Table,
	/// Render the four-panel plot
	Plot {
		/// Overlay a rolling mean with the given window on the case panels
		#[arg(long)]
		movingaverage: Option<usize>,
		/// Save the plot at the specified directory or file
		#[arg(long)]
		file: Option<PathBuf>,
	},
}

fn print_table(rows: &[ottawa::OttawaRow]) {
	let headers: Vec<String> = ["num", "date", "total", "new", "%growth", "days to double"]
		.iter()
		.map(|h| h.to_string())
		.collect();
	let cells: Vec<Vec<String>> = rows.iter().enumerate().map(|(i, r)| vec![
		format!("{}", i + 1),
		r.date.to_string(),
		r.total.to_string(),
		r.new_cases.to_string(),
		format!("{:.1}", r.percent),
		format!("{:.1}", r.doubling),
	]).collect();
	println!();
	println!("Data for Ottawa as of {}", rows[rows.len() - 1].date);
	println!();
	print!("{}", report::format_table(&headers, &cells));
}

fn main() -> Result<(), Box<dyn Error>> {
	pretty_env_logger::init();
	let cli = Cli::parse();
	let paths = Paths::from_env();

	if !cli.offline {
		println!("Loading data from website...");
		let client = fetch::client()?;
		if let Err(e) = ottawa::fetch_report(&client, &paths.ottawa_html()) {
			// reporting is unavailable this run; don't take down a wrapping
			// batch job over it
			warn!("failed to fetch the Ottawa report: {}", e);
			return Ok(())
		}
		println!("DONE");
	}

	let html = fs::read_to_string(paths.ottawa_html())?;
	let rows = ottawa::parse_report(&html)?;
	if rows.is_empty() {
		warn!("the Ottawa report contained no data rows");
		return Ok(())
	}

	match cli.command {
		Commands::Table => print_table(&rows),
		Commands::Plot{movingaverage, file} => {
			let last_date = rows[rows.len() - 1].date;
			let path = match file {
				Some(f) if f.is_dir() => f.join(format!("{}-ottawa.png", last_date)),
				Some(f) => f,
				None => paths.plot_dir().join(format!("{}-ottawa.png", last_date)),
			};
			if let Some(parent) = path.parent() {
				fs::create_dir_all(parent)?;
			}
			plot::ottawa_panels(&path, &rows, movingaverage)?;
			println!("Saved plot: {}", path.display());
		},
	}
	Ok(())
}
