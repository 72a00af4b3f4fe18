use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::ottawa::OttawaRow;
use super::series::rolling_mean;


static COMPARISON_COLORS: &'static [RGBColor] = &[RED, BLUE, GREEN, MAGENTA, CYAN, BLACK];

const GREY: RGBColor = RGBColor(128, 128, 128);
const PINK: RGBColor = RGBColor(255, 182, 193);


fn tail3(values: &[f64]) -> String {
	let start = values.len().saturating_sub(3);
	let parts: Vec<String> = values[start..].iter()
		.map(|v| format!("{:.1}", v))
		.collect();
	if parts.is_empty() {
		String::new()
	} else {
		format!(": ..., {}", parts.join(", "))
	}
}

fn bounds(values: &[f64]) -> (f64, f64) {
	let mut lo = 0.0f64;
	let mut hi = 1.0f64;
	for v in values {
		if v.is_finite() {
			lo = lo.min(*v);
			hi = hi.max(*v);
		}
	}
	(lo, hi)
}

fn draw_line_panel(
		area: &DrawingArea<BitMapBackend, Shift>,
		title: &str,
		y_desc: &str,
		values: &[f64],
		color: &RGBColor,
		overlay: Option<(&[Option<f64>], &RGBColor)>,
) -> Result<(), Box<dyn Error>> {
	let n = values.len().max(1) as i32;
	let (lo, hi) = bounds(values);
	let mut chart = ChartBuilder::on(area)
		.margin(10)
		.caption(format!("{}{}", title, tail3(values)), ("sans-serif", 18))
		.x_label_area_size(30)
		.y_label_area_size(60)
		.build_cartesian_2d(0i32..n, lo..hi)?;
	chart.configure_mesh()
		.x_desc("Day")
		.y_desc(y_desc)
		.draw()?;
	chart.draw_series(LineSeries::new(
		values.iter().enumerate().map(|(i, v)| (i as i32, *v)),
		color,
	))?;
	if let Some((averaged, avg_color)) = overlay {
		chart.draw_series(LineSeries::new(
			averaged.iter().enumerate().filter_map(|(i, v)| v.map(|v| (i as i32, v))),
			avg_color,
		))?;
	}
	Ok(())
}

/// Per-region three-panel image: cumulative total, daily delta, percent
/// growth.
pub fn region_panels(
		path: &Path,
		title: &str,
		data: &[u64],
		diff: &[i64],
		percent: &[f64],
) -> Result<(), Box<dyn Error>> {
	let root = BitMapBackend::new(path, (1800, 800)).into_drawing_area();
	root.fill(&WHITE)?;
	let root = root.titled(title, ("sans-serif", 30))?;
	let panels = root.split_evenly((1, 3));

	let data_f: Vec<f64> = data.iter().map(|v| *v as f64).collect();
	let diff_f: Vec<f64> = diff.iter().map(|v| *v as f64).collect();
	draw_line_panel(&panels[0], "Total cases", "Infected", &data_f, &BLACK, None)?;
	draw_line_panel(&panels[1], "New cases", "Newly infected", &diff_f, &RED, None)?;
	draw_line_panel(&panels[2], "Percentage", "Percentage growth", percent, &GREEN, None)?;
	root.present()?;
	Ok(())
}

fn comparison_panel(
		area: &DrawingArea<BitMapBackend, Shift>,
		title: &str,
		x_desc: &str,
		series: &[(String, &Vec<u64>)],
) -> Result<(), Box<dyn Error>> {
	let n = series.iter().map(|(_, s)| s.len()).max().unwrap_or(1).max(1) as i32;
	let hi = series.iter()
		.flat_map(|(_, s)| s.iter())
		.max()
		.copied()
		.unwrap_or(1)
		.max(1) as f64;
	let mut chart = ChartBuilder::on(area)
		.margin(10)
		.caption(title, ("sans-serif", 20))
		.x_label_area_size(40)
		.y_label_area_size(70)
		.build_cartesian_2d(0i32..n, 0f64..hi * 1.05)?;
	chart.configure_mesh()
		.x_desc(x_desc)
		.draw()?;
	for (i, (name, values)) in series.iter().enumerate() {
		let color = COMPARISON_COLORS[i % COMPARISON_COLORS.len()];
		chart.draw_series(LineSeries::new(
			values.iter().enumerate().map(|(x, v)| (x as i32, *v as f64)),
			&color,
		))?
			.label(name.as_str())
			.legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
	}
	chart.configure_series_labels()
		.border_style(&BLACK)
		.position(SeriesLabelPosition::UpperLeft)
		.draw()?;
	Ok(())
}

/// Two-panel country comparison: confirmed cases and deaths, each series
/// already trimmed to its first non-zero entry by the caller.
pub fn comparison(
		path: &Path,
		end_label: &str,
		series: &[(String, Vec<u64>, Vec<u64>)],
) -> Result<(), Box<dyn Error>> {
	let root = BitMapBackend::new(path, (1400, 700)).into_drawing_area();
	root.fill(&WHITE)?;
	let root = root.titled(&format!("Compare {}", end_label), ("sans-serif", 30))?;
	let panels = root.split_evenly((1, 2));

	let confirmed: Vec<(String, &Vec<u64>)> = series.iter()
		.map(|(name, c, _)| (name.clone(), c))
		.collect();
	let death: Vec<(String, &Vec<u64>)> = series.iter()
		.map(|(name, _, d)| (name.clone(), d))
		.collect();
	comparison_panel(&panels[0], "Confirmed Cases", "Days Since Country's First Case", &confirmed)?;
	comparison_panel(&panels[1], "Deaths", "Days Since Country's First Death", &death)?;
	root.present()?;
	Ok(())
}

/// Four-panel Ottawa image: total, new cases, percent growth and doubling
/// days, with optional rolling-mean overlays on the first two.
pub fn ottawa_panels(
		path: &Path,
		rows: &[OttawaRow],
		moving_average: Option<usize>,
) -> Result<(), Box<dyn Error>> {
	let root = BitMapBackend::new(path, (1800, 700)).into_drawing_area();
	root.fill(&WHITE)?;
	let title = match rows.last() {
		Some(row) => format!("Ottawa {}", row.date),
		None => "Ottawa".to_string(),
	};
	let root = root.titled(&title, ("sans-serif", 30))?;
	let panels = root.split_evenly((1, 4));

	let totals: Vec<f64> = rows.iter().map(|r| r.total as f64).collect();
	let new_cases: Vec<f64> = rows.iter().map(|r| r.new_cases as f64).collect();
	let percent: Vec<f64> = rows.iter().map(|r| r.percent).collect();
	let doubling: Vec<f64> = rows.iter().map(|r| r.doubling).collect();

	let total_avg = moving_average.map(|w| rolling_mean(&totals, w));
	let new_avg = moving_average.map(|w| rolling_mean(&new_cases, w));

	draw_line_panel(
		&panels[0], "Total cases", "Infected", &totals, &BLACK,
		total_avg.as_ref().map(|a| (&a[..], &GREY)),
	)?;
	draw_line_panel(
		&panels[1], "New cases", "Newly infected", &new_cases, &RED,
		new_avg.as_ref().map(|a| (&a[..], &PINK)),
	)?;
	draw_line_panel(&panels[2], "Percentage", "Percentage growth", &percent, &GREEN, None)?;
	draw_line_panel(&panels[3], "Days to double", "Days", &doubling, &GREEN, None)?;
	root.present()?;
	Ok(())
}
