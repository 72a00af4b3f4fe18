use num_traits::ToPrimitive;


/// Reported when the doubling-time formula has no usable answer, i.e.
/// whenever growth is zero or negative. The same sentinel is used on the
/// world-report and Ottawa paths.
pub const DOUBLING_SENTINEL: f64 = 99.9;


/// Day-over-day metrics computed from one cumulative series.
///
/// For input of length N, `diff` and `percent` have length N-1: entry `i`
/// describes the step from day `i` to day `i+1`. A single-point series
/// yields empty vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
	pub diff: Vec<i64>,
	pub percent: Vec<f64>,
}

pub fn derive<V: Copy + ToPrimitive>(data: &[V]) -> Derived {
	let n = data.len().saturating_sub(1);
	let mut diff = Vec::with_capacity(n);
	let mut percent = Vec::with_capacity(n);
	for w in data.windows(2) {
		let prev = w[0].to_i64().unwrap_or(0);
		let curr = w[1].to_i64().unwrap_or(0);
		let d = curr - prev;
		diff.push(d);
		// zero-fill on a zero denominator, by contract
		percent.push(if curr == 0 {
			0.0
		} else {
			100.0 * d as f64 / curr as f64
		});
	}
	Derived{diff, percent}
}

/// Days until the cumulative count doubles at a constant `percent` daily
/// growth rate. Non-positive growth has no doubling time and returns
/// [`DOUBLING_SENTINEL`].
pub fn doubling_days(percent: f64) -> f64 {
	if percent <= 0.0 {
		return DOUBLING_SENTINEL
	}
	2f64.log10() / (1.0 + percent / 100.0).log10()
}

/// Trailing mean over `window` values; positions without a full window are
/// `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
	if window == 0 || window > values.len() {
		return vec![None; values.len()]
	}
	values.iter().enumerate().map(|(i, _)| {
		if i + 1 >= window {
			Some(values[i + 1 - window..=i].iter().sum::<f64>() / window as f64)
		} else {
			None
		}
	}).collect()
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn derive_computes_adjacent_differences() {
		let d = derive(&[10u64, 15, 20]);
		assert_eq!(d.diff, vec![5, 5]);
		assert_eq!(d.percent.len(), 2);
		assert_eq!(d.percent[0], 100.0 * 5.0 / 15.0);
		assert_eq!(d.percent[1], 100.0 * 5.0 / 20.0);
	}

	#[test]
	fn derive_lengths_track_input() {
		let data: Vec<u64> = (0..17).map(|i| i * i).collect();
		let d = derive(&data);
		assert_eq!(d.diff.len(), data.len() - 1);
		assert_eq!(d.percent.len(), d.diff.len());
		for (i, v) in d.diff.iter().enumerate() {
			assert_eq!(*v, data[i + 1] as i64 - data[i] as i64);
		}
	}

	#[test]
	fn derive_zero_fills_on_zero_denominator() {
		let d = derive(&[3u64, 0, 4]);
		assert_eq!(d.diff, vec![-3, 4]);
		assert_eq!(d.percent[0], 0.0);
		assert_eq!(d.percent[1], 100.0);
	}

	#[test]
	fn derive_single_point_is_empty() {
		let d = derive(&[42u64]);
		assert!(d.diff.is_empty());
		assert!(d.percent.is_empty());
	}

	#[test]
	fn doubling_days_sentinel_on_nonpositive_growth() {
		assert_eq!(doubling_days(0.0), DOUBLING_SENTINEL);
		assert_eq!(doubling_days(-5.0), DOUBLING_SENTINEL);
		assert_eq!(doubling_days(-150.0), DOUBLING_SENTINEL);
	}

	#[test]
	fn doubling_days_matches_formula() {
		let v = doubling_days(20.0);
		assert!((v - 2f64.log10() / 1.2f64.log10()).abs() < 1e-12);
		// 100% daily growth doubles in one day
		assert!((doubling_days(100.0) - 1.0).abs() < 1e-12);
	}

	#[test]
	fn rolling_mean_leading_positions_are_none() {
		let m = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
		assert_eq!(m, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
	}

	#[test]
	fn rolling_mean_oversized_window() {
		let m = rolling_mean(&[1.0, 2.0], 5);
		assert_eq!(m, vec![None, None]);
	}
}
