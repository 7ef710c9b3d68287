//! Feature construction for the price model
//!
//! Each historical day becomes one row of four numbers: day index, traded
//! volume, 7-day simple moving average of price, and the day's price change.

use serde::Serialize;

use crate::error::{Result, TrackerError};

/// Width of the moving-average window, and the minimum series length
pub const SMA_WINDOW: usize = 7;

/// Number of columns in a feature row
pub const FEATURE_COUNT: usize = 4;

/// One day's model input
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FeatureRow {
    /// Position of the day in the series
    pub index: f64,
    pub volume: f64,
    /// 7-day simple moving average of price
    pub sma7: f64,
    /// Price change from the previous day
    pub delta: f64,
}

impl FeatureRow {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [self.index, self.volume, self.sma7, self.delta]
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.to_array().to_vec()
    }
}

/// Simple moving average over full windows only (length `n - window + 1`)
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }

    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// First difference, `values[i] - values[i - 1]` (length `n - 1`)
pub fn first_difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Build one feature row per day.
///
/// The moving average is left-padded with its first value and the
/// difference with a zero, so both line up with the input days.
pub fn build_features(prices: &[f64], volumes: &[f64]) -> Result<Vec<FeatureRow>> {
    if prices.len() != volumes.len() {
        return Err(TrackerError::SeriesMismatch {
            prices: prices.len(),
            volumes: volumes.len(),
        });
    }
    if prices.len() < SMA_WINDOW {
        return Err(TrackerError::InsufficientHistory {
            needed: SMA_WINDOW,
            available: prices.len(),
        });
    }

    let sma = moving_average(prices, SMA_WINDOW);
    let sma_pad = prices.len() - sma.len();
    let first_avg = sma[0];
    let smoothed = std::iter::repeat_n(first_avg, sma_pad).chain(sma);

    let deltas = std::iter::once(0.0).chain(first_difference(prices));

    let rows = volumes
        .iter()
        .zip(smoothed)
        .zip(deltas)
        .enumerate()
        .map(|(i, ((&volume, sma7), delta))| FeatureRow {
            index: i as f64,
            volume,
            sma7,
            delta,
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> (Vec<f64>, Vec<f64>) {
        let prices = (0..n).map(|i| 100.0 + (i * i) as f64).collect();
        let volumes = (0..n).map(|i| 1_000.0 + i as f64).collect();
        (prices, volumes)
    }

    #[test]
    fn test_one_row_per_day() {
        for n in [7, 8, 30, 37] {
            let (prices, volumes) = ramp(n);
            let rows = build_features(&prices, &volumes).unwrap();
            assert_eq!(rows.len(), n);
            assert_eq!(rows[0].to_array().len(), FEATURE_COUNT);
        }
    }

    #[test]
    fn test_padding_of_first_row() {
        let (prices, volumes) = ramp(30);
        let rows = build_features(&prices, &volumes).unwrap();

        let first_avg = prices[..7].iter().sum::<f64>() / 7.0;
        for row in &rows[..7] {
            assert!((row.sma7 - first_avg).abs() < 1e-9);
        }
        assert_eq!(rows[0].delta, 0.0);
        assert_eq!(rows[0].index, 0.0);
        assert_eq!(rows[0].volume, 1_000.0);
    }

    #[test]
    fn test_columns_match_definitions() {
        let prices = vec![1.0, 2.0, 4.0, 7.0, 11.0, 16.0, 22.0, 29.0];
        let volumes = vec![10.0; 8];
        let rows = build_features(&prices, &volumes).unwrap();

        assert_eq!(rows[7].index, 7.0);
        assert!((rows[7].sma7 - (2.0 + 4.0 + 7.0 + 11.0 + 16.0 + 22.0 + 29.0) / 7.0).abs() < 1e-9);
        assert_eq!(rows[7].delta, 7.0);
        assert_eq!(rows[1].delta, 1.0);
    }

    #[test]
    fn test_short_series_is_rejected() {
        let err = build_features(&[1.0; 6], &[1.0; 6]).unwrap_err();
        assert!(matches!(err, TrackerError::InsufficientHistory { needed: 7, available: 6 }));
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = build_features(&[1.0; 10], &[1.0; 9]).unwrap_err();
        assert!(matches!(err, TrackerError::SeriesMismatch { prices: 10, volumes: 9 }));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(moving_average(&[1.0, 2.0, 3.0], 2), vec![1.5, 2.5]);
        assert!(moving_average(&[1.0], 2).is_empty());
        assert_eq!(first_difference(&[1.0, 4.0, 2.0]), vec![3.0, -2.0]);
    }
}
