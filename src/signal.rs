use std::sync::Arc;
use thiserror::Error;

use crate::mapper::ArrhythmiaLabel;

/// Number of samples per heartbeat the classifier was trained on
pub const DEFAULT_SIGNAL_LENGTH: usize = 187;

#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    #[error("signal has no samples")]
    Empty,

    #[error("sample {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("row has {found} columns, expected {expected}")]
    ColumnCount { expected: usize, found: usize },

    #[error("column {column} is not a number: {value:?}")]
    Parse { column: usize, value: String },
}

/// A single heartbeat recording sent to the classifier
///
/// Samples are shared, never mutated after construction, so cloning a
/// signal into an in-flight request is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Arc<[f32]>,
}

impl Signal {
    /// Build a signal from raw samples
    pub fn new(samples: Vec<f32>) -> Result<Self, SignalError> {
        if samples.is_empty() {
            return Err(SignalError::Empty);
        }

        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(SignalError::NonFinite { index });
        }

        Ok(Self {
            samples: samples.into(),
        })
    }

    /// Build a signal of exactly `len` samples, truncating or zero-padding
    ///
    /// The service applies the same fitting before inference, so a fitted
    /// signal is classified identically to the raw one.
    pub fn fitted(mut samples: Vec<f32>, len: usize) -> Result<Self, SignalError> {
        if samples.is_empty() {
            return Err(SignalError::Empty);
        }
        samples.resize(len, 0.0);
        Self::new(samples)
    }

    /// This signal at exactly `len` samples; shares storage when it already fits
    pub fn fit_to(&self, len: usize) -> Result<Self, SignalError> {
        if self.len() == len {
            return Ok(self.clone());
        }
        Self::fitted(self.samples.to_vec(), len)
    }

    /// Parse one MIT-BIH heartbeat row: `len` samples then the class id
    pub fn from_csv_row(row: &str, len: usize) -> Result<(Self, ArrhythmiaLabel), SignalError> {
        let columns: Vec<&str> = row.trim().split(',').map(str::trim).collect();
        if columns.len() != len + 1 {
            return Err(SignalError::ColumnCount {
                expected: len + 1,
                found: columns.len(),
            });
        }

        let mut values = Vec::with_capacity(columns.len());
        for (column, raw) in columns.iter().enumerate() {
            let value: f32 = raw.parse().map_err(|_| SignalError::Parse {
                column,
                value: raw.to_string(),
            })?;
            values.push(value);
        }

        // Class column is written as a float ("2.0") and must be a whole number
        let class = values.pop().unwrap_or(f32::NAN);
        if !class.is_finite() || class < 0.0 || class.fract() != 0.0 || class > u32::MAX as f32 {
            return Err(SignalError::Parse {
                column: len,
                value: columns[len].to_string(),
            });
        }
        let label = ArrhythmiaLabel::from_class_id(class as u32);

        Ok((Self::new(values)?, label))
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
