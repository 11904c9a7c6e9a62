//! JSON input container holding calibration curves and record tables.
//!
//! Objects are grouped in named directories and addressed as
//! `<directory>/<name>`, e.g. `specalib/hSPE_ave_femch00` or
//! `specalib/pulsetree`.

use super::traits::{CurveSource, RecordStream, TableSource};
use crate::domain::{SpectraError, SpectraResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

fn unit_bin_width() -> f64 {
    1.0
}

/// Binned reference curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    #[serde(default)]
    pub low_edge: f64,
    #[serde(default = "unit_bin_width")]
    pub bin_width: f64,
    pub values: Vec<f64>,
}

impl Curve {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            low_edge: 0.0,
            bin_width: unit_bin_width(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Curves share an axis when bin count, low edge and bin width agree.
    pub fn same_axis(&self, other: &Curve) -> bool {
        self.len() == other.len()
            && self.low_edge == other.low_edge
            && self.bin_width == other.bin_width
    }

    /// Bin-by-bin quotient; bins with a zero denominator become zero.
    /// Returns `None` when the curves do not share an axis.
    pub fn divided_by(&self, denominator: &Curve) -> Option<Curve> {
        if !self.same_axis(denominator) {
            return None;
        }
        let values = self
            .values
            .iter()
            .zip(&denominator.values)
            .map(|(numerator, denominator)| {
                if *denominator == 0.0 {
                    0.0
                } else {
                    numerator / denominator
                }
            })
            .collect();
        Some(Curve {
            low_edge: self.low_edge,
            bin_width: self.bin_width,
            values,
        })
    }

    pub fn maximum(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    /// Sum of bin contents.
    pub fn integral(&self) -> f64 {
        self.values.iter().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub curves: BTreeMap<String, Curve>,
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerDocument {
    #[serde(default)]
    pub directories: BTreeMap<String, Directory>,
}

impl ContainerDocument {
    pub fn open(path: &Path) -> SpectraResult<Self> {
        let file = File::open(path).map_err(|source| SpectraError::InputOpen {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SpectraError::InputParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write_json(&self, path: &Path) -> SpectraResult<()> {
        let write_error = |source| SpectraError::OutputWrite {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|source| SpectraError::OutputEncode {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(write_error)
    }

    pub fn insert_curve(&mut self, path: &str, curve: Curve) {
        let (directory, name) = split_object_path(path);
        self.directories
            .entry(directory.to_string())
            .or_default()
            .curves
            .insert(name.to_string(), curve);
    }

    pub fn insert_table(&mut self, path: &str, rows: Vec<Value>) {
        let (directory, name) = split_object_path(path);
        self.directories
            .entry(directory.to_string())
            .or_default()
            .tables
            .insert(name.to_string(), rows);
    }

    /// Appends one serialized record, creating the table when needed.
    pub fn push_record<T: Serialize>(&mut self, path: &str, record: &T) -> SpectraResult<()> {
        let row = serde_json::to_value(record)
            .map_err(|error| SpectraError::Internal(format!("failed to encode record: {error}")))?;
        let (directory, name) = split_object_path(path);
        self.directories
            .entry(directory.to_string())
            .or_default()
            .tables
            .entry(name.to_string())
            .or_default()
            .push(row);
        Ok(())
    }

    fn table_rows(&self, path: &str) -> Option<&[Value]> {
        let (directory, name) = split_object_path(path);
        self.directories
            .get(directory)?
            .tables
            .get(name)
            .map(Vec::as_slice)
    }
}

impl CurveSource for ContainerDocument {
    fn curve(&self, path: &str) -> Option<&Curve> {
        let (directory, name) = split_object_path(path);
        self.directories.get(directory)?.curves.get(name)
    }
}

impl TableSource for ContainerDocument {
    fn entry_count(&self, path: &str) -> Option<usize> {
        self.table_rows(path).map(<[Value]>::len)
    }

    fn records<'a, T>(&'a self, path: &str) -> Option<RecordStream<'a, T>>
    where
        T: DeserializeOwned + 'a,
    {
        let rows = self.table_rows(path)?;
        let table = path.to_string();
        Some(Box::new(rows.iter().enumerate().map_while(
            move |(entry, row)| match T::deserialize(row) {
                Ok(record) => Some(record),
                Err(error) => {
                    tracing::warn!(
                        table = %table,
                        entry,
                        %error,
                        "undecodable row ends the table stream"
                    );
                    None
                }
            },
        )))
    }
}

/// Splits `<directory>/<name>`; a path without a separator lives in the root directory `""`.
fn split_object_path(path: &str) -> (&str, &str) {
    path.split_once('/').unwrap_or(("", path))
}
