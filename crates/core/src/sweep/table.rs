//! Tabular sweep results

use crate::error::FireSimError;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// One parameter combination and its reduced outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    /// Swept values in axis declaration order.
    pub parameters: Vec<f64>,
    /// Reporter means in reporter order, or the error that rejected the combination.
    pub outcome: Result<Vec<f64>, FireSimError>,
}

impl SweepRow {
    /// Reporter values if the combination ran.
    pub fn values(&self) -> Option<&[f64]> {
        self.outcome.as_deref().ok()
    }
}

/// Result of a parameter sweep, one row per combination.
#[derive(Debug, Clone, Serialize)]
pub struct SweepTable {
    pub parameter_names: Vec<String>,
    pub reporter_names: Vec<String>,
    /// Runs averaged into each row.
    pub iterations: u32,
    /// Seed every run seed was derived from.
    pub seed: u64,
    pub rows: Vec<SweepRow>,
}

impl SweepTable {
    /// Column headers: parameters in axis order, then reporters.
    pub fn columns(&self) -> Vec<&str> {
        self.parameter_names
            .iter()
            .chain(&self.reporter_names)
            .map(String::as_str)
            .collect()
    }

    /// Value of `reporter` in row `row`, if that row ran.
    pub fn value(&self, row: usize, reporter: &str) -> Option<f64> {
        let column = self.reporter_names.iter().position(|name| name == reporter)?;
        self.rows.get(row)?.values().map(|values| values[column])
    }

    /// Column name to value maps, one per completed row.
    pub fn records(&self) -> Vec<FxHashMap<String, f64>> {
        self.rows
            .iter()
            .filter_map(|row| {
                let values = row.values()?;
                let mut record = FxHashMap::default();
                for (name, value) in self.parameter_names.iter().zip(&row.parameters) {
                    record.insert(name.clone(), *value);
                }
                for (name, value) in self.reporter_names.iter().zip(values) {
                    record.insert(name.clone(), *value);
                }
                Some(record)
            })
            .collect()
    }

    /// Number of rejected combinations.
    pub fn rejected(&self) -> usize {
        self.rows.iter().filter(|row| row.outcome.is_err()).count()
    }

    /// Write the table as CSV. Rejected rows leave reporter cells empty.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", self.columns().join(","))?;
        for row in &self.rows {
            let mut cells: Vec<String> = row.parameters.iter().map(f64::to_string).collect();
            match row.values() {
                Some(values) => cells.extend(values.iter().map(f64::to_string)),
                None => cells.extend(self.reporter_names.iter().map(|_| String::new())),
            }
            writeln!(out, "{}", cells.join(","))?;
        }
        Ok(())
    }
}

impl fmt::Display for SweepTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WIDTH: usize = 12;
        for name in self.columns() {
            write!(f, "{name:>WIDTH$}")?;
        }
        writeln!(f)?;
        for row in &self.rows {
            for value in &row.parameters {
                write!(f, "{value:>WIDTH$.3}")?;
            }
            match &row.outcome {
                Ok(values) => {
                    for value in values {
                        write!(f, "{value:>WIDTH$.4}")?;
                    }
                }
                Err(err) => write!(f, "  rejected: {err}")?,
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SweepTable {
        SweepTable {
            parameter_names: vec!["p".to_string(), "f".to_string()],
            reporter_names: vec!["BurntFine".to_string()],
            iterations: 1,
            seed: 0,
            rows: vec![
                SweepRow {
                    parameters: vec![0.1, 0.2],
                    outcome: Ok(vec![0.5]),
                },
                SweepRow {
                    parameters: vec![0.1, 1.5],
                    outcome: Err(FireSimError::OutOfRange {
                        parameter: "ignition",
                        value: 1.5,
                        range: "[0, 1]".to_string(),
                    }),
                },
            ],
        }
    }

    #[test]
    fn test_columns_follow_declaration_order() {
        assert_eq!(table().columns(), vec!["p", "f", "BurntFine"]);
    }

    #[test]
    fn test_records_skip_rejected_rows() {
        let table = table();
        let records = table.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["p"], 0.1);
        assert_eq!(records[0]["BurntFine"], 0.5);
        assert_eq!(table.rejected(), 1);
        assert_eq!(table.value(0, "BurntFine"), Some(0.5));
        assert_eq!(table.value(1, "BurntFine"), None);
    }

    #[test]
    fn test_csv_layout() {
        let mut out = Vec::new();
        table().write_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert_eq!(csv, "p,f,BurntFine\n0.1,0.2,0.5\n0.1,1.5,\n");
    }
}
