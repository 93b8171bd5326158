//! Tabular views of trajectories and CSV output.
//!
//! A [`Dataset`] is a column-named table of integers. Downstream consumers
//! (plotting, spreadsheets) only ever see this table, never simulation types.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ExportError;
use crate::metrics::MetricsRow;

/// Columns of a single run's step table, in file order.
pub const STEP_COLUMNS: [&str; 8] = [
    "Step",
    "Rich",
    "Poor",
    "Middle Class",
    "Savings",
    "Wallets",
    "Money",
    "Loans",
];

/// Extra columns tagging each row of a combined sweep table.
pub const RUN_COLUMNS: [&str; 4] = ["Run", "init_people", "rich_threshold", "reserve_percent"];

/// Prefix of per-run checkpoint files; the step number follows.
pub const CHECKPOINT_FILE_PREFIX: &str = "BankReservesModel_Step_Data_Single_Run";

/// File name of the combined sweep output.
pub const SWEEP_FILE_NAME: &str = "BankReservesModel_Step_Data.csv";

pub(crate) fn step_values(row: &MetricsRow) -> [i64; 8] {
    [
        row.step as i64,
        row.rich as i64,
        row.poor as i64,
        row.middle as i64,
        row.savings,
        row.wallets,
        row.money,
        row.loans,
    ]
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<i64>>,
}

impl Dataset {
    pub(crate) fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Dataset {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// One row per collected step, with [`STEP_COLUMNS`].
    pub fn from_trajectory(rows: &[MetricsRow]) -> Self {
        Dataset {
            columns: STEP_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: rows.iter().map(|r| step_values(r).to_vec()).collect(),
        }
    }

    /// Rows pushed here must match the column count.
    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<i64>> {
        &mut self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<i64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn require_columns(&self, required: &[&str]) -> Result<(), ExportError> {
        match required.iter().find(|name| !self.has_column(name)) {
            Some(missing) => Err(ExportError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Every value of column `name`, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<i64>, ExportError> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ExportError::MissingColumn(name.to_string()))?;
        Ok(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Copy of the table without column `name`.
    pub fn without_column(&self, name: &str) -> Dataset {
        let Some(idx) = self.columns.iter().position(|c| c == name) else {
            return self.clone();
        };
        let mut out = self.clone();
        out.columns.remove(idx);
        for row in &mut out.rows {
            row.remove(idx);
        }
        out
    }

    pub fn to_csv(&self) -> String {
        let mut csv = self.columns.join(",");
        csv.push('\n');
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(i64::to_string).collect();
            csv.push_str(&line.join(","));
            csv.push('\n');
        }
        csv
    }

    /// Write the table after checking that every `required` column exists.
    /// A missing column fails before anything touches the filesystem.
    pub fn write_csv(&self, path: &Path, required: &[&str]) -> Result<(), ExportError> {
        self.require_columns(required)?;
        fs::write(path, self.to_csv()).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), rows = self.rows.len(), "wrote dataset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<MetricsRow> {
        vec![
            MetricsRow {
                step: 0,
                rich: 0,
                poor: 0,
                middle: 2,
                savings: 0,
                wallets: 20,
                money: 20,
                loans: 0,
            },
            MetricsRow {
                step: 1,
                rich: 0,
                poor: 0,
                middle: 2,
                savings: 10,
                wallets: 10,
                money: 20,
                loans: 0,
            },
        ]
    }

    #[test]
    fn trajectory_csv_has_header_and_one_line_per_step() {
        let csv = Dataset::from_trajectory(&sample_rows()).to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Step,Rich,Poor,Middle Class,Savings,Wallets,Money,Loans"
        );
        assert_eq!(lines[1], "0,0,0,2,0,20,20,0");
        assert_eq!(lines[2], "1,0,0,2,10,10,20,0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn column_lookup() {
        let data = Dataset::from_trajectory(&sample_rows());
        assert_eq!(data.column("Savings").unwrap(), vec![0, 10]);
        assert!(matches!(
            data.column("Reserves"),
            Err(ExportError::MissingColumn(name)) if name == "Reserves"
        ));
    }

    #[test]
    fn missing_required_column_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let data = Dataset::from_trajectory(&sample_rows()).without_column("Step");

        let err = data.write_csv(&path, &["Step"]).unwrap_err();
        assert_eq!(err.to_string(), "Step column is missing from the data.");
        assert!(!path.exists());
    }

    #[test]
    fn write_csv_round_trips_through_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let data = Dataset::from_trajectory(&sample_rows());
        data.write_csv(&path, &["Step"]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), data.to_csv());
    }
}
