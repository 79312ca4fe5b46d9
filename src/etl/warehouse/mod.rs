mod schema;

use std::path::Path;
use std::time::{Duration, Instant};

use rusqlite::{Connection, params};
use tracing::info;

pub use schema::{LoadStep, STEPS, StepKind, WAREHOUSE_SCHEMA};

use crate::error::{Error, Result};

/// Rows inserted by one load step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub table: &'static str,
    pub rows: usize,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub steps: Vec<StepReport>,
    pub duration: Duration,
}

impl BuildReport {
    pub fn rows_for(&self, table: &str) -> Option<usize> {
        self.steps.iter().find(|s| s.table == table).map(|s| s.rows)
    }
}

/// The star-schema database, with the source database attached as `src`.
pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(warehouse_path: P, source_path: Q) -> Result<Self> {
        let source_path = source_path.as_ref();
        if !source_path.exists() {
            return Err(Error::Config(format!(
                "source database {} does not exist",
                source_path.display()
            )));
        }

        let conn = Connection::open(warehouse_path)?;
        conn.execute(
            "ATTACH DATABASE ?1 AS src",
            params![source_path.to_string_lossy().into_owned()],
        )?;

        Ok(Self { conn })
    }

    pub fn create_tables(&self) -> Result<()> {
        self.conn.execute_batch(WAREHOUSE_SCHEMA)?;
        Ok(())
    }

    /// Empties every warehouse table, facts before dimensions.
    pub fn truncate(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for step in STEPS.iter().rev() {
            let deleted = tx.execute(&format!("DELETE FROM {}", step.table), [])?;
            tracing::debug!(table = step.table, rows = deleted, "truncated");
        }
        tx.commit()?;
        Ok(())
    }

    /// Runs every load step in order. The first failing step aborts the
    /// build; rows inserted by earlier steps are kept.
    pub fn build(&self) -> Result<BuildReport> {
        let started = Instant::now();
        let mut steps = Vec::with_capacity(STEPS.len());

        for step in STEPS {
            let rows = self
                .conn
                .execute(step.sql, [])
                .map_err(|source| Error::WarehouseStep {
                    step: step.table,
                    source,
                })?;

            info!(table = step.table, rows, "Loaded {}", step.table);
            steps.push(StepReport {
                table: step.table,
                rows,
            });
        }

        let duration = started.elapsed();
        info!("Warehouse build finished in {:.2?}", duration);

        Ok(BuildReport { steps, duration })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SqliteStore, Store};
    use tempfile::TempDir;

    const SOURCE_ROWS: &str = r#"
INSERT INTO circuits VALUES (1, 'monaco', 'Circuit de Monaco', 'Monte-Carlo', 'Monaco', 43.7347, 7.42056, 7, 'http://example.com/monaco');
INSERT INTO races VALUES (1, 1985, 1, 1, 'Monaco Grand Prix', '1985-05-19', 'http://example.com/1985_monaco');
INSERT INTO races VALUES (2, 1985, 2, 1, 'Late Grand Prix', '1985-11-03', 'http://example.com/1985_late');
INSERT INTO races VALUES (3, 1986, 1, 1, 'Undated Grand Prix', NULL, NULL);
INSERT INTO constructors VALUES (1, 'McLaren', 'British', NULL);
INSERT INTO drivers VALUES (1, 'Alain', 'Prost', '1955-02-24', 'French', NULL);
INSERT INTO drivers VALUES (2, 'Nigel', 'Mansell', '1953-08-08', 'British', NULL);
INSERT INTO status VALUES (1, 'Finished');
INSERT INTO status VALUES (2, 'Brakes');
INSERT INTO results VALUES (1, 1, 1, 1, '2', 1, '1', '1', 1, 9, 78, '1:51:58', NULL, '\N', '\N', '\N', '\N', 1);
INSERT INTO results VALUES (2, 1, 2, 1, '5', 2, NULL, 'R', 2, 0, 30, NULL, NULL, '\N', '\N', '1:25.3', '140.5', 2);
INSERT INTO qualifying VALUES (1, 1, 1, 1, 2, 3, NULL, NULL, NULL);
INSERT INTO pit_stops VALUES (1, 1, 1, 20, '14:00:00', '25.0', 25000);
INSERT INTO pit_stops VALUES (1, 1, 2, 50, '14:40:00', '24.5', 24500);
INSERT INTO lap_times VALUES (1, 1, 1, 1, '1:30.500', 90500);
INSERT INTO driver_standings VALUES (1, 1, 1, 9, 1, 1);
INSERT INTO constructor_standings VALUES (1, 1, 1, 9, 1, 1);
"#;

    fn setup() -> (TempDir, Warehouse) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("f1.db");
        {
            let store = SqliteStore::new(&source).unwrap();
            store.initialize().unwrap();
            store.connection().execute_batch(SOURCE_ROWS).unwrap();
        }

        let warehouse = Warehouse::open(temp.path().join("f1_dw.db"), &source).unwrap();
        warehouse.create_tables().unwrap();
        (temp, warehouse)
    }

    #[test]
    fn test_open_requires_source() {
        let temp = TempDir::new().unwrap();
        let result = Warehouse::open(temp.path().join("dw.db"), temp.path().join("missing.db"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_create_tables_is_idempotent() {
        let (_temp, warehouse) = setup();
        warehouse.create_tables().unwrap();
    }

    #[test]
    fn test_steps_load_dimensions_first() {
        let first_fact = STEPS.iter().position(|s| s.kind == StepKind::Fact).unwrap();
        assert!(STEPS[first_fact..].iter().all(|s| s.kind == StepKind::Fact));
        assert_eq!(STEPS[0].table, "dim_date");
        assert_eq!(STEPS.len(), 10);
    }

    #[test]
    fn test_build_reports_row_counts() {
        let (_temp, warehouse) = setup();
        let report = warehouse.build().unwrap();

        let order: Vec<_> = report.steps.iter().map(|s| s.table).collect();
        let expected: Vec<_> = STEPS.iter().map(|s| s.table).collect();
        assert_eq!(order, expected);

        // the undated race has no date dimension row
        assert_eq!(report.rows_for("dim_date"), Some(2));
        assert_eq!(report.rows_for("dim_race"), Some(3));
        assert_eq!(report.rows_for("fact_race_results"), Some(2));
        assert_eq!(report.rows_for("fact_lap_times"), Some(1));
    }

    #[test]
    fn test_dim_date_columns() {
        let (_temp, warehouse) = setup();
        warehouse.build().unwrap();

        let (month, day, quarter, season): (i64, i64, i64, i64) = warehouse
            .connection()
            .query_row(
                "SELECT month, day, quarter, season FROM dim_date WHERE date_id = 19851103",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!((month, day, quarter, season), (11, 3, 4, 1985));
    }

    #[test]
    fn test_fact_race_results_aggregates_pit_stops() {
        let (_temp, warehouse) = setup();
        warehouse.build().unwrap();

        let conn = warehouse.connection();
        let (date_id, qualifying, finish, pit_stops, duration): (i64, Option<i64>, Option<i64>, i64, Option<f64>) = conn
            .query_row(
                "SELECT date_id, qualifying_position, finish_position, pit_stops, total_pit_stop_duration \
                 FROM fact_race_results WHERE race_result_id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .unwrap();
        assert_eq!(date_id, 19850519);
        assert_eq!(qualifying, Some(3));
        assert_eq!(finish, Some(1));
        assert_eq!(pit_stops, 2);
        assert_eq!(duration, Some(49.5));

        let (finish, speed, pit_stops): (Option<i64>, Option<f64>, i64) = conn
            .query_row(
                "SELECT finish_position, fastest_lap_speed, pit_stops \
                 FROM fact_race_results WHERE race_result_id = 2",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(finish, None);
        assert_eq!(speed, Some(140.5));
        assert_eq!(pit_stops, 0);
    }

    #[test]
    fn test_rebuild_needs_truncate() {
        let (_temp, warehouse) = setup();
        warehouse.build().unwrap();

        match warehouse.build() {
            Err(Error::WarehouseStep { step, .. }) => assert_eq!(step, "dim_date"),
            other => panic!("expected a failed step, got {other:?}"),
        }

        warehouse.truncate().unwrap();
        let report = warehouse.build().unwrap();
        assert_eq!(report.rows_for("fact_race_results"), Some(2));
    }
}
