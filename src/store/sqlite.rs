use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// The ETL commands use it for bulk loads.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }

    fn query_list<T, F>(&self, sql: &str, params: impl rusqlite::Params, map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        hashed_password: row.get(2)?,
        email: row.get(3)?,
        is_active: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    fn ping(&self) -> Result<i64> {
        let value: i64 = self.conn().query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(value)
    }

    // User operations

    fn create_user(&self, user: &NewUser) -> Result<User> {
        let created_at = Utc::now();
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO users (username, hashed_password, email, is_active, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![
                user.username,
                user.hashed_password,
                user.email,
                format_datetime(&created_at),
            ],
        );

        match result {
            Ok(_) => Ok(User {
                id: conn.last_insert_rowid(),
                username: user.username.clone(),
                hashed_password: user.hashed_password.clone(),
                email: user.email.clone(),
                is_active: true,
                created_at,
            }),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, hashed_password, email, is_active, created_at
             FROM users WHERE username = ?1",
            params![username],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, hashed_password, email, is_active, created_at
             FROM users WHERE email = ?1",
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    // Driver statistics

    fn driver_points_by_year(
        &self,
        forename: &str,
        surname: &str,
    ) -> Result<Vec<DriverSeasonPoints>> {
        self.query_list(
            "SELECT r.year, SUM(res.points) AS total_points
             FROM races r
             JOIN results res ON r.raceId = res.raceId
             JOIN drivers d ON res.driverId = d.driverId
             WHERE d.forename = ?1 AND d.surname = ?2
             GROUP BY r.year
             HAVING SUM(res.points) > 0
             ORDER BY r.year",
            params![forename, surname],
            |row| {
                Ok(DriverSeasonPoints {
                    year: row.get(0)?,
                    total_points: row.get(1)?,
                })
            },
        )
    }

    fn pole_positions(&self) -> Result<Vec<DriverPolePositions>> {
        self.query_list(
            "SELECT COALESCE(d.forename, ''), COALESCE(d.surname, ''), COUNT(*) AS pole_positions
             FROM qualifying q
             JOIN drivers d ON q.driverId = d.driverId
             WHERE q.position = 1
             GROUP BY d.driverId, d.forename, d.surname
             ORDER BY pole_positions DESC, d.surname, d.forename, d.driverId",
            [],
            |row| {
                Ok(DriverPolePositions {
                    forename: row.get(0)?,
                    surname: row.get(1)?,
                    pole_positions: row.get(2)?,
                })
            },
        )
    }

    fn driver_victories(&self) -> Result<Vec<DriverVictories>> {
        self.query_list(
            "SELECT COALESCE(d.forename, ''), COALESCE(d.surname, ''), COUNT(*) AS victories
             FROM results r
             JOIN drivers d ON r.driverId = d.driverId
             WHERE r.position = '1'
             GROUP BY d.driverId, d.forename, d.surname
             ORDER BY victories DESC, d.surname, d.forename, d.driverId",
            [],
            |row| {
                Ok(DriverVictories {
                    forename: row.get(0)?,
                    surname: row.get(1)?,
                    victories: row.get(2)?,
                })
            },
        )
    }

    fn driver_details(&self) -> Result<Vec<DriverDetail>> {
        self.query_list(
            "SELECT COALESCE(forename, ''), COALESCE(surname, ''), nationality, url
             FROM drivers
             ORDER BY driverId",
            [],
            |row| {
                Ok(DriverDetail {
                    forename: row.get(0)?,
                    surname: row.get(1)?,
                    nationality: row.get(2)?,
                    url: row.get(3)?,
                })
            },
        )
    }

    // Race statistics

    fn retirements_by_year(&self) -> Result<Vec<YearlyRetirements>> {
        self.query_list(
            "SELECT r.year, COUNT(*) AS total_retirements,
                    COUNT(*) * 100.0 / (
                        SELECT COUNT(*) FROM results
                        WHERE raceId IN (SELECT raceId FROM races WHERE year = r.year)
                    ) AS retirement_percentage
             FROM results res
             JOIN races r ON res.raceId = r.raceId
             JOIN status s ON res.statusId = s.statusId
             WHERE s.status LIKE '%Brakes%'
             GROUP BY r.year
             ORDER BY r.year",
            [],
            |row| {
                Ok(YearlyRetirements {
                    year: row.get(0)?,
                    total_retirements: row.get(1)?,
                    retirement_percentage: row.get(2)?,
                })
            },
        )
    }

    fn race_classifications(&self, year: i64, rank: i64) -> Result<Vec<RaceClassification>> {
        self.query_list(
            "SELECT ra.round, COALESCE(ra.name, ''), COALESCE(d.forename, ''),
                    COALESCE(d.surname, ''), COALESCE(co.name, ''), res.points
             FROM results res
             JOIN races ra ON res.raceId = ra.raceId
             JOIN drivers d ON res.driverId = d.driverId
             JOIN constructors co ON res.constructorId = co.constructorId
             WHERE ra.year = ?1 AND res.positionOrder = ?2
             ORDER BY ra.round, res.resultId",
            params![year, rank],
            |row| {
                Ok(RaceClassification {
                    round: row.get(0)?,
                    race: row.get(1)?,
                    forename: row.get(2)?,
                    surname: row.get(3)?,
                    constructor: row.get(4)?,
                    points: row.get(5)?,
                })
            },
        )
    }

    fn grand_prix_info(&self) -> Result<Vec<GrandPrixInfo>> {
        self.query_list(
            "SELECT year, url
             FROM races
             WHERE round = 1
             ORDER BY year DESC",
            [],
            |row| {
                Ok(GrandPrixInfo {
                    year: row.get(0)?,
                    url: row.get(1)?,
                })
            },
        )
    }

    // Circuit statistics

    fn races_per_circuit(&self) -> Result<Vec<CircuitRaceCount>> {
        self.query_list(
            "SELECT COALESCE(c.name, ''), c.country, COUNT(*) AS race_count
             FROM circuits c
             JOIN races r ON c.circuitId = r.circuitId
             GROUP BY c.circuitId, c.name, c.country
             ORDER BY race_count DESC, c.name, c.circuitId",
            [],
            |row| {
                Ok(CircuitRaceCount {
                    name: row.get(0)?,
                    country: row.get(1)?,
                    race_count: row.get(2)?,
                })
            },
        )
    }

    fn circuit_locations(&self) -> Result<Vec<CircuitLocation>> {
        self.query_list(
            "SELECT COALESCE(name, ''), country, lat, lng, url
             FROM circuits
             ORDER BY circuitId",
            [],
            |row| {
                Ok(CircuitLocation {
                    name: row.get(0)?,
                    country: row.get(1)?,
                    lat: row.get(2)?,
                    lng: row.get(3)?,
                    url: row.get(4)?,
                })
            },
        )
    }

    // Constructor statistics

    fn constructor_victories(&self, limit: Option<u32>) -> Result<Vec<ConstructorWins>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map_or(-1, i64::from);
        self.query_list(
            "SELECT COALESCE(co.name, ''), COUNT(*) AS wins
             FROM results r
             JOIN constructors co ON r.constructorId = co.constructorId
             WHERE r.position = '1'
             GROUP BY co.constructorId, co.name
             ORDER BY wins DESC, co.name, co.constructorId
             LIMIT ?1",
            params![limit],
            |row| {
                Ok(ConstructorWins {
                    name: row.get(0)?,
                    wins: row.get(1)?,
                })
            },
        )
    }

    fn constructor_details(&self) -> Result<Vec<ConstructorDetail>> {
        self.query_list(
            "SELECT COALESCE(name, ''), nationality, url
             FROM constructors
             ORDER BY name",
            [],
            |row| {
                Ok(ConstructorDetail {
                    name: row.get(0)?,
                    nationality: row.get(1)?,
                    url: row.get(2)?,
                })
            },
        )
    }

    fn constructors(&self) -> Result<Vec<ConstructorSummary>> {
        self.query_list(
            "SELECT constructorId, COALESCE(name, '')
             FROM constructors
             ORDER BY name, constructorId",
            [],
            |row| {
                Ok(ConstructorSummary {
                    constructor_id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
    }

    fn constructor_drivers(&self, constructor: &str) -> Result<Vec<ConstructorDriverRecord>> {
        self.query_list(
            "SELECT COALESCE(d.forename, ''), COALESCE(d.surname, ''),
                    COUNT(*) AS races,
                    SUM(CASE WHEN res.position = '1' THEN 1 ELSE 0 END) AS wins,
                    COALESCE(SUM(res.points), 0.0) AS total_points
             FROM results res
             JOIN constructors co ON res.constructorId = co.constructorId
             JOIN drivers d ON res.driverId = d.driverId
             WHERE co.name = ?1
             GROUP BY d.driverId, d.forename, d.surname
             ORDER BY total_points DESC, d.surname, d.forename, d.driverId",
            params![constructor],
            |row| {
                Ok(ConstructorDriverRecord {
                    forename: row.get(0)?,
                    surname: row.get(1)?,
                    races: row.get(2)?,
                    wins: row.get(3)?,
                    total_points: row.get(4)?,
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SEED: &str = r#"
        INSERT INTO circuits (circuitId, name, location, country, lat, lng, url) VALUES
            (1, 'Circuit de Monaco', 'Monte-Carlo', 'Monaco', 43.7347, 7.42056, 'http://en.wikipedia.org/wiki/Circuit_de_Monaco'),
            (2, 'Silverstone Circuit', 'Silverstone', 'UK', 52.0786, -1.01694, 'http://en.wikipedia.org/wiki/Silverstone_Circuit');
        INSERT INTO races (raceId, year, round, circuitId, name, date, url) VALUES
            (1, 1985, 1, 1, 'Monaco Grand Prix', '1985-05-19', 'http://en.wikipedia.org/wiki/1985_Monaco_Grand_Prix'),
            (2, 1985, 2, 2, 'British Grand Prix', '1985-07-21', 'http://en.wikipedia.org/wiki/1985_British_Grand_Prix'),
            (3, 1986, 1, 1, 'Monaco Grand Prix', '1986-05-11', 'http://en.wikipedia.org/wiki/1986_Monaco_Grand_Prix');
        INSERT INTO constructors (constructorId, name, nationality) VALUES
            (1, 'McLaren', 'British'), (2, 'Williams', 'British'), (3, 'Ferrari', 'Italian');
        INSERT INTO drivers (driverId, forename, surname, nationality) VALUES
            (1, 'Alain', 'Prost', 'French'), (2, 'Nigel', 'Mansell', 'British');
        INSERT INTO status (statusId, status) VALUES (1, 'Finished'), (2, 'Brakes');
        INSERT INTO results (resultId, raceId, driverId, constructorId, position, positionOrder, points, statusId) VALUES
            (1, 1, 1, 1, '1', 1, 9, 1),
            (2, 1, 2, 2, '\N', 2, 0, 2),
            (3, 2, 1, 1, '1', 1, 9, 1),
            (4, 2, 2, 2, '2', 2, 6, 1),
            (5, 3, 2, 2, '1', 1, 9, 1),
            (6, 3, 1, 1, '\N', 2, 0, 2);
        INSERT INTO qualifying (qualifyId, raceId, driverId, constructorId, position) VALUES
            (1, 1, 1, 1, 1), (2, 2, 2, 2, 1), (3, 3, 1, 1, 2), (4, 3, 2, 2, 1);
    "#;

    fn seeded_store(temp: &TempDir) -> SqliteStore {
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        store.conn().execute_batch(SEED).unwrap();
        store
    }

    #[test]
    fn test_initialize_creates_tables() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        // idempotent
        store.initialize().unwrap();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in crate::store::SOURCE_TABLES {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
        assert!(tables.contains(&"users".to_string()));
    }

    #[test]
    fn test_ping() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        assert_eq!(store.ping().unwrap(), 1);
    }

    #[test]
    fn test_user_crud() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let created = store
            .create_user(&NewUser {
                username: "alain".to_string(),
                hashed_password: "hash".to_string(),
                email: "alain@example.com".to_string(),
            })
            .unwrap();
        assert!(created.id > 0);
        assert!(created.is_active);

        let fetched = store.get_user_by_username("alain").unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.hashed_password, "hash");

        let by_email = store
            .get_user_by_email("alain@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(by_email.username, "alain");

        assert!(store.get_user_by_username("nigel").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_user_is_already_exists() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let user = NewUser {
            username: "alain".to_string(),
            hashed_password: "hash".to_string(),
            email: "alain@example.com".to_string(),
        };
        store.create_user(&user).unwrap();

        let result = store.create_user(&NewUser {
            email: "other@example.com".to_string(),
            ..user
        });
        assert!(matches!(result, Err(Error::AlreadyExists)));
    }

    #[test]
    fn test_driver_points_by_year() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        let points = store.driver_points_by_year("Alain", "Prost").unwrap();
        // 1986 has results but no points
        assert_eq!(
            points,
            vec![DriverSeasonPoints {
                year: 1985,
                total_points: 18.0
            }]
        );

        let mansell = store.driver_points_by_year("Nigel", "Mansell").unwrap();
        let years: Vec<i64> = mansell.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![1985, 1986]);

        assert!(store.driver_points_by_year("Ayrton", "Senna").unwrap().is_empty());
    }

    #[test]
    fn test_retirements_by_year() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        let rows = store.retirements_by_year().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year, 1985);
        assert_eq!(rows[0].total_retirements, 1);
        assert!((rows[0].retirement_percentage - 25.0).abs() < 1e-9);
        assert_eq!(rows[1].year, 1986);
        assert!((rows[1].retirement_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_constructor_victories_ordering_and_limit() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        let all = store.constructor_victories(None).unwrap();
        assert_eq!(
            all,
            vec![
                ConstructorWins {
                    name: "McLaren".to_string(),
                    wins: 2
                },
                ConstructorWins {
                    name: "Williams".to_string(),
                    wins: 1
                },
            ]
        );

        let top = store.constructor_victories(Some(1)).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "McLaren");
    }

    #[test]
    fn test_pole_positions_ordering() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        let poles = store.pole_positions().unwrap();
        assert_eq!(poles.len(), 2);
        assert_eq!(poles[0].pole_positions, 2);
        assert_eq!(poles[0].surname, "Mansell");
        assert_eq!(poles[1].surname, "Prost");
        assert_eq!(poles[1].pole_positions, 1);
    }

    #[test]
    fn test_race_classifications() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        let winners = store.race_classifications(1985, 1).unwrap();
        assert_eq!(winners.len(), 2);
        assert_eq!(winners[0].round, 1);
        assert_eq!(winners[0].race, "Monaco Grand Prix");
        assert_eq!(winners[0].surname, "Prost");
        assert_eq!(winners[0].constructor, "McLaren");
        assert_eq!(winners[1].race, "British Grand Prix");

        assert!(store.race_classifications(1990, 1).unwrap().is_empty());
    }

    #[test]
    fn test_constructor_drivers() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        let drivers = store.constructor_drivers("Williams").unwrap();
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].surname, "Mansell");
        assert_eq!(drivers[0].races, 3);
        assert_eq!(drivers[0].wins, 1);
        assert!((drivers[0].total_points - 15.0).abs() < 1e-9);

        assert!(store.constructor_drivers("Brabham").unwrap().is_empty());
    }

    #[test]
    fn test_circuit_and_grand_prix_listings() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        let counts = store.races_per_circuit().unwrap();
        assert_eq!(counts[0].name, "Circuit de Monaco");
        assert_eq!(counts[0].race_count, 2);

        let gps = store.grand_prix_info().unwrap();
        let years: Vec<i64> = gps.iter().map(|g| g.year).collect();
        assert_eq!(years, vec![1986, 1985]);

        let constructors = store.constructors().unwrap();
        let names: Vec<&str> = constructors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ferrari", "McLaren", "Williams"]);
    }
}
