mod schema;
mod sqlite;

pub use schema::{SCHEMA, SOURCE_TABLES};
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface used by the API.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    /// Round-trips a trivial statement; returns the selected value.
    fn ping(&self) -> Result<i64>;

    // User operations
    fn create_user(&self, user: &NewUser) -> Result<User>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    // Driver statistics
    fn driver_points_by_year(&self, forename: &str, surname: &str)
    -> Result<Vec<DriverSeasonPoints>>;
    fn pole_positions(&self) -> Result<Vec<DriverPolePositions>>;
    fn driver_victories(&self) -> Result<Vec<DriverVictories>>;
    fn driver_details(&self) -> Result<Vec<DriverDetail>>;

    // Race statistics
    fn retirements_by_year(&self) -> Result<Vec<YearlyRetirements>>;
    fn race_classifications(&self, year: i64, rank: i64) -> Result<Vec<RaceClassification>>;
    fn grand_prix_info(&self) -> Result<Vec<GrandPrixInfo>>;

    // Circuit statistics
    fn races_per_circuit(&self) -> Result<Vec<CircuitRaceCount>>;
    fn circuit_locations(&self) -> Result<Vec<CircuitLocation>>;

    // Constructor statistics
    /// `None` returns every constructor with at least one win.
    fn constructor_victories(&self, limit: Option<u32>) -> Result<Vec<ConstructorWins>>;
    fn constructor_details(&self) -> Result<Vec<ConstructorDetail>>;
    fn constructors(&self) -> Result<Vec<ConstructorSummary>>;
    fn constructor_drivers(&self, constructor: &str) -> Result<Vec<ConstructorDriverRecord>>;
}
