//! Row records returned by the analytical queries.
//!
//! Field names are the JSON keys served by the API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSeasonPoints {
    pub year: i64,
    pub total_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRetirements {
    pub year: i64,
    pub total_retirements: i64,
    pub retirement_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverPolePositions {
    pub forename: String,
    pub surname: String,
    pub pole_positions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorWins {
    pub name: String,
    pub wins: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitRaceCount {
    pub name: String,
    pub country: Option<String>,
    pub race_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverVictories {
    pub forename: String,
    pub surname: String,
    pub victories: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitLocation {
    pub name: String,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverDetail {
    pub forename: String,
    pub surname: String,
    pub nationality: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDetail {
    pub name: String,
    pub nationality: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrandPrixInfo {
    pub year: i64,
    pub url: Option<String>,
}

/// The driver classified at a given position in one race of a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceClassification {
    pub round: i64,
    pub race: String,
    pub forename: String,
    pub surname: String,
    pub constructor: String,
    pub points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorSummary {
    pub constructor_id: i64,
    pub name: String,
}

/// Career totals of one driver while racing for a given constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDriverRecord {
    pub forename: String,
    pub surname: String,
    pub races: i64,
    pub wins: i64,
    pub total_points: f64,
}
