pub const WAREHOUSE_SCHEMA: &str = r#"
-- Facts
CREATE TABLE IF NOT EXISTS fact_race_results (
    race_result_id INTEGER PRIMARY KEY,
    date_id INTEGER,
    race_id INTEGER,
    circuit_id INTEGER,
    driver_id INTEGER,
    constructor_id INTEGER,
    qualifying_position INTEGER,
    grid_position INTEGER,
    finish_position INTEGER,
    points REAL,
    laps_completed INTEGER,
    fastest_lap_time TEXT,
    fastest_lap_speed REAL,
    status_id INTEGER,
    pit_stops INTEGER,
    total_pit_stop_duration REAL      -- seconds
);

CREATE TABLE IF NOT EXISTS fact_lap_times (
    race_id INTEGER,
    driver_id INTEGER,
    lap INTEGER,
    position INTEGER,
    lap_time REAL,                    -- seconds
    PRIMARY KEY (race_id, driver_id, lap)
);

CREATE TABLE IF NOT EXISTS fact_constructor_standings (
    race_id INTEGER,
    constructor_id INTEGER,
    points REAL,
    position INTEGER,
    wins INTEGER,
    PRIMARY KEY (race_id, constructor_id)
);

CREATE TABLE IF NOT EXISTS fact_driver_standings (
    race_id INTEGER,
    driver_id INTEGER,
    points REAL,
    position INTEGER,
    wins INTEGER,
    PRIMARY KEY (race_id, driver_id)
);

-- Dimensions
CREATE TABLE IF NOT EXISTS dim_date (
    date_id INTEGER PRIMARY KEY,      -- YYYYMMDD
    full_date TEXT,
    year INTEGER,
    month INTEGER,
    day INTEGER,
    quarter INTEGER,
    season INTEGER
);

CREATE TABLE IF NOT EXISTS dim_race (
    race_id INTEGER PRIMARY KEY,
    name TEXT,
    round INTEGER,
    url TEXT
);

CREATE TABLE IF NOT EXISTS dim_circuit (
    circuit_id INTEGER PRIMARY KEY,
    name TEXT,
    location TEXT,
    country TEXT,
    lat REAL,
    lng REAL,
    alt INTEGER
);

CREATE TABLE IF NOT EXISTS dim_driver (
    driver_id INTEGER PRIMARY KEY,
    full_name TEXT,
    dob TEXT,
    nationality TEXT
);

CREATE TABLE IF NOT EXISTS dim_constructor (
    constructor_id INTEGER PRIMARY KEY,
    name TEXT,
    nationality TEXT
);

CREATE TABLE IF NOT EXISTS dim_status (
    status_id INTEGER PRIMARY KEY,
    status TEXT
);
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Dimension,
    Fact,
}

/// One `INSERT ... SELECT` from the attached `src` schema into a warehouse table.
#[derive(Debug, Clone, Copy)]
pub struct LoadStep {
    pub table: &'static str,
    pub kind: StepKind,
    pub sql: &'static str,
}

/// Load order: every dimension before any fact.
pub const STEPS: &[LoadStep] = &[
    LoadStep {
        table: "dim_date",
        kind: StepKind::Dimension,
        sql: r#"
INSERT INTO dim_date (date_id, full_date, year, month, day, quarter, season)
SELECT DISTINCT
    CAST(REPLACE(date, '-', '') AS INTEGER),
    date,
    year,
    CAST(strftime('%m', date) AS INTEGER),
    CAST(strftime('%d', date) AS INTEGER),
    (CAST(strftime('%m', date) AS INTEGER) + 2) / 3,
    year
FROM src.races
WHERE date IS NOT NULL
"#,
    },
    LoadStep {
        table: "dim_race",
        kind: StepKind::Dimension,
        sql: "INSERT INTO dim_race (race_id, name, round, url) \
              SELECT raceId, name, round, url FROM src.races",
    },
    LoadStep {
        table: "dim_circuit",
        kind: StepKind::Dimension,
        sql: "INSERT INTO dim_circuit (circuit_id, name, location, country, lat, lng, alt) \
              SELECT circuitId, name, location, country, lat, lng, alt FROM src.circuits",
    },
    LoadStep {
        table: "dim_driver",
        kind: StepKind::Dimension,
        sql: "INSERT INTO dim_driver (driver_id, full_name, dob, nationality) \
              SELECT driverId, forename || ' ' || surname, dob, nationality FROM src.drivers",
    },
    LoadStep {
        table: "dim_constructor",
        kind: StepKind::Dimension,
        sql: "INSERT INTO dim_constructor (constructor_id, name, nationality) \
              SELECT constructorId, name, nationality FROM src.constructors",
    },
    LoadStep {
        table: "dim_status",
        kind: StepKind::Dimension,
        sql: "INSERT INTO dim_status (status_id, status) SELECT statusId, status FROM src.status",
    },
    LoadStep {
        table: "fact_race_results",
        kind: StepKind::Fact,
        // Text columns that are not plain numbers (the \N marker included) become NULL.
        sql: r#"
INSERT INTO fact_race_results (
    race_result_id, date_id, race_id, circuit_id, driver_id, constructor_id,
    qualifying_position, grid_position, finish_position, points, laps_completed,
    fastest_lap_time, fastest_lap_speed, status_id, pit_stops, total_pit_stop_duration
)
SELECT
    r.resultId,
    CAST(REPLACE(ra.date, '-', '') AS INTEGER),
    r.raceId,
    ra.circuitId,
    r.driverId,
    r.constructorId,
    q.position,
    r.grid,
    CASE
        WHEN r.position = '\N' OR r.position = '' OR r.position GLOB '*[^0-9]*' THEN NULL
        ELSE CAST(r.position AS INTEGER)
    END,
    r.points,
    r.laps,
    r.fastestLapTime,
    CASE
        WHEN r.fastestLapSpeed = '\N' OR r.fastestLapSpeed = ''
             OR r.fastestLapSpeed GLOB '*[^0-9.]*' THEN NULL
        ELSE CAST(r.fastestLapSpeed AS REAL)
    END,
    r.statusId,
    COUNT(p.stop),
    SUM(p.milliseconds) / 1000.0
FROM src.results r
JOIN src.races ra ON r.raceId = ra.raceId
LEFT JOIN src.qualifying q ON r.raceId = q.raceId AND r.driverId = q.driverId
LEFT JOIN src.pit_stops p ON r.raceId = p.raceId AND r.driverId = p.driverId
GROUP BY r.resultId
"#,
    },
    LoadStep {
        table: "fact_lap_times",
        kind: StepKind::Fact,
        sql: "INSERT INTO fact_lap_times (race_id, driver_id, lap, position, lap_time) \
              SELECT raceId, driverId, lap, position, CAST(milliseconds AS REAL) / 1000 \
              FROM src.lap_times",
    },
    LoadStep {
        table: "fact_constructor_standings",
        kind: StepKind::Fact,
        sql: "INSERT INTO fact_constructor_standings (race_id, constructor_id, points, position, wins) \
              SELECT raceId, constructorId, points, position, wins FROM src.constructor_standings",
    },
    LoadStep {
        table: "fact_driver_standings",
        kind: StepKind::Fact,
        sql: "INSERT INTO fact_driver_standings (race_id, driver_id, points, position, wins) \
              SELECT raceId, driverId, points, position, wins FROM src.driver_standings",
    },
];
