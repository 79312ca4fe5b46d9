pub const SCHEMA: &str = r#"
-- Normalized source schema, one table per CSV extract
CREATE TABLE IF NOT EXISTS circuits (
    circuitId INTEGER PRIMARY KEY,
    circuitRef TEXT,
    name TEXT,
    location TEXT,
    country TEXT,
    lat REAL,
    lng REAL,
    alt INTEGER,
    url TEXT
);

CREATE TABLE IF NOT EXISTS races (
    raceId INTEGER PRIMARY KEY,
    year INTEGER,
    round INTEGER,
    circuitId INTEGER REFERENCES circuits(circuitId),
    name TEXT,
    date TEXT,            -- ISO YYYY-MM-DD after coercion
    url TEXT
);

CREATE TABLE IF NOT EXISTS constructors (
    constructorId INTEGER PRIMARY KEY,
    name TEXT,
    nationality TEXT,
    url TEXT
);

CREATE TABLE IF NOT EXISTS drivers (
    driverId INTEGER PRIMARY KEY,
    forename TEXT,
    surname TEXT,
    dob TEXT,
    nationality TEXT,
    url TEXT
);

CREATE TABLE IF NOT EXISTS constructor_results (
    constructorResultsId INTEGER PRIMARY KEY,
    raceId INTEGER REFERENCES races(raceId),
    constructorId INTEGER REFERENCES constructors(constructorId),
    points REAL
);

CREATE TABLE IF NOT EXISTS constructor_standings (
    constructorStandingsId INTEGER PRIMARY KEY,
    raceId INTEGER REFERENCES races(raceId),
    constructorId INTEGER REFERENCES constructors(constructorId),
    points REAL,
    position INTEGER,
    wins INTEGER
);

CREATE TABLE IF NOT EXISTS driver_standings (
    driverStandingsId INTEGER PRIMARY KEY,
    raceId INTEGER REFERENCES races(raceId),
    driverId INTEGER REFERENCES drivers(driverId),
    points REAL,
    position INTEGER,
    wins INTEGER
);

CREATE TABLE IF NOT EXISTS lap_times (
    raceId INTEGER REFERENCES races(raceId),
    driverId INTEGER REFERENCES drivers(driverId),
    lap INTEGER,
    position INTEGER,
    time TEXT,
    milliseconds INTEGER,
    PRIMARY KEY (raceId, driverId, lap)
);

CREATE TABLE IF NOT EXISTS pit_stops (
    raceId INTEGER REFERENCES races(raceId),
    driverId INTEGER REFERENCES drivers(driverId),
    stop INTEGER,
    lap INTEGER,
    time TEXT,
    duration TEXT,
    milliseconds INTEGER
);

CREATE TABLE IF NOT EXISTS qualifying (
    qualifyId INTEGER PRIMARY KEY,
    raceId INTEGER REFERENCES races(raceId),
    driverId INTEGER REFERENCES drivers(driverId),
    constructorId INTEGER REFERENCES constructors(constructorId),
    number INTEGER,
    position INTEGER,
    q1 TEXT,
    q2 TEXT,
    q3 TEXT
);

-- position stays textual: the extract mixes finishing positions and the \N marker
CREATE TABLE IF NOT EXISTS results (
    resultId INTEGER PRIMARY KEY,
    raceId INTEGER REFERENCES races(raceId),
    driverId INTEGER REFERENCES drivers(driverId),
    constructorId INTEGER REFERENCES constructors(constructorId),
    number TEXT,
    grid INTEGER,
    position TEXT,
    positionText TEXT,
    positionOrder INTEGER,
    points REAL,
    laps INTEGER,
    time TEXT,
    milliseconds TEXT,
    fastestLap TEXT,
    rank TEXT,
    fastestLapTime TEXT,
    fastestLapSpeed TEXT,
    statusId INTEGER
);

CREATE TABLE IF NOT EXISTS seasons (
    year INTEGER PRIMARY KEY,
    url TEXT
);

CREATE TABLE IF NOT EXISTS status (
    statusId INTEGER PRIMARY KEY,
    status TEXT
);

-- API accounts
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    hashed_password TEXT NOT NULL,   -- PHC string with embedded salt
    email TEXT NOT NULL UNIQUE,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_races_circuit ON races(circuitId);
CREATE INDEX IF NOT EXISTS idx_results_race ON results(raceId);
CREATE INDEX IF NOT EXISTS idx_results_driver ON results(driverId);
CREATE INDEX IF NOT EXISTS idx_results_constructor ON results(constructorId);
CREATE INDEX IF NOT EXISTS idx_qualifying_race_driver ON qualifying(raceId, driverId);
CREATE INDEX IF NOT EXISTS idx_pit_stops_race_driver ON pit_stops(raceId, driverId);
"#;

/// Tables created by [`SCHEMA`] that receive CSV extracts.
pub const SOURCE_TABLES: &[&str] = &[
    "circuits",
    "races",
    "constructors",
    "drivers",
    "constructor_results",
    "constructor_standings",
    "driver_standings",
    "lap_times",
    "pit_stops",
    "qualifying",
    "results",
    "seasons",
    "status",
];
