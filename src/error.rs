use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("already exists")]
    AlreadyExists,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("unknown table {0}")]
    UnknownTable(String),

    #[error("unknown column '{column}' for table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("warehouse step {step} failed: {source}")]
    WarehouseStep {
        step: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
