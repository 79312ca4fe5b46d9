pub mod csv_loader;
pub mod warehouse;

pub use csv_loader::{CsvSource, LoadReport, LoadSummary, MANIFEST, SkippedFile, load_all, load_file};
pub use warehouse::{BuildReport, StepReport, Warehouse};
