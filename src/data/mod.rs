//! Dataset loading

pub mod csv;

pub use csv::CsvDataset;
