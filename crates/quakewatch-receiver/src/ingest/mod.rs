//! Alert ingestion and the rotating alert log.

pub mod ingestor;
pub mod rotating;

pub use ingestor::AlertIngestor;
pub use rotating::RotatingFile;
