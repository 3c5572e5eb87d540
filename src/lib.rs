// Receipt Points - Core Library
// Exposes the scoring core for the CLI, the API server, and tests

pub mod config;
pub mod error;
pub mod points;
pub mod receipt;
pub mod store;
pub mod validation;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, ParseError, StoreError, ValidationError};
pub use points::{score, score_breakdown, PointsBreakdown};
pub use receipt::{Receipt, ReceiptItem};
pub use store::{example_receipts, ReceiptStore};
pub use validation::{is_guid, validate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
