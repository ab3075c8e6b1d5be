//! epidash Database Layer
//!
//! SQLite storage for the disease survey: diseases, their questions, the
//! allowed choices per question, and one row per individual answer.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use epidash_db::{Database, ReferenceRepository, ResponseRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Arc::new(Database::connect("sqlite://epidash.sqlite", 5).await?);
//!     db.initialize().await?;
//!
//!     let diseases = ReferenceRepository::new(db.clone()).diseases().await?;
//!     let total = ResponseRepository::new(db).total_responses().await?;
//!     println!("{} diseases, {} responses", diseases.len(), total);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod schema;
pub mod reference;
pub mod responses;

pub use database::{Database, DatabaseStats};
pub use error::{DbError, Result};
pub use schema::{
    Choice, Disease, GroupedResponse, GroupedResponses, Question, ResponseFilter, ResponseRecord,
    TABLE_CHOICES, TABLE_DISEASES, TABLE_QUESTIONS, TABLE_RESPONSES,
};
pub use reference::ReferenceRepository;
pub use responses::ResponseRepository;
