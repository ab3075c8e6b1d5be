//! epidash-web: HTTP API for the disease survey dashboard.
//! Provides:
//!   - Survey analytics (`GET /api/data?type=analytics`)
//!   - Cached reference data and summary counts
//!   - Chat with the dashboard assistant, optionally streamed over SSE
//!   - Natural-language questions answered with chart payloads
//!   - Raw responses grouped by disease

pub mod cache;
pub mod error;
pub mod handlers;
pub mod router;
pub mod sse;
pub mod state;
