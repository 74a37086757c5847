//! Web layer for the schedule server.
//!
//! Provides HTTP endpoints for managing the catalog and reading
//! departure boards, as JSON or as HTML pages.

mod dto;
mod params;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use params::{BoardQuery, ReferenceError, ReferenceQuery, parse_reference};
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
