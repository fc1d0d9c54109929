//! HTTP surface for the bike-share planner.
//!
//! Mirrors the chat commands: build a graph, inspect it, plan routes
//! and rebalance bikes. One graph session is shared by all clients.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Session};
