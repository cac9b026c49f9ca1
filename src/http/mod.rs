//! HTTP API server for driving interview sessions
//!
//! This module provides a REST API for the interview lifecycle:
//! - POST /interviews/start - Create a session and get the greeting
//! - POST /interviews/:id/answer - Submit a text answer
//! - POST /interviews/:id/answer/audio - Submit a recorded audio answer
//! - POST /interviews/:id/end - Close a session
//! - GET /interviews/:id/status - Query session status
//! - GET /interviews/:id/transcript - Get the conversation log
//! - GET /interviews/:id/feedback - Get the final assessment
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
