//! Per-user up/down votes on reports.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/reports/{id}/upvote` | Upvote, or withdraw an upvote |
//! | POST | `/api/reports/{id}/downvote` | Downvote, or withdraw a downvote |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::VoteService;
