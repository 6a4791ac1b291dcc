//! HTTP endpoint handlers.
//!
//! `page` serves the browser form; the rest are the JSON API under `/api/`.

pub mod health;
pub mod options;
pub mod page;
pub mod predict;
