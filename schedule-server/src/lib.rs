//! Transit schedule server.
//!
//! Stores recurring departure times per station and answers: "what
//! leaves next from this station, or from any station in my saved
//! location?"

pub mod cache;
pub mod config;
pub mod domain;
pub mod schedule;
pub mod store;
pub mod web;
