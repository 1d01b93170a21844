//! A small polling site: published questions, their choices, and vote tallies
//! kept in SQLite and served over HTTP with axum.

pub mod config;
pub mod db;
pub mod error;
pub mod polls;
pub mod startup;
pub mod views;
