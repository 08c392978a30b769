// SQLite module - the bundled executor implementation
//
// - config: connection options and their builder
// - params: conversion from middleware values to rusqlite values and binding
// - query: result extraction
// - connection: the connection wrapper and its executor implementation

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteConnection;
pub use query::build_result_set;
