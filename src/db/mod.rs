// src/db/mod.rs
//
// Database module
//
// Provides:
// - Connection pooling
// - Schema migrations
// - Raw-SQL pass-through for trusted inspection

pub mod connection;
pub mod migrations;
pub mod raw;

pub use connection::{
    create_connection_pool, create_test_connection, create_test_pool, get_connection,
    ConnectionPool, PooledConn,
};

pub use migrations::initialize_database;

pub use raw::raw_query;
