pub mod config;
pub mod db;
pub mod parser;
pub mod snapshot;
