pub mod api;
pub mod catalog;
pub mod config;
pub mod models;
pub mod search;
pub mod state;
