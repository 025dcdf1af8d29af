pub mod client;
pub mod config;
pub mod data_models;
pub mod debouncer;
pub mod error;
pub mod search_controller;
