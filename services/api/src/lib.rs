pub mod adapters;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod web;
