//! Two-seed movie recommendations over pre-computed embeddings.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
