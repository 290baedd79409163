//! Library crate for score-keeper, exposing the scoring engine, persistence and session services.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;
