pub mod amount;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credential;
pub mod error;
pub mod session;
pub mod token;
