pub mod assets;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod editor;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod server;
pub mod session;
pub mod views;

#[cfg(test)]
pub mod testing;
