pub mod account;
pub mod auth;
pub mod dish;
pub mod menu;
pub mod onboard;
pub mod server;
pub mod site;
