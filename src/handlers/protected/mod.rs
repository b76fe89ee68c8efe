// handlers/protected/mod.rs - JWT authentication required
//
// Route prefix /api/*; `jwt_auth_middleware` runs first and injects AuthUser.
pub mod auth;
pub mod client;
pub mod cuisine;
pub mod dish;
pub mod file;
pub mod website;
