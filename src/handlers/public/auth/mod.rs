// handlers/public/auth/mod.rs - sign-up and sign-in
use serde::Deserialize;

pub mod login;
pub mod register;

pub use login::signin_post;
pub use register::signup_post;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}
