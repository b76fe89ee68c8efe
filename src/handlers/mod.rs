// handlers/mod.rs - two security tiers
//
// Public (no auth, /auth/*) and Protected (JWT auth, /api/*). Protected
// handlers receive the token owner as `Extension<AuthUser>` and never act on
// another owner's rows.
pub mod public;
pub mod protected;
