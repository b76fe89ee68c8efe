pub mod delete;
pub mod upload;

pub use delete::post as delete_post;
pub use upload::post as upload_post;

/// Objects are namespaced by owner: `{owner}/{folder}/{filename}`
pub(crate) fn owner_prefix(owner: &uuid::Uuid) -> String {
    format!("{}/", owner)
}
