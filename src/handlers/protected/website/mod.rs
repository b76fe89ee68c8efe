pub mod document;

pub use document::get as document_get;
pub use document::post as document_post;
pub use document::put as document_put;
