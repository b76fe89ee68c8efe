pub mod profile;
pub mod website_link;

pub use profile::get as profile_get;
pub use profile::post as profile_post;
pub use profile::put as profile_put;
pub use website_link::post as website_link_post;
