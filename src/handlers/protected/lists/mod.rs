pub mod collection;
pub mod leave;

pub use collection::{list_delete, list_get, list_post, list_put};
pub use leave::list_leave;
