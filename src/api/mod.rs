pub mod error_map;

pub use error_map::{ErrorEntry, ErrorMap};
