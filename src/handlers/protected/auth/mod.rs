pub mod me;

pub use me::me_get;
