pub mod common;
pub mod dump;
pub mod get;
pub mod info;
pub mod keys;
