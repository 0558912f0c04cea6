pub mod catalog;
pub mod streaming;
