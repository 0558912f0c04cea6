pub mod anime;
pub mod browse;
pub mod catalog;
pub mod genre;
pub mod macros;
pub mod search;
pub mod streaming;

pub mod util;
