pub mod bench;
pub mod cache;
pub mod extent;
pub mod hash;
pub mod order;
pub mod results;
pub mod stats;
pub mod subs;
pub mod util;
pub mod walk;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
