mod interface;
mod manager;
mod task;
mod worker;

pub use interface::*;
pub use manager::*;
