mod interface;
mod merge;
mod mutex;
mod rwlock;
mod sharded;

pub use interface::*;
pub use merge::*;
pub use mutex::*;
pub use rwlock::*;
pub use sharded::*;
