#![doc = include_str!("../README.md")]

mod error;
mod pool;
mod recover;
mod runtime;
mod set;

pub use crate::error::*;
pub use crate::pool::*;
pub use crate::recover::*;
#[cfg(feature = "async-tokio")]
pub use crate::runtime::*;
pub use crate::set::*;
