#[cfg(feature = "async-tokio")]
mod tokio;

#[cfg(feature = "async-tokio")]
pub use tokio::*;
