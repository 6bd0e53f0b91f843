//! Resilient HTTP calls shared by every remote provider.

mod client;
mod retry;

pub use client::*;
pub use retry::*;
