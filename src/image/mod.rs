//! Asynchronous screenshot generation against the image endpoint.

pub mod client;
pub mod resolve;
pub mod task;
pub mod types;

pub use client::{ImageClient, ImageClientBuilder};
pub use resolve::{ImageResolver, DEFAULT_RELAY_URL};
pub use task::{ImageOutput, TaskResponse, TaskStatus};
pub use types::{ImageFormat, Screenshot};
