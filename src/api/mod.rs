mod client;
mod error;

pub use client::{ApiClient, Auth};
pub use error::ApiError;
