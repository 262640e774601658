//! Wire types shared by the OSTrails proxy and its callers.

pub mod client;
pub mod types;

pub use client::{ClientError, ProxyClient};
pub use types::{
    ErrorResponse, HealthResponse, PushResponse, PushStatus, SubmissionResult, TargetName,
};
