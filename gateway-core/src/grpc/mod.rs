//! gRPC plumbing for the downstream services.
//!
//! This module provides:
//! - Translation of downstream `tonic::Status` values into HTTP errors
//! - Outgoing metadata (credential, request id, trace context, deadline)
//! - Lazily connected channels built from configuration
//! - One client per downstream service, each behind a trait so handlers can
//!   be exercised against in-memory fakes

pub mod authz_client;
pub mod board_client;
pub mod card_client;
pub mod category_client;
pub mod channel;
pub mod error;
pub mod interceptors;
pub mod tag_client;
pub mod user_client;

// Generated `proto.v1` messages and clients
pub mod proto {
    tonic::include_proto!("proto.v1");
}

pub use authz_client::{AuthzClient, CheckerApi, SubjectApi};
pub use board_client::{BoardApi, BoardClient};
pub use card_client::{CardApi, CardClient};
pub use category_client::{CategoryApi, CategoryClient};
pub use channel::ClientConfig;
pub use interceptors::outgoing_request;
pub use tag_client::{TagApi, TagClient};
pub use user_client::{UserApi, UserClient};

// Re-export commonly used tonic types
pub use tonic::{Code, Request, Response, Status};

/// Converts a downstream timestamp; absent or out-of-range values become the
/// Unix epoch.
pub fn timestamp_to_datetime(
    timestamp: Option<&prost_types::Timestamp>,
) -> chrono::DateTime<chrono::Utc> {
    timestamp
        .and_then(|ts| chrono::DateTime::from_timestamp(ts.seconds, ts.nanos.max(0) as u32))
        .unwrap_or_default()
}
