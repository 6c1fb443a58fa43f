pub mod error;
pub mod metrics;
pub mod tracing;

pub use error::{error_normalizer, ApiError};
pub use metrics::metrics_middleware;
pub use tracing::{request_id_middleware, REQUEST_ID_HEADER};
