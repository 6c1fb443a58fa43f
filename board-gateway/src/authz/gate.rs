use std::sync::Arc;

use gateway_core::context::RequestContext;
use gateway_core::grpc::proto::IsGrantedRequest;
use gateway_core::grpc::CheckerApi;
use metrics::counter;

use super::{Action, CapabilityObject};

/// Asks the authorization service whether the caller may perform an action
/// on an object. Fails closed: any error answers "no".
#[derive(Clone)]
pub struct AuthorizationGate {
    checker: Arc<dyn CheckerApi>,
}

impl AuthorizationGate {
    pub fn new(checker: Arc<dyn CheckerApi>) -> Self {
        Self { checker }
    }

    pub async fn check(&self, ctx: &RequestContext, object: &CapabilityObject, action: Action) -> bool {
        let resource = object.name.as_str();

        let encoded = match object.encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(error = %e, resource, "failed to encode capability object");
                record(resource, "error");
                return false;
            }
        };

        let request = IsGrantedRequest {
            params: vec![
                ctx.subject().to_string(),
                encoded,
                action.as_str().to_string(),
            ],
        };

        match self.checker.is_granted(ctx, request).await {
            Ok(granted) if granted.yes => {
                record(resource, "granted");
                true
            }
            Ok(_) => {
                tracing::debug!(
                    user_id = %ctx.subject(),
                    resource,
                    action = %action,
                    "capability denied"
                );
                record(resource, "denied");
                false
            }
            Err(status) => {
                // Indistinguishable from a denial for the caller.
                tracing::warn!(
                    user_id = %ctx.subject(),
                    resource,
                    action = %action,
                    code = ?status.code(),
                    error = %status.message(),
                    "capability check failed"
                );
                record(resource, "error");
                false
            }
        }
    }
}

fn record(resource: &'static str, outcome: &'static str) {
    counter!(
        "gateway_capability_checks_total",
        "resource" => resource,
        "outcome" => outcome
    )
    .increment(1);
}
