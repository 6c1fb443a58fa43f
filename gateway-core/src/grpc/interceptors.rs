//! Metadata attached to every outgoing downstream call.
//!
//! Each call carries:
//! - the caller's raw credential (`authorization`)
//! - the correlation id (`x-request-id`)
//! - W3C trace context (`traceparent`/`tracestate`) when a span is active
//! - the time left until the request deadline (`grpc-timeout`)

use opentelemetry::trace::TraceContextExt;
use tonic::metadata::MetadataValue;
use tonic::Request;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::context::RequestContext;

/// gRPC metadata key for W3C traceparent header.
pub const TRACEPARENT_KEY: &str = "traceparent";

/// gRPC metadata key for W3C tracestate header.
pub const TRACESTATE_KEY: &str = "tracestate";

/// gRPC metadata key for request ID.
pub const REQUEST_ID_KEY: &str = "x-request-id";

/// gRPC metadata key for the forwarded credential.
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Wraps `message` in a request carrying the metadata derived from `ctx`.
pub fn outgoing_request<T>(ctx: &RequestContext, message: T) -> Request<T> {
    let mut request = Request::new(message);

    match MetadataValue::try_from(ctx.credential()) {
        Ok(value) => {
            request.metadata_mut().insert(AUTHORIZATION_KEY, value);
        }
        Err(_) => tracing::warn!("credential is not valid metadata; not forwarded"),
    }

    inject_trace_context_with_request_id(&mut request, ctx.request_id());
    request.set_timeout(ctx.remaining());
    request
}

/// Inject current trace context into outgoing gRPC request metadata.
pub fn inject_trace_context<T>(request: &mut Request<T>) {
    let span = Span::current();
    let context = span.context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();

    if span_context.is_valid() {
        // Format: version-trace_id-span_id-trace_flags
        let traceparent = format!(
            "00-{}-{}-{:02x}",
            span_context.trace_id(),
            span_context.span_id(),
            span_context.trace_flags().to_u8()
        );

        if let Ok(value) = traceparent.parse() {
            request.metadata_mut().insert(TRACEPARENT_KEY, value);
        }

        let tracestate = span_context.trace_state().header();
        if !tracestate.is_empty() {
            if let Ok(value) = tracestate.parse() {
                request.metadata_mut().insert(TRACESTATE_KEY, value);
            }
        }
    }
}

/// Inject trace context and request ID into outgoing gRPC request metadata.
pub fn inject_trace_context_with_request_id<T>(request: &mut Request<T>, request_id: &str) {
    inject_trace_context(request);

    if let Ok(value) = request_id.parse() {
        request.metadata_mut().insert(REQUEST_ID_KEY, value);
    }
}
