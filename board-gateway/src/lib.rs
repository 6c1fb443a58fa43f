//! board-gateway: HTTP gateway in front of the board services.
//!
//! Authenticates callers, authorizes every action against the board that owns
//! the resource, forwards the call to the owning gRPC service and renders all
//! failures through one error normalizer.
pub mod auth;
pub mod authz;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod startup;
pub mod utils;
