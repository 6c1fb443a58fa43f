pub mod boards;
pub mod cards;
pub mod categories;
pub mod health;
pub mod members;
pub mod tags;
pub mod users;

use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};

/// `201 Created` with `Location: <request path>/<id>`.
pub(crate) fn created(uri: &Uri, id: &str) -> Response {
    let location = format!("{}/{}", uri.path().trim_end_matches('/'), id);
    (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
}
