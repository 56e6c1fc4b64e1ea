//! Request extractors that reject malformed requests with the app's JSON
//! error body instead of axum's plain text.

use axum::extract::{FromRequest, FromRequestParts};

use crate::Error;

/// A JSON request body, see [axum::Json].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// A path parameter, see [axum::extract::Path].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct ApiPath<T>(pub T);

/// Query string parameters, see [axum::extract::Query].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);
