// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

use http::{Request, Response, StatusCode};
use kube::{Client, client::Body, error::ErrorResponse};
use std::convert::Infallible;
use tower::service_fn;

/// The `Status` body the API server sends along with an error code.
fn status_body(code: StatusCode) -> String {
    let reason = match code {
        StatusCode::NOT_FOUND => "NotFound",
        StatusCode::FORBIDDEN => "Forbidden",
        StatusCode::INTERNAL_SERVER_ERROR => "InternalError",
        _ => "Unknown",
    };
    let status = ErrorResponse {
        status: "Failure".to_string(),
        message: code
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_lowercase(),
        reason: reason.to_string(),
        code: code.as_u16(),
    };
    serde_json::to_string(&status).unwrap()
}

async fn respond<T>(answer: T) -> Result<Response<Body>, Infallible>
where
    T: Future<Output = Result<String, StatusCode>>,
{
    let (code, body) = match answer.await {
        Ok(json) => (StatusCode::OK, json),
        Err(code) => (code, status_body(code)),
    };
    Ok(Response::builder()
        .status(code)
        .body(Body::from(body.into_bytes()))
        .unwrap())
}

/// A `kube::Client` in `namespace` whose every request is answered by
/// `answer`: JSON for a 200, or the status code of an API error.
pub fn mock_client<F, T>(namespace: &str, answer: F) -> Client
where
    F: Fn(Request<Body>) -> T + Send + Sync + 'static,
    T: Future<Output = Result<String, StatusCode>> + Send + 'static,
{
    let svc = service_fn(move |req: Request<Body>| respond(answer(req)));
    Client::new(svc, namespace.to_string())
}
