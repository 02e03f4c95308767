use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Tags every request with an id (keeping one supplied by the client) and
/// echoes it on the response.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = match req.headers().get(&REQUEST_ID_HEADER) {
        Some(existing) => existing.clone(),
        None => match HeaderValue::try_from(Uuid::new_v4().to_string()) {
            Ok(generated) => {
                req.headers_mut()
                    .insert(REQUEST_ID_HEADER, generated.clone());
                generated
            }
            Err(_) => return next.run(req).await,
        },
    };

    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
    response
}
