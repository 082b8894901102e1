use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::ApiError;

/// Raw access token taken from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Rejects function calls without a well-formed bearer header (401) and
/// hands the token to the handler as a request extension.
pub async fn require_bearer_token(mut req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_value);

    match token {
        Some(token) => {
            req.extensions_mut().insert(BearerToken(token));
            next.run(req).await
        }
        None => {
            tracing::warn!(path = %req.uri().path(), "missing or malformed Authorization header");
            ApiError::unauthorized().into_response()
        }
    }
}

fn bearer_value(header: &str) -> Option<String> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::bearer_value;

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_value("Bearer abc.def").as_deref(), Some("abc.def"));
        assert_eq!(bearer_value("bearer  abc ").as_deref(), Some("abc"));
        assert_eq!(bearer_value("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_value("Bearer "), None);
        assert_eq!(bearer_value("abc"), None);
    }
}
