use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Default cap for request bodies. Delete requests carry a list of relpaths
/// and nothing else, so a few megabytes is plenty.
pub const DEFAULT_MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

/// Effective body limit, overridable through `ASSETS_PLUS_MAX_BODY_SIZE`.
pub fn max_body_size() -> usize {
    std::env::var("ASSETS_PLUS_MAX_BODY_SIZE")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_BODY_SIZE)
        .clamp(64 * 1024, 50 * 1024 * 1024)
}

/// An Axum middleware that validates incoming requests for common security issues.
///
/// This middleware checks for:
/// - Path traversal attempts in the request URI.
/// - Suspicious user agents.
/// - Excessive content length.
///
/// Relpaths travel in the query string and are checked separately when they
/// are resolved against a root.
pub async fn validate_request_middleware(req: Request, next: Next) -> Response {
    // Check for path traversal attempts in URL
    let uri_path = req.uri().path();
    if contains_path_traversal(uri_path) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": "INVALID_PATH",
                    "message": "Path traversal detected in request",
                },
                "status": 400,
            })),
        )
            .into_response();
    }

    if let Some(user_agent) = req.headers().get("user-agent") {
        if let Ok(ua_str) = user_agent.to_str() {
            if is_suspicious_user_agent(ua_str) {
                tracing::warn!("Suspicious user agent detected: {}", sanitize_for_logging(ua_str));
            }
        }
    }

    // Early rejection; DefaultBodyLimit still guards chunked bodies
    if matches!(req.method(), &axum::http::Method::POST | &axum::http::Method::PUT) {
        if let Some(length) = req
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<usize>().ok())
        {
            let max_body_size = max_body_size();
            if length > max_body_size {
                return (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    Json(json!({
                        "error": {
                            "code": "PAYLOAD_TOO_LARGE",
                            "message": format!("Request body exceeds maximum size of {} bytes", max_body_size),
                        },
                        "status": 413,
                    })),
                )
                    .into_response();
            }
        }
    }

    next.run(req).await
}

/// Traversal sequences in the raw URI path, including URL-encoded variants.
fn contains_path_traversal(path: &str) -> bool {
    let lower = path.to_lowercase();

    if path.contains("/..") || path.contains("\\..") || path.starts_with("..") {
        return true;
    }

    if path.contains("/./") || path.contains("\\.\\") {
        return true;
    }

    let encoded_patterns = [
        "%2e%2e",
        "%252e%252e", // .. and double-encoded ..
        "%2e/",
        "%252e%2f", // ./
        "/%2e",
        "%2f%2e", // /.
        "%2e\\",
        "%2e%5c", // .\\
        "%5c%2e",
        "%5c%5c", // \\.
        "%00",    // Null byte
    ];

    for pattern in &encoded_patterns {
        if lower.contains(pattern) {
            return true;
        }
    }

    path.contains('\0')
}

fn is_suspicious_user_agent(ua: &str) -> bool {
    let ua_lower = ua.to_lowercase();
    ua_lower.contains("scanner")
        || (ua_lower.contains("crawler") && !ua_lower.contains("googlebot") && !ua_lower.contains("bingbot"))
        || ua_lower.contains("nikto")
        || ua_lower.contains("sqlmap")
        || ua_lower.contains("acunetix")
}

/// Sanitizes user input for logging purposes.
///
/// Removes control characters (except whitespace), limits the length to 200
/// characters and escapes quotes and backslashes.
pub fn sanitize_for_logging(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .take(200)
        .collect::<String>()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\'', "\\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_traversal_detection() {
        assert!(contains_path_traversal("/assets_plus/../etc/passwd"));
        assert!(contains_path_traversal("/assets_plus/%2e%2e/output/list"));
        assert!(contains_path_traversal("/a/./b"));
        assert!(contains_path_traversal("path\0with\0null"));

        assert!(!contains_path_traversal("/assets_plus/output/list"));
        assert!(!contains_path_traversal("/assets_plus/input/thumb"));
    }

    #[test]
    fn test_suspicious_user_agents() {
        assert!(is_suspicious_user_agent("nikto/2.1.5"));
        assert!(is_suspicious_user_agent("sqlmap/1.0"));
        assert!(is_suspicious_user_agent("random scanner bot"));

        assert!(!is_suspicious_user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"));
        assert!(!is_suspicious_user_agent("Googlebot/2.1"));
    }

    #[test]
    fn test_sanitize_for_logging() {
        assert_eq!(sanitize_for_logging("normal text"), "normal text");
        assert_eq!(sanitize_for_logging("text\nwith\nnewlines"), "text\nwith\nnewlines");

        let sanitized = sanitize_for_logging("text\x00with\x01control\x02chars");
        assert!(!sanitized.contains('\x00'));
        assert!(!sanitized.contains('\x01'));

        let long_text = "a".repeat(300);
        assert_eq!(sanitize_for_logging(&long_text).len(), 200);
    }

    #[test]
    fn test_body_limit_is_clamped() {
        let limit = max_body_size();
        assert!(limit >= 64 * 1024);
        assert!(limit <= 50 * 1024 * 1024);
    }
}
