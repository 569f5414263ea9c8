//! Problem Details (RFC 7807) response body

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use super::app_error::AppError;

/// `type` URI の接頭辞
pub const PROBLEM_TYPE_BASE: &str = "https://petwell.vet/problems/";

/// エラーレスポンスのボディ
///
/// `action` と `instance` は値がある場合のみ出力します。
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails<'a> {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: &'static str,
    pub status: u16,
    pub detail: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<&'a str>,
    /// RFC 3339 UTC, ミリ秒精度
    pub timestamp: String,
}

impl<'a> ProblemDetails<'a> {
    pub fn new(err: &'a AppError) -> Self {
        let kind = err.kind();
        Self {
            problem_type: format!("{PROBLEM_TYPE_BASE}{}", kind.slug()),
            title: kind.as_str(),
            status: kind.status_code(),
            detail: err.message(),
            action: err.action(),
            instance: err.instance(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_body_shape() {
        let err = AppError::forbidden("Missing required permission: admin:read")
            .with_instance("/api/v1/employees");
        let body = serde_json::to_value(err.problem()).unwrap();

        assert_eq!(body["type"], "https://petwell.vet/problems/forbidden");
        assert_eq!(body["title"], "Forbidden");
        assert_eq!(body["status"], 403);
        assert_eq!(body["detail"], "Missing required permission: admin:read");
        assert_eq!(body["instance"], "/api/v1/employees");
        assert!(body.get("action").is_none());
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
