// Auth client: exchanges a client id/password pair for a bearer token at
// `POST {domain}/api/v1/auth`.

use crate::config::{endpoint, Timeouts, SUCCESS_CODE};
use crate::error::{ApiFailure, UploadError};
use crate::http::{HttpRequest, HttpTransport};
use crate::token_store::Token;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub const AUTH_PATH: &str = "/api/v1/auth";

/// Request body for the auth endpoint.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest<'a> {
    pub client_id: &'a str,
    pub client_pwd: &'a str,
}

/// Response envelope of the auth endpoint.
#[derive(Deserialize, Debug)]
pub struct AuthResponse {
    pub code: Option<String>,
    pub message: Option<String>,
    pub data: Option<AuthData>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
}

/// A successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub token: Token,
    pub refresh_token: Option<String>,
    pub code: String,
    pub message: String,
}

#[derive(Clone)]
pub struct AuthClient {
    transport: Arc<dyn HttpTransport>,
    timeouts: Timeouts,
}

impl AuthClient {
    pub fn new(transport: Arc<dyn HttpTransport>, timeouts: Timeouts) -> Self {
        AuthClient { transport, timeouts }
    }

    /// Authenticate and return the issued token.
    ///
    /// Any non-200 status, a business code other than `10000`, or a success
    /// answer without `data.token` is `AuthenticationFailed`.
    pub fn authenticate(
        &self,
        domain: &str,
        client_id: &str,
        client_pwd: &str,
    ) -> Result<AuthResult, UploadError> {
        let url = endpoint(domain, AUTH_PATH);
        let body = serde_json::to_vec(&AuthRequest {
            client_id,
            client_pwd,
        })
        .map_err(|e| UploadError::InvalidArgument(format!("cannot encode credentials: {e}")))?;

        let request = HttpRequest::post(url, self.timeouts)
            .header("Content-Type", "application/json")
            .body(body);
        let response = self.transport.execute(request)?;
        let status = response.status;

        if status != 200 {
            return Err(UploadError::AuthenticationFailed(ApiFailure::from_body(
                status,
                &response.body,
                format!("HTTP error code: {status}"),
            )));
        }

        let parsed: AuthResponse = serde_json::from_str(&response.body).map_err(|e| {
            debug!(error = %e, "auth response is not valid JSON");
            UploadError::AuthenticationFailed(ApiFailure::new(
                status,
                None,
                "unexpected auth response body",
            ))
        })?;

        let code = parsed.code.unwrap_or_default();
        let message = parsed.message.unwrap_or_default();
        if code != SUCCESS_CODE {
            return Err(UploadError::AuthenticationFailed(ApiFailure::new(
                status,
                Some(code),
                message,
            )));
        }

        let (token, refresh_token) = match parsed.data {
            Some(AuthData {
                token: Some(token),
                refresh_token,
            }) if !token.is_empty() => (token, refresh_token),
            _ => {
                return Err(UploadError::AuthenticationFailed(ApiFailure::new(
                    status,
                    Some(code),
                    "auth response did not include a token",
                )))
            }
        };

        info!(domain, "authenticated");
        Ok(AuthResult {
            token,
            refresh_token,
            code,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::BlockingTransport;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client() -> AuthClient {
        AuthClient::new(Arc::new(BlockingTransport::new()), Timeouts::from_millis(1000, 2000))
    }

    #[test]
    fn returns_token_on_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(AUTH_PATH)
                .header("Content-Type", "application/json")
                .json_body(json!({"clientId": "c1", "clientPwd": "p1"}));
            then.status(200).json_body(json!({
                "code": "10000",
                "message": "ok",
                "data": {"token": "tok-1", "refreshToken": "ref-1"}
            }));
        });

        let result = client().authenticate(&server.base_url(), "c1", "p1").expect("auth");
        mock.assert();
        assert_eq!(result.token, "tok-1");
        assert_eq!(result.refresh_token.as_deref(), Some("ref-1"));
        assert_eq!(result.code, "10000");
    }

    #[test]
    fn business_failure_carries_code_and_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(AUTH_PATH);
            then.status(200)
                .json_body(json!({"code": "20001", "message": "bad credentials"}));
        });

        match client().authenticate(&server.base_url(), "c1", "wrong") {
            Err(UploadError::AuthenticationFailed(f)) => {
                assert_eq!(f.code.as_deref(), Some("20001"));
                assert_eq!(f.message, "bad credentials");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_200_without_json_has_generic_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(AUTH_PATH);
            then.status(503).body("unavailable");
        });

        match client().authenticate(&server.base_url(), "c1", "p1") {
            Err(UploadError::AuthenticationFailed(f)) => {
                assert_eq!(f.status, 503);
                assert_eq!(f.code, None);
                assert_eq!(f.message, "HTTP error code: 503");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn success_code_without_token_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(AUTH_PATH);
            then.status(200).json_body(json!({"code": "10000", "message": "ok", "data": {}}));
        });

        let err = client().authenticate(&server.base_url(), "c1", "p1").unwrap_err();
        assert!(matches!(err, UploadError::AuthenticationFailed(_)), "got {err:?}");
    }
}
