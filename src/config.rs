// Client configuration: plain values handed to each request at call time.

use std::time::Duration;

/// Business code returned by every endpoint on success.
pub const SUCCESS_CODE: &str = "10000";

/// Business code returned by the upload endpoint when the bearer token is
/// rejected. The only failure that triggers a re-authentication.
pub const TOKEN_INVALID_CODE: &str = "29011";

/// Connect/read timeout pair applied to a single HTTP call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Timeouts {
    pub const fn from_millis(connect: u64, read: u64) -> Self {
        Timeouts {
            connect: Duration::from_millis(connect),
            read: Duration::from_millis(read),
        }
    }
}

/// Timeouts for the two call sites of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    pub auth_timeouts: Timeouts,
    pub upload_timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            auth_timeouts: Timeouts::from_millis(5_000, 8_000),
            upload_timeouts: Timeouts::from_millis(7_000, 15_000),
        }
    }
}

/// Join a domain and an endpoint path, dropping a trailing `/` on the domain.
pub(crate) fn endpoint(domain: &str, path: &str) -> String {
    format!("{}{}", domain.trim().trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeouts_per_call_site() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.auth_timeouts.connect, Duration::from_millis(5000));
        assert_eq!(cfg.auth_timeouts.read, Duration::from_millis(8000));
        assert_eq!(cfg.upload_timeouts.connect, Duration::from_millis(7000));
        assert_eq!(cfg.upload_timeouts.read, Duration::from_millis(15000));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        assert_eq!(
            endpoint("https://api.example.com/", "/api/v1/auth"),
            "https://api.example.com/api/v1/auth"
        );
        assert_eq!(
            endpoint("https://api.example.com", "/api/v1/upload"),
            "https://api.example.com/api/v1/upload"
        );
    }
}
