// Upload client: the entry point that ties the token store, the auth client,
// the multipart encoder and the transport together to satisfy one upload.
//
// Flow for a single call, strictly sequential:
//   validate -> cached token? -> (authenticate) -> upload
//   -> on token-invalid only: authenticate once more -> upload once more.

use crate::auth::AuthClient;
use crate::config::{endpoint, ClientConfig, SUCCESS_CODE, TOKEN_INVALID_CODE};
use crate::error::{ApiFailure, UploadError};
use crate::http::{BlockingTransport, HttpRequest, HttpTransport};
use crate::multipart::{MultipartForm, Part};
use crate::token_store::{StoreKey, Token, TokenStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const UPLOAD_PATH: &str = "/api/v1/upload";

/// File read into memory, with the MIME type guessed from its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub filename: String,
}

impl FileContent {
    /// Read `path` fully. Missing or unreadable files are `InvalidArgument`.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        if !path.is_file() {
            return Err(UploadError::InvalidArgument(format!(
                "file does not exist: {}",
                path.display()
            )));
        }
        let bytes = std::fs::read(path).map_err(|e| {
            UploadError::InvalidArgument(format!("cannot read {}: {}", path.display(), e))
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream().to_string();
        Ok(FileContent {
            bytes,
            mime,
            filename,
        })
    }
}

/// Everything needed for one upload attempt apart from the token.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub domain: String,
    pub brand_id: Option<String>,
    pub file: FileContent,
}

/// The `reqFile` JSON part.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReqFile<'a> {
    brand_id: &'a str,
}

#[derive(Deserialize, Debug)]
struct UploadResponse {
    code: Option<String>,
    message: Option<String>,
    data: Option<serde_json::Value>,
}

/// Successful upload as reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub code: String,
    pub message: String,
    /// The `data` object exactly as returned.
    pub server_data: serde_json::Value,
}

/// Typed view of the upload `data` payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub ch: Option<String>,
    pub img_url: Option<String>,
    #[serde(default)]
    pub img_url_lst: Vec<String>,
    pub file_id: Option<String>,
    pub file_exp_dt: Option<String>,
}

impl UploadResult {
    /// Decode `server_data` into `FileData`, if it has that shape.
    pub fn file_data(&self) -> Option<FileData> {
        serde_json::from_value(self.server_data.clone()).ok()
    }
}

/// Upload client holding the shared token store and transport.
#[derive(Clone)]
pub struct UploadClient {
    transport: Arc<dyn HttpTransport>,
    auth: AuthClient,
    store: TokenStore,
    config: ClientConfig,
}

impl UploadClient {
    /// Client over the blocking reqwest transport with default timeouts.
    pub fn new(store: TokenStore) -> Self {
        UploadClient::with_transport(
            Arc::new(BlockingTransport::new()),
            store,
            ClientConfig::default(),
        )
    }

    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        store: TokenStore,
        config: ClientConfig,
    ) -> Self {
        let auth = AuthClient::new(Arc::clone(&transport), config.auth_timeouts);
        UploadClient {
            transport,
            auth,
            store,
            config,
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Upload `file` to `domain`, authenticating when no token is cached and
    /// re-authenticating exactly once if the cached token is rejected.
    pub fn handle_file_upload(
        &self,
        domain: &str,
        client_id: &str,
        client_pwd: &str,
        brand_id: Option<&str>,
        file: &Path,
    ) -> Result<UploadResult, UploadError> {
        require("domain", domain)?;
        require("clientId", client_id)?;
        require("clientPwd", client_pwd)?;
        let file = FileContent::from_path(file)?;

        let request = UploadRequest {
            domain: domain.trim().to_string(),
            brand_id: brand_id.map(str::to_string),
            file,
        };
        self.upload(&request, client_id, client_pwd)
    }

    /// Run the token lookup / upload / single retry cycle for a validated
    /// request.
    pub fn upload(
        &self,
        request: &UploadRequest,
        client_id: &str,
        client_pwd: &str,
    ) -> Result<UploadResult, UploadError> {
        let key = StoreKey::derive(client_id, client_pwd);
        let token = match self.store.get(&key) {
            Some(token) => {
                debug!("using cached token");
                token
            }
            None => self.renew_token(&request.domain, client_id, client_pwd, &key)?,
        };

        match self.upload_once(request, &token) {
            Err(UploadError::TokenInvalid(failure)) => {
                warn!(%failure, "token rejected, re-authenticating once");
                let token = self.renew_token(&request.domain, client_id, client_pwd, &key)?;
                match self.upload_once(request, &token) {
                    Err(UploadError::TokenInvalid(failure)) => {
                        Err(UploadError::UploadFailed(failure))
                    }
                    outcome => outcome,
                }
            }
            outcome => outcome,
        }
    }

    fn renew_token(
        &self,
        domain: &str,
        client_id: &str,
        client_pwd: &str,
        key: &StoreKey,
    ) -> Result<Token, UploadError> {
        let auth = self.auth.authenticate(domain, client_id, client_pwd)?;
        self.store.put(key.clone(), auth.token.clone());
        Ok(auth.token)
    }

    fn upload_once(
        &self,
        request: &UploadRequest,
        token: &str,
    ) -> Result<UploadResult, UploadError> {
        let req_file = serde_json::to_string(&ReqFile {
            brand_id: request.brand_id.as_deref().unwrap_or(""),
        })
        .map_err(|e| UploadError::InvalidArgument(format!("cannot encode reqFile: {e}")))?;

        let file = &request.file;
        let body = MultipartForm::new()
            .text("reqFile", req_file)
            .part(Part::file(
                "filePart",
                file.bytes.clone(),
                file.mime.clone(),
                file.filename.clone(),
            ))
            .encode();

        let url = endpoint(&request.domain, UPLOAD_PATH);
        let http_request = HttpRequest::post(url, self.config.upload_timeouts)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", body.content_type())
            .body(body.bytes);
        let response = self.transport.execute(http_request)?;
        let status = response.status;

        // Business codes only count on a 200; anything else is terminal.
        if status != 200 {
            return Err(UploadError::UploadFailed(ApiFailure::from_body(
                status,
                &response.body,
                format!("HTTP error code: {status}"),
            )));
        }

        let parsed: UploadResponse = serde_json::from_str(&response.body).map_err(|e| {
            debug!(error = %e, "upload response is not valid JSON");
            UploadError::UploadFailed(ApiFailure::new(
                status,
                None,
                "unexpected upload response body",
            ))
        })?;

        let code = parsed.code.unwrap_or_default();
        let message = parsed.message.unwrap_or_default();
        if code != SUCCESS_CODE {
            return Err(rejection(ApiFailure::new(status, Some(code), message)));
        }

        info!(filename = %file.filename, "upload accepted");
        Ok(UploadResult {
            code,
            message,
            server_data: parsed.data.unwrap_or(serde_json::Value::Null),
        })
    }
}

fn require(name: &str, value: &str) -> Result<(), UploadError> {
    if value.trim().is_empty() {
        return Err(UploadError::InvalidArgument(format!("{name} cannot be empty")));
    }
    Ok(())
}

fn rejection(failure: ApiFailure) -> UploadError {
    if failure.has_code(TOKEN_INVALID_CODE) {
        UploadError::TokenInvalid(failure)
    } else {
        UploadError::UploadFailed(failure)
    }
}
