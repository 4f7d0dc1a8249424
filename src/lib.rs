// Library root
// -----------
// Client for the RCS file upload API. The binary (`main.rs`) wires these
// modules into a small CLI.
//
// Module responsibilities:
// - `api`: the upload entry point (`UploadClient::handle_file_upload`),
//   including the single re-authentication retry on a rejected token.
// - `auth`: exchanges client credentials for a bearer token.
// - `token_store`: in-memory token cache keyed by credential pair.
// - `multipart`: multipart/form-data body encoder.
// - `http`: narrow blocking HTTP transport with per-call timeouts.
// - `error`, `config`: shared error taxonomy and timeout/sentinel values.
// - `cli`, `ui`, `logging`: front end pieces used by the binary.
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod multipart;
pub mod token_store;
pub mod ui;

pub use api::{UploadClient, UploadResult};
pub use error::{ApiFailure, TransportError, UploadError};
pub use token_store::TokenStore;
