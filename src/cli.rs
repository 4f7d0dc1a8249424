// Command-line surface. Every value may come from a positional argument or
// its environment variable; anything still missing is prompted for by `ui`.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "rcs-uploader",
    version,
    about = "Authenticate against the RCS API and upload a file"
)]
pub struct Args {
    /// API domain, e.g. https://api.example.com
    #[arg(env = "RCS_DOMAIN")]
    pub domain: Option<String>,

    #[arg(env = "RCS_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(env = "RCS_CLIENT_PWD", hide_env_values = true)]
    pub client_pwd: Option<String>,

    /// Brand id; may be an empty string
    #[arg(env = "RCS_BRAND_ID")]
    pub brand_id: Option<String>,

    /// Path of the file to upload
    #[arg(env = "RCS_FILE")]
    pub file: Option<PathBuf>,
}

impl Args {
    /// True when nothing needs to be prompted for.
    pub fn is_complete(&self) -> bool {
        self.domain.is_some()
            && self.client_id.is_some()
            && self.client_pwd.is_some()
            && self.file.is_some()
    }
}
