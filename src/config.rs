use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use interview_portal::{ApiClient, AuthSession, FileHandoff};
use secrecy::Secret;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Settings shared by every command, read from flags or the environment.
#[derive(Args)]
pub struct Config {
    /// Base URL of the portal REST backend.
    #[clap(long, env = "PORTAL_API_URL", value_parser, value_name = "URL")]
    pub api_url: Url,

    /// Bearer token for admin commands, as printed by `login`.
    #[clap(long, env = "PORTAL_API_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub api_token: Option<String>,

    /// Where candidate details are kept between `candidate enter` and `candidate take`.
    #[clap(long, env = "PORTAL_HANDOFF_DIR", value_parser, value_name = "PATH")]
    pub handoff_dir: Option<PathBuf>,

    #[clap(long, env = "RUST_LOG", default_value = "info")]
    pub rust_log: String,
}

impl Config {
    pub fn client(&self) -> ApiClient {
        let auth = match &self.api_token {
            Some(token) => AuthSession::with_token(Secret::new(token.clone())),
            None => AuthSession::new(),
        };

        ApiClient::new(self.api_url.clone(), Arc::new(auth))
    }

    pub fn handoff(&self) -> FileHandoff {
        let dir = self
            .handoff_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        FileHandoff::new(dir)
    }

    /// Logs go to stderr so command output on stdout stays pipeable.
    pub fn init_tracing(&self) {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(&self.rust_log))
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}
