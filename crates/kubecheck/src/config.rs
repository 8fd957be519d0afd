use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;
use clap::Parser;

use kubecheck_k8s_backend::ProbeOptions;

#[derive(Parser, Debug, Clone)]
#[command(name = "kubecheck", version, about = "Check which contexts of a kubeconfig can reach their cluster")]
pub struct Args {
    /// Address the HTTP server listens on.
    #[arg(long, env = "KUBECHECK_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Browser origin allowed to call the API (CORS).
    #[arg(long, env = "KUBECHECK_ALLOWED_ORIGIN", default_value = "http://localhost:5173")]
    pub allowed_origin: String,

    /// Seconds to wait for a TCP/TLS connection to each cluster. 0 keeps the client default.
    #[arg(long, env = "KUBECHECK_CONNECT_TIMEOUT", default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Seconds to wait for the namespace list response. 0 keeps the client default.
    #[arg(long, env = "KUBECHECK_READ_TIMEOUT", default_value_t = 30)]
    pub read_timeout_secs: u64,

    /// Write logs to this file instead of stdout.
    #[arg(long, env = "KUBECHECK_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            connect_timeout: seconds(self.connect_timeout_secs),
            read_timeout: seconds(self.read_timeout_secs),
        }
    }

    pub fn allowed_origin(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.allowed_origin)
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
