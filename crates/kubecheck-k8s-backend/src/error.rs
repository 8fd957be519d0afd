use kube::config::KubeconfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KubecheckBackendError {
    #[error("kubeconfig is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),
    #[error("{0}")]
    Kubeconfig(#[from] KubeconfigError),
    #[error("{kind} {name:?} is defined more than once")]
    DuplicateName { kind: &'static str, name: String },
}

/// Failure of a single context probe, tagged by the stage that failed.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("creating client config failed: {0}")]
    Config(#[source] KubeconfigError),
    /// Credentials that would run a command or read a file on this host.
    #[error("creating client config failed: {0}")]
    HostAccess(String),
    #[error("creating client failed: {0}")]
    Client(#[source] kube::Error),
    #[error("listing namespaces failed: {0}")]
    ListNamespaces(#[source] kube::Error),
}
