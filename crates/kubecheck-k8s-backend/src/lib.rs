pub mod context;
pub mod error;
pub mod kubeconfig;
pub mod namespaces;
pub mod probe;

pub use context::KubeContext;
pub use error::{KubecheckBackendError, ProbeError};
pub use kubeconfig::{context_names, parse_kubeconfig};
pub use namespaces::list_namespace_names;
pub use probe::{ConnectionResult, ProbeOptions, probe_all, probe_context};
