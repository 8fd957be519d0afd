use std::time::Duration;

use kube::config::Kubeconfig;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::context::KubeContext;
use crate::error::ProbeError;
use crate::kubeconfig::context_names;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of probing one context.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResult {
    pub context_name: String,
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionResult {
    pub fn connected(context_name: impl Into<String>) -> Self {
        Self {
            context_name: context_name.into(),
            connected: true,
            error: None,
        }
    }

    pub fn failed(context_name: impl Into<String>, error: &ProbeError) -> Self {
        Self {
            context_name: context_name.into(),
            connected: false,
            error: Some(error.to_string()),
        }
    }
}

/// Client timeouts applied on top of whatever the kubeconfig itself specifies.
#[derive(Clone, Debug)]
pub struct ProbeOptions {
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }
}

/// Probe a single context. Never fails: every error is folded into the returned result.
pub async fn probe_context(
    kubeconfig: &Kubeconfig,
    context_name: &str,
    options: &ProbeOptions,
) -> ConnectionResult {
    let span = tracing::info_span!("probe", context = %context_name);

    async {
        match try_probe(kubeconfig, context_name, options).await {
            Ok(()) => {
                tracing::info!("Context is reachable.");
                ConnectionResult::connected(context_name)
            }
            Err(e) => {
                tracing::warn!("Context is not reachable: {}", e);
                ConnectionResult::failed(context_name, &e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn try_probe(
    kubeconfig: &Kubeconfig,
    context_name: &str,
    options: &ProbeOptions,
) -> Result<(), ProbeError> {
    let kube_context = KubeContext::init_context(context_name, kubeconfig, options).await?;

    let sample = kube_context.check_namespaces().await?;
    tracing::debug!("Namespace list returned {:?}.", sample);

    Ok(())
}

/// Probe every context of `kubeconfig`, one after another, in file order.
pub async fn probe_all(kubeconfig: &Kubeconfig, options: &ProbeOptions) -> Vec<ConnectionResult> {
    let names = context_names(kubeconfig);
    let mut results: Vec<ConnectionResult> = Vec::with_capacity(names.len());

    for name in &names {
        results.push(probe_context(kubeconfig, name, options).await);
    }

    let connected = results.iter().filter(|r| r.connected).count();
    tracing::info!(
        "Probed {} contexts: {} connected, {} failed.",
        results.len(),
        connected,
        results.len() - connected
    );

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubeconfig::parse_kubeconfig;

    // Nothing listens on port 1 on loopback, so connections are refused immediately.
    const MIXED: &str = r#"
apiVersion: v1
kind: Config
clusters:
- name: closed
  cluster:
    server: http://127.0.0.1:1
- name: garbled
  cluster:
    server: "not a url at all"
users:
- name: anon
  user: {}
contexts:
- name: refused
  context:
    cluster: closed
    user: anon
- name: dangling
  context:
    cluster: missing
    user: anon
- name: bad-url
  context:
    cluster: garbled
    user: anon
"#;

    fn fast_options() -> ProbeOptions {
        ProbeOptions {
            connect_timeout: Some(Duration::from_secs(2)),
            read_timeout: Some(Duration::from_secs(2)),
        }
    }

    #[tokio::test]
    async fn refused_connection_fails_at_list_stage() {
        let kubeconfig = parse_kubeconfig(MIXED.as_bytes()).unwrap();

        let result = probe_context(&kubeconfig, "refused", &fast_options()).await;

        assert_eq!(result.context_name, "refused");
        assert!(!result.connected);
        let error = result.error.unwrap();
        assert!(error.starts_with("listing namespaces failed"), "{error}");
    }

    #[tokio::test]
    async fn missing_cluster_fails_at_config_stage() {
        let kubeconfig = parse_kubeconfig(MIXED.as_bytes()).unwrap();

        let result = probe_context(&kubeconfig, "dangling", &fast_options()).await;

        assert!(!result.connected);
        let error = result.error.unwrap();
        assert!(error.starts_with("creating client config failed"), "{error}");
    }

    #[tokio::test]
    async fn unparseable_server_fails_at_config_stage() {
        let kubeconfig = parse_kubeconfig(MIXED.as_bytes()).unwrap();

        let result = probe_context(&kubeconfig, "bad-url", &fast_options()).await;

        assert!(!result.connected);
        let error = result.error.unwrap();
        assert!(error.starts_with("creating client config failed"), "{error}");
    }

    #[tokio::test]
    async fn unknown_context_fails_at_config_stage() {
        let kubeconfig = parse_kubeconfig(MIXED.as_bytes()).unwrap();

        let result = probe_context(&kubeconfig, "nope", &fast_options()).await;

        assert!(!result.connected);
        assert!(result.error.unwrap().starts_with("creating client config failed"));
    }

    #[tokio::test]
    async fn probe_all_reports_every_context_in_order() {
        let kubeconfig = parse_kubeconfig(MIXED.as_bytes()).unwrap();

        let results = probe_all(&kubeconfig, &fast_options()).await;

        let names: Vec<&str> = results.iter().map(|r| r.context_name.as_str()).collect();
        assert_eq!(names, vec!["refused", "dangling", "bad-url"]);
        assert!(results.iter().all(|r| !r.connected));
        assert!(
            results
                .iter()
                .all(|r| r.error.as_deref().is_some_and(|e| !e.is_empty()))
        );
    }

    #[tokio::test]
    async fn probe_all_without_contexts_is_empty() {
        let kubeconfig = parse_kubeconfig(b"apiVersion: v1\nkind: Config\n").unwrap();

        assert!(probe_all(&kubeconfig, &fast_options()).await.is_empty());
    }

    #[tokio::test]
    async fn exec_credentials_are_never_run() {
        let marker = std::env::temp_dir().join(format!("kubecheck-exec-{}", std::process::id()));
        let _ = std::fs::remove_file(&marker);
        let kubeconfig = format!(
            r#"
clusters:
- name: closed
  cluster:
    server: http://127.0.0.1:1
users:
- name: plugin
  user:
    exec:
      apiVersion: client.authentication.k8s.io/v1beta1
      command: sh
      args: ["-c", "touch {}"]
contexts:
- name: exec
  context:
    cluster: closed
    user: plugin
"#,
            marker.display()
        );
        let kubeconfig = parse_kubeconfig(kubeconfig.as_bytes()).unwrap();

        let result = probe_context(&kubeconfig, "exec", &fast_options()).await;

        assert!(!result.connected);
        let error = result.error.unwrap();
        assert!(error.starts_with("creating client config failed"), "{error}");
        assert!(error.contains("exec credential plugins"), "{error}");
        assert!(!marker.exists());
    }

    #[test]
    fn successful_result_omits_error() {
        let value = serde_json::to_value(ConnectionResult::connected("prod")).unwrap();

        assert_eq!(
            value,
            serde_json::json!({ "contextName": "prod", "connected": true })
        );
    }

    #[test]
    fn failed_result_carries_stage_message() {
        let err =
            ProbeError::HostAccess("user \"ci\": tokenFile is not accepted; use token".into());
        let value = serde_json::to_value(ConnectionResult::failed("dev", &err)).unwrap();

        assert_eq!(value["contextName"], "dev");
        assert_eq!(value["connected"], false);
        assert_eq!(
            value["error"],
            "creating client config failed: user \"ci\": tokenFile is not accepted; use token"
        );
    }
}
