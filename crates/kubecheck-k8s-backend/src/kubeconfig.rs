use std::collections::HashSet;

use kube::config::Kubeconfig;

use crate::error::KubecheckBackendError;

/// Parse an uploaded kubeconfig.
///
/// The bytes must be UTF-8 YAML (or JSON). Multiple YAML documents are merged the same way
/// `kubectl` merges several files named in `KUBECONFIG`.
pub fn parse_kubeconfig(data: &[u8]) -> Result<Kubeconfig, KubecheckBackendError> {
    let text = std::str::from_utf8(data)?;
    let kubeconfig = Kubeconfig::from_yaml(text)?;

    reject_duplicates("context", kubeconfig.contexts.iter().map(|c| &c.name))?;
    reject_duplicates("cluster", kubeconfig.clusters.iter().map(|c| &c.name))?;
    reject_duplicates("user", kubeconfig.auth_infos.iter().map(|u| &u.name))?;

    tracing::debug!(
        "Parsed kubeconfig with {} contexts, {} clusters, {} users.",
        kubeconfig.contexts.len(),
        kubeconfig.clusters.len(),
        kubeconfig.auth_infos.len()
    );

    Ok(kubeconfig)
}

// Names are keys: a repeated name within one document makes the file ambiguous. Documents merged
// by `Kubeconfig::from_yaml` already keep only the first definition of each name.
fn reject_duplicates<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a String>,
) -> Result<(), KubecheckBackendError> {
    let mut seen = HashSet::new();

    for name in names {
        if !seen.insert(name) {
            return Err(KubecheckBackendError::DuplicateName {
                kind,
                name: name.clone(),
            });
        }
    }

    Ok(())
}

/// Context names in file order.
pub fn context_names(kubeconfig: &Kubeconfig) -> Vec<String> {
    kubeconfig
        .contexts
        .iter()
        .map(|ctx| ctx.name.clone())
        .collect()
}
