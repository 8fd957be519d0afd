use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use crate::error::ProbeError;
use crate::namespaces::list_namespace_names;
use crate::probe::ProbeOptions;

/// A single kubeconfig context with a client bound to it.
#[derive(Clone)]
pub struct KubeContext {
    pub name: String,
    pub client: Client,
}

impl KubeContext {
    pub async fn init_context(
        name: impl Into<String>,
        kubeconfig: &Kubeconfig,
        options: &ProbeOptions,
    ) -> Result<Self, ProbeError> {
        let name = name.into();
        let client = get_client(kubeconfig, &name, options).await?;

        Ok(Self { name, client })
    }

    /// Issue the cheapest read the API server offers: one page of at most one namespace.
    pub async fn check_namespaces(&self) -> Result<Vec<String>, ProbeError> {
        list_namespace_names(self.client.clone(), Some(1))
            .await
            .map_err(ProbeError::ListNamespaces)
    }
}

// Build a client from the uploaded kubeconfig with `context` selected in place of the file's
// current-context.
async fn get_client(
    kubeconfig: &Kubeconfig,
    context: &str,
    options: &ProbeOptions,
) -> Result<Client, ProbeError> {
    reject_host_access(kubeconfig, context)?;

    let kube_options = KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };

    let mut config = Config::from_custom_kubeconfig(kubeconfig.clone(), &kube_options)
        .await
        .map_err(ProbeError::Config)?;

    if options.connect_timeout.is_some() {
        config.connect_timeout = options.connect_timeout;
    }
    if options.read_timeout.is_some() {
        config.read_timeout = options.read_timeout;
    }

    Client::try_from(config).map_err(ProbeError::Client)
}

/// Refuse credentials that would act on the host running kubecheck: commands (`exec`,
/// `auth-provider`) and paths to local files. Only inline credentials are accepted.
///
/// Contexts, clusters or users that cannot be resolved are left for the config loader to report.
fn reject_host_access(kubeconfig: &Kubeconfig, context: &str) -> Result<(), ProbeError> {
    let Some(ctx) = kubeconfig
        .contexts
        .iter()
        .find(|c| c.name == context)
        .and_then(|c| c.context.as_ref())
    else {
        return Ok(());
    };

    let cluster = kubeconfig
        .clusters
        .iter()
        .find(|c| c.name == ctx.cluster)
        .and_then(|c| c.cluster.as_ref());
    if let Some(cluster) = cluster {
        if cluster.certificate_authority.is_some() {
            return Err(ProbeError::HostAccess(format!(
                "cluster {:?} points at a certificate-authority file; use certificate-authority-data",
                ctx.cluster
            )));
        }
    }

    let Some(user_name) = ctx.user.as_ref() else {
        return Ok(());
    };
    let Some(user) = kubeconfig
        .auth_infos
        .iter()
        .find(|u| &u.name == user_name)
        .and_then(|u| u.auth_info.as_ref())
    else {
        return Ok(());
    };

    let refused = if user.exec.is_some() {
        Some("exec credential plugins are not accepted")
    } else if user.auth_provider.is_some() {
        Some("auth-provider credentials are not accepted")
    } else if user.token_file.is_some() {
        Some("tokenFile is not accepted; use token")
    } else if user.client_certificate.is_some() || user.client_key.is_some() {
        Some("client-certificate/client-key files are not accepted; use the -data fields")
    } else {
        None
    };

    match refused {
        Some(reason) => Err(ProbeError::HostAccess(format!(
            "user {:?}: {}",
            user_name, reason
        ))),
        None => Ok(()),
    }
}
