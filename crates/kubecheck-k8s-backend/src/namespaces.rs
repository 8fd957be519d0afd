use k8s_openapi::api::core::v1::Namespace;

use kube::ResourceExt;
use kube::{
    Client,
    api::{Api, ListParams},
};

/// List namespace names visible to the client.
///
/// `limit` caps the page size requested from the API server, which keeps a reachability check
/// cheap on clusters with many namespaces.
pub async fn list_namespace_names(
    client: Client,
    limit: Option<u32>,
) -> Result<Vec<String>, kube::Error> {
    let ns_api: Api<Namespace> = Api::all(client);

    let mut lp = ListParams::default();
    if let Some(limit) = limit {
        lp = lp.limit(limit);
    }

    let ns_list = ns_api.list(&lp).await?;

    Ok(ns_list.items.iter().map(|ns| ns.name_any()).collect())
}
