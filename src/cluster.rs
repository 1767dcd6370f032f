//! Cluster client bootstrap from ambient credentials.

use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use tracing::debug;

use crate::error::{Error, Result};

/// Where to find the cluster, as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterOptions {
    pub namespace: Option<String>,
    pub context: Option<String>,
}

/// Loads cluster credentials and resolves the namespace to operate in.
///
/// Without an explicit context the usual inference applies: the kubeconfig
/// (`$KUBECONFIG` or `~/.kube/config`) first, then the in-cluster service
/// account. The explicit namespace wins over the one the config carries.
pub async fn connect(options: ClusterOptions) -> Result<(Client, String)> {
    let config = match options.context {
        Some(context) => {
            debug!("using kubeconfig context {context}");
            let kubeconfig = Kubeconfig::read()?;
            Config::from_custom_kubeconfig(
                kubeconfig,
                &KubeConfigOptions {
                    context: Some(context),
                    ..KubeConfigOptions::default()
                },
            )
            .await?
        }
        None => Config::infer().await?,
    };

    let namespace = effective_namespace(options.namespace.as_deref(), &config);
    debug!(
        "connecting to {} in namespace {namespace}",
        config.cluster_url
    );

    let client = Client::try_from(config).map_err(Error::Client)?;
    Ok((client, namespace))
}

fn effective_namespace(explicit: Option<&str>, config: &Config) -> String {
    match explicit {
        Some(namespace) if !namespace.is_empty() => namespace.to_string(),
        _ => config.default_namespace.clone(),
    }
}
