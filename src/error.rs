use thiserror::Error;

/// Failures surfaced after the command line has been accepted.
///
/// Argument errors never reach this type: they are reported by clap
/// before any cluster I/O takes place.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to infer cluster configuration: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("failed to construct cluster client: {0}")]
    Client(#[source] kube::Error),

    #[error("failed to get ingress {namespace}/{name}: {source}")]
    Fetch {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("ingress {namespace}/{name} was modified concurrently, refusing to overwrite: {source}")]
    Conflict {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to update ingress {namespace}/{name}: {source}")]
    Update {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },
}

impl Error {
    /// Whether the failure happened while bootstrapping the client, as
    /// opposed to while talking to the API server.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::InferConfig(_) | Error::Kubeconfig(_) | Error::Client(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
