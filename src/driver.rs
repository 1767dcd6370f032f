use std::{ffi::OsString, future::Future};

use tracing::info;

use crate::{
    cli::{Config, Operation},
    cluster::ClusterOptions,
    editor::RuleEditor,
    error::Result,
    status::Status,
    store::IngressStore,
};

/// Parses `argv`, connects and applies the requested edit.
///
/// `connect` is only invoked once the arguments have been accepted, so
/// invalid input never touches the cluster.
pub async fn execute<I, T, F, Fut, S>(argv: I, connect: F) -> Status
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: FnOnce(ClusterOptions) -> Fut,
    Fut: Future<Output = Result<(S, String)>>,
    S: IngressStore,
{
    let config = match Config::try_parse_from(argv) {
        Ok(config) => config,
        Err(error) => {
            // Help and version requests end up here too.
            let status = if error.use_stderr() {
                Status::InvalidArguments
            } else {
                Status::Success
            };
            error.print().ok();
            return status;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(config.log_level)
        .try_init();

    run(&config, connect).await
}

pub async fn run<F, Fut, S>(config: &Config, connect: F) -> Status
where
    F: FnOnce(ClusterOptions) -> Fut,
    Fut: Future<Output = Result<(S, String)>>,
    S: IngressStore,
{
    let outcome = match connect(config.cluster.clone()).await {
        Ok((store, namespace)) => apply(&store, &namespace, config).await,
        Err(error) => Err(error),
    };

    match outcome {
        Ok(true) => Status::Success,
        Ok(false) => Status::Neutral,
        Err(error) => {
            eprintln!("error: {error}");
            Status::from(&error)
        }
    }
}

/// Returns whether the ingress was changed.
async fn apply<S: IngressStore>(store: &S, namespace: &str, config: &Config) -> Result<bool> {
    let mut editor = RuleEditor::fetch(store, namespace, &config.ingress)
        .await?
        .check_conflicts(config.check_conflicts);

    let ingress = format!("{namespace}/{}", config.ingress);
    match &config.operation {
        Operation::Add(rule) => {
            let added = editor.add(rule.clone()).await?;
            if added {
                info!(
                    "routed {} to {}:{} on ingress {ingress}",
                    rule.host, rule.service, rule.port
                );
            } else {
                info!("{} is already routed by ingress {ingress}, nothing to do", rule.host);
            }
            Ok(added)
        }
        Operation::Remove { host } => {
            let found = editor.remove(host).await?;
            if found {
                info!("removed {host} from ingress {ingress}");
            } else {
                info!("{host} is not routed by ingress {ingress}, nothing to do");
            }
            Ok(found)
        }
    }
}
