use std::ffi::OsString;

use clap::{builder::NonEmptyStringValueParser, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    cluster::ClusterOptions,
    rules::{HostRule, DEFAULT_PATH, DEFAULT_PATH_TYPE},
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Namespace of the ingress. Defaults to the namespace of the current
    /// kubeconfig context, or `default`.
    #[arg(long, global = true, value_name = "NAMESPACE")]
    pub namespace: Option<String>,

    /// Kubeconfig context to use instead of the current one.
    #[arg(long, global = true, value_name = "CONTEXT")]
    pub context: Option<String>,

    /// Send the fetched resource version along with the update, so the API
    /// server refuses to overwrite changes made since the ingress was read.
    #[arg(long, global = true)]
    pub check_conflicts: bool,

    #[arg(long, global = true, default_value_t = LevelFilter::INFO)]
    pub log_level: LevelFilter,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Route a host to a service, unless the host is already routed.
    Add {
        /// Name of the ingress to edit.
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        ingress: String,

        /// Host to route.
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        host: String,

        /// Name of the backend service.
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        service: String,

        /// Port number of the backend service.
        #[arg(long, value_parser = clap::value_parser!(i32).range(1..=65535))]
        port: i32,

        /// Path pattern matched against incoming requests.
        #[arg(
            long,
            default_value = DEFAULT_PATH,
            value_parser = NonEmptyStringValueParser::new(),
        )]
        path: String,

        #[arg(
            long,
            default_value = DEFAULT_PATH_TYPE,
            value_parser = ["Exact", "Prefix", "ImplementationSpecific"],
        )]
        path_type: String,
    },

    /// Drop the rule routing a host, if there is one.
    Remove {
        /// Name of the ingress to edit.
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        ingress: String,

        /// Host whose rule is removed.
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        host: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add(HostRule),
    Remove { host: String },
}

/// Everything a single run needs, resolved from the command line once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cluster: ClusterOptions,
    pub ingress: String,
    pub operation: Operation,
    pub check_conflicts: bool,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn try_parse_from<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Args::try_parse_from(argv).map(Config::from)
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let (ingress, operation) = match args.command {
            Command::Add {
                ingress,
                host,
                service,
                port,
                path,
                path_type,
            } => (
                ingress,
                Operation::Add(
                    HostRule::new(host, service, port)
                        .with_path(path)
                        .with_path_type(path_type),
                ),
            ),
            Command::Remove { ingress, host } => (ingress, Operation::Remove { host }),
        };

        Config {
            cluster: ClusterOptions {
                namespace: args.namespace,
                context: args.context,
            },
            ingress,
            operation,
            check_conflicts: args.check_conflicts,
            log_level: args.log_level,
        }
    }
}
