use std::process::ExitCode;

use ingress_rules_editor::{cluster, driver};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    driver::execute(std::env::args_os(), cluster::connect)
        .await
        .into()
}
