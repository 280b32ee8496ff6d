use std::env;
use std::process::ExitCode;

use skelhrw_core::Settings;
use tracing::{Level, error, info};

const USAGE: &str = "usage: skelhrw <node,node,...> <key>...";

/// Builds a skeleton from the `SKELHRW_*` environment, registers the
/// comma-separated nodes given as the first argument and prints the owner of
/// every remaining argument.
///
/// # Examples
///
/// ```text
/// $ SKELHRW_CLUSTER_SIZE=3 skelhrw cache-1,cache-2,cache-3,cache-4 user:1 user:2
/// user:1 -> <owner of user:1>
/// user:2 -> <owner of user:2>
/// ```
fn main() -> ExitCode {
    let level = env::var("RUST_LOG").ok().and_then(|v| v.parse::<Level>().ok()).unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_target(false).with_max_level(level).init();

    let mut args = env::args().skip(1);
    let Some(nodes) = args.next() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut skeleton = match settings.build() {
        Ok(skeleton) => skeleton,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    skeleton.set_nodes(nodes.split(',').map(str::trim).filter(|n| !n.is_empty()));
    info!(
        nodes = skeleton.nodes().len(),
        clusters = skeleton.cluster_count(),
        depth = skeleton.depth(),
        hash = %settings.hash,
        "skeleton ready"
    );

    let mut status = ExitCode::SUCCESS;
    for key in args {
        match skeleton.find_node(&key) {
            Ok(node) => println!("{} -> {}", key, node),
            Err(e) => {
                error!("{}: {}", key, e);
                status = ExitCode::FAILURE;
            }
        }
    }

    status
}
