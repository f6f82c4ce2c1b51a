//! shardsortd — distributed sort node daemon.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use shardsortd::{run_node, NodeOptions};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 5 {
        bail!("usage: shardsortd <server-id> <input-file> <output-file> <cluster-config>");
    }
    let server_id: u32 = args[1]
        .parse()
        .with_context(|| format!("server id must be an integer, got {:?}", args[1]))?;

    run_node(NodeOptions {
        server_id,
        input: PathBuf::from(&args[2]),
        output: PathBuf::from(&args[3]),
        cluster: PathBuf::from(&args[4]),
    })
    .await
}
