use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use minikv::acl::AclDirectory;
use minikv::server::{self, ServerContext};
use minikv::status;
use minikv::store::Store;
use minikv::{Error, DEFAULT_HTTP_PORT, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(name = "minikv-server", version, about = "A minimal key-value server")]
struct Args {
    /// The port to serve the key-value protocol on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// The port to serve the read-only status page on
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT)]
    http_port: u16,

    /// Path to the access-control file
    #[arg(long, default_value = "users.acl")]
    acl: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    // A broken ACL file or an unbindable port aborts startup; the server
    // never accepts connections with a partially loaded directory.
    let acl = AclDirectory::from_path(&args.acl)?;
    info!("loaded {} users from {}", acl.len(), args.acl.display());

    let store = Store::new();
    let ctx = ServerContext::new(store.clone(), Arc::new(acl));

    let listener = TcpListener::bind(("0.0.0.0", args.port)).await?;
    let status_listener = TcpListener::bind(("0.0.0.0", args.http_port)).await?;

    // Either loop failing after startup is a server-level failure worth
    // surfacing, not just the main one.
    tokio::select! {
        res = server::run(listener, ctx) => res,
        res = status::run(status_listener, store) => res,
    }
}
