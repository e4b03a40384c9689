use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument, warn};

use crate::acl::AclDirectory;
use crate::commands::executable::{Context, Executable};
use crate::commands::Command;
use crate::connection::{self, Connection};
use crate::session::Session;
use crate::store::Store;

/// Everything the connection handlers share, constructed once at startup.
/// The store carries its own synchronization; the ACL directory is
/// read-only after construction and needs none.
#[derive(Clone)]
pub struct ServerContext {
    pub store: Store,
    pub acl: Arc<AclDirectory>,
}

impl ServerContext {
    pub fn new(store: Store, acl: Arc<AclDirectory>) -> ServerContext {
        ServerContext { store, acl }
    }
}

/// Accept loop: one task per connection, commands within a connection run
/// strictly in arrival order. A handler failure never touches the listener
/// or any other connection.
pub async fn run(listener: TcpListener, ctx: ServerContext) -> crate::Result<()> {
    info!("kv server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let ctx = ctx.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, ctx).await {
                error!("connection error: {}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, ctx),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    ctx: ServerContext,
) -> crate::Result<()> {
    let mut conn = Connection::new(stream);
    let mut session = Session::new();

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    loop {
        let request = match conn.read_frame().await {
            Ok(Some(request)) => request,
            Ok(None) => break,
            // Malformed frames are answered, not fatal; the codec already
            // resynchronized the stream.
            Err(connection::Error::Frame(e)) => {
                warn!("dropping malformed frame: {}", e);
                conn.write_line(&format!("ERROR: {}", e)).await?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        debug!("received frame: {:?}", request);

        let command = match Command::try_from(request) {
            Ok(command) => command,
            Err(e) => {
                conn.write_line(&format!("ERROR: {}", e)).await?;
                continue;
            }
        };

        let disconnecting = command.is_disconnect();

        let line = match command.exec(&mut Context {
            store: &ctx.store,
            acl: &ctx.acl,
            session: &mut session,
        }) {
            Ok(line) => line,
            Err(e) => format!("ERROR: {}", e),
        };

        debug!("sending response: {:?}", line);
        conn.write_line(&line).await?;

        if disconnecting {
            break;
        }
    }

    info!("connection closed");
    Ok(())
}
