use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

use crate::store::{unix_now, DbId, Record, Store};

/// Read-only status page: serves a point-in-time HTML view of every
/// database over plain HTTP. No authentication and no write path; it only
/// ever sees a snapshot of the store.
pub async fn run(listener: TcpListener, store: Store) -> crate::Result<()> {
    info!("status page listening on {}", listener.local_addr()?);

    loop {
        let (socket, _) = listener.accept().await?;
        let store = store.clone();

        tokio::spawn(async move {
            if let Err(e) = serve(socket, store).await {
                error!("status request failed: {}", e);
            }
        });
    }
}

async fn serve(mut socket: TcpStream, store: Store) -> crate::Result<()> {
    // The response is the same for every path, so the request is read once
    // and otherwise ignored.
    let mut request = [0u8; 1024];
    let _ = socket.read(&mut request).await?;

    let body = render(&store);
    let response = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{}",
        body.len(),
        body
    );

    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await?;
    Ok(())
}

fn render(store: &Store) -> String {
    let snapshot = store.snapshot(unix_now());

    let mut body = String::from(
        "<!DOCTYPE html>\n<html>\n<head><title>minikv status</title></head>\n<body>\n\
         <h1>Databases</h1>\n",
    );

    if snapshot.is_empty() {
        body.push_str("<p>No databases yet.</p>\n");
    }

    for (id, records) in &snapshot {
        body.push_str(&render_database(*id, records));
    }

    body.push_str("</body>\n</html>\n");
    body
}

fn render_database(id: DbId, records: &[(String, Record)]) -> String {
    let mut section = format!("<h2>Database {}</h2>\n<table>\n", id);
    section.push_str("<tr><th>key</th><th>value</th><th>expires at</th></tr>\n");

    for (key, record) in records {
        let expiry = record
            .expires_at
            .map(|at| at.to_string())
            .unwrap_or_else(|| "never".to_string());

        section.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(key),
            escape(&record.value),
            expiry
        ));
    }

    section.push_str("</table>\n");
    section
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
