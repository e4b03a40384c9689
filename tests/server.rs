use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use minikv::acl::AclDirectory;
use minikv::commands::opcode;
use minikv::frame::Request;
use minikv::server::{self, ServerContext};
use minikv::status;
use minikv::store::{Record, Store};

const ACL: &str = "alice:secret:0,2 1,1\nbob:hunter2:0,2\n";

async fn spawn_server() -> (SocketAddr, Store) {
    let acl = AclDirectory::from_reader(ACL.as_bytes()).unwrap();
    let store = Store::new();
    let ctx = ServerContext::new(store.clone(), Arc::new(acl));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(server::run(listener, ctx));

    (addr, store)
}

struct Client {
    stream: BufReader<TcpStream>,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Client {
        let stream = TcpStream::connect(addr).await.unwrap();
        Client {
            stream: BufReader::new(stream),
        }
    }

    async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.get_mut().write_all(bytes).await.unwrap();
    }

    /// `None` once the server has closed the connection.
    async fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        if self.stream.read_line(&mut line).await.unwrap() == 0 {
            return None;
        }
        Some(line.trim_end().to_string())
    }

    async fn send(&mut self, op: u8, args: &[&str]) -> String {
        let request = Request::new(op, args.iter().map(|s| s.to_string()).collect());
        self.send_raw(&request.encode().unwrap()).await;
        self.read_line().await.expect("server closed the connection")
    }

    async fn login(&mut self, username: &str, password: &str) {
        assert_eq!(
            self.send(opcode::LOGIN, &[username, password]).await,
            username
        );
    }
}

#[tokio::test]
async fn ping_needs_no_authentication() {
    let (addr, _) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.send(opcode::PING, &[]).await, "PONG");
}

#[tokio::test]
async fn full_session_scenario() {
    let (addr, store) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.send(opcode::LOGIN, &["alice", "secret"]).await, "alice");
    assert_eq!(client.send(opcode::SELECT_DB, &["0"]).await, "0");
    assert!(store.contains_database(0));

    assert_eq!(client.send(opcode::SET, &["foo", "bar"]).await, "bar");
    assert_eq!(client.send(opcode::GET, &["foo"]).await, "bar");
    assert_eq!(client.send(opcode::SET_TTL, &["foo", "0"]).await, "OK");
    assert_eq!(
        client.send(opcode::GET, &["foo"]).await,
        "ERROR: key not exists"
    );
}

#[tokio::test]
async fn authorization_gating_order() {
    let (addr, _) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    // Argument count is validated before anything else.
    assert_eq!(
        client.send(opcode::SET, &["only-key"]).await,
        "ERROR: unexpected amount of arguments"
    );

    // DB-scoped command before LOGIN.
    assert_eq!(
        client.send(opcode::SET, &["k", "v"]).await,
        "ERROR: not authenticated"
    );

    // After LOGIN but before SELECT-DB.
    client.login("alice", "secret").await;
    assert_eq!(
        client.send(opcode::SET, &["k", "v"]).await,
        "ERROR: no db is selected"
    );

    // SELECT-DB without a grant fails but still creates the database.
    assert_eq!(
        client.send(opcode::SELECT_DB, &["7"]).await,
        "ERROR: not authorized"
    );
}

#[tokio::test]
async fn login_failures_and_whoami() {
    let (addr, _) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    assert_eq!(
        client.send(opcode::WHOAMI, &[]).await,
        "ERROR: not authenticated"
    );
    assert_eq!(
        client.send(opcode::LOGIN, &["alice", "wrong"]).await,
        "ERROR: authentication failed"
    );

    client.login("alice", "secret").await;
    assert_eq!(client.send(opcode::WHOAMI, &[]).await, "alice");
}

#[tokio::test]
async fn set_does_not_overwrite() {
    let (addr, _) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.login("alice", "secret").await;
    client.send(opcode::SELECT_DB, &["0"]).await;

    assert_eq!(client.send(opcode::SET, &["k", "a"]).await, "a");
    assert_eq!(
        client.send(opcode::SET, &["k", "b"]).await,
        "ERROR: key already exists"
    );
    assert_eq!(client.send(opcode::GET, &["k"]).await, "a");
}

#[tokio::test]
async fn replace_requires_existence() {
    let (addr, _) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.login("alice", "secret").await;
    client.send(opcode::SELECT_DB, &["0"]).await;

    assert_eq!(
        client.send(opcode::REPLACE, &["k", "x"]).await,
        "ERROR: key not exists"
    );

    client.send(opcode::SET, &["k", "a"]).await;
    assert_eq!(client.send(opcode::REPLACE, &["k", "b"]).await, "b");
    assert_eq!(client.send(opcode::GET, &["k"]).await, "b");
}

#[tokio::test]
async fn unknown_opcode() {
    let (addr, _) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.send(0x7f, &[]).await, "ERROR: invalid command");
}

#[tokio::test]
async fn bad_version_does_not_kill_the_connection() {
    let (addr, _) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.send_raw(&[2, opcode::PING, 0]).await;
    assert_eq!(
        client.read_line().await.unwrap(),
        "ERROR: unsupported protocol version 2"
    );

    // The stream stayed in sync; a valid request still goes through.
    assert_eq!(client.send(opcode::PING, &[]).await, "PONG");
}

#[tokio::test]
async fn pipelined_requests_answered_in_order() {
    let (addr, _) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.login("alice", "secret").await;
    client.send(opcode::SELECT_DB, &["0"]).await;

    let mut bytes = Request::new(opcode::SET, vec!["k".into(), "v".into()])
        .encode()
        .unwrap();
    bytes.extend(Request::new(opcode::GET, vec!["k".into()]).encode().unwrap());
    client.send_raw(&bytes).await;

    assert_eq!(client.read_line().await.unwrap(), "v");
    assert_eq!(client.read_line().await.unwrap(), "v");
}

#[tokio::test]
async fn disconnect_closes_the_socket() {
    let (addr, _) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.send(opcode::DISCONNECT, &[]).await, "OK");
    assert_eq!(client.read_line().await, None);
}

#[tokio::test]
async fn concurrent_set_on_the_same_key_has_one_winner() {
    let (addr, _) = spawn_server().await;

    let mut first = Client::connect(addr).await;
    let mut second = Client::connect(addr).await;

    first.login("alice", "secret").await;
    first.send(opcode::SELECT_DB, &["0"]).await;
    second.login("bob", "hunter2").await;
    second.send(opcode::SELECT_DB, &["0"]).await;

    // Both writes race on the same key; exactly one may win.
    let (r1, r2) = tokio::join!(
        first.send(opcode::SET, &["samekey", "v1"]),
        second.send(opcode::SET, &["samekey", "v2"]),
    );

    let winners: Vec<&str> = [r1.as_str(), r2.as_str()]
        .into_iter()
        .filter(|r| !r.starts_with("ERROR: "))
        .collect();
    assert_eq!(winners.len(), 1, "responses: {r1:?} / {r2:?}");

    let loser = if winners[0] == "v1" { r2.as_str() } else { r1.as_str() };
    assert_eq!(loser, "ERROR: key already exists");

    // The winner's value is the one actually observable.
    assert_eq!(first.send(opcode::GET, &["samekey"]).await, winners[0]);
}

#[tokio::test]
async fn status_page_renders_a_snapshot() {
    let store = Store::new();
    {
        let db = store.database(0);
        let mut db = db.lock().unwrap();
        db.put("greeting".to_string(), Record::new("hello".to_string()));
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(status::run(listener, store));

    let mut socket = TcpStream::connect(addr).await.unwrap();
    socket
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let mut response = String::new();
    socket.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("<h2>Database 0</h2>"));
    assert!(response.contains("<td>greeting</td><td>hello</td><td>never</td>"));
}
