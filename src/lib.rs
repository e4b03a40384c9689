pub mod acl;
pub mod codec;
pub mod commands;
pub mod connection;
pub mod frame;
pub mod server;
pub mod session;
pub mod status;
pub mod store;

pub const DEFAULT_PORT: u16 = 1234;
pub const DEFAULT_HTTP_PORT: u16 = 8080;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
