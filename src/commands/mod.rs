pub mod disconnect;
pub mod executable;
pub mod get;
pub mod login;
pub mod ping;
pub mod replace;
pub mod select_db;
pub mod set;
pub mod set_ttl;
pub mod whoami;

use std::sync::Arc;

use thiserror::Error as ThisError;

use crate::acl::User;
use crate::commands::executable::{Context, Executable};
use crate::frame::Request;
use crate::session::Session;
use crate::store::DbId;

use disconnect::Disconnect;
use get::Get;
use login::Login;
use ping::Ping;
use replace::Replace;
use select_db::SelectDb;
use set::Set;
use set_ttl::SetTtl;
use whoami::WhoAmI;

pub mod opcode {
    pub const PING: u8 = 0x01;
    pub const SET: u8 = 0x02;
    pub const GET: u8 = 0x03;
    pub const REPLACE: u8 = 0x04;
    pub const SET_TTL: u8 = 0x05;
    pub const SELECT_DB: u8 = 0x40;
    pub const LOGIN: u8 = 0x50;
    pub const WHOAMI: u8 = 0x51;
    pub const DISCONNECT: u8 = 0x99;
}

/// Typed failure of a single command. The connection handler turns the
/// display text into the `ERROR: <message>` response line and keeps reading;
/// no command error is ever fatal to the connection.
#[derive(Debug, ThisError, PartialEq)]
pub enum CommandError {
    #[error("invalid command")]
    UnknownCommand(u8),
    #[error("unexpected amount of arguments")]
    ArgumentCount,
    #[error("not authenticated")]
    Unauthenticated,
    #[error("no db is selected")]
    NoDatabaseSelected,
    #[error("not authorized")]
    Unauthorized,
    #[error("key not exists")]
    KeyNotFound,
    #[error("key already exists")]
    KeyAlreadyExists,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("db id parsing failed")]
    DbIdParseFailed,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Ping(Ping),
    Set(Set),
    Get(Get),
    Replace(Replace),
    SetTtl(SetTtl),
    SelectDb(SelectDb),
    Login(Login),
    WhoAmI(WhoAmI),
    Disconnect(Disconnect),
}

impl Command {
    /// DISCONNECT is the one command the connection handler treats
    /// specially: respond first, then close the socket.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Command::Disconnect(_))
    }
}

impl Executable for Command {
    fn exec(self, ctx: &mut Context) -> Result<String, CommandError> {
        match self {
            Command::Ping(cmd) => cmd.exec(ctx),
            Command::Set(cmd) => cmd.exec(ctx),
            Command::Get(cmd) => cmd.exec(ctx),
            Command::Replace(cmd) => cmd.exec(ctx),
            Command::SetTtl(cmd) => cmd.exec(ctx),
            Command::SelectDb(cmd) => cmd.exec(ctx),
            Command::Login(cmd) => cmd.exec(ctx),
            Command::WhoAmI(cmd) => cmd.exec(ctx),
            Command::Disconnect(cmd) => cmd.exec(ctx),
        }
    }
}

impl TryFrom<Request> for Command {
    type Error = CommandError;

    fn try_from(request: Request) -> Result<Self, Self::Error> {
        let args = request.args;

        match request.opcode {
            opcode::PING => Ping::try_from(args).map(Command::Ping),
            opcode::SET => Set::try_from(args).map(Command::Set),
            opcode::GET => Get::try_from(args).map(Command::Get),
            opcode::REPLACE => Replace::try_from(args).map(Command::Replace),
            opcode::SET_TTL => SetTtl::try_from(args).map(Command::SetTtl),
            opcode::SELECT_DB => SelectDb::try_from(args).map(Command::SelectDb),
            opcode::LOGIN => Login::try_from(args).map(Command::Login),
            opcode::WHOAMI => WhoAmI::try_from(args).map(Command::WhoAmI),
            opcode::DISCONNECT => Disconnect::try_from(args).map(Command::Disconnect),
            other => Err(CommandError::UnknownCommand(other)),
        }
    }
}

/// Exact argument-count check. No command is variadic, and the count is
/// validated before anything else so error precedence stays deterministic.
pub(crate) fn expect_args<const N: usize>(args: Vec<String>) -> Result<[String; N], CommandError> {
    args.try_into().map_err(|_| CommandError::ArgumentCount)
}

/// Auth gate, checked after the argument count.
pub(crate) fn require_user(session: &Session) -> Result<Arc<User>, CommandError> {
    session
        .user()
        .cloned()
        .ok_or(CommandError::Unauthenticated)
}

/// DB gate for DB-scoped commands: a user must be bound, a database must be
/// selected, and the user must still hold a permission entry for it. The
/// permission is re-checked on every command, not only at SELECT-DB time.
pub(crate) fn require_db(session: &Session) -> Result<DbId, CommandError> {
    let user = require_user(session)?;
    let db = session.db().ok_or(CommandError::NoDatabaseSelected)?;

    if user.permission(db).is_none() {
        return Err(CommandError::Unauthorized);
    }

    Ok(db)
}
