use crate::acl::AclDirectory;
use crate::commands::CommandError;
use crate::session::Session;
use crate::store::Store;

/// Everything a handler may touch: the shared store, the read-only auth
/// directory, and the session of the connection that issued the command.
pub struct Context<'a> {
    pub store: &'a Store,
    pub acl: &'a AclDirectory,
    pub session: &'a mut Session,
}

pub trait Executable {
    /// Runs the command, producing the single response line for the client.
    fn exec(self, ctx: &mut Context) -> Result<String, CommandError>;
}
