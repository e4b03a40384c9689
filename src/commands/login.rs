use crate::commands::executable::{Context, Executable};
use crate::commands::{expect_args, CommandError};

/// Binds a user to the session on an exact username + password match; the
/// success line is the username. Logging in again overwrites the bound user.
#[derive(Debug, PartialEq)]
pub struct Login {
    pub username: String,
    pub password: String,
}

impl Executable for Login {
    fn exec(self, ctx: &mut Context) -> Result<String, CommandError> {
        let user = ctx
            .acl
            .authenticate(&self.username, &self.password)
            .ok_or(CommandError::AuthenticationFailed)?;

        let username = user.username.clone();
        ctx.session.bind_user(user);
        Ok(username)
    }
}

impl TryFrom<Vec<String>> for Login {
    type Error = CommandError;

    fn try_from(args: Vec<String>) -> Result<Self, Self::Error> {
        let [username, password] = expect_args(args)?;
        Ok(Self { username, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::opcode;
    use crate::commands::tests::{exec, test_acl};
    use crate::session::Session;
    use crate::store::Store;

    #[test]
    fn bad_credentials() {
        let store = Store::new();
        let acl = test_acl();
        let mut session = Session::new();

        assert_eq!(
            exec(&store, &acl, &mut session, opcode::LOGIN, &["alice", "wrong"]),
            Err(CommandError::AuthenticationFailed)
        );
        assert!(session.user().is_none());
    }

    #[test]
    fn relogin_overwrites_the_bound_user() {
        let store = Store::new();
        let acl = test_acl();
        let mut session = Session::new();

        exec(&store, &acl, &mut session, opcode::LOGIN, &["alice", "secret"]).unwrap();
        exec(&store, &acl, &mut session, opcode::LOGIN, &["bob", "hunter2"]).unwrap();

        assert_eq!(session.user().unwrap().username, "bob");
    }
}
