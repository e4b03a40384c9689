use crate::commands::executable::{Context, Executable};
use crate::commands::{expect_args, require_user, CommandError};

/// Identity query: returns the authenticated user's username.
#[derive(Debug, PartialEq)]
pub struct WhoAmI;

impl Executable for WhoAmI {
    fn exec(self, ctx: &mut Context) -> Result<String, CommandError> {
        let user = require_user(ctx.session)?;
        Ok(user.username.clone())
    }
}

impl TryFrom<Vec<String>> for WhoAmI {
    type Error = CommandError;

    fn try_from(args: Vec<String>) -> Result<Self, Self::Error> {
        let [] = expect_args::<0>(args)?;
        Ok(Self)
    }
}
