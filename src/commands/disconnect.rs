use crate::commands::executable::{Context, Executable};
use crate::commands::{expect_args, CommandError};

/// Orderly shutdown of the connection. The handler acknowledges with `OK`
/// and then closes the socket; valid from any session state.
#[derive(Debug, PartialEq)]
pub struct Disconnect;

impl Executable for Disconnect {
    fn exec(self, _ctx: &mut Context) -> Result<String, CommandError> {
        Ok("OK".to_string())
    }
}

impl TryFrom<Vec<String>> for Disconnect {
    type Error = CommandError;

    fn try_from(args: Vec<String>) -> Result<Self, Self::Error> {
        let [] = expect_args::<0>(args)?;
        Ok(Self)
    }
}
