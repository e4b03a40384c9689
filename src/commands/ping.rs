use crate::commands::executable::{Context, Executable};
use crate::commands::{expect_args, CommandError};

/// Liveness probe. Takes no arguments, needs no authentication, always
/// answers the literal `PONG`.
#[derive(Debug, PartialEq)]
pub struct Ping;

impl Executable for Ping {
    fn exec(self, _ctx: &mut Context) -> Result<String, CommandError> {
        Ok("PONG".to_string())
    }
}

impl TryFrom<Vec<String>> for Ping {
    type Error = CommandError;

    fn try_from(args: Vec<String>) -> Result<Self, Self::Error> {
        let [] = expect_args::<0>(args)?;
        Ok(Self)
    }
}
