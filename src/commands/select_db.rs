use crate::commands::executable::{Context, Executable};
use crate::commands::{expect_args, require_user, CommandError};
use crate::store::DbId;

/// Selects the session's working database. An unknown id is created on the
/// spot, then the authenticated user must hold a permission entry for it;
/// creation happens either way, access does not. The success line echoes the
/// id in decimal.
#[derive(Debug, PartialEq)]
pub struct SelectDb {
    pub id: String,
}

impl Executable for SelectDb {
    fn exec(self, ctx: &mut Context) -> Result<String, CommandError> {
        let user = require_user(ctx.session)?;

        let id: DbId = self
            .id
            .parse()
            .map_err(|_| CommandError::DbIdParseFailed)?;

        ctx.store.database(id);

        if user.permission(id).is_none() {
            return Err(CommandError::Unauthorized);
        }

        ctx.session.select_db(id);
        Ok(id.to_string())
    }
}

impl TryFrom<Vec<String>> for SelectDb {
    type Error = CommandError;

    fn try_from(args: Vec<String>) -> Result<Self, Self::Error> {
        let [id] = expect_args(args)?;
        Ok(Self { id })
    }
}
