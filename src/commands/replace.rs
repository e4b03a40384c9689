use crate::commands::executable::{Context, Executable};
use crate::commands::{expect_args, require_db, CommandError};
use crate::store::unix_now;

/// Overwrites the value of an existing key, preserving its current expiry.
/// Unlike SET it requires prior existence; a missing or expired key fails
/// with `key not exists`.
#[derive(Debug, PartialEq)]
pub struct Replace {
    pub key: String,
    pub value: String,
}

impl Executable for Replace {
    fn exec(self, ctx: &mut Context) -> Result<String, CommandError> {
        let db_id = require_db(ctx.session)?;
        let db = ctx.store.database(db_id);

        let mut db = db.lock().unwrap();

        if !db.replace(&self.key, self.value.clone(), unix_now()) {
            return Err(CommandError::KeyNotFound);
        }

        Ok(self.value)
    }
}

impl TryFrom<Vec<String>> for Replace {
    type Error = CommandError;

    fn try_from(args: Vec<String>) -> Result<Self, Self::Error> {
        let [key, value] = expect_args(args)?;
        Ok(Self { key, value })
    }
}
