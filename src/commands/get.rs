use crate::commands::executable::{Context, Executable};
use crate::commands::{expect_args, require_db, CommandError};
use crate::store::unix_now;

/// Returns the value of a key. An absent key and an expired one are the same
/// condition on the wire; the expired record is evicted as a side effect of
/// the read.
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: String,
}

impl Executable for Get {
    fn exec(self, ctx: &mut Context) -> Result<String, CommandError> {
        let db_id = require_db(ctx.session)?;
        let db = ctx.store.database(db_id);

        let mut db = db.lock().unwrap();

        match db.get(&self.key, unix_now()) {
            Some(record) => Ok(record.value.clone()),
            None => Err(CommandError::KeyNotFound),
        }
    }
}

impl TryFrom<Vec<String>> for Get {
    type Error = CommandError;

    fn try_from(args: Vec<String>) -> Result<Self, Self::Error> {
        let [key] = expect_args(args)?;
        Ok(Self { key })
    }
}
