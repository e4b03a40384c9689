use crate::commands::executable::{Context, Executable};
use crate::commands::{expect_args, require_db, CommandError};
use crate::store::{unix_now, Record};

/// Creates a key with the given value and no expiry. SET never overwrites:
/// a present key fails with `key already exists`. The stored value is echoed
/// back so the client can confirm the assignment.
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: String,
}

impl Executable for Set {
    fn exec(self, ctx: &mut Context) -> Result<String, CommandError> {
        let db_id = require_db(ctx.session)?;
        let db = ctx.store.database(db_id);

        // Check-then-insert under one guard so two connections cannot both
        // win the same key.
        let mut db = db.lock().unwrap();
        let now = unix_now();

        if db.exists(&self.key, now) {
            return Err(CommandError::KeyAlreadyExists);
        }

        db.put(self.key, Record::new(self.value.clone()));
        Ok(self.value)
    }
}

impl TryFrom<Vec<String>> for Set {
    type Error = CommandError;

    fn try_from(args: Vec<String>) -> Result<Self, Self::Error> {
        let [key, value] = expect_args(args)?;
        Ok(Self { key, value })
    }
}
