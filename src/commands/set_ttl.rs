use crate::commands::executable::{Context, Executable};
use crate::commands::{expect_args, require_db, CommandError};
use crate::store::unix_now;

/// Re-arms a key's expiry to `now + seconds`. Seconds must be a
/// non-negative integer; zero makes the key expire immediately.
#[derive(Debug, PartialEq)]
pub struct SetTtl {
    pub key: String,
    pub seconds: String,
}

impl Executable for SetTtl {
    fn exec(self, ctx: &mut Context) -> Result<String, CommandError> {
        let db_id = require_db(ctx.session)?;

        let seconds: i64 = self
            .seconds
            .parse()
            .map_err(|_| CommandError::InvalidArgument)?;
        if seconds < 0 {
            return Err(CommandError::InvalidArgument);
        }

        let db = ctx.store.database(db_id);
        let mut db = db.lock().unwrap();
        let now = unix_now();

        // Saturate: a huge TTL means "effectively never", not an overflow.
        if !db.set_expiry(&self.key, now.saturating_add(seconds), now) {
            return Err(CommandError::KeyNotFound);
        }

        Ok("OK".to_string())
    }
}

impl TryFrom<Vec<String>> for SetTtl {
    type Error = CommandError;

    fn try_from(args: Vec<String>) -> Result<Self, Self::Error> {
        let [key, seconds] = expect_args(args)?;
        Ok(Self { key, seconds })
    }
}
