use std::sync::Arc;

use crate::acl::User;
use crate::store::DbId;

/// Per-connection mutable state. Created empty when a connection is
/// accepted, destroyed with it; never shared across connections.
///
/// State machine: `Anonymous -> Authenticated -> Authenticated+DbSelected`.
/// LOGIN (re-)binds the user, SELECT-DB sets the database while
/// authenticated. The only way back to anonymous is connection teardown.
#[derive(Debug, Default)]
pub struct Session {
    user: Option<Arc<User>>,
    db: Option<DbId>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Re-authenticating overwrites the bound user; the selected database
    /// carries over, and every DB-scoped command re-checks authorization
    /// against the new user anyway.
    pub fn bind_user(&mut self, user: Arc<User>) {
        self.user = Some(user);
    }

    pub fn select_db(&mut self, db: DbId) {
        self.db = Some(db);
    }

    pub fn user(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }

    pub fn db(&self) -> Option<DbId> {
        self.db
    }
}
