use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error as ThisError;

use crate::store::DbId;

/// Per-database grant a user holds. Wire/file encoding: `1` read, `2`
/// read-write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Read = 1,
    ReadWrite = 2,
}

impl TryFrom<u8> for Permission {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Permission::Read),
            2 => Ok(Permission::ReadWrite),
            other => Err(Error::InvalidPermission(other.to_string())),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("acl line {0}: expected `username:password:dbid,perm ...`")]
    MalformedLine(usize),
    #[error("acl line {0}: malformed permission entry `{1}`")]
    MalformedGrant(usize, String),
    #[error("invalid db id: {0}")]
    InvalidDbId(String),
    #[error("invalid permission level: {0}")]
    InvalidPermission(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct User {
    pub username: String,
    password: String,
    permissions: HashMap<DbId, Permission>,
}

impl User {
    pub fn permission(&self, db: DbId) -> Option<Permission> {
        self.permissions.get(&db).copied()
    }
}

/// Read-only username directory, built once before the server starts
/// accepting connections. Needs no locking afterwards.
#[derive(Debug, Default)]
pub struct AclDirectory {
    users: HashMap<String, Arc<User>>,
}

impl AclDirectory {
    pub fn from_path(path: impl AsRef<Path>) -> Result<AclDirectory, Error> {
        let file = File::open(path)?;
        AclDirectory::from_reader(BufReader::new(file))
    }

    /// Parses the line-oriented access-control source. Each line has the
    /// shape `username:password:dbid,perm dbid,perm ...`; blank lines and
    /// `#` comments are skipped. Any malformed entry fails the whole load,
    /// so the server never starts with a partial directory.
    pub fn from_reader(reader: impl BufRead) -> Result<AclDirectory, Error> {
        let mut users = HashMap::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed.splitn(3, ':');
            let username = fields.next().filter(|s| !s.is_empty());
            let password = fields.next();
            let grants = fields.next();

            let (username, password, grants) = match (username, password, grants) {
                (Some(u), Some(p), Some(g)) => (u, p, g),
                _ => return Err(Error::MalformedLine(line_no)),
            };

            // A user entry must carry at least one grant.
            if grants.trim().is_empty() {
                return Err(Error::MalformedLine(line_no));
            }

            let mut permissions = HashMap::new();
            for grant in grants.split_whitespace() {
                let (db, perm) = grant
                    .split_once(',')
                    .ok_or_else(|| Error::MalformedGrant(line_no, grant.to_string()))?;

                let db: DbId = db
                    .parse()
                    .map_err(|_| Error::InvalidDbId(db.to_string()))?;
                let perm: u8 = perm
                    .parse()
                    .map_err(|_| Error::InvalidPermission(perm.to_string()))?;

                permissions.insert(db, Permission::try_from(perm)?);
            }

            users.insert(
                username.to_string(),
                Arc::new(User {
                    username: username.to_string(),
                    password: password.to_string(),
                    permissions,
                }),
            );
        }

        Ok(AclDirectory { users })
    }

    /// Exact username + password match; anything else is a failure the
    /// caller reports as `authentication failed`.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Arc<User>> {
        self.users
            .get(username)
            .filter(|user| user.password == password)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
