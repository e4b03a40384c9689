use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Logical database identifier. The wire protocol encodes it as decimal text,
/// parsed as a signed 8-bit integer.
pub type DbId = i8;

/// Current Unix time in seconds; the reference point for every expiry check.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// A stored value plus its absolute expiry. `expires_at: None` means the
/// record never expires.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub value: String,
    pub expires_at: Option<i64>,
}

impl Record {
    pub fn new(value: String) -> Record {
        Record {
            value,
            expires_at: None,
        }
    }

    /// A record whose expiry has been reached is logically absent. Equality
    /// counts as expired so a zero TTL kills the key immediately.
    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(at) if now >= at)
    }
}

/// One logical database: a key-to-record mapping. Callers lock the owning
/// mutex for the whole of a read-modify-write sequence, so every method here
/// runs inside a single critical section.
#[derive(Debug, Default)]
pub struct Database {
    records: HashMap<String, Record>,
}

impl Database {
    /// Looks a key up, lazily evicting it when its expiry has passed. There
    /// is no background sweep; this is the only place memory is reclaimed.
    pub fn get(&mut self, key: &str, now: i64) -> Option<&Record> {
        if self.records.get(key).is_some_and(|r| r.is_expired(now)) {
            self.remove(key);
            return None;
        }
        self.records.get(key)
    }

    pub fn exists(&mut self, key: &str, now: i64) -> bool {
        self.get(key, now).is_some()
    }

    pub fn put(&mut self, key: String, record: Record) {
        self.records.insert(key, record);
    }

    /// Overwrites the value of an existing record, preserving its expiry.
    /// Returns `false` when the key is absent or already expired.
    pub fn replace(&mut self, key: &str, value: String, now: i64) -> bool {
        if self.get(key, now).is_none() {
            return false;
        }
        if let Some(record) = self.records.get_mut(key) {
            record.value = value;
        }
        true
    }

    /// Re-arms the expiry of an existing record to an absolute timestamp.
    /// Returns `false` when the key is absent or already expired.
    pub fn set_expiry(&mut self, key: &str, at: i64, now: i64) -> bool {
        if self.get(key, now).is_none() {
            return false;
        }
        if let Some(record) = self.records.get_mut(key) {
            record.expires_at = Some(at);
        }
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<Record> {
        self.records.remove(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Live records only; dead-but-unswept records are skipped without being
    /// evicted, since this takes `&self` (used by the status snapshot).
    pub fn entries(&self, now: i64) -> impl Iterator<Item = (&String, &Record)> {
        self.records
            .iter()
            .filter(move |(_, record)| !record.is_expired(now))
    }
}

/// The single piece of global mutable state: database id to database. Shared
/// by every connection task and the status page; cheap to clone. The outer
/// lock only guards the map of databases, each database carries its own
/// mutex so unrelated databases never serialize on each other.
#[derive(Clone, Default)]
pub struct Store {
    databases: Arc<RwLock<HashMap<DbId, Arc<Mutex<Database>>>>>,
}

impl Store {
    pub fn new() -> Store {
        Store::default()
    }

    /// Idempotent ensure-database: returns the handle, creating the database
    /// on first use. Databases are never destroyed.
    pub fn database(&self, id: DbId) -> Arc<Mutex<Database>> {
        if let Some(db) = self.databases.read().unwrap().get(&id) {
            return db.clone();
        }

        let mut databases = self.databases.write().unwrap();
        databases.entry(id).or_default().clone()
    }

    pub fn contains_database(&self, id: DbId) -> bool {
        self.databases.read().unwrap().contains_key(&id)
    }

    /// Clones a point-in-time view of every database's live records, ordered
    /// by database id. Read-only: expired records are skipped, not evicted.
    pub fn snapshot(&self, now: i64) -> BTreeMap<DbId, Vec<(String, Record)>> {
        let databases = self.databases.read().unwrap();

        databases
            .iter()
            .map(|(id, db)| {
                let db = db.lock().unwrap();
                let mut records: Vec<(String, Record)> = db
                    .entries(now)
                    .map(|(key, record)| (key.clone(), record.clone()))
                    .collect();
                records.sort_by(|a, b| a.0.cmp(&b.0));
                (*id, records)
            })
            .collect()
    }
}
