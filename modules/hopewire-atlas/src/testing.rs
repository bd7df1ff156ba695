// In-memory taxonomy stores for resolver and pipeline tests.
// Conditional-insert semantics match the Postgres implementations:
// "already exists" is success, never an error.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use hopewire_common::{Category, Location};

use crate::resolver::{CategoryStore, LocationStore};

pub struct MemoryLocationStore {
    rows: Mutex<HashMap<u32, Location>>,
    insert_attempts: AtomicU64,
}

impl MemoryLocationStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            insert_attempts: AtomicU64::new(0),
        }
    }

    pub fn seed(&self, location: Location) {
        self.rows.lock().unwrap().insert(location.code, location);
    }

    pub fn contains(&self, code: u32) -> bool {
        self.rows.lock().unwrap().contains_key(&code)
    }

    pub fn get_sync(&self, code: u32) -> Option<Location> {
        self.rows.lock().unwrap().get(&code).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn insert_attempts(&self) -> u64 {
        self.insert_attempts.load(Ordering::Relaxed)
    }
}

impl Default for MemoryLocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationStore for MemoryLocationStore {
    async fn get(&self, code: u32) -> Result<Option<Location>> {
        Ok(self.rows.lock().unwrap().get(&code).cloned())
    }

    async fn create_if_absent(&self, location: &Location) -> Result<bool> {
        self.insert_attempts.fetch_add(1, Ordering::Relaxed);
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&location.code) {
            return Ok(false);
        }
        rows.insert(location.code, location.clone());
        Ok(true)
    }
}

pub struct MemoryCategoryStore {
    rows: Mutex<HashMap<String, (i32, Category)>>,
    next_id: AtomicU64,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn get_by_name(&self, name: &str) -> Option<Category> {
        self.rows.lock().unwrap().get(name).map(|(_, c)| c.clone())
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl Default for MemoryCategoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn ensure(&self, category: &Category) -> Result<i32> {
        let mut rows = self.rows.lock().unwrap();
        if let Some((id, _)) = rows.get(&category.name) {
            return Ok(*id);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) as i32;
        rows.insert(category.name.clone(), (id, category.clone()));
        Ok(id)
    }
}
