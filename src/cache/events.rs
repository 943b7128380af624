//! Cache event vocabulary used in log records.

use std::fmt;

/// Advisory event emitted for each store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent<'a> {
    Hit(&'a str),
    Miss(&'a str),
    Update(&'a str),
    Delete(&'a str),
}

impl fmt::Display for CacheEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheEvent::Hit(key) => write!(f, "Cache hit for key {}", key),
            CacheEvent::Miss(key) => write!(f, "Cache miss for key {}", key),
            CacheEvent::Update(key) => write!(f, "Cache updated for key {}", key),
            CacheEvent::Delete(key) => write!(f, "Cache deleted for key {}", key),
        }
    }
}
