use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

/// Errors returned by [`Store`] operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
  /// The request failed boundary validation; nothing was touched
  #[error("{0}")]
  InvalidArgument(String),
  /// A previous lock holder panicked
  #[error("store lock poisoned")]
  Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// In-memory key-value store
///
/// Every operation takes the same exclusive lock for its whole duration, so
/// the read-modify-write in [`Store::append`] can never interleave with
/// another call.
pub struct Store {
  data: Mutex<HashMap<String, String>>,
}

impl Store {
  /// Create a new empty store
  pub fn new() -> Self {
    Self {
      data: Mutex::new(HashMap::new()),
    }
  }

  /// Set a key to the given value, overwriting any previous value
  pub fn put(&self, key: &str, value: String) -> StoreResult<()> {
    check_key(key)?;
    let mut data = self.lock()?;
    data.insert(key.to_string(), value);
    Ok(())
  }

  /// Get the value for a key, or the empty string if it was never set
  pub fn get(&self, key: &str) -> StoreResult<String> {
    check_key(key)?;
    let data = self.lock()?;
    Ok(data.get(key).cloned().unwrap_or_default())
  }

  /// Append `arg` to the value under `key` and return the previous value
  pub fn append(&self, key: &str, arg: &str) -> StoreResult<String> {
    check_key(key)?;
    let mut data = self.lock()?;
    let old = data.get(key).cloned().unwrap_or_default();
    let mut new = String::with_capacity(old.len() + arg.len());
    new.push_str(&old);
    new.push_str(arg);
    data.insert(key.to_string(), new);
    Ok(old)
  }

  /// Number of keys currently stored
  pub fn len(&self) -> StoreResult<usize> {
    Ok(self.lock()?.len())
  }

  pub fn is_empty(&self) -> StoreResult<bool> {
    Ok(self.lock()?.is_empty())
  }

  fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, String>>> {
    self.data.lock().map_err(|_| StoreError::Poisoned)
  }
}

impl Default for Store {
  fn default() -> Self {
    Self::new()
  }
}

/// Keys are validated before the lock is taken
fn check_key(key: &str) -> StoreResult<()> {
  if key.is_empty() {
    return Err(StoreError::InvalidArgument("missing key".to_string()));
  }
  Ok(())
}
