//! Scoped environment overrides for integration tests.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Restores the previous values of the variables it set when dropped.
///
/// Guards serialise on a process-wide mutex, so only one test mutates the
/// environment at a time.
pub struct EnvVarGuard {
    previous: Vec<(String, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets each `(key, value)` pair for the guard's lifetime.
    pub fn set(vars: &[(&str, &str)]) -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = vars
            .iter()
            .map(|(key, value)| {
                let old = env::var_os(key);
                unsafe {
                    // SAFETY: ENV_MUTEX serialises environment mutation in tests.
                    env::set_var(key, value);
                }
                ((*key).to_owned(), old)
            })
            .collect();
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, old) in self.previous.drain(..) {
            unsafe {
                // SAFETY: ENV_MUTEX is still held by this guard.
                match old {
                    Some(value) => env::set_var(&key, value),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}
