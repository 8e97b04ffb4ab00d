//! Driven port for durable key/value storage of the session.
//!
//! Values are strings. Writes of several keys happen as one unit so a crash
//! cannot leave a token without its identity record.

use super::define_port_error;

define_port_error! {
    /// Errors raised by [`KeyValueStorage`] adapters.
    pub enum StorageError {
        /// Reading or writing the backing medium failed.
        Io { message: String } => "session storage I/O failed: {message}",
        /// The stored contents could not be parsed.
        Corrupt { message: String } => "session storage is unreadable: {message}",
    }
}

/// Port for the durable store that survives process restarts.
pub trait KeyValueStorage: Send + Sync {
    /// Read one value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write every entry, or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the write does not complete.
    fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StorageError>;

    /// Remove every stored value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the medium cannot be cleared.
    fn clear(&self) -> Result<(), StorageError>;
}
