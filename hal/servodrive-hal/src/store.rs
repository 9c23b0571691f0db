//! Position storage abstractions
//!
//! The controller has no position sensor, so the only record of where the
//! actuator stands after a restart is the last estimate written here.

/// Storage keys for persisted data
///
/// Flash-backed stores use these as sequential-storage map keys. Host-backed
/// stores address the value through a configured entity id instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Last estimated actuator position (0-100)
    Position = 0,
    /// Servo configuration as TOML text
    ConfigToml = 1,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::Position),
            1 => Some(StorageKey::ConfigToml),
            _ => None,
        }
    }
}

/// Errors from position storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Underlying medium failed (flash erase/program, service call)
    Backend,
    /// Stored data could not be interpreted
    Corrupted,
    /// Storage is full
    Full,
}

/// Durable position store
///
/// Values are raw numbers at this boundary. Range checking and clamping
/// belong to the caller.
pub trait PositionStore {
    /// Read the last stored position
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn read_position(&mut self) -> impl core::future::Future<Output = Result<Option<u8>, StoreError>>;

    /// Store a position
    fn write_position(&mut self, position: u8) -> impl core::future::Future<Output = Result<(), StoreError>>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
