//! Flash position store for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage in the last
//! 64KB of flash. The position is rewritten after every move, so wear
//! leveling matters more here than for configuration data.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

use servodrive_hal::{PositionStore, StorageKey, StoreError};

/// Flash size of the supported boards
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Partition reserved for persisted data
pub const DATA_PARTITION_SIZE: usize = 64 * 1024;
pub const DATA_PARTITION_START: usize = FLASH_SIZE - DATA_PARTITION_SIZE;

/// Flash range of the data partition
pub const DATA_RANGE: core::ops::Range<u32> = (DATA_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch buffer size for sequential-storage items
const ITEM_BUF_SIZE: usize = 64;

/// Largest configuration blob that can be read back
pub const MAX_CONFIG_SIZE: usize = 1024;

/// Position store backed by on-chip flash
pub struct FlashPositionStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> FlashPositionStore<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Read the TOML configuration override, if one was stored
    ///
    /// Returns the number of bytes copied into `buffer`.
    pub async fn read_config(&mut self, buffer: &mut [u8]) -> Result<Option<usize>, StoreError> {
        let mut item_buf = [0u8; MAX_CONFIG_SIZE + 8];

        let data = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            DATA_RANGE,
            &mut NoCache::new(),
            &mut item_buf,
            &StorageKey::ConfigToml,
        )
        .await
        .map_err(|_| StoreError::Backend)?;

        match data {
            Some(data) if data.len() > buffer.len() => Err(StoreError::Full),
            Some(data) => {
                buffer[..data.len()].copy_from_slice(data);
                Ok(Some(data.len()))
            }
            None => Ok(None),
        }
    }
}

impl<'d> PositionStore for FlashPositionStore<'d> {
    async fn read_position(&mut self) -> Result<Option<u8>, StoreError> {
        let mut item_buf = [0u8; ITEM_BUF_SIZE];

        let data = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            DATA_RANGE,
            &mut NoCache::new(),
            &mut item_buf,
            &StorageKey::Position,
        )
        .await
        .map_err(|_| StoreError::Backend)?;

        match data {
            Some([position]) if *position <= 100 => Ok(Some(*position)),
            Some(_) => Err(StoreError::Corrupted),
            None => Ok(None),
        }
    }

    async fn write_position(&mut self, position: u8) -> Result<(), StoreError> {
        let mut item_buf = [0u8; ITEM_BUF_SIZE];
        let value: &[u8] = &[position];

        map::store_item(
            &mut self.flash,
            DATA_RANGE,
            &mut NoCache::new(),
            &mut item_buf,
            &StorageKey::Position,
            &value,
        )
        .await
        .map_err(|e| match e {
            sequential_storage::Error::FullStorage => StoreError::Full,
            _ => StoreError::Backend,
        })
    }
}
