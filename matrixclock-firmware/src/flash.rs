//! Flash document storage
//!
//! Option documents live in a wear-leveled key-value map in the last
//! 64KB of flash; message log lines go into a 64KB ring just below it.
//! The [`DocumentStorage`] trait is synchronous, so the async flash
//! driver is bridged with `block_on` (saves are rare and user-initiated).

use embassy_futures::block_on;
use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use heapless::String;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{self, SerializationError};
use sequential_storage::queue;

use matrixclock_core::command::NAME_MAX;
use matrixclock_hal::{DocumentStorage, StorageError};

/// Total flash on the Pico W
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

const DOC_PARTITION_SIZE: u32 = 64 * 1024;
const LOG_PARTITION_SIZE: u32 = 64 * 1024;

/// Document map: the last 64KB of flash
const DOC_RANGE: core::ops::Range<u32> =
    (FLASH_SIZE as u32 - DOC_PARTITION_SIZE)..(FLASH_SIZE as u32);

/// Log ring: 64KB below the document map; old lines are overwritten
const LOG_RANGE: core::ops::Range<u32> =
    (FLASH_SIZE as u32 - DOC_PARTITION_SIZE - LOG_PARTITION_SIZE)
        ..(FLASH_SIZE as u32 - DOC_PARTITION_SIZE);

/// Working buffer for map operations; documents are at most 512 bytes
const DATA_BUF: usize = 1024;

/// Document name as a storage map key (length-prefixed bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
struct DocKey(String<NAME_MAX>);

impl DocKey {
    fn new(name: &str) -> Option<Self> {
        let mut key = String::new();
        key.push_str(name).ok()?;
        Some(Self(key))
    }
}

impl map::Key for DocKey {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let bytes = self.0.as_bytes();
        if buffer.len() < bytes.len() + 1 {
            return Err(SerializationError::BufferTooSmall);
        }
        buffer[0] = bytes.len() as u8;
        buffer[1..=bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len() + 1)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
        let len = *buffer.first().ok_or(SerializationError::BufferTooSmall)? as usize;
        let bytes = buffer
            .get(1..=len)
            .ok_or(SerializationError::BufferTooSmall)?;
        let text = core::str::from_utf8(bytes).map_err(|_| SerializationError::InvalidFormat)?;
        let key = DocKey::new(text).ok_or(SerializationError::InvalidFormat)?;
        Ok((key, len + 1))
    }
}

/// Named document storage in the on-board flash
pub struct FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    read_only: bool,
}

impl<'d> FlashStorage<'d> {
    /// `read_only` is decided once at boot from the write-protect button
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>, read_only: bool) -> Self {
        Self {
            flash: Flash::new(flash, dma),
            read_only,
        }
    }

    async fn load_doc(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let key = DocKey::new(name).ok_or(StorageError::NotFound)?;
        let mut data_buffer = [0u8; DATA_BUF];

        let found = map::fetch_item::<DocKey, &[u8], _>(
            &mut self.flash,
            DOC_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await
        .map_err(map_err)?;

        match found {
            Some(data) => {
                if buf.len() < data.len() {
                    return Err(StorageError::BufferTooSmall);
                }
                buf[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
            None => Err(StorageError::NotFound),
        }
    }

    async fn save_doc(&mut self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        let key = DocKey::new(name).ok_or(StorageError::Io)?;
        let mut data_buffer = [0u8; DATA_BUF];

        map::store_item(
            &mut self.flash,
            DOC_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(map_err)
    }

    async fn push_log(&mut self, line: &str) -> Result<(), StorageError> {
        // allow_overwrite_old: the ring discards the oldest lines when full
        queue::push(
            &mut self.flash,
            LOG_RANGE,
            &mut NoCache::new(),
            line.as_bytes(),
            true,
        )
        .await
        .map_err(map_err)
    }
}

fn map_err<E>(err: sequential_storage::Error<E>) -> StorageError {
    match err {
        sequential_storage::Error::FullStorage => StorageError::Full,
        sequential_storage::Error::Corrupted {} => StorageError::Corrupted,
        sequential_storage::Error::BufferTooSmall(_) => StorageError::BufferTooSmall,
        _ => StorageError::Io,
    }
}

impl DocumentStorage for FlashStorage<'_> {
    fn load(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        block_on(self.load_doc(name, buf))
    }

    fn save(&mut self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        block_on(self.save_doc(name, data))
    }

    fn read_only(&self) -> bool {
        self.read_only
    }

    fn append_log(&mut self, line: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        block_on(self.push_log(line))
    }
}
