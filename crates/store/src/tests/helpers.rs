use config::StoreConfig;
use layout::{Meta, Mirror, SegmentId, DEFAULT_VERSION, MIRROR_LEN};
use medium::{RamMedium, ERASED_BYTE};

pub const CAPACITY: usize = 512;

/// A medium holding a fully consistent default image at address 0.
pub fn healthy_medium() -> RamMedium {
    let mut bytes = vec![ERASED_BYTE; CAPACITY];
    bytes[..MIRROR_LEN].copy_from_slice(Mirror::with_defaults().as_bytes());
    RamMedium::from_bytes(bytes)
}

/// A healthy medium whose meta segment already records `error_counter`
/// recoveries.
pub fn medium_with_counter(error_counter: u16) -> RamMedium {
    let mut image = Mirror::with_defaults();
    image.write(&Meta {
        error_counter,
        version: DEFAULT_VERSION,
    });
    let mut bytes = vec![ERASED_BYTE; CAPACITY];
    bytes[..MIRROR_LEN].copy_from_slice(image.as_bytes());
    RamMedium::from_bytes(bytes)
}

pub fn config() -> StoreConfig {
    StoreConfig::default()
}

pub fn config_with(io_retries: u32, verify_commits: bool) -> StoreConfig {
    StoreConfig {
        io_retries,
        verify_commits,
        ..StoreConfig::default()
    }
}

/// Flips one bit of the first field byte of `id` directly on the medium.
pub fn corrupt_fields(medium: &mut RamMedium, id: SegmentId) {
    let offset = id.descriptor().offset;
    medium.bytes_mut()[offset] ^= 0x01;
}

pub fn config_at(base_address: usize) -> StoreConfig {
    StoreConfig {
        base_address,
        ..StoreConfig::default()
    }
}
