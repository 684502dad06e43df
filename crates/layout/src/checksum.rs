use crc32fast::Hasher as Crc32;

/// CRC-32 (IEEE polynomial, reflected, init/xorout `0xFFFF_FFFF`) of `bytes`.
///
/// Used for both ROM default images and runtime data so the two are always
/// comparable.
#[must_use]
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(bytes);
    hasher.finalize()
}
