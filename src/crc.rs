//! The STM32 hardware CRC32 used to checksum a PutBytes object before
//! Commit: polynomial 0x04C11DB7, initial value 0xFFFFFFFF, processed
//! word-at-a-time with the input zero-padded to a 4-byte boundary, no
//! reflection, no final XOR.
//!
//! The STM32 peripheral reads each 4-byte chunk as a native (little-endian)
//! word before running the shift-xor-poly core over it — see
//! `examples/original_source/libpebble2/util/stm32_crc.py`'s `process_word`.
//! The `crc` crate's table/shift engine below is MSB-first (`refin: false`):
//! to reproduce the hardware's little-endian word read, each 4-byte chunk
//! (after zero-padding the final, possibly-short one) is byte-reversed
//! before being fed in. `process_word` happens to apply this same reversal
//! to a short final chunk too (after right-aligning the real bytes against
//! the zero padding), so zero-pad-then-reverse is correct for every chunk,
//! not just whole ones.
//!
//! Kept separate from `services::putbytes` since it's plain arithmetic
//! rather than wire codec work.

use crc::{Algorithm, Crc};

const STM32_CRC32: Algorithm<u32> = Algorithm {
    width: 32,
    poly: 0x04C1_1DB7,
    init: 0xFFFF_FFFF,
    refin: false,
    refout: false,
    xorout: 0x0000_0000,
    check: 0x0000_0000,
    residue: 0x0000_0000,
};

/// Computes the STM32 hardware-polynomial CRC32 over `data`, zero-padding
/// the final word to a 4-byte boundary and byte-reversing every word before
/// it is fed to the (MSB-first) CRC core.
pub fn stm32_crc32(data: &[u8]) -> u32 {
    let crc = Crc::<u32>::new(&STM32_CRC32);
    let mut digest = crc.digest();

    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        word.reverse();
        digest.update(&word);
    }

    digest.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_reference_stm32_crc_for_a_non_aligned_buffer() {
        // `process_buffer([0x01, 0x02, 0x03, 0x04, 0x05])` against the real
        // STM32 algorithm in `stm32_crc.py`.
        assert_eq!(stm32_crc32(&[0x01, 0x02, 0x03, 0x04, 0x05]), 0xba237be3);
    }

    #[test]
    fn pads_to_word_boundary_deterministically() {
        let aligned = [0u8; 8];
        assert_eq!(stm32_crc32(&aligned), stm32_crc32(&aligned));
    }

    #[test]
    fn non_aligned_input_does_not_panic() {
        let data = [1u8, 2, 3, 4, 5];
        let _ = stm32_crc32(&data);
    }

    #[test]
    fn empty_input_crc_is_stable() {
        assert_eq!(stm32_crc32(&[]), stm32_crc32(&[]));
    }
}
