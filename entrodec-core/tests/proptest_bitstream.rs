//! Property-based tests for bitstream operations.

use entrodec_core::{BitReader, BitSource, BitWriter};
use proptest::prelude::*;

proptest! {
    /// Writing and reading arbitrary bit widths round-trips.
    #[test]
    fn roundtrip_bits_variable_width(value in 0u32..=0xFFFF, width in 1u8..=16) {
        let masked_value = value & ((1u32 << width) - 1);

        let mut writer = BitWriter::new();
        writer.write_bits(masked_value, width);
        writer.align_to_byte();

        let mut reader = BitReader::new(writer.data());
        prop_assert_eq!(reader.read_bits(width).unwrap(), masked_value);
    }

    /// Individual bits round-trip in order.
    #[test]
    fn roundtrip_individual_bits(bits in prop::collection::vec(any::<bool>(), 1..200)) {
        let mut writer = BitWriter::new();
        for &bit in &bits {
            writer.write_bit(bit);
        }
        writer.align_to_byte();

        let mut reader = BitReader::new(writer.data());
        for (i, &expected) in bits.iter().enumerate() {
            prop_assert_eq!(reader.read_bit().unwrap(), expected, "mismatch at bit {}", i);
        }
    }

    /// The reader never hands out more bits than were written.
    #[test]
    fn exhaustion_after_all_bits(len in 0usize..64) {
        let data = vec![0xA5u8; len];
        let mut reader = BitReader::new(&data);
        for _ in 0..len * 8 {
            reader.read_bit().unwrap();
        }
        prop_assert!(reader.read_bit().is_err());
    }
}
