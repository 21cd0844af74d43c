//! PacBio kinetics codec.
//!
//! CCS BAM files store IPD and pulse width values either as raw 16 bit frame
//! counts or compressed to one byte with the lossy "V1" codec: four ranges of
//! 64 codes with step 1, 2, 4 and 8 frames.

/// Frame count encoded by one V1 code.
pub fn decode_v1(code: u8) -> u16 {
    let code = code as u16;
    match code {
        0..=63 => code,
        64..=127 => 64 + (code - 64) * 2,
        128..=191 => 192 + (code - 128) * 4,
        _ => 448 + (code - 192) * 8,
    }
}

/// Largest frame count the V1 codec can represent.
pub const V1_MAX_FRAMES: u16 = 952;

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(0, 0)]
    #[case(63, 63)]
    #[case(64, 64)]
    #[case(65, 66)]
    #[case(127, 190)]
    #[case(128, 192)]
    #[case(191, 444)]
    #[case(192, 448)]
    #[case(255, 952)]
    fn test_decode_v1(#[case] code: u8, #[case] frames: u16) {
        assert_eq!(decode_v1(code), frames);
    }

    #[rstest]
    fn test_decoding_is_monotonic() {
        let frames: Vec<u16> = (0..=255u8).map(decode_v1).collect();
        assert!(frames.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(*frames.last().unwrap(), V1_MAX_FRAMES);
    }
}
