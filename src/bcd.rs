// Copyright (c) 2026 Fastcomcorp, LLC. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Packed-BCD IMSI codec
//!
//! The registration wire format is a 15-digit IMSI packed into 8 bytes, two
//! digits per byte with the earlier digit in the high nibble:
//!
//! ```text
//! byte 0: [d0<<4 | d1]   byte 1: [d2<<4 | d3]   ...   byte 7: [d14<<4 | 0xF]
//! ```
//!
//! The 16th nibble is the `0xF` filler and is verified on decode. Both
//! directions are bijective over their valid inputs.

use thiserror::Error;

/// Number of decimal digits in an IMSI.
pub const IMSI_DIGITS: usize = 15;

/// Length of a packed-BCD IMSI on the wire.
pub const BCD_LEN: usize = 8;

const FILLER: u8 = 0x0F;

/// Errors produced by the BCD codec
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BcdError {
    /// Input has the wrong number of digits (encode) or bytes (decode)
    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },
    /// IMSI contains a non-digit character
    #[error("invalid digit {0:?} in IMSI")]
    InvalidDigit(char),
    /// Packed data contains a nibble that is not a decimal digit, or a
    /// filler nibble other than `0xF`
    #[error("invalid BCD nibble {nibble:#x} at position {index}")]
    InvalidBcd { nibble: u8, index: usize },
}

/// Packs a 15-digit IMSI string into its 8-byte wire form.
pub fn imsi_to_bcd(imsi: &str) -> Result<[u8; BCD_LEN], BcdError> {
    if imsi.len() != IMSI_DIGITS {
        return Err(BcdError::InvalidLength {
            expected: IMSI_DIGITS,
            got: imsi.len(),
        });
    }

    let mut bcd = [0u8; BCD_LEN];
    for (i, c) in imsi.chars().enumerate() {
        let digit = c.to_digit(10).ok_or(BcdError::InvalidDigit(c))? as u8;
        if i % 2 == 0 {
            bcd[i / 2] = digit << 4;
        } else {
            bcd[i / 2] |= digit;
        }
    }
    bcd[BCD_LEN - 1] |= FILLER;

    Ok(bcd)
}

/// Unpacks an 8-byte BCD sequence back into the IMSI string.
pub fn bcd_to_imsi(bcd: &[u8]) -> Result<String, BcdError> {
    if bcd.len() != BCD_LEN {
        return Err(BcdError::InvalidLength {
            expected: BCD_LEN,
            got: bcd.len(),
        });
    }

    let mut imsi = String::with_capacity(IMSI_DIGITS);
    for (i, byte) in bcd.iter().enumerate() {
        let high = byte >> 4;
        let low = byte & 0x0F;

        if high > 9 {
            return Err(BcdError::InvalidBcd {
                nibble: high,
                index: 2 * i,
            });
        }
        imsi.push(char::from(b'0' + high));

        if i < BCD_LEN - 1 {
            if low > 9 {
                return Err(BcdError::InvalidBcd {
                    nibble: low,
                    index: 2 * i + 1,
                });
            }
            imsi.push(char::from(b'0' + low));
        } else if low != FILLER {
            return Err(BcdError::InvalidBcd {
                nibble: low,
                index: 2 * i + 1,
            });
        }
    }

    Ok(imsi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_known_imsi() {
        let bcd = imsi_to_bcd("250010123456789").unwrap();
        assert_eq!(bcd, [0x25, 0x00, 0x10, 0x12, 0x34, 0x56, 0x78, 0x9F]);
    }

    #[test]
    fn test_decode_known_imsi() {
        let imsi = bcd_to_imsi(&[0x25, 0x00, 0x10, 0x12, 0x34, 0x56, 0x78, 0x9F]).unwrap();
        assert_eq!(imsi, "250010123456789");
    }

    #[test]
    fn test_encode_rejects_wrong_length() {
        assert_eq!(
            imsi_to_bcd("12345"),
            Err(BcdError::InvalidLength {
                expected: IMSI_DIGITS,
                got: 5
            })
        );
        assert_eq!(
            imsi_to_bcd("1234567890123456"),
            Err(BcdError::InvalidLength {
                expected: IMSI_DIGITS,
                got: 16
            })
        );
    }

    #[test]
    fn test_encode_rejects_non_digit() {
        assert_eq!(
            imsi_to_bcd("25001012345678x"),
            Err(BcdError::InvalidDigit('x'))
        );
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert_eq!(
            bcd_to_imsi(&[0x12, 0x34]),
            Err(BcdError::InvalidLength {
                expected: BCD_LEN,
                got: 2
            })
        );
    }

    #[test]
    fn test_decode_rejects_bad_nibble() {
        // 0xA in the high nibble of byte 2
        let err = bcd_to_imsi(&[0x25, 0x00, 0xA0, 0x12, 0x34, 0x56, 0x78, 0x9F]).unwrap_err();
        assert_eq!(
            err,
            BcdError::InvalidBcd {
                nibble: 0xA,
                index: 4
            }
        );
    }

    #[test]
    fn test_decode_rejects_bad_filler() {
        // low nibble of the last byte must be 0xF
        let err = bcd_to_imsi(&[0x25, 0x00, 0x10, 0x12, 0x34, 0x56, 0x78, 0x90]).unwrap_err();
        assert_eq!(
            err,
            BcdError::InvalidBcd {
                nibble: 0x0,
                index: 15
            }
        );
    }

    proptest! {
        #[test]
        fn prop_roundtrip_from_string(imsi in "[0-9]{15}") {
            let bcd = imsi_to_bcd(&imsi).unwrap();
            prop_assert_eq!(bcd_to_imsi(&bcd).unwrap(), imsi);
        }

        #[test]
        fn prop_roundtrip_from_bytes(digits in prop::collection::vec(0u8..10, 15)) {
            let mut bcd = [0u8; BCD_LEN];
            for (i, d) in digits.iter().enumerate() {
                if i % 2 == 0 {
                    bcd[i / 2] = d << 4;
                } else {
                    bcd[i / 2] |= d;
                }
            }
            bcd[BCD_LEN - 1] |= 0x0F;

            let imsi = bcd_to_imsi(&bcd).unwrap();
            prop_assert_eq!(imsi_to_bcd(&imsi).unwrap(), bcd);
        }
    }
}
