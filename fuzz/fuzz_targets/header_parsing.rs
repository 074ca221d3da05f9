// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Header decoding under adversarial input.
//!
//! A dataset file from an unknown source may claim any number of dimensions,
//! extents of `u32::MAX`, or blocks larger than their axis. Decoding must
//! return an error for all of it, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use spectrastore::{DatasetFormat, DatasetHeader};

fuzz_target!(|data: &[u8]| {
    for format in [DatasetFormat::Nv, DatasetFormat::Ucsf] {
        if let Ok(header) = DatasetHeader::decode(format, data) {
            // A decoded header re-encodes to one that decodes to the same layout.
            let again = DatasetHeader::decode(format, &header.encode())
                .expect("re-encoded header must decode");
            assert_eq!(again.layout, header.layout);
            assert!(header.layout.stored_point_count() >= header.layout.point_count());
        }
    }
});
