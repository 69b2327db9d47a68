// SPDX-License-Identifier: Apache-2.0
// Copyright 2023 SUSE LLC
// Author: Nicolai Stange <nstange@suse.de>

/// `dst[i] ^= mask[i]` for all `i`. Both slices must have the same length.
pub fn xor_bytes(dst: &mut [u8], mask: &[u8]) {
    debug_assert_eq!(dst.len(), mask.len());

    for (d, m) in dst.iter_mut().zip(mask.iter()) {
        *d ^= *m;
    }
}

#[test]
fn test_xor_bytes() {
    let mask = [0x77u8; 37];
    for len in [0usize, 1, 7, 8, 9, 37] {
        let mut dst = [0xccu8; 37];
        xor_bytes(&mut dst[..len], &mask[..len]);
        assert!(dst[..len].iter().all(|b| *b == 0xbb));
        assert!(dst[len..].iter().all(|b| *b == 0xcc));
        xor_bytes(&mut dst[..len], &mask[..len]);
        assert_eq!(dst, [0xccu8; 37]);
    }
}
