// SPDX-License-Identifier: Apache-2.0
// Copyright 2023 SUSE LLC
// Author: Nicolai Stange <nstange@suse.de>

extern crate alloc;
use alloc::vec::Vec;

use super::cfg_zeroize;
use crate::interface;

/// Allocate a zero-filled, zeroize-on-drop buffer, reporting allocation
/// failure as `TPM_RC_MEMORY` rather than aborting.
pub fn try_alloc_zeroizing_vec<T: Copy + Default>(
    len: usize,
) -> Result<cfg_zeroize::Zeroizing<Vec<T>>, interface::TpmErr>
where
    Vec<T>: cfg_zeroize::Zeroize,
{
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| tpm_err_rc!(MEMORY))?;
    v.resize(len, T::default());
    Ok(cfg_zeroize::Zeroizing::new(v))
}

#[test]
fn test_try_alloc_zeroizing_vec() {
    let v = try_alloc_zeroizing_vec::<u8>(13).unwrap();
    assert_eq!(v.len(), 13);
    assert!(v.iter().all(|b| *b == 0));

    let v = try_alloc_zeroizing_vec::<u8>(0).unwrap();
    assert!(v.is_empty());

    assert_eq!(
        try_alloc_zeroizing_vec::<u64>(usize::MAX).err(),
        Some(tpm_err_rc!(MEMORY))
    );
}
