// SPDX-License-Identifier: Apache-2.0
// Copyright 2023 SUSE LLC
// Author: Nicolai Stange <nstange@suse.de>

//! Key derivation functions of the TCG TPM2 Library specification, Part 1
//! ("Architecture"), section 11.4.10: the counter mode HMAC based `KDFa()`
//! and the hash based `KDFe()` for ECDH derived secrets.

#![no_std]

// Must come first, so that the helper macros are visible for the rest.
mod tpm_err_helpers;

pub mod crypto;
pub mod interface;
mod utils;

pub use utils::cfg_zeroize::Zeroizing;
