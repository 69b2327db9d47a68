// SPDX-License-Identifier: Apache-2.0
// Copyright 2023 SUSE LLC
// Author: Nicolai Stange <nstange@suse.de>

pub mod hash;
pub mod io_slices;
pub mod kdf;
pub mod xor;
