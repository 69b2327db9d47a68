// SPDX-License-Identifier: Apache-2.0
// Copyright 2023 SUSE LLC
// Author: Nicolai Stange <nstange@suse.de>

pub mod cfg_zeroize;
mod try_new_helpers;

pub use try_new_helpers::try_alloc_zeroizing_vec;
