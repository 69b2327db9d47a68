// SPDX-License-Identifier: Apache-2.0
// Copyright 2023 SUSE LLC
// Author: Nicolai Stange <nstange@suse.de>

//! Wrappers around the [`Zeroize`](https://docs.rs/zeroize/latest/zeroize/trait.Zeroize.html)
//! crate, so that derived key material and intermediate PRF blocks can be wiped unconditionally
//! in the code, independent of whether the `zeroize` Cargo feature is enabled.

#[cfg(feature = "zeroize")]
pub use zeroize::{Zeroize, Zeroizing};

/// Stand-in for
/// [`zeroize::Zeroizing`](https://docs.rs/zeroize/latest/zeroize/struct.Zeroizing.html) with the
/// `zeroize` feature disabled: dereferences to the wrapped value and does nothing on drop.
#[cfg(not(feature = "zeroize"))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Zeroizing<T>(T);

#[cfg(not(feature = "zeroize"))]
impl<T> Zeroizing<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }
}

#[cfg(not(feature = "zeroize"))]
impl<T> core::ops::Deref for Zeroizing<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(not(feature = "zeroize"))]
impl<T> core::ops::DerefMut for Zeroizing<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(not(feature = "zeroize"))]
pub trait Zeroize {
    fn zeroize(&mut self);
}

#[cfg(not(feature = "zeroize"))]
impl<T: ?Sized> Zeroize for T {
    fn zeroize(&mut self) {}
}
