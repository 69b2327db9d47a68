// SPDX-License-Identifier: Apache-2.0
// Copyright 2023 SUSE LLC
// Author: Nicolai Stange <nstange@suse.de>

//! Scatter lists of byte slices.
//!
//! KDF messages get assembled from several independent fields and the
//! generated output may be distributed over several destination buffers.
//! Both are represented as slices of optional slices, with `None` and
//! empty entries being equivalent and skipped transparently.

use core::mem;

/// Scatter list of destination buffers.
pub struct IoSlicesMut<'a, 'b> {
    // Invariant: slices[0], if any, is a non-empty buffer.
    slices: &'a mut [Option<&'b mut [u8]>],
}

impl<'a, 'b> IoSlicesMut<'a, 'b> {
    pub fn new(slices: &'a mut [Option<&'b mut [u8]>]) -> Self {
        let mut slices = Self { slices };
        slices.skip_empty();
        slices
    }

    fn skip_empty(&mut self) {
        let n_empty = self
            .slices
            .iter()
            .take_while(|s| s.as_deref().map(|s| s.is_empty()).unwrap_or(true))
            .count();
        let slices = mem::take(&mut self.slices);
        self.slices = &mut slices[n_empty..];
    }

    pub fn len(&self) -> usize {
        self.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn first(&mut self) -> Option<&mut [u8]> {
        self.slices.first_mut().and_then(|s| s.as_deref_mut())
    }

    pub fn advance(&mut self, mut distance: usize) {
        while distance != 0 {
            let first = match self.slices.first_mut() {
                Some(first) => first,
                None => break,
            };
            let s0 = first.take().unwrap_or_default();
            if s0.len() > distance {
                *first = Some(&mut s0[distance..]);
                return;
            }
            distance -= s0.len();
            self.skip_empty();
        }
        debug_assert_eq!(distance, 0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.slices
            .iter()
            .filter_map(|s| s.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Scatter list of source buffers.
pub struct IoSlices<'a, 'b> {
    // Invariant: slices[0], if any, is a non-empty buffer.
    slices: &'a mut [Option<&'b [u8]>],
}

impl<'a, 'b> IoSlices<'a, 'b> {
    pub fn new(slices: &'a mut [Option<&'b [u8]>]) -> Self {
        let mut slices = Self { slices };
        slices.skip_empty();
        slices
    }

    fn skip_empty(&mut self) {
        let n_empty = self
            .slices
            .iter()
            .take_while(|s| s.map(|s| s.is_empty()).unwrap_or(true))
            .count();
        let slices = mem::take(&mut self.slices);
        self.slices = &mut slices[n_empty..];
    }

    pub fn len(&self) -> usize {
        self.slices
            .iter()
            .map(|s| s.map(|s| s.len()).unwrap_or(0))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn take_first(&mut self) -> Option<&'b [u8]> {
        let slices = mem::take(&mut self.slices);
        let (first, rest) = slices.split_first_mut()?;
        let first = first.take();
        self.slices = rest;
        self.skip_empty();
        first
    }
}

#[test]
fn test_io_slices_mut() {
    let mut a = [0u8, 0u8];
    let mut b: [u8; 0] = [0u8; 0];
    let mut c = [0u8, 0u8, 0u8];
    let mut d: [u8; 0] = [0u8; 0];
    let mut slices = [
        None,
        Some(a.as_mut_slice()),
        None,
        Some(b.as_mut_slice()),
        None,
        Some(c.as_mut_slice()),
        None,
        Some(d.as_mut_slice()),
        None,
    ];
    let mut slices = IoSlicesMut::new(&mut slices);
    assert_eq!(slices.len(), 5);
    assert_eq!(slices.iter().count(), 2);
    for i in 1..=5u8 {
        slices.first().unwrap()[0] = i;
        slices.advance(1);
        assert_eq!(slices.len(), 5 - i as usize);
    }
    assert!(slices.is_empty());
    assert!(slices.first().is_none());
    assert_eq!(a, [1, 2]);
    assert_eq!(c, [3, 4, 5]);

    // Advance across slice boundaries.
    let mut a = [0u8; 3];
    let mut c = [0u8; 3];
    let mut slices = [Some(a.as_mut_slice()), None, Some(c.as_mut_slice())];
    let mut slices = IoSlicesMut::new(&mut slices);
    slices.advance(4);
    assert_eq!(slices.len(), 2);
    slices.first().unwrap().fill(0xff);
    slices.advance(2);
    assert!(slices.is_empty());
    assert_eq!(a, [0, 0, 0]);
    assert_eq!(c, [0, 0xff, 0xff]);
}

#[test]
fn test_io_slices_mut_advance_within_slice() {
    let mut a = [0u8; 20];
    let mut b = [0u8; 12];
    let mut slices = [Some(a.as_mut_slice()), Some(b.as_mut_slice())];
    let mut slices = IoSlicesMut::new(&mut slices);
    slices.advance(13);
    assert_eq!(slices.len(), 19);
    assert_eq!(slices.first().unwrap().len(), 7);
    slices.advance(7);
    assert_eq!(slices.len(), 12);
    slices.advance(5);
    assert_eq!(slices.len(), 7);
    slices.first().unwrap()[0] = 0xff;
    slices.advance(7);
    assert!(slices.is_empty());
    assert_eq!(b[5], 0xff);
}

#[test]
fn test_io_slices() {
    let a = [1u8, 2u8];
    let b: [u8; 0] = [0u8; 0];
    let c = [3u8, 4u8];
    let d: [u8; 0] = [0u8; 0];
    let mut slices = [
        None,
        Some(a.as_slice()),
        None,
        Some(b.as_slice()),
        None,
        Some(c.as_slice()),
        None,
        Some(d.as_slice()),
        None,
    ];
    let mut slices = IoSlices::new(&mut slices);
    assert_eq!(slices.len(), 4);
    assert_eq!(slices.take_first().unwrap(), [1, 2]);
    assert_eq!(slices.len(), 2);
    assert_eq!(slices.take_first().unwrap(), [3, 4]);
    assert!(slices.is_empty());
    assert!(slices.take_first().is_none());
}
