// SPDX-License-Identifier: Apache-2.0
// Copyright 2023 SUSE LLC
// Author: Nicolai Stange <nstange@suse.de>

//! Hash and HMAC primitives, dispatched on [`TpmiAlgHash`](interface::TpmiAlgHash).

use super::io_slices;
use crypto_common;
use digest::{self, Digest};
use hmac::{Hmac, Mac};
#[cfg(feature = "sha1")]
use sha1;
#[cfg(any(feature = "sha256", feature = "sha384", feature = "sha512"))]
use sha2;
#[cfg(any(feature = "sha3_256", feature = "sha3_384", feature = "sha3_512"))]
use sha3;
#[cfg(feature = "sm3_256")]
use sm3;

use crate::interface;

pub const fn hash_alg_digest_len(alg: interface::TpmiAlgHash) -> u8 {
    match alg {
        #[cfg(feature = "sha1")]
        interface::TpmiAlgHash::Sha1 => 20u8,
        #[cfg(feature = "sha256")]
        interface::TpmiAlgHash::Sha256 => 32u8,
        #[cfg(feature = "sha384")]
        interface::TpmiAlgHash::Sha384 => 48u8,
        #[cfg(feature = "sha512")]
        interface::TpmiAlgHash::Sha512 => 64u8,
        #[cfg(feature = "sha3_256")]
        interface::TpmiAlgHash::Sha3_256 => 32u8,
        #[cfg(feature = "sha3_384")]
        interface::TpmiAlgHash::Sha3_384 => 48u8,
        #[cfg(feature = "sha3_512")]
        interface::TpmiAlgHash::Sha3_512 => 64u8,
        #[cfg(feature = "sm3_256")]
        interface::TpmiAlgHash::Sm3_256 => 32u8,
    }
}

// Feed all of a scatter list into a digest::Update implementation.
fn update_from_io_slices<U: digest::Update>(instance: &mut U, mut data: io_slices::IoSlices) {
    while let Some(data) = data.take_first() {
        digest::Update::update(instance, data);
    }
}

#[derive(Clone)]
pub enum HashInstance {
    #[cfg(feature = "sha1")]
    Sha1(sha1::Sha1),
    #[cfg(feature = "sha256")]
    Sha256(sha2::Sha256),
    #[cfg(feature = "sha384")]
    Sha384(sha2::Sha384),
    #[cfg(feature = "sha512")]
    Sha512(sha2::Sha512),
    #[cfg(feature = "sha3_256")]
    Sha3_256(sha3::Sha3_256),
    #[cfg(feature = "sha3_384")]
    Sha3_384(sha3::Sha3_384),
    #[cfg(feature = "sha3_512")]
    Sha3_512(sha3::Sha3_512),
    #[cfg(feature = "sm3_256")]
    Sm3_256(sm3::Sm3),
}

impl HashInstance {
    pub fn new(alg: interface::TpmiAlgHash) -> Self {
        match alg {
            #[cfg(feature = "sha1")]
            interface::TpmiAlgHash::Sha1 => Self::Sha1(sha1::Sha1::new()),
            #[cfg(feature = "sha256")]
            interface::TpmiAlgHash::Sha256 => Self::Sha256(sha2::Sha256::new()),
            #[cfg(feature = "sha384")]
            interface::TpmiAlgHash::Sha384 => Self::Sha384(sha2::Sha384::new()),
            #[cfg(feature = "sha512")]
            interface::TpmiAlgHash::Sha512 => Self::Sha512(sha2::Sha512::new()),
            #[cfg(feature = "sha3_256")]
            interface::TpmiAlgHash::Sha3_256 => Self::Sha3_256(sha3::Sha3_256::new()),
            #[cfg(feature = "sha3_384")]
            interface::TpmiAlgHash::Sha3_384 => Self::Sha3_384(sha3::Sha3_384::new()),
            #[cfg(feature = "sha3_512")]
            interface::TpmiAlgHash::Sha3_512 => Self::Sha3_512(sha3::Sha3_512::new()),
            #[cfg(feature = "sm3_256")]
            interface::TpmiAlgHash::Sm3_256 => Self::Sm3_256(sm3::Sm3::new()),
        }
    }

    pub fn update(&mut self, data: io_slices::IoSlices) {
        match self {
            #[cfg(feature = "sha1")]
            Self::Sha1(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha256")]
            Self::Sha256(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha384")]
            Self::Sha384(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha512")]
            Self::Sha512(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha3_256")]
            Self::Sha3_256(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha3_384")]
            Self::Sha3_384(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha3_512")]
            Self::Sha3_512(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sm3_256")]
            Self::Sm3_256(instance) => update_from_io_slices(instance, data),
        }
    }

    /// `digest.len()` must equal [`digest_len()`](Self::digest_len).
    pub fn finalize_into(self, digest: &mut [u8]) {
        debug_assert_eq!(digest.len(), self.digest_len());
        match self {
            #[cfg(feature = "sha1")]
            Self::Sha1(instance) => {
                let digest: &mut crypto_common::Output<sha1::Sha1> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha256")]
            Self::Sha256(instance) => {
                let digest: &mut crypto_common::Output<sha2::Sha256> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha384")]
            Self::Sha384(instance) => {
                let digest: &mut crypto_common::Output<sha2::Sha384> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha512")]
            Self::Sha512(instance) => {
                let digest: &mut crypto_common::Output<sha2::Sha512> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha3_256")]
            Self::Sha3_256(instance) => {
                let digest: &mut crypto_common::Output<sha3::Sha3_256> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha3_384")]
            Self::Sha3_384(instance) => {
                let digest: &mut crypto_common::Output<sha3::Sha3_384> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha3_512")]
            Self::Sha3_512(instance) => {
                let digest: &mut crypto_common::Output<sha3::Sha3_512> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sm3_256")]
            Self::Sm3_256(instance) => {
                let digest: &mut crypto_common::Output<sm3::Sm3> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
        }
    }

    pub fn digest_len(&self) -> usize {
        match self {
            #[cfg(feature = "sha1")]
            Self::Sha1(_) => <sha1::Sha1 as crypto_common::OutputSizeUser>::output_size(),
            #[cfg(feature = "sha256")]
            Self::Sha256(_) => <sha2::Sha256 as crypto_common::OutputSizeUser>::output_size(),
            #[cfg(feature = "sha384")]
            Self::Sha384(_) => <sha2::Sha384 as crypto_common::OutputSizeUser>::output_size(),
            #[cfg(feature = "sha512")]
            Self::Sha512(_) => <sha2::Sha512 as crypto_common::OutputSizeUser>::output_size(),
            #[cfg(feature = "sha3_256")]
            Self::Sha3_256(_) => <sha3::Sha3_256 as crypto_common::OutputSizeUser>::output_size(),
            #[cfg(feature = "sha3_384")]
            Self::Sha3_384(_) => <sha3::Sha3_384 as crypto_common::OutputSizeUser>::output_size(),
            #[cfg(feature = "sha3_512")]
            Self::Sha3_512(_) => <sha3::Sha3_512 as crypto_common::OutputSizeUser>::output_size(),
            #[cfg(feature = "sm3_256")]
            Self::Sm3_256(_) => <sm3::Sm3 as crypto_common::OutputSizeUser>::output_size(),
        }
    }
}

#[derive(Clone)]
pub enum HmacInstance {
    #[cfg(feature = "sha1")]
    Sha1(Hmac<sha1::Sha1>),
    #[cfg(feature = "sha256")]
    Sha256(Hmac<sha2::Sha256>),
    #[cfg(feature = "sha384")]
    Sha384(Hmac<sha2::Sha384>),
    #[cfg(feature = "sha512")]
    Sha512(Hmac<sha2::Sha512>),
    #[cfg(feature = "sha3_256")]
    Sha3_256(Hmac<sha3::Sha3_256>),
    #[cfg(feature = "sha3_384")]
    Sha3_384(Hmac<sha3::Sha3_384>),
    #[cfg(feature = "sha3_512")]
    Sha3_512(Hmac<sha3::Sha3_512>),
    #[cfg(feature = "sm3_256")]
    Sm3_256(Hmac<sm3::Sm3>),
}

impl HmacInstance {
    pub fn new(alg: interface::TpmiAlgHash, key: &[u8]) -> Result<Self, interface::TpmErr> {
        // HMAC accepts keys of any length, a failure here would be a bug in the
        // hmac crate.
        let instance = match alg {
            #[cfg(feature = "sha1")]
            interface::TpmiAlgHash::Sha1 => {
                Hmac::<sha1::Sha1>::new_from_slice(key).map(Self::Sha1)
            }
            #[cfg(feature = "sha256")]
            interface::TpmiAlgHash::Sha256 => {
                Hmac::<sha2::Sha256>::new_from_slice(key).map(Self::Sha256)
            }
            #[cfg(feature = "sha384")]
            interface::TpmiAlgHash::Sha384 => {
                Hmac::<sha2::Sha384>::new_from_slice(key).map(Self::Sha384)
            }
            #[cfg(feature = "sha512")]
            interface::TpmiAlgHash::Sha512 => {
                Hmac::<sha2::Sha512>::new_from_slice(key).map(Self::Sha512)
            }
            #[cfg(feature = "sha3_256")]
            interface::TpmiAlgHash::Sha3_256 => {
                Hmac::<sha3::Sha3_256>::new_from_slice(key).map(Self::Sha3_256)
            }
            #[cfg(feature = "sha3_384")]
            interface::TpmiAlgHash::Sha3_384 => {
                Hmac::<sha3::Sha3_384>::new_from_slice(key).map(Self::Sha3_384)
            }
            #[cfg(feature = "sha3_512")]
            interface::TpmiAlgHash::Sha3_512 => {
                Hmac::<sha3::Sha3_512>::new_from_slice(key).map(Self::Sha3_512)
            }
            #[cfg(feature = "sm3_256")]
            interface::TpmiAlgHash::Sm3_256 => {
                Hmac::<sm3::Sm3>::new_from_slice(key).map(Self::Sm3_256)
            }
        };
        instance.map_err(|_| tpm_err_internal!())
    }

    pub fn update(&mut self, data: io_slices::IoSlices) {
        match self {
            #[cfg(feature = "sha1")]
            Self::Sha1(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha256")]
            Self::Sha256(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha384")]
            Self::Sha384(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha512")]
            Self::Sha512(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha3_256")]
            Self::Sha3_256(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha3_384")]
            Self::Sha3_384(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sha3_512")]
            Self::Sha3_512(instance) => update_from_io_slices(instance, data),
            #[cfg(feature = "sm3_256")]
            Self::Sm3_256(instance) => update_from_io_slices(instance, data),
        }
    }

    /// `digest.len()` must equal [`digest_len()`](Self::digest_len).
    pub fn finalize_into(self, digest: &mut [u8]) {
        debug_assert_eq!(digest.len(), self.digest_len());
        match self {
            #[cfg(feature = "sha1")]
            Self::Sha1(instance) => {
                let digest: &mut crypto_common::Output<Hmac<sha1::Sha1>> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha256")]
            Self::Sha256(instance) => {
                let digest: &mut crypto_common::Output<Hmac<sha2::Sha256>> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha384")]
            Self::Sha384(instance) => {
                let digest: &mut crypto_common::Output<Hmac<sha2::Sha384>> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha512")]
            Self::Sha512(instance) => {
                let digest: &mut crypto_common::Output<Hmac<sha2::Sha512>> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha3_256")]
            Self::Sha3_256(instance) => {
                let digest: &mut crypto_common::Output<Hmac<sha3::Sha3_256>> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha3_384")]
            Self::Sha3_384(instance) => {
                let digest: &mut crypto_common::Output<Hmac<sha3::Sha3_384>> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sha3_512")]
            Self::Sha3_512(instance) => {
                let digest: &mut crypto_common::Output<Hmac<sha3::Sha3_512>> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
            #[cfg(feature = "sm3_256")]
            Self::Sm3_256(instance) => {
                let digest: &mut crypto_common::Output<Hmac<sm3::Sm3>> = digest.into();
                digest::FixedOutput::finalize_into(instance, digest);
            }
        }
    }

    pub fn digest_len(&self) -> usize {
        match self {
            #[cfg(feature = "sha1")]
            Self::Sha1(_) => <Hmac<sha1::Sha1> as crypto_common::OutputSizeUser>::output_size(),
            #[cfg(feature = "sha256")]
            Self::Sha256(_) => <Hmac<sha2::Sha256> as crypto_common::OutputSizeUser>::output_size(),
            #[cfg(feature = "sha384")]
            Self::Sha384(_) => <Hmac<sha2::Sha384> as crypto_common::OutputSizeUser>::output_size(),
            #[cfg(feature = "sha512")]
            Self::Sha512(_) => <Hmac<sha2::Sha512> as crypto_common::OutputSizeUser>::output_size(),
            #[cfg(feature = "sha3_256")]
            Self::Sha3_256(_) => {
                <Hmac<sha3::Sha3_256> as crypto_common::OutputSizeUser>::output_size()
            }
            #[cfg(feature = "sha3_384")]
            Self::Sha3_384(_) => {
                <Hmac<sha3::Sha3_384> as crypto_common::OutputSizeUser>::output_size()
            }
            #[cfg(feature = "sha3_512")]
            Self::Sha3_512(_) => {
                <Hmac<sha3::Sha3_512> as crypto_common::OutputSizeUser>::output_size()
            }
            #[cfg(feature = "sm3_256")]
            Self::Sm3_256(_) => <Hmac<sm3::Sm3> as crypto_common::OutputSizeUser>::output_size(),
        }
    }
}

#[cfg(test)]
const TEST_HASH_ALGS: &[interface::TpmiAlgHash] = &[
    #[cfg(feature = "sha1")]
    interface::TpmiAlgHash::Sha1,
    #[cfg(feature = "sha256")]
    interface::TpmiAlgHash::Sha256,
    #[cfg(feature = "sha384")]
    interface::TpmiAlgHash::Sha384,
    #[cfg(feature = "sha512")]
    interface::TpmiAlgHash::Sha512,
    #[cfg(feature = "sha3_256")]
    interface::TpmiAlgHash::Sha3_256,
    #[cfg(feature = "sha3_384")]
    interface::TpmiAlgHash::Sha3_384,
    #[cfg(feature = "sha3_512")]
    interface::TpmiAlgHash::Sha3_512,
    #[cfg(feature = "sm3_256")]
    interface::TpmiAlgHash::Sm3_256,
];

#[test]
fn test_digest_len_table() {
    for alg in TEST_HASH_ALGS.iter() {
        let expected = hash_alg_digest_len(*alg) as usize;
        assert_ne!(expected, 0);
        assert_eq!(HashInstance::new(*alg).digest_len(), expected);
        assert_eq!(HmacInstance::new(*alg, b"key").unwrap().digest_len(), expected);
    }
}

#[test]
fn test_hash_update_scatter_list() {
    // Splitting the message over several slices must not matter.
    for alg in TEST_HASH_ALGS.iter() {
        let digest_len = hash_alg_digest_len(*alg) as usize;
        let mut d0 = [0u8; 64];
        let mut h = HashInstance::new(*alg);
        h.update(io_slices::IoSlices::new(&mut [Some(b"abcdef".as_slice())]));
        h.finalize_into(&mut d0[..digest_len]);

        let mut d1 = [0u8; 64];
        let mut h = HashInstance::new(*alg);
        h.update(io_slices::IoSlices::new(&mut [
            Some(b"ab".as_slice()),
            None,
            Some(b"".as_slice()),
            Some(b"cdef".as_slice()),
        ]));
        h.finalize_into(&mut d1[..digest_len]);
        assert_eq!(d0, d1);
    }
}

#[test]
#[cfg(feature = "sha256")]
fn test_hmac_sha256_rfc4231() {
    use hex_literal::hex;

    // RFC 4231, test case 2.
    let mut h = HmacInstance::new(interface::TpmiAlgHash::Sha256, b"Jefe").unwrap();
    h.update(io_slices::IoSlices::new(&mut [
        Some(b"what do ya want ".as_slice()),
        Some(b"for nothing?".as_slice()),
    ]));
    let mut mac = [0u8; 32];
    h.finalize_into(&mut mac);
    assert_eq!(
        mac,
        hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
    );
}
