// SPDX-License-Identifier: Apache-2.0
// Copyright 2023 SUSE LLC
// Author: Nicolai Stange <nstange@suse.de>

//! TPM2 interface definitions consumed by the key derivation functions.

use core::fmt;

/// TPM_RC response code, TCG TPM2 Library specification, Part 2, section 6.6.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TpmRc(u32);

impl TpmRc {
    const RC_FMT1: u32 = 0x080;
    const RC_WARN: u32 = 0x900;

    /// Hash algorithm not supported or not appropriate.
    pub const HASH: Self = Self(Self::RC_FMT1 + 0x003);
    /// Structure or requested output is the wrong size.
    pub const SIZE: Self = Self(Self::RC_FMT1 + 0x015);
    /// Out of memory.
    pub const MEMORY: Self = Self(Self::RC_WARN + 0x004);

    pub const fn value(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TpmErr {
    Rc(TpmRc),
    InternalErr,
}

impl fmt::Display for TpmErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rc(rc) if *rc == TpmRc::HASH => f.write_str("unsupported hash algorithm"),
            Self::Rc(rc) if *rc == TpmRc::SIZE => f.write_str("invalid output length"),
            Self::Rc(rc) if *rc == TpmRc::MEMORY => f.write_str("out of memory"),
            Self::Rc(rc) => write!(f, "TPM_RC {:#05x}", rc.value()),
            Self::InternalErr => f.write_str("internal error"),
        }
    }
}

/// Raw TPM_ALG_ID, Part 2, section 6.3. Not every value names a hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TpmAlgId(pub u16);

impl TpmAlgId {
    pub const SHA1: Self = Self(0x0004);
    pub const SHA256: Self = Self(0x000b);
    pub const SHA384: Self = Self(0x000c);
    pub const SHA512: Self = Self(0x000d);
    pub const SM3_256: Self = Self(0x0012);
    pub const SHA3_256: Self = Self(0x0027);
    pub const SHA3_384: Self = Self(0x0028);
    pub const SHA3_512: Self = Self(0x0029);
}

/// TPMI_ALG_HASH, restricted to the hashes enabled at build time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TpmiAlgHash {
    #[cfg(feature = "sha1")]
    Sha1,
    #[cfg(feature = "sha256")]
    Sha256,
    #[cfg(feature = "sha384")]
    Sha384,
    #[cfg(feature = "sha512")]
    Sha512,
    #[cfg(feature = "sha3_256")]
    Sha3_256,
    #[cfg(feature = "sha3_384")]
    Sha3_384,
    #[cfg(feature = "sha3_512")]
    Sha3_512,
    #[cfg(feature = "sm3_256")]
    Sm3_256,
}

impl TryFrom<TpmAlgId> for TpmiAlgHash {
    type Error = TpmErr;

    fn try_from(alg: TpmAlgId) -> Result<Self, Self::Error> {
        match alg {
            #[cfg(feature = "sha1")]
            TpmAlgId::SHA1 => Ok(Self::Sha1),
            #[cfg(feature = "sha256")]
            TpmAlgId::SHA256 => Ok(Self::Sha256),
            #[cfg(feature = "sha384")]
            TpmAlgId::SHA384 => Ok(Self::Sha384),
            #[cfg(feature = "sha512")]
            TpmAlgId::SHA512 => Ok(Self::Sha512),
            #[cfg(feature = "sha3_256")]
            TpmAlgId::SHA3_256 => Ok(Self::Sha3_256),
            #[cfg(feature = "sha3_384")]
            TpmAlgId::SHA3_384 => Ok(Self::Sha3_384),
            #[cfg(feature = "sha3_512")]
            TpmAlgId::SHA3_512 => Ok(Self::Sha3_512),
            #[cfg(feature = "sm3_256")]
            TpmAlgId::SM3_256 => Ok(Self::Sm3_256),
            _ => Err(tpm_err_rc!(HASH)),
        }
    }
}

impl From<TpmiAlgHash> for TpmAlgId {
    fn from(alg: TpmiAlgHash) -> Self {
        match alg {
            #[cfg(feature = "sha1")]
            TpmiAlgHash::Sha1 => Self::SHA1,
            #[cfg(feature = "sha256")]
            TpmiAlgHash::Sha256 => Self::SHA256,
            #[cfg(feature = "sha384")]
            TpmiAlgHash::Sha384 => Self::SHA384,
            #[cfg(feature = "sha512")]
            TpmiAlgHash::Sha512 => Self::SHA512,
            #[cfg(feature = "sha3_256")]
            TpmiAlgHash::Sha3_256 => Self::SHA3_256,
            #[cfg(feature = "sha3_384")]
            TpmiAlgHash::Sha3_384 => Self::SHA3_384,
            #[cfg(feature = "sha3_512")]
            TpmiAlgHash::Sha3_512 => Self::SHA3_512,
            #[cfg(feature = "sm3_256")]
            TpmiAlgHash::Sm3_256 => Self::SM3_256,
        }
    }
}

#[test]
fn test_tpmi_alg_hash_from_alg_id() {
    // TPM_ALG_RSA, TPM_ALG_HMAC, TPM_ALG_NULL and an unassigned value.
    for alg in [0x0001u16, 0x0005, 0x0010, 0xffff] {
        assert_eq!(
            TpmiAlgHash::try_from(TpmAlgId(alg)),
            Err(TpmErr::Rc(TpmRc::HASH))
        );
    }

    #[cfg(feature = "sha1")]
    assert_eq!(TpmiAlgHash::try_from(TpmAlgId(0x0004)), Ok(TpmiAlgHash::Sha1));
    #[cfg(feature = "sha256")]
    assert_eq!(TpmiAlgHash::try_from(TpmAlgId(0x000b)), Ok(TpmiAlgHash::Sha256));
    #[cfg(feature = "sha3_512")]
    assert_eq!(
        TpmAlgId::from(TpmiAlgHash::Sha3_512),
        TpmAlgId::SHA3_512
    );
}

#[test]
fn test_tpm_err_display() {
    extern crate alloc;
    use alloc::string::ToString as _;

    assert_eq!(tpm_err_rc!(HASH).to_string(), "unsupported hash algorithm");
    assert_eq!(tpm_err_rc!(SIZE).to_string(), "invalid output length");
    assert_eq!(TpmErr::Rc(TpmRc(0x0101)).to_string(), "TPM_RC 0x101");
    assert_eq!(tpm_rc!(MEMORY).value(), 0x904);
}
