//! TPM2 key derivation functions.
//!
//! Both [`KDFa()`](tcg_tpm2_kdf_a::TcgTpm2KdfA) and
//! [`KDFe()`](tcg_tpm2_kdf_e::TcgTpm2KdfE) produce their output as a
//! sequence of fixed size PRF blocks, the first block being keyed with
//! counter value 1. The output is truncated to the requested number of
//! bits, excess bits being cleared in the first octet. The
//! [`FixedBlockOutputKdf`] trait captures the block generation, the
//! [`Kdf`] and [`VariableChunkOutputKdf`] traits provide for writing (or
//! xoring) the stream into arbitrary scatter lists of destination buffers.
//!
//! For the common case of deriving a single key into an owned buffer, use
//! [`kdf_a()`] or [`kdf_e()`].

extern crate alloc;
use crate::crypto::{io_slices, xor};
use crate::interface;
use crate::utils::{self, cfg_zeroize};
use alloc::vec::Vec;
use cfg_zeroize::Zeroize as _;
use tracing::instrument;

pub mod tcg_tpm2_kdf_a;
#[cfg(feature = "ecdh")]
pub mod tcg_tpm2_kdf_e;

// Appended to the label unconditionally, no matter whether the label
// itself contains zero bytes already.
const LABEL_TERMINATOR: &[u8] = &[0u8];

/// KDFa() label for deriving parameter obfuscation masks, TCG TPM2 Library
/// specification, Part 1, section 11.4.6.3 ("XOR Parameter Obfuscation").
pub const XOR_LABEL: &str = "XOR";

/// Number of octets needed for holding `n_bits` bits.
pub const fn bits_to_octets(n_bits: u32) -> usize {
    (n_bits / 8) as usize + (n_bits % 8 != 0) as usize
}

/// Mask to be and-ed to the first output octet for an `n_bits` output.
pub const fn first_octet_mask(n_bits: u32) -> u8 {
    if n_bits % 8 == 0 {
        0xffu8
    } else {
        0xffu8 >> (8 - n_bits % 8)
    }
}

/// Clamp a freshly generated PRF block to the requested output length.
///
/// `block_offset` is the position of `block` within the output stream of a
/// KDF instantiated for `n_total_bits` bits. The excess high bits get
/// cleared if `block` is the first one, and whatever is beyond the end of
/// the output stream gets wiped.
///
/// Returns the number of valid octets at the head of `block`.
pub fn clamp_block_to_bits(block: &mut [u8], block_offset: usize, n_total_bits: u32) -> usize {
    let valid_len = bits_to_octets(n_total_bits)
        .saturating_sub(block_offset)
        .min(block.len());
    if block_offset == 0 && valid_len != 0 {
        block[0] &= first_octet_mask(n_total_bits);
    }
    block[valid_len..].fill(0);
    valid_len
}

/// Truncate an accumulated PRF output stream to exactly `n_bits` bits.
///
/// Keeps the first `ceil(n_bits / 8)` octets of `buf` and clears the
/// `8 - n_bits % 8` most significant bits of the first one, if any. Fails
/// with `TPM_RC_SIZE` if `n_bits` is zero or if `buf` is too short.
pub fn truncate_to_bits(buf: &mut Vec<u8>, n_bits: u32) -> Result<(), interface::TpmErr> {
    if n_bits == 0 || buf.len() < bits_to_octets(n_bits) {
        return Err(tpm_err_rc!(SIZE));
    }
    let len = clamp_block_to_bits(buf, 0, n_bits);
    buf.truncate(len);
    Ok(())
}

pub trait Kdf {
    fn max_output_len(&self) -> Option<usize>;

    fn generate(self, output: &mut io_slices::IoSlicesMut) -> Result<(), interface::TpmErr>;

    fn generate_and_xor(self, output: &mut io_slices::IoSlicesMut)
        -> Result<(), interface::TpmErr>;
}

pub trait VariableChunkOutputKdf {
    fn max_remaining_len(&self) -> Option<usize>;

    fn generate_chunk(
        &mut self,
        output: &mut io_slices::IoSlicesMut,
    ) -> Result<(), interface::TpmErr>;

    fn generate_and_xor_chunk(
        &mut self,
        output: &mut io_slices::IoSlicesMut,
    ) -> Result<(), interface::TpmErr>;
}

impl<VK: VariableChunkOutputKdf> Kdf for VK {
    fn max_output_len(&self) -> Option<usize> {
        self.max_remaining_len()
    }

    fn generate(mut self, output: &mut io_slices::IoSlicesMut) -> Result<(), interface::TpmErr> {
        self.generate_chunk(output)
    }

    fn generate_and_xor(
        mut self,
        output: &mut io_slices::IoSlicesMut,
    ) -> Result<(), interface::TpmErr> {
        self.generate_and_xor_chunk(output)
    }
}

pub trait FixedBlockOutputKdf: Sized {
    fn block_len(&self) -> usize;

    fn max_remaining_len(&self) -> Option<usize>;

    /// Generate the next block into `output`, which must be exactly
    /// [`block_len()`](Self::block_len) long.
    ///
    /// Returns the number of valid octets produced, which is less than the
    /// block length only for a final, truncated block.
    fn generate_block(&mut self, output: &mut [u8]) -> Result<usize, interface::TpmErr>;

    fn generate_chunk_impl(
        &mut self,
        output: &mut io_slices::IoSlicesMut,
        block_buf: &mut [u8],
        block_buf_remaining_len: usize,
    ) -> Result<usize, interface::TpmErr> {
        emit_chunk(self, output, block_buf, block_buf_remaining_len, ChunkOp::Copy)
    }

    fn generate_and_xor_chunk_impl(
        &mut self,
        output: &mut io_slices::IoSlicesMut,
        block_buf: &mut [u8],
        block_buf_remaining_len: usize,
    ) -> Result<usize, interface::TpmErr> {
        emit_chunk(self, output, block_buf, block_buf_remaining_len, ChunkOp::Xor)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ChunkOp {
    Copy,
    Xor,
}

impl ChunkOp {
    fn apply(self, dst: &mut [u8], src: &[u8]) {
        match self {
            Self::Copy => dst.copy_from_slice(src),
            Self::Xor => xor::xor_bytes(dst, src),
        }
    }
}

// The trailing block_buf_remaining_len bytes of block_buf[] hold output
// generated, but not consumed yet by a previous invocation. Returns the
// updated value.
fn emit_chunk<BK: FixedBlockOutputKdf>(
    block_kdf: &mut BK,
    output: &mut io_slices::IoSlicesMut,
    block_buf: &mut [u8],
    mut block_buf_remaining_len: usize,
    op: ChunkOp,
) -> Result<usize, interface::TpmErr> {
    if let Some(max_remaining_len) = block_kdf.max_remaining_len() {
        if output.len() > max_remaining_len + block_buf_remaining_len {
            return Err(tpm_err_internal!());
        }
    }

    let block_len = block_kdf.block_len();
    while let Some(output0) = output.first() {
        let output0_len = output0.len();
        if block_buf_remaining_len != 0 {
            let output0_len = output0_len.min(block_buf_remaining_len);
            let block_buf_src_begin = block_len - block_buf_remaining_len;
            let block_buf_src_end = block_buf_src_begin + output0_len;
            op.apply(
                &mut output0[..output0_len],
                &block_buf[block_buf_src_begin..block_buf_src_end],
            );
            block_buf_remaining_len -= output0_len;
            output.advance(output0_len);
        } else if op == ChunkOp::Copy && output0_len >= block_len {
            let cur_block_len = block_kdf.generate_block(&mut output0[..block_len])?;
            debug_assert_eq!(cur_block_len, block_len);
            output.advance(cur_block_len);
        } else {
            if block_buf.len() != block_len {
                return Err(tpm_err_internal!());
            }
            let cur_block_len = block_kdf.generate_block(block_buf)?;
            if cur_block_len == 0 {
                return Err(tpm_err_internal!());
            } else if cur_block_len != block_len {
                // Buffered output gets consumed from the tail of block_buf[].
                block_buf.copy_within(..cur_block_len, block_len - cur_block_len);
            }
            block_buf_remaining_len = cur_block_len;
        }
    }

    // Wipe out the bytes consumed from the block_buf[]. Callers may pass an
    // empty block_buf[] if they can guarantee that it won't get used for the
    // given output slices.
    if !block_buf.is_empty() {
        block_buf[..block_len - block_buf_remaining_len].zeroize();
    }

    Ok(block_buf_remaining_len)
}

// Kdf::generate() and Kdf::generate_and_xor() for FixedBlockOutputKdf
// implementations.
fn generate_unbuffered<BK: FixedBlockOutputKdf>(
    mut block_kdf: BK,
    output: &mut io_slices::IoSlicesMut,
    op: ChunkOp,
) -> Result<(), interface::TpmErr> {
    if let Some(max_remaining_len) = block_kdf.max_remaining_len() {
        if output.len() > max_remaining_len {
            return Err(tpm_err_internal!());
        }
    }

    // The block scratch buf will only be needed if any of the output slices'
    // lengths doesn't align with the block length, or for xoring.
    let block_len = block_kdf.block_len();
    let block_scratch_buf_len =
        if op == ChunkOp::Xor || output.iter().any(|s| s.len() % block_len != 0) {
            block_len
        } else {
            0
        };
    let mut block_scratch_buf = utils::try_alloc_zeroizing_vec::<u8>(block_scratch_buf_len)?;
    emit_chunk(
        &mut block_kdf,
        output,
        block_scratch_buf.as_mut_slice(),
        0,
        op,
    )?;
    Ok(())
}

pub struct BufferedFixedBlockOutputKdf<BK: FixedBlockOutputKdf> {
    block_kdf: BK,
    block_buf: cfg_zeroize::Zeroizing<Vec<u8>>,
    block_buf_remaining_len: usize,
}

impl<BK: FixedBlockOutputKdf> BufferedFixedBlockOutputKdf<BK> {
    pub fn new(block_kdf: BK) -> Result<Self, interface::TpmErr> {
        let block_len = block_kdf.block_len();
        let block_buf = utils::try_alloc_zeroizing_vec::<u8>(block_len)?;
        Ok(Self {
            block_kdf,
            block_buf,
            block_buf_remaining_len: 0,
        })
    }
}

impl<BK: FixedBlockOutputKdf> VariableChunkOutputKdf for BufferedFixedBlockOutputKdf<BK> {
    fn max_remaining_len(&self) -> Option<usize> {
        self.block_kdf
            .max_remaining_len()
            .map(|max_remaining: usize| max_remaining + self.block_buf_remaining_len)
    }

    fn generate_chunk(
        &mut self,
        output: &mut io_slices::IoSlicesMut,
    ) -> Result<(), interface::TpmErr> {
        self.block_buf_remaining_len = self.block_kdf.generate_chunk_impl(
            output,
            self.block_buf.as_mut_slice(),
            self.block_buf_remaining_len,
        )?;
        Ok(())
    }

    fn generate_and_xor_chunk(
        &mut self,
        output: &mut io_slices::IoSlicesMut,
    ) -> Result<(), interface::TpmErr> {
        self.block_buf_remaining_len = self.block_kdf.generate_and_xor_chunk_impl(
            output,
            self.block_buf.as_mut_slice(),
            self.block_buf_remaining_len,
        )?;
        Ok(())
    }
}

// Concatenate all of the PRF blocks, then cut the stream down to n_bits.
fn generate_owned<BK: FixedBlockOutputKdf>(
    mut block_kdf: BK,
    n_bits: u32,
) -> Result<cfg_zeroize::Zeroizing<Vec<u8>>, interface::TpmErr> {
    let block_len = block_kdf.block_len();
    let blocks_len = bits_to_octets(n_bits)
        .div_ceil(block_len)
        .checked_mul(block_len)
        .ok_or(tpm_err_rc!(SIZE))?;
    let mut output = utils::try_alloc_zeroizing_vec::<u8>(blocks_len)?;
    for block in output.chunks_exact_mut(block_len) {
        block_kdf.generate_block(block)?;
    }
    truncate_to_bits(&mut output, n_bits)?;
    Ok(output)
}

/// `KDFa(hash_alg, key, label, context_u, context_v, n_bits)`
///
/// Returns exactly `ceil(n_bits / 8)` octets. Fails with `TPM_RC_HASH` if
/// `hash_alg` doesn't identify a supported hash and with `TPM_RC_SIZE` for a
/// zero `n_bits`.
#[instrument(level = "debug", skip(key, context_u, context_v), fields(key_len = key.len()))]
pub fn kdf_a(
    hash_alg: interface::TpmAlgId,
    key: &[u8],
    label: &str,
    context_u: &[u8],
    context_v: &[u8],
    n_bits: u32,
) -> Result<cfg_zeroize::Zeroizing<Vec<u8>>, interface::TpmErr> {
    let hash_alg = interface::TpmiAlgHash::try_from(hash_alg)?;
    let kdf = tcg_tpm2_kdf_a::TcgTpm2KdfA::new(
        hash_alg,
        key,
        label,
        Some(context_u),
        Some(context_v),
        n_bits,
    )?;
    generate_owned(kdf, n_bits)
}

/// `KDFe(hash_alg, z, label, party_u_info, party_v_info, n_bits)`
///
/// Same output and error conventions as [`kdf_a()`].
#[cfg(feature = "ecdh")]
#[instrument(level = "debug", skip(z, party_u_info, party_v_info), fields(z_len = z.len()))]
pub fn kdf_e(
    hash_alg: interface::TpmAlgId,
    z: &[u8],
    label: &str,
    party_u_info: &[u8],
    party_v_info: &[u8],
    n_bits: u32,
) -> Result<cfg_zeroize::Zeroizing<Vec<u8>>, interface::TpmErr> {
    let hash_alg = interface::TpmiAlgHash::try_from(hash_alg)?;
    let kdf = tcg_tpm2_kdf_e::TcgTpm2KdfE::new(
        hash_alg,
        z,
        label,
        party_u_info,
        party_v_info,
        n_bits,
    )?;
    generate_owned(kdf, n_bits)
}

/// XOR parameter obfuscation, TCG TPM2 Library specification, Part 1,
/// section 11.4.6.3.
///
/// Xors `data` with `KDFa(hash_alg, hmac_key, "XOR", context_u, context_v,
/// 8 * data.len())`. Applying it twice yields the input again.
#[instrument(
    level = "debug",
    skip(hmac_key, context_u, context_v, data),
    fields(data_len = data.len())
)]
pub fn xor_obfuscate(
    hash_alg: interface::TpmiAlgHash,
    hmac_key: &[u8],
    context_u: &[u8],
    context_v: &[u8],
    data: &mut [u8],
) -> Result<(), interface::TpmErr> {
    if data.is_empty() {
        return Ok(());
    }
    let n_bits = u32::try_from(data.len())
        .ok()
        .and_then(|len| len.checked_mul(8))
        .ok_or(tpm_err_rc!(SIZE))?;
    let kdf = tcg_tpm2_kdf_a::TcgTpm2KdfA::new(
        hash_alg,
        hmac_key,
        XOR_LABEL,
        Some(context_u),
        Some(context_v),
        n_bits,
    )?;
    kdf.generate_and_xor(&mut io_slices::IoSlicesMut::new(&mut [Some(data)]))
}

#[test]
fn test_bits_to_octets() {
    assert_eq!(bits_to_octets(0), 0);
    assert_eq!(bits_to_octets(1), 1);
    assert_eq!(bits_to_octets(8), 1);
    assert_eq!(bits_to_octets(100), 13);
    assert_eq!(bits_to_octets(521), 66);
    assert_eq!(bits_to_octets(1600), 200);
    assert_eq!(bits_to_octets(u32::MAX), 0x2000_0000);
}

#[test]
fn test_first_octet_mask() {
    assert_eq!(first_octet_mask(128), 0xff);
    assert_eq!(first_octet_mask(100), 0x0f);
    assert_eq!(first_octet_mask(521), 0x01);
    assert_eq!(first_octet_mask(7), 0x7f);
}

#[test]
fn test_truncate_to_bits() {
    use alloc::vec;

    let mut buf = vec![0xffu8; 40];
    truncate_to_bits(&mut buf, 256).unwrap();
    assert_eq!(buf, [0xffu8; 32]);

    // Trailing octets get dropped, never leading ones.
    let mut buf: Vec<u8> = (0xf0u8..=0xffu8).collect();
    truncate_to_bits(&mut buf, 100).unwrap();
    assert_eq!(buf.len(), 13);
    assert_eq!(buf[0], 0x00);
    assert_eq!(buf[1..], [0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa, 0xfb, 0xfc]);

    let mut buf = vec![0xffu8; 80];
    truncate_to_bits(&mut buf, 521).unwrap();
    assert_eq!(buf.len(), 66);
    assert_eq!(buf[0], 0x01);
    assert!(buf[1..].iter().all(|b| *b == 0xff));

    let mut buf = vec![0xffu8; 12];
    assert_eq!(truncate_to_bits(&mut buf, 100), Err(tpm_err_rc!(SIZE)));
    assert_eq!(truncate_to_bits(&mut buf, 0), Err(tpm_err_rc!(SIZE)));
}

#[test]
fn test_clamp_block_to_bits() {
    // Second block of a 40 octet output, 20 octet blocks.
    let mut block = [0xffu8; 20];
    assert_eq!(clamp_block_to_bits(&mut block, 20, 317), 20);
    assert_eq!(block, [0xffu8; 20]);

    // Final, partial block.
    let mut block = [0xffu8; 20];
    assert_eq!(clamp_block_to_bits(&mut block, 40, 397), 10);
    assert_eq!(block[..10], [0xffu8; 10]);
    assert_eq!(block[10..], [0u8; 10]);

    // Single block that's both first and last.
    let mut block = [0xffu8; 32];
    assert_eq!(clamp_block_to_bits(&mut block, 0, 12), 2);
    assert_eq!(block[..2], [0x0f, 0xff]);
    assert_eq!(block[2..], [0u8; 30]);
}

#[test]
#[cfg(feature = "sha256")]
fn test_kdf_a_identity_sha256() {
    use hex_literal::hex;

    let derived = kdf_a(
        interface::TpmAlgId::SHA256,
        b"yolo\0",
        "IDENTITY",
        b"kek\0",
        b"yoyo\0",
        128,
    )
    .unwrap();
    assert_eq!(derived.as_slice(), hex!("d2d72cc7a8a5eb09e8c79012e2da9f22"));
}

#[test]
#[cfg(feature = "sha1")]
fn test_kdf_a_identity_sha1() {
    use hex_literal::hex;

    let derived = kdf_a(
        interface::TpmAlgId::SHA1,
        b"ca\0",
        "IDENTITY",
        b"abc\0",
        b"",
        256,
    )
    .unwrap();
    assert_eq!(
        derived.as_slice(),
        hex!("83f354afcf923de2112e0891434cd0bdc8acbf01b811c0e8cd062ded39e31f7f")
    );
}

#[test]
#[cfg(all(feature = "ecdh", feature = "sha256"))]
fn test_kdf_e_shorter_than_hash() {
    use hex_literal::hex;

    let derived = kdf_e(
        interface::TpmAlgId::SHA256,
        &hex!("9ec0691d3c5d35fbb2dcf082b0bb4d1df07ee0c5bf27251fffa973ee339e5e62"),
        "DUPLICATE",
        &hex!("68d62d3449e0db8c1af57adba15343bc34f2a6e76a9750f476e61862db8f0bec"),
        &hex!("aab7cab361d8f31d0f6a98cc3c11bbe9983bf91fc4c53e90d5cb10eb74fd5c3a"),
        100,
    )
    .unwrap();
    assert_eq!(derived.as_slice(), hex!("050054d3d778059120af6d0313"));
    assert_eq!(derived[0] & 0xf0, 0);
}

#[test]
fn test_kdf_unsupported_hash() {
    // TPM_ALG_HMAC is an algorithm, but not a hash.
    for alg in [interface::TpmAlgId(0x0005), interface::TpmAlgId(0x7fff)] {
        assert_eq!(
            kdf_a(alg, b"key", "IDENTITY", b"", b"", 128).err(),
            Some(tpm_err_rc!(HASH))
        );
        #[cfg(feature = "ecdh")]
        assert_eq!(
            kdf_e(alg, b"z", "DUPLICATE", b"", b"", 128).err(),
            Some(tpm_err_rc!(HASH))
        );
    }
}

#[test]
#[cfg(feature = "sha256")]
fn test_kdf_zero_bits() {
    assert_eq!(
        kdf_a(interface::TpmAlgId::SHA256, b"key", "IDENTITY", b"", b"", 0).err(),
        Some(tpm_err_rc!(SIZE))
    );
    #[cfg(feature = "ecdh")]
    assert_eq!(
        kdf_e(interface::TpmAlgId::SHA256, b"z", "DUPLICATE", b"", b"", 0).err(),
        Some(tpm_err_rc!(SIZE))
    );
}

#[test]
#[cfg(feature = "sha256")]
fn test_xor_obfuscate() {
    const NONCE_NEWER: &[u8] = b"nonce newer";
    const NONCE_OLDER: &[u8] = b"nonce older";
    let plain: Vec<u8> = (0u8..77u8).collect();

    let mut data = plain.clone();
    xor_obfuscate(
        interface::TpmiAlgHash::Sha256,
        b"session key",
        NONCE_NEWER,
        NONCE_OLDER,
        &mut data,
    )
    .unwrap();

    // The mask is the plain KDFa() output.
    let mask = kdf_a(
        interface::TpmAlgId::SHA256,
        b"session key",
        XOR_LABEL,
        NONCE_NEWER,
        NONCE_OLDER,
        8 * plain.len() as u32,
    )
    .unwrap();
    for i in 0..plain.len() {
        assert_eq!(data[i], plain[i] ^ mask[i]);
    }

    xor_obfuscate(
        interface::TpmiAlgHash::Sha256,
        b"session key",
        NONCE_NEWER,
        NONCE_OLDER,
        &mut data,
    )
    .unwrap();
    assert_eq!(data, plain);

    let mut empty = [0u8; 0];
    xor_obfuscate(
        interface::TpmiAlgHash::Sha256,
        b"session key",
        NONCE_NEWER,
        NONCE_OLDER,
        &mut empty,
    )
    .unwrap();
}

#[test]
#[cfg(feature = "sha1")]
fn test_generate_into_scatter_list() {
    use alloc::vec;

    // 397 bits -> 50 octets out of three 20 octet SHA-1 blocks.
    let new_kdf = || {
        tcg_tpm2_kdf_a::TcgTpm2KdfA::new(
            interface::TpmiAlgHash::Sha1,
            b"key",
            "scatter",
            Some(b"u".as_slice()),
            None,
            397,
        )
        .unwrap()
    };
    let mut expected = vec![0u8; 50];
    new_kdf()
        .generate(&mut io_slices::IoSlicesMut::new(&mut [Some(
            expected.as_mut_slice(),
        )]))
        .unwrap();

    // Block aligned and unaligned slices mixed.
    let mut a = [0u8; 20];
    let mut b = [0u8; 3];
    let mut c = [0u8; 27];
    let mut empty = [0u8; 0];
    new_kdf()
        .generate(&mut io_slices::IoSlicesMut::new(&mut [
            Some(a.as_mut_slice()),
            None,
            Some(b.as_mut_slice()),
            Some(empty.as_mut_slice()),
            Some(c.as_mut_slice()),
        ]))
        .unwrap();
    assert_eq!(a, expected[..20]);
    assert_eq!(b, expected[20..23]);
    assert_eq!(c, expected[23..]);

    // Xoring the stream onto itself yields zeroes.
    let mut x = expected.clone();
    let (x0, x1) = x.split_at_mut(7);
    new_kdf()
        .generate_and_xor(&mut io_slices::IoSlicesMut::new(&mut [Some(x0), Some(x1)]))
        .unwrap();
    assert!(x.iter().all(|b| *b == 0));

    // Requesting more than 397 bits is an error.
    let mut too_long = [0u8; 51];
    assert_eq!(
        new_kdf().generate(&mut io_slices::IoSlicesMut::new(&mut [Some(
            too_long.as_mut_slice()
        )])),
        Err(tpm_err_internal!())
    );
}

#[test]
#[cfg(all(feature = "sha1", feature = "ecdh"))]
fn test_one_shot_matches_streaming() {
    use alloc::vec;

    // 397 bits span three SHA-1 blocks, the last one partially.
    let mut expected = vec![0u8; bits_to_octets(397)];
    tcg_tpm2_kdf_a::TcgTpm2KdfA::new(
        interface::TpmiAlgHash::Sha1,
        b"key",
        "STREAM",
        Some(b"u".as_slice()),
        Some(b"v".as_slice()),
        397,
    )
    .unwrap()
    .generate(&mut io_slices::IoSlicesMut::new(&mut [Some(expected.as_mut_slice())]))
    .unwrap();
    let derived = kdf_a(interface::TpmAlgId::SHA1, b"key", "STREAM", b"u", b"v", 397).unwrap();
    assert_eq!(derived.as_slice(), expected.as_slice());
    assert_eq!(derived.len(), 50);
    assert_eq!(derived[0] & 0xe0, 0);

    let mut expected = vec![0u8; bits_to_octets(397)];
    tcg_tpm2_kdf_e::TcgTpm2KdfE::new(interface::TpmiAlgHash::Sha1, b"z", "STREAM", b"u", b"v", 397)
        .unwrap()
        .generate(&mut io_slices::IoSlicesMut::new(&mut [Some(expected.as_mut_slice())]))
        .unwrap();
    let derived = kdf_e(interface::TpmAlgId::SHA1, b"z", "STREAM", b"u", b"v", 397).unwrap();
    assert_eq!(derived.as_slice(), expected.as_slice());
}
