// SPDX-License-Identifier: Apache-2.0
// Copyright 2023 SUSE LLC
// Author: Nicolai Stange <nstange@suse.de>

extern crate alloc;
use crate::crypto::{hash, io_slices, kdf};
use crate::interface;
#[cfg(test)]
use hex_literal::hex;

/// `KDFa()`, TCG TPM2 Library specification, Part 1 ("Architecture"),
/// section 11.4.10.2.
///
/// HMAC based counter mode KDF from NIST SP800-108. Block `i`, counting
/// from one, is computed as
/// `HMAC(key, [i] || label || 0x00 || context_u || context_v || [n_bits])`,
/// with `[x]` denoting the 32 bit big endian encoding of `x`.
///
/// Absent contexts contribute nothing to the HMAC input, just like empty
/// ones.
pub struct TcgTpm2KdfA<'a> {
    hmac_instance: Option<hash::HmacInstance>,
    block_len: usize,
    label: &'a str,
    context_u: Option<&'a [u8]>,
    context_v: Option<&'a [u8]>,
    n_total_output_bits: u32,
    n_total_output_bits_buf: [u8; 4],
    n_blocks_generated: u32,
}

impl<'a> TcgTpm2KdfA<'a> {
    pub fn new(
        hash_alg: interface::TpmiAlgHash,
        key: &[u8],
        label: &'a str,
        context_u: Option<&'a [u8]>,
        context_v: Option<&'a [u8]>,
        n_total_output_bits: u32,
    ) -> Result<Self, interface::TpmErr> {
        if n_total_output_bits == 0 {
            tracing::trace!(?hash_alg, "KDFa() requested for empty output");
            return Err(tpm_err_rc!(SIZE));
        }

        let hmac_instance = hash::HmacInstance::new(hash_alg, key)?;
        let block_len = hash::hash_alg_digest_len(hash_alg) as usize;
        tracing::trace!(?hash_alg, n_total_output_bits, block_len, "KDFa() instantiated");

        Ok(Self {
            hmac_instance: Some(hmac_instance),
            block_len,
            label,
            context_u,
            context_v,
            n_total_output_bits,
            n_total_output_bits_buf: n_total_output_bits.to_be_bytes(),
            n_blocks_generated: 0,
        })
    }

    fn generated_len(&self) -> usize {
        self.n_blocks_generated as usize * self.block_len
    }

    fn remaining_output_len(&self) -> usize {
        kdf::bits_to_octets(self.n_total_output_bits).saturating_sub(self.generated_len())
    }

    /// The HMAC message fields for the block with counter value
    /// `counter_buf`, in the order they get fed into the HMAC.
    pub fn block_input<'s>(&'s self, counter_buf: &'s [u8; 4]) -> [Option<&'s [u8]>; 6] {
        [
            Some(counter_buf.as_slice()),
            Some(self.label.as_bytes()),
            Some(kdf::LABEL_TERMINATOR),
            self.context_u,
            self.context_v,
            Some(self.n_total_output_bits_buf.as_slice()),
        ]
    }
}

impl<'a> kdf::FixedBlockOutputKdf for TcgTpm2KdfA<'a> {
    fn block_len(&self) -> usize {
        self.block_len
    }

    fn max_remaining_len(&self) -> Option<usize> {
        Some(self.remaining_output_len())
    }

    fn generate_block(&mut self, output: &mut [u8]) -> Result<usize, interface::TpmErr> {
        if output.len() != self.block_len {
            return Err(tpm_err_internal!());
        }

        // The final block may consume the keyed HMAC instance, all others
        // work on a copy.
        let remaining_output_len = self.remaining_output_len();
        let hmac_instance = if remaining_output_len > self.block_len {
            self.hmac_instance.clone()
        } else {
            self.hmac_instance.take()
        };
        // None if the last block has been produced already.
        let mut hmac_instance = hmac_instance.ok_or_else(|| tpm_err_internal!())?;

        let block_offset = self.generated_len();
        self.n_blocks_generated += 1;
        let counter_buf = self.n_blocks_generated.to_be_bytes();
        hmac_instance.update(io_slices::IoSlices::new(&mut self.block_input(&counter_buf)));
        hmac_instance.finalize_into(output);

        Ok(kdf::clamp_block_to_bits(
            output,
            block_offset,
            self.n_total_output_bits,
        ))
    }
}

impl<'a> kdf::Kdf for TcgTpm2KdfA<'a> {
    fn max_output_len(&self) -> Option<usize> {
        Some(self.remaining_output_len())
    }

    fn generate(self, output: &mut io_slices::IoSlicesMut) -> Result<(), interface::TpmErr> {
        kdf::generate_unbuffered(self, output, kdf::ChunkOp::Copy)
    }

    fn generate_and_xor(
        self,
        output: &mut io_slices::IoSlicesMut,
    ) -> Result<(), interface::TpmErr> {
        kdf::generate_unbuffered(self, output, kdf::ChunkOp::Xor)
    }
}

#[cfg(test)]
fn kdf_a_to_vec(
    hash_alg: interface::TpmiAlgHash,
    key: &[u8],
    label: &str,
    context_u: Option<&[u8]>,
    context_v: Option<&[u8]>,
    n_total_output_bits: u32,
) -> alloc::vec::Vec<u8> {
    use kdf::Kdf as _;

    let kdf = TcgTpm2KdfA::new(hash_alg, key, label, context_u, context_v, n_total_output_bits)
        .unwrap();
    let mut output = alloc::vec![0u8; kdf::bits_to_octets(n_total_output_bits)];
    kdf.generate(&mut io_slices::IoSlicesMut::new(&mut [Some(output.as_mut_slice())]))
        .unwrap();
    output
}

#[test]
#[cfg(feature = "sha256")]
fn test_kdf_a_block_input() {
    let kdf = TcgTpm2KdfA::new(
        interface::TpmiAlgHash::Sha256,
        b"key",
        "STORAGE",
        Some(b"name".as_slice()),
        None,
        0x1234_5678,
    )
    .unwrap();
    let counter_buf = 7u32.to_be_bytes();
    let fields = kdf.block_input(&counter_buf);
    assert_eq!(fields[0], Some([0u8, 0, 0, 7].as_slice()));
    assert_eq!(fields[1], Some(b"STORAGE".as_slice()));
    assert_eq!(fields[2], Some([0u8].as_slice()));
    assert_eq!(fields[3], Some(b"name".as_slice()));
    assert_eq!(fields[4], None);
    assert_eq!(fields[5], Some([0x12u8, 0x34, 0x56, 0x78].as_slice()));
}

#[test]
#[cfg(feature = "sha256")]
fn test_kdf_a_zero_bits() {
    assert!(matches!(
        TcgTpm2KdfA::new(interface::TpmiAlgHash::Sha256, b"key", "IDENTITY", None, None, 0),
        Err(interface::TpmErr::Rc(interface::TpmRc::SIZE))
    ));
}

#[test]
#[cfg(feature = "sha256")]
fn test_kdf_a_absent_context_is_empty() {
    assert_eq!(
        kdf_a_to_vec(
            interface::TpmiAlgHash::Sha256,
            b"key",
            "IDENTITY",
            None,
            None,
            256
        ),
        kdf_a_to_vec(
            interface::TpmiAlgHash::Sha256,
            b"key",
            "IDENTITY",
            Some(b"".as_slice()),
            Some(b"".as_slice()),
            256
        )
    );
}

#[test]
#[cfg(feature = "sha256")]
fn test_kdf_a_go_tpm_sha256() {
    assert_eq!(
        kdf_a_to_vec(
            interface::TpmiAlgHash::Sha256,
            b"yolo\0",
            "IDENTITY",
            Some(b"kek\0".as_slice()),
            Some(b"yoyo\0".as_slice()),
            128
        ),
        hex!("d2d72cc7a8a5eb09e8c79012e2da9f22")
    );

    assert_eq!(
        kdf_a_to_vec(
            interface::TpmiAlgHash::Sha256,
            b"ca\0",
            "IDENTITY",
            Some(b"abc\0".as_slice()),
            None,
            1024
        ),
        hex!(
            "1aae7151ac1a5690eda7dcabd56800c11c56a3810ba059826fe4776348d6ae8e"
            "5d5d18c7ccf8373f7b942ada8b912b12da56fb37f64b935872841ec07d38e1fb"
            "8e7ec86efcbfb444756bc8863f858d2690a621c9afb983cd77e7a1048ae1a759"
            "8ac895323d44c10227af0a00144cab55111075dc6b72ad6eb163c7458b878e8c"
        )
    );
}

#[test]
#[cfg(feature = "sha1")]
fn test_kdf_a_go_tpm_sha1() {
    assert_eq!(
        kdf_a_to_vec(
            interface::TpmiAlgHash::Sha1,
            b"ca\0",
            "IDENTITY",
            Some(b"abc\0".as_slice()),
            None,
            256
        ),
        hex!("83f354afcf923de2112e0891434cd0bdc8acbf01b811c0e8cd062ded39e31f7f")
    );

    // Upper seven bits of the first octet are cleared for 521 bits.
    assert_eq!(
        kdf_a_to_vec(
            interface::TpmiAlgHash::Sha1,
            &hex!("271fa08bbdc5060ec3dfa928ff9b73123a12da0c"),
            "KDFSELFTESTLABEL",
            Some(hex!("ce244f395dca7391").as_slice()),
            Some(hex!("da504031ddf12e83").as_slice()),
            521
        ),
        hex!(
            "01714e865072c1e4c40b3670281112632fc9ecba25e66af68d18a2b62de9cbb4"
            "4521da2bc9a496862eb3f306949f9efe8a9e1ccbce3b4d668ffd75c9394ba594"
            "58fe"
        )
    );
}

#[cfg(test)]
const TEST_KDF_A_LABEL: &str = "test_kdf_a_label";
#[cfg(test)]
const TEST_KDF_A_CONTEXT_U: &[u8] = b"test_kdf_a_contextU";
#[cfg(test)]
const TEST_KDF_A_CONTEXT_V: &[u8] = b"test_kdf_a_contextV";

#[cfg(test)]
struct KdfATestVec<'a> {
    output_bits: u32,
    // One for each combination of absent or present context_u and context_v.
    expected_outputs: [&'a [u8]; 4],
}

#[cfg(test)]
fn test_kdf_a_common(hash_alg: interface::TpmiAlgHash, key: &[u8], vecs: &[KdfATestVec]) {
    use alloc::vec;
    use kdf::VariableChunkOutputKdf as _;

    for v in vecs.iter() {
        let total_output_len = kdf::bits_to_octets(v.output_bits);
        for cfg in 0..4 {
            let context_u = (cfg & 2 != 0).then_some(TEST_KDF_A_CONTEXT_U);
            let context_v = (cfg & 1 != 0).then_some(TEST_KDF_A_CONTEXT_V);

            let output = kdf_a_to_vec(
                hash_alg,
                key,
                TEST_KDF_A_LABEL,
                context_u,
                context_v,
                v.output_bits,
            );
            assert_eq!(output, v.expected_outputs[cfg]);

            // Consume the output in odd sized pieces.
            let kdf = TcgTpm2KdfA::new(
                hash_alg,
                key,
                TEST_KDF_A_LABEL,
                context_u,
                context_v,
                v.output_bits,
            )
            .unwrap();
            let mut buffered_kdf = kdf::BufferedFixedBlockOutputKdf::new(kdf).unwrap();
            let mut total_consumed_len = 0;
            let mut chunk_len = 3;
            while total_consumed_len < total_output_len {
                chunk_len = chunk_len.min(total_output_len - total_consumed_len);
                let mut outbuf = vec![0u8; chunk_len];
                buffered_kdf
                    .generate_chunk(&mut io_slices::IoSlicesMut::new(&mut [Some(
                        outbuf.as_mut_slice(),
                    )]))
                    .unwrap();
                assert_eq!(
                    outbuf,
                    v.expected_outputs[cfg][total_consumed_len..total_consumed_len + chunk_len]
                );
                total_consumed_len += chunk_len;
                chunk_len = 31;
            }
            assert_eq!(buffered_kdf.max_remaining_len(), Some(0));
            let mut outbuf = [0u8; 1];
            let r = buffered_kdf.generate_chunk(&mut io_slices::IoSlicesMut::new(&mut [Some(
                outbuf.as_mut_slice(),
            )]));
            assert!(matches!(r, Err(interface::TpmErr::InternalErr)))
        }
    }
}

#[test]
#[cfg(feature = "sha1")]
fn test_kdf_a_sha1() {
    let key = &hex!("0102030405060708090a0b0c0d0e0f1011121314");
    let vecs: [KdfATestVec; 2] = [
        KdfATestVec {
            output_bits: 400,
            expected_outputs: [
                &hex!(
                    "7fbeb21c36a89a225040381bea132937\
                     208e6c5cdb2be5bc33af0ecad68da710\
                     ba364763da0498507f407a56da743662\
                     4ab6"
                ),
                &hex!(
                    "3ffaf0a74b95743caa95a9a092771fcb\
                     c3e06ac993f928df9ef07a62f4592dff\
                     0791a026cfffd537c8a70e8ba6e963d8\
                     6338"
                ),
                &hex!(
                    "3a93e9747073c0cd376998ed3b1e8276\
                     21d4b3a261a45448d3b0fda1481aeaf9\
                     271575f8bb7774cd3324569f17eebea0\
                     2195"
                ),
                &hex!(
                    "3c0c4bb6c0257d3430ad88db0ada33e0\
                     1e3b0449e1f8cc4c936ce12bd197c02d\
                     744a6c438fb1a41042cf5026bbcf85c6\
                     29dc"
                ),
            ],
        },
        KdfATestVec {
            output_bits: 397,
            expected_outputs: [
                &hex!(
                    "0863779fa74a9868138c4a82934ffaff\
                     04e81f9d15689d9a8f9ea33225dad696\
                     7e6e504008b281ace1f4df80922a58de\
                     6ea6"
                ),
                &hex!(
                    "1af59ace3fdff4b2865aa4a5a8894066\
                     21f9c9f239952da90dcafefc39f0816f\
                     070db5f1b08fb0b07eb25409867ae572\
                     c642"
                ),
                &hex!(
                    "0a1ca80dd15f1cd7424e53791b9ad06a\
                     da96429b63d0154464aad211eb82b1c8\
                     cc851cb5bf4305b3a4cccbfcc1e7fa96\
                     8d5f"
                ),
                &hex!(
                    "003141d500a641b0465ea90b4b1a8af0\
                     2e58b13ab18f2b18b92c7e0d6566bd4f\
                     c50489d4e2098407baa73936b4a943d9\
                     77a9"
                ),
            ],
        },
    ];

    test_kdf_a_common(interface::TpmiAlgHash::Sha1, key, &vecs);
}

#[test]
#[cfg(feature = "sha256")]
fn test_kdf_a_sha256() {
    let key = &hex!(
        "0102030405060708090a0b0c0d0e0f10\
         1112131415161718191a1b1c1d1e1f20"
    );
    let vecs: [KdfATestVec; 2] = [
        KdfATestVec {
            output_bits: 640,
            expected_outputs: [
                &hex!(
                    "d8a01f0d475078caa9828edcf9ee9cc5\
                     13ff7c72a1e4b5abe91ef572d99b827a\
                     3935edaed51e9575a03eae79d6011b8d\
                     a28fca0f5f86ca7a04ff7345667d3fba\
                     5b357bbfdc8a558b73d8c4736460b389"
                ),
                &hex!(
                    "3ed1b2d1fad86697635d680de0ad4302\
                     7614a296c979df2b6c82b473c13c55ab\
                     1a8f522832308973c6b71ed220d08f65\
                     05f89035d32e1454ddd9d22c906a69cd\
                     455902d3221b688143551ecefcae97f4"
                ),
                &hex!(
                    "4242ce2dba9f8bb01ed36d93deb50a3a\
                     fa72320f39bf10796815b5a4dd08e592\
                     75d042e709f8b3ddfa06bc91d0ea4f92\
                     b3c03f85e16e1a39fd21ef736d84e035\
                     42d9aa3f6cd029af88e37c8e6fe7c7b1"
                ),
                &hex!(
                    "cdea645d147f9ebc8c09ef713f02f7f2\
                     2d558222df0535ab0e339b4245c47e13\
                     dbb99b92990499b1e0b52af3f479c15a\
                     f9002dc10bb9a0643eadba7169fc272b\
                     96e1b956ab3ba80d209da20f90a638ef"
                ),
            ],
        },
        KdfATestVec {
            output_bits: 637,
            expected_outputs: [
                &hex!(
                    "05e27ba5a54a048c17398db8acfff6a5\
                     bdee852114fc19f486920967606cb3f2\
                     e451e564078382df83cf060bf63a34a9\
                     8c0011104b26fffe823ffcd39eb52503\
                     92f0f2829a610a5e451c57d237c71e07"
                ),
                &hex!(
                    "08bbeb65ccc3e2055b16c615073099e0\
                     1b2b37a0cca1ef7debc04a59b9d2df32\
                     5315dda5aa3446881bb328eec0e95233\
                     9644c8c3615cdfb3e91e9db5573855fc\
                     b0e102a74baf60f0f5eb07b36108d11f"
                ),
                &hex!(
                    "19ab8d468fee122d6119ca00eff9010b\
                     99b6a1a1de6370ea1692e7781448c81b\
                     4d3c921c55c7bcfde9afa787af86ce5b\
                     8638e13d2b407f86eddd3a7dfa39124d\
                     f0f1e211fd22564a1c011f2c025c7999"
                ),
                &hex!(
                    "1b020bda0129cbe74183f861d81b0844\
                     65cc290ac1b4f491ea6b042d26a01839\
                     69786c49ebd39d155b199aa6496bc762\
                     2ff371ccfe4b32d6adb1958e6d9b43fe\
                     0fcf7fc0be61e7554623b70a3622b903"
                ),
            ],
        },
    ];

    test_kdf_a_common(interface::TpmiAlgHash::Sha256, key, &vecs);
}

#[test]
#[cfg(feature = "sha3_256")]
fn test_kdf_a_sha3_256() {
    let key = &hex!(
        "0102030405060708090a0b0c0d0e0f10\
         1112131415161718191a1b1c1d1e1f20"
    );
    let vecs: [KdfATestVec; 2] = [
        KdfATestVec {
            output_bits: 640,
            expected_outputs: [
                &hex!(
                    "db893813baa29a616fca847e740238b5\
                     5a8bfd71939a730608b8084963cd195c\
                     5a75175da3efb50b66c95064314bdc99\
                     c179de6c996928b70c80b67fa1aeb890\
                     f8db9ad799aef5eff5ad987dc05fef07"
                ),
                &hex!(
                    "db24f816a60cce6c578b8090c7fdace4\
                     77a832777e4e9551c06ebc5935345984\
                     fd5ca28f777fd21f9636b39b06e831f0\
                     e8513015b5eeb3b63b06268cd4d72835\
                     9d15a521b8199e834278f5fee620c481"
                ),
                &hex!(
                    "0cbb63b6f145f458ce3e7aa6fc82b110\
                     bc390c71745a1a003577d7f17b9cba61\
                     632f62b482dd72d1f1fb73776aec2578\
                     b7af33f93168ca9fc15b004022c7a0c9\
                     55d5a88d490fc4fe8d7601b0ea1fa915"
                ),
                &hex!(
                    "fe18aeaf15926dd22c4766442220b453\
                     d592c71d5028c3fba591a6fd6a8667a8\
                     1e4679540b9f79bc4fc326d244cf3c47\
                     b380823197bf3bcd978ba1a68fbff636\
                     6cf5a2d7d02ba69bebd3075f96fa0317"
                ),
            ],
        },
        KdfATestVec {
            output_bits: 637,
            expected_outputs: [
                &hex!(
                    "1364e9224052458c21a66af018f3ab4b\
                     86c73693174d7c5eb571b5ea2868c9b6\
                     f8f85b02e3739061c7b611b6e07c6a25\
                     6a6fa3baf56aadfafbc12b2734561182\
                     3d1a446d2ea4042feaf3f31bb82e03c7"
                ),
                &hex!(
                    "1f09799e6c56b9e0252005c69b81f6f9\
                     3d6656a4d0d3084d62b3d2df6bdd5c36\
                     8740b4042aaa9338e3c724ca07bedcf3\
                     18cbbac3d2b73814c050c82e5f6a75f7\
                     781ec3f4fdf2130aacb7342c4a2d56bd"
                ),
                &hex!(
                    "0992e6385c26d414d51f5c9a3896aa08\
                     13e6bdfee3ceb9213427f46a2987ac8c\
                     6301ffd55b3b8faa328037c3c2de9538\
                     560d102313ab6ebef3e8826b0dd2a674\
                     c3679d8817d3584e7b8fbf804d0bc5f7"
                ),
                &hex!(
                    "0e04e144af638751bf28c808f708e0c6\
                     4545db9ac23f534a671e547c94bfed52\
                     df4fb7489b1c929d32da77803305ae2f\
                     85b305da273ad1dd16d3a574f558b6f2\
                     4bea15b613865f5a1ea85c32854722b4"
                ),
            ],
        },
    ];

    test_kdf_a_common(interface::TpmiAlgHash::Sha3_256, key, &vecs);
}
