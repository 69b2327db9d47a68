// SPDX-License-Identifier: Apache-2.0
// Copyright 2023 SUSE LLC
// Author: Nicolai Stange <nstange@suse.de>

//! Property based tests for the KDFa() and KDFe() output streams.

#![cfg(all(
    feature = "sha1",
    feature = "sha256",
    feature = "sha384",
    feature = "sha3_256",
    feature = "ecdh"
))]

use proptest::prelude::*;
use tpm2_kdf::crypto::io_slices::IoSlicesMut;
use tpm2_kdf::crypto::kdf::{
    self, tcg_tpm2_kdf_a::TcgTpm2KdfA, BufferedFixedBlockOutputKdf, VariableChunkOutputKdf,
};
use tpm2_kdf::interface::{TpmAlgId, TpmiAlgHash};

fn bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

fn label() -> impl Strategy<Value = String> {
    "[A-Z_]{0,16}"
}

fn hash_alg() -> impl Strategy<Value = TpmAlgId> {
    prop_oneof![
        Just(TpmAlgId::SHA1),
        Just(TpmAlgId::SHA256),
        Just(TpmAlgId::SHA384),
        Just(TpmAlgId::SHA3_256),
    ]
}

proptest! {
    #[test]
    fn kdf_a_output_shape(
        alg in hash_alg(),
        key in bytes(64),
        label in label(),
        context_u in bytes(32),
        context_v in bytes(32),
        n_bits in 1u32..=2048,
    ) {
        let a = kdf::kdf_a(alg, &key, &label, &context_u, &context_v, n_bits).unwrap();
        let b = kdf::kdf_a(alg, &key, &label, &context_u, &context_v, n_bits).unwrap();
        prop_assert_eq!(a.as_slice(), b.as_slice());
        prop_assert_eq!(a.len(), ((n_bits + 7) / 8) as usize);
        if n_bits % 8 != 0 {
            prop_assert_eq!(a[0] >> (n_bits % 8), 0);
        }
    }

    #[test]
    fn kdf_e_output_shape(
        alg in hash_alg(),
        z in bytes(66),
        label in label(),
        party_u_info in bytes(66),
        party_v_info in bytes(66),
        n_bits in 1u32..=2048,
    ) {
        let a = kdf::kdf_e(alg, &z, &label, &party_u_info, &party_v_info, n_bits).unwrap();
        let b = kdf::kdf_e(alg, &z, &label, &party_u_info, &party_v_info, n_bits).unwrap();
        prop_assert_eq!(a.as_slice(), b.as_slice());
        prop_assert_eq!(a.len(), ((n_bits + 7) / 8) as usize);
        if n_bits % 8 != 0 {
            prop_assert_eq!(a[0] >> (n_bits % 8), 0);
        }
    }

    // The output length isn't hashed by KDFe(), so whole octet outputs are
    // prefixes of longer ones.
    #[test]
    fn kdf_e_octet_outputs_are_prefixes(
        z in bytes(32),
        party_u_info in bytes(32),
        short_len in 1u32..=64,
        extra_len in 0u32..=64,
    ) {
        let short = kdf::kdf_e(TpmAlgId::SHA256, &z, "DUPLICATE", &party_u_info, &[], 8 * short_len)
            .unwrap();
        let long = kdf::kdf_e(
            TpmAlgId::SHA256,
            &z,
            "DUPLICATE",
            &party_u_info,
            &[],
            8 * (short_len + extra_len),
        )
        .unwrap();
        prop_assert_eq!(short.as_slice(), &long[..short.len()]);
    }

    #[test]
    fn kdf_a_context_sensitivity(
        key in bytes(32),
        context_u in bytes(16),
        other_context_u in bytes(16),
    ) {
        prop_assume!(context_u != other_context_u);
        let a = kdf::kdf_a(TpmAlgId::SHA256, &key, "IDENTITY", &context_u, &[], 128).unwrap();
        let b = kdf::kdf_a(TpmAlgId::SHA256, &key, "IDENTITY", &other_context_u, &[], 128)
            .unwrap();
        prop_assert_ne!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn kdf_a_hash_sensitivity(key in bytes(32), context_u in bytes(16)) {
        let a = kdf::kdf_a(TpmAlgId::SHA1, &key, "IDENTITY", &context_u, &[], 128).unwrap();
        let b = kdf::kdf_a(TpmAlgId::SHA256, &key, "IDENTITY", &context_u, &[], 128).unwrap();
        prop_assert_ne!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn kdf_a_context_v_sensitivity(
        key in bytes(32),
        context_u in bytes(16),
        context_v in bytes(16),
        other_context_v in bytes(16),
    ) {
        prop_assume!(context_v != other_context_v);
        let a = kdf::kdf_a(TpmAlgId::SHA256, &key, "IDENTITY", &context_u, &context_v, 128)
            .unwrap();
        let b = kdf::kdf_a(TpmAlgId::SHA256, &key, "IDENTITY", &context_u, &other_context_v, 128)
            .unwrap();
        prop_assert_ne!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn kdf_e_party_info_sensitivity(
        z in bytes(32),
        party_u_info in bytes(32),
        party_v_info in bytes(32),
        other_info in bytes(32),
    ) {
        let a = kdf::kdf_e(TpmAlgId::SHA256, &z, "DUPLICATE", &party_u_info, &party_v_info, 256)
            .unwrap();
        if other_info != party_u_info {
            let b = kdf::kdf_e(TpmAlgId::SHA256, &z, "DUPLICATE", &other_info, &party_v_info, 256)
                .unwrap();
            prop_assert_ne!(a.as_slice(), b.as_slice());
        }
        if other_info != party_v_info {
            let b = kdf::kdf_e(TpmAlgId::SHA256, &z, "DUPLICATE", &party_u_info, &other_info, 256)
                .unwrap();
            prop_assert_ne!(a.as_slice(), b.as_slice());
        }
    }

    #[test]
    fn kdf_e_hash_sensitivity(z in bytes(32), party_u_info in bytes(32), party_v_info in bytes(32)) {
        let a = kdf::kdf_e(TpmAlgId::SHA1, &z, "DUPLICATE", &party_u_info, &party_v_info, 128)
            .unwrap();
        let b = kdf::kdf_e(TpmAlgId::SHA256, &z, "DUPLICATE", &party_u_info, &party_v_info, 128)
            .unwrap();
        prop_assert_ne!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn kdf_a_chunked_matches_one_shot(
        key in bytes(32),
        n_bits in 1u32..=1024,
        chunk_lens in prop::collection::vec(1usize..=45, 1..8),
    ) {
        let expected = kdf::kdf_a(TpmAlgId::SHA1, &key, "CHUNKS", b"u", b"v", n_bits).unwrap();

        let block_kdf = TcgTpm2KdfA::new(
            TpmiAlgHash::Sha1,
            &key,
            "CHUNKS",
            Some(b"u".as_slice()),
            Some(b"v".as_slice()),
            n_bits,
        )
        .unwrap();
        let mut buffered_kdf = BufferedFixedBlockOutputKdf::new(block_kdf).unwrap();
        let mut output = vec![0u8; expected.len()];
        let mut pos = 0;
        for chunk_len in chunk_lens.iter().cycle() {
            if pos == output.len() {
                break;
            }
            let end = (pos + chunk_len).min(output.len());
            buffered_kdf
                .generate_chunk(&mut IoSlicesMut::new(&mut [Some(&mut output[pos..end])]))
                .unwrap();
            pos = end;
        }
        prop_assert_eq!(output.as_slice(), expected.as_slice());
        prop_assert_eq!(buffered_kdf.max_remaining_len(), Some(0));
    }

    #[test]
    fn xor_obfuscate_is_an_involution(
        hmac_key in bytes(32),
        nonce_newer in bytes(32),
        nonce_older in bytes(32),
        data in bytes(300),
    ) {
        let mut obfuscated = data.clone();
        kdf::xor_obfuscate(TpmiAlgHash::Sha256, &hmac_key, &nonce_newer, &nonce_older, &mut obfuscated)
            .unwrap();
        let mut restored = obfuscated.clone();
        kdf::xor_obfuscate(TpmiAlgHash::Sha256, &hmac_key, &nonce_newer, &nonce_older, &mut restored)
            .unwrap();
        prop_assert_eq!(restored, data);
    }
}
