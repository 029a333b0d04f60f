// End-to-end Info / Decrypt / Parse against archives on disk.

mod common;

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::common::*;

    use aea_core::compression::CompressionCodec;
    use aea_core::keys::{KeyError, KeyMaterial};
    use aea_core::prelude::*;
    use aea_core::telemetry::Stage;
    use p256::pkcs8::LineEnding;
    use tempfile::tempdir;

    fn three_segment_archive() -> (Vec<u8>, Fixture) {
        let pt = sample_plaintext(2 * 1024 + 300, 11);
        let fx = ArchiveBuilder::symmetric(TEST_KEY)
            .segment_size(1024)
            .meta("com.apple.wkms.fcs-key-url", b"https://wkms.example/key".to_vec())
            .meta("com.apple.wkms.fcs-response", br#"{"enc-request":"AAAA"}"#.to_vec())
            .build(&pt);
        (pt, fx)
    }

    #[test]
    fn decrypt_three_segment_archive() {
        init_tracing();
        let tmp = tempdir().unwrap();
        let (pt, fx) = three_segment_archive();
        let archive = fx.write_to(tmp.path(), "iPhone16,2_18.0_22A3354_Restore.ipsw.aea");
        let out_dir = tmp.path().join("out");

        let path = decrypt(&archive, &out_dir, Some(symmetric_key(TEST_KEY))).unwrap();
        assert_eq!(path, out_dir.join("iPhone16,2_18.0_22A3354_Restore.ipsw"));
        assert_eq!(fs::read(&path).unwrap(), pt);
        assert_eq!(dir_listing(&out_dir), ["iPhone16,2_18.0_22A3354_Restore.ipsw"]);
    }

    #[test]
    fn info_returns_ordered_metadata_and_is_idempotent() {
        let tmp = tempdir().unwrap();
        let (_, fx) = three_segment_archive();
        let archive = fx.write_to(tmp.path(), "a.aea");

        let first = info(&archive).unwrap();
        let second = info(&archive).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            ["com.apple.wkms.fcs-key-url", "com.apple.wkms.fcs-response"]
        );
        let resp: serde_json::Value = serde_json::from_slice(first.get("com.apple.wkms.fcs-response").unwrap()).unwrap();
        assert_eq!(resp["enc-request"], "AAAA");
        // Info never writes anything.
        assert_eq!(dir_listing(tmp.path()), ["a.aea"]);
    }

    #[test]
    fn wrong_key_leaves_no_artifact() {
        let tmp = tempdir().unwrap();
        let (_, fx) = three_segment_archive();
        let archive = fx.write_to(tmp.path(), "a.aea");
        let out_dir = tmp.path().join("out");

        let err = decrypt(&archive, &out_dir, Some(symmetric_key([0x24; 32]))).unwrap_err();
        assert!(matches!(err, AeaError::AuthenticationFailure { segment: 0 }));
        assert!(dir_listing(&out_dir).is_empty());
    }

    #[test]
    fn corrupted_tag_on_segment_one_leaves_no_artifact() {
        let tmp = tempdir().unwrap();
        let (_, mut fx) = three_segment_archive();
        let at = fx.tag_offset(1);
        fx.bytes[at] ^= 0x5A;
        let archive = fx.write_to(tmp.path(), "a.aea");
        let out_dir = tmp.path().join("out");

        for workers in [1, 3] {
            let config = DecryptConfig::default().with_workers(workers);
            let err = decrypt_with_config(&archive, &out_dir, Some(symmetric_key(TEST_KEY)), &config).unwrap_err();
            assert!(matches!(err, AeaError::AuthenticationFailure { segment: 1 }), "workers={workers}");
            assert!(dir_listing(&out_dir).is_empty(), "workers={workers}");
        }
    }

    #[test]
    fn truncated_archive() {
        let tmp = tempdir().unwrap();
        let (_, fx) = three_segment_archive();
        let archive = tmp.path().join("t.aea");
        fs::write(&archive, &fx.bytes[..fx.bytes.len() - 100]).unwrap();
        let out_dir = tmp.path().join("out");

        assert!(matches!(info(&archive), Err(AeaError::TruncatedArchive(Truncation::Payload { .. }))));
        assert!(matches!(
            decrypt(&archive, &out_dir, Some(symmetric_key(TEST_KEY))),
            Err(AeaError::TruncatedArchive(_))
        ));
        assert!(!out_dir.exists());
    }

    #[test]
    fn not_an_archive() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("notes.txt");
        fs::write(&path, b"plain text, nothing to see here at all, really nothing to see here").unwrap();
        assert!(matches!(info(&path), Err(AeaError::MalformedHeader(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempdir().unwrap();
        assert!(matches!(info(&tmp.path().join("nope.aea")), Err(AeaError::Io(_))));
    }

    #[test]
    fn symmetric_and_asymmetric_paths_agree() {
        let tmp = tempdir().unwrap();
        let pt = sample_plaintext(5000, 12);
        let archive_key = [0x6Bu8; 32];
        let (secret, public, pem) = recipient_keypair(13);

        let asym = ArchiveBuilder::asymmetric(public, archive_key).segment_size(1500).build(&pt);
        let sym = ArchiveBuilder::symmetric(archive_key).segment_size(1500).build(&pt);
        let asym_path = asym.write_to(tmp.path(), "asym.aea");
        let sym_path = sym.write_to(tmp.path(), "sym.aea");

        let via_pem = decrypt(&asym_path, &tmp.path().join("pem"), Some(pem)).unwrap();
        let via_unwrapped = decrypt(&asym_path, &tmp.path().join("raw"), Some(symmetric_key(archive_key))).unwrap();
        let via_symmetric = decrypt(&sym_path, &tmp.path().join("sym"), Some(symmetric_key(archive_key))).unwrap();

        let sec1_file = tmp.path().join("key.pem");
        fs::write(&sec1_file, secret.to_sec1_pem(LineEnding::LF).unwrap().as_bytes()).unwrap();
        let via_sec1 =
            decrypt(&asym_path, &tmp.path().join("sec1"), Some(KeyMaterial::from_pem_file(&sec1_file).unwrap()))
                .unwrap();

        for p in [&via_pem, &via_unwrapped, &via_symmetric, &via_sec1] {
            assert_eq!(fs::read(p).unwrap(), pt, "{}", p.display());
        }
    }

    #[test]
    fn wrong_private_key_is_authentication_failure() {
        let tmp = tempdir().unwrap();
        let (_, public, _) = recipient_keypair(14);
        let (_, _, other_pem) = recipient_keypair(15);
        let fx = ArchiveBuilder::asymmetric(public, [0x19; 32]).build(&sample_plaintext(100, 16));
        let archive = fx.write_to(tmp.path(), "a.aea");
        let out_dir = tmp.path().join("out");

        let err = decrypt(&archive, &out_dir, Some(other_pem)).unwrap_err();
        assert!(err.is_authentication_failure());
        assert!(dir_listing(&out_dir).is_empty());
    }

    #[test]
    fn parse_keyless_archive() {
        let tmp = tempdir().unwrap();
        let pt = text_plaintext(9000);
        let fx = ArchiveBuilder::keyless().codec(CompressionCodec::Deflate).segment_size(2048).build(&pt);
        let archive = fx.write_to(tmp.path(), "ota.aea");

        let path = parse(&archive, &tmp.path().join("out")).unwrap();
        assert_eq!(fs::read(path).unwrap(), pt);
    }

    #[test]
    fn parse_on_key_required_profile_fails_without_output() {
        let tmp = tempdir().unwrap();
        let (_, fx) = three_segment_archive();
        let archive = fx.write_to(tmp.path(), "a.aea");
        let out_dir = tmp.path().join("out");

        let err = parse(&archive, &out_dir).unwrap_err();
        assert!(matches!(
            err,
            AeaError::KeyResolution(KeyError::MissingKeyMaterial { profile: Profile::Symmetric })
        ));
        assert!(!out_dir.exists());
    }

    #[test]
    fn key_supplied_for_keyless_profile_is_rejected() {
        let tmp = tempdir().unwrap();
        let fx = ArchiveBuilder::keyless().build(&sample_plaintext(10, 17));
        let archive = fx.write_to(tmp.path(), "a.aea");
        let err = decrypt(&archive, &tmp.path().join("out"), Some(symmetric_key(TEST_KEY))).unwrap_err();
        assert!(matches!(err, AeaError::KeyResolution(KeyError::UnsupportedMaterial { .. })));
    }

    #[test]
    fn workers_do_not_change_output_or_counters() {
        let tmp = tempdir().unwrap();
        let pt = sample_plaintext(40 * 512 + 1, 18);
        let fx = ArchiveBuilder::symmetric(TEST_KEY).segment_size(512).build(&pt);
        let archive = fx.write_to(tmp.path(), "w.aea");

        let one = decrypt_with_config(
            &archive,
            &tmp.path().join("one"),
            Some(symmetric_key(TEST_KEY)),
            &DecryptConfig::default().with_workers(1),
        )
        .unwrap();
        let many = decrypt_with_config(
            &archive,
            &tmp.path().join("many"),
            Some(symmetric_key(TEST_KEY)),
            &DecryptConfig::default().with_workers(6).with_inflight_segments(4),
        )
        .unwrap();

        assert_eq!(fs::read(&one.path).unwrap(), pt);
        assert_eq!(fs::read(&many.path).unwrap(), pt);
        assert_eq!(one.telemetry.segments, 41);
        assert_eq!(one.telemetry.bytes_plaintext, many.telemetry.bytes_plaintext);
        assert_eq!(one.telemetry.bytes_ciphertext, many.telemetry.bytes_ciphertext);
        assert!(one.telemetry.has_all_stages(&[Stage::Parse, Stage::Read, Stage::Decrypt, Stage::Write]));

        let json = serde_json::to_value(&many.telemetry).unwrap();
        assert_eq!(json["segments"], 41);
        assert_eq!(json["workers"], 6);
    }

    #[test]
    fn config_validation() {
        let tmp = tempdir().unwrap();
        let (_, fx) = three_segment_archive();
        let archive = fx.write_to(tmp.path(), "a.aea");
        let key = || Some(symmetric_key(TEST_KEY));

        for bad in [
            DecryptConfig::default().with_workers(0),
            DecryptConfig::default().with_workers(100_000),
            DecryptConfig::default().with_inflight_segments(0),
        ] {
            assert!(matches!(bad.validate(), Err(AeaError::InvalidConfig(_))));
            assert!(matches!(
                decrypt_with_config(&archive, tmp.path(), key(), &bad),
                Err(AeaError::InvalidConfig(_))
            ));
        }

        let missing = tmp.path().join("does-not-exist");
        let no_create = DecryptConfig::default().with_create_output_dir(false);
        assert!(matches!(
            decrypt_with_config(&archive, &missing, key(), &no_create),
            Err(AeaError::InvalidConfig(_))
        ));
        assert!(!missing.exists());
    }

    #[test]
    fn cancelled_run_leaves_no_artifact() {
        let tmp = tempdir().unwrap();
        let (_, fx) = three_segment_archive();
        let archive = fx.write_to(tmp.path(), "a.aea");
        let out_dir = tmp.path().join("out");

        let abort = AbortHandle::new();
        abort.cancel();
        let config = DecryptConfig::default().with_workers(2).with_abort(abort);
        let err = decrypt_with_config(&archive, &out_dir, Some(symmetric_key(TEST_KEY)), &config).unwrap_err();
        assert!(matches!(err, AeaError::Cancelled));
        assert!(dir_listing(&out_dir).is_empty());
    }

    #[test]
    fn extensionless_archive_decrypted_in_place_is_kept() {
        init_tracing();
        let tmp = tempdir().unwrap();
        let (_, fx) = three_segment_archive();
        let archive = fx.write_to(tmp.path(), "firmware");

        for workers in [1, 4] {
            let config = DecryptConfig::default().with_workers(workers);
            let err = decrypt_with_config(&archive, tmp.path(), Some(symmetric_key(TEST_KEY)), &config).unwrap_err();
            match err {
                AeaError::OutputExists(path) => assert_eq!(path, archive),
                other => panic!("expected OutputExists, got {other:?}"),
            }
            assert_eq!(fs::read(&archive).unwrap(), fx.bytes);
            assert!(info(&archive).is_ok());
            // No staging file left next to the archive.
            assert_eq!(dir_listing(tmp.path()), ["firmware"]);
        }
    }

    #[test]
    fn existing_output_is_not_replaced() {
        let tmp = tempdir().unwrap();
        let (pt, fx) = three_segment_archive();
        let archive = fx.write_to(tmp.path(), "a.aea");
        let out_dir = tmp.path().join("out");
        fs::create_dir(&out_dir).unwrap();
        fs::write(out_dir.join("a"), b"keep").unwrap();

        let err = decrypt(&archive, &out_dir, Some(symmetric_key(TEST_KEY))).unwrap_err();
        assert!(matches!(err, AeaError::OutputExists(ref p) if *p == out_dir.join("a")));
        assert_eq!(fs::read(out_dir.join("a")).unwrap(), b"keep");
        assert_eq!(dir_listing(&out_dir), ["a"]);

        // Once the old file is gone the same call succeeds.
        fs::remove_file(out_dir.join("a")).unwrap();
        let path = decrypt(&archive, &out_dir, Some(symmetric_key(TEST_KEY))).unwrap();
        assert_eq!(fs::read(path).unwrap(), pt);
    }

    #[test]
    fn inspect_exposes_container() {
        let tmp = tempdir().unwrap();
        let (_, fx) = three_segment_archive();
        let archive = fx.write_to(tmp.path(), "a.aea");

        let c = inspect(&archive).unwrap();
        assert_eq!(c.profile(), Profile::Symmetric);
        assert_eq!(c.segment_count(), 3);
        assert_eq!(c.header().segment_size, 1024);
        assert_eq!(aea_core::api::metadata_of(c).unwrap(), info(&archive).unwrap());
    }
}
