// Metadata codec: order preservation, strict tokenization, error offsets.

#[cfg(test)]
mod tests {
    use aea_core::metadata::{decode_metadata, encode_metadata, MetadataEntry, MetadataError};
    use proptest::prelude::*;

    fn entry_bytes(key: &[u8], value: &[u8]) -> Vec<u8> {
        let len = (4 + key.len() + 1 + value.len()) as u32;
        let mut out = len.to_le_bytes().to_vec();
        out.extend_from_slice(key);
        out.push(0);
        out.extend_from_slice(value);
        out
    }

    #[test]
    fn empty_block_is_empty_metadata() {
        let m = decode_metadata(&[]).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn preserves_declaration_order() {
        let entries = vec![
            MetadataEntry::new("zeta", b"1".to_vec()),
            MetadataEntry::new("alpha", b"2".to_vec()),
            MetadataEntry::new("mid", Vec::new()),
        ];
        let block = encode_metadata(&entries).unwrap();
        let m = decode_metadata(&block).unwrap();

        assert_eq!(m.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
        assert_eq!(m.entries(), entries.as_slice());
        assert_eq!(m.get("mid"), Some(&b""[..]));
    }

    #[test]
    fn values_are_raw_bytes() {
        let json = serde_json::json!({ "ProductType": "iPhone16,2", "Build": "22A3354" });
        let json_bytes = serde_json::to_vec(&json).unwrap();
        let block = [
            entry_bytes(b"com.apple.wkms.fcs-response", &json_bytes),
            entry_bytes(b"com.apple.wkms.fcs-key-url", b"aHR0cHM6Ly9leGFtcGxlLmNvbQ=="),
            entry_bytes(b"blob", &[0xFF, 0x00, 0x10]),
        ]
        .concat();

        let m = decode_metadata(&block).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_slice(m.get("com.apple.wkms.fcs-response").unwrap()).unwrap();
        assert_eq!(parsed["ProductType"], "iPhone16,2");

        let url = m.iter().find(|e| e.key == "com.apple.wkms.fcs-key-url").unwrap();
        assert_eq!(url.base64_decoded().unwrap(), b"https://example.com");

        let blob = m.iter().find(|e| e.key == "blob").unwrap();
        assert!(blob.as_utf8().is_none());
        assert_eq!(blob.value, [0xFF, 0x00, 0x10]);
    }

    #[test]
    fn value_may_contain_nul() {
        let block = entry_bytes(b"k", b"a\0b");
        let m = decode_metadata(&block).unwrap();
        assert_eq!(m.get("k").unwrap(), b"a\0b");
    }

    #[test]
    fn truncated_entry_reports_offset() {
        let first = entry_bytes(b"a", b"1");
        let mut block = first.clone();
        block.extend_from_slice(&entry_bytes(b"b", b"long value"));
        block.truncate(block.len() - 3);

        let err = decode_metadata(&block).unwrap_err();
        assert!(matches!(err, MetadataError::Truncated { .. }));
        assert_eq!(err.offset(), Some(first.len()));
    }

    #[test]
    fn trailing_garbage_is_truncation() {
        let mut block = entry_bytes(b"a", b"1");
        block.extend_from_slice(&[1, 2]);
        assert!(matches!(decode_metadata(&block), Err(MetadataError::Truncated { offset: 7, need: 4, have: 2 })));
    }

    #[test]
    fn entry_length_below_minimum() {
        let block = 5u32.to_le_bytes().iter().copied().chain([b'a']).collect::<Vec<_>>();
        assert!(matches!(decode_metadata(&block), Err(MetadataError::InvalidEntryLength { offset: 0, len: 5 })));
    }

    #[test]
    fn missing_terminator() {
        let mut block = 7u32.to_le_bytes().to_vec();
        block.extend_from_slice(b"abc");
        assert!(matches!(decode_metadata(&block), Err(MetadataError::MissingTerminator { offset: 0 })));
    }

    #[test]
    fn empty_key() {
        let block = entry_bytes(b"", b"value");
        assert!(matches!(decode_metadata(&block), Err(MetadataError::EmptyKey { offset: 0 })));
    }

    #[test]
    fn non_utf8_key() {
        let block = entry_bytes(&[0xC3, 0x28], b"v");
        assert!(matches!(decode_metadata(&block), Err(MetadataError::InvalidKey { offset: 0 })));
    }

    #[test]
    fn duplicate_key_rejected_on_decode_and_encode() {
        let first = entry_bytes(b"dup", b"1");
        let block = [first.clone(), entry_bytes(b"dup", b"2")].concat();
        match decode_metadata(&block) {
            Err(MetadataError::DuplicateKey { offset, key }) => {
                assert_eq!(offset, first.len());
                assert_eq!(key, "dup");
            }
            other => panic!("expected DuplicateKey, got {other:?}"),
        }

        let entries = [MetadataEntry::new("dup", b"1".to_vec()), MetadataEntry::new("dup", b"2".to_vec())];
        assert!(matches!(encode_metadata(&entries), Err(MetadataError::DuplicateKey { .. })));
    }

    #[test]
    fn encoder_rejects_nul_in_key() {
        let entries = [MetadataEntry::new("a\0b", Vec::new())];
        assert!(matches!(encode_metadata(&entries), Err(MetadataError::InvalidKey { offset: 0 })));
    }

    proptest! {
        #[test]
        fn decoder_never_panics(block in proptest::collection::vec(any::<u8>(), 0..512)) {
            let _ = decode_metadata(&block);
        }

        #[test]
        fn encoded_entries_decode_in_order(
            values in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..64), 0..8)
        ) {
            let entries: Vec<MetadataEntry> = values
                .into_iter()
                .enumerate()
                .map(|(i, v)| MetadataEntry::new(format!("key-{i}"), v))
                .collect();
            let block = encode_metadata(&entries).unwrap();
            let decoded = decode_metadata(&block).unwrap();
            prop_assert_eq!(decoded.entries(), entries.as_slice());
        }
    }
}
