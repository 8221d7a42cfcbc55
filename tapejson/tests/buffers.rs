// SPDX-License-Identifier: Apache-2.0

#![cfg(feature = "bytes")]

use bytes::{Bytes, BytesMut};
use tapejson::{
    decode_one, encode_one, tokenize, BufferReader, BufferWriter, BytesReader, SliceReader,
    TokenType, Value,
};
use test_log::test;

const DOC: &str = r#"{"name":"sensor-7","readings":[21.5,-3,1e2],"ok":true,"note":null}"#;

#[test]
fn test_readers_agree() {
    let mut slice = SliceReader::from(DOC);
    let mut pooled = BytesReader::from(Bytes::from_static(DOC.as_bytes()));

    let a = tokenize(&mut slice).unwrap();
    let b = tokenize(&mut pooled).unwrap();
    assert_eq!(a, b);
    assert_eq!(slice.read_offset(), pooled.read_offset());

    let from_slice: Value = decode_one(&a, &slice).unwrap();
    let from_pooled: Value = decode_one(&b, &pooled).unwrap();
    assert_eq!(from_slice, from_pooled);
    assert_eq!(from_pooled.get("readings").and_then(|r| r.as_array()).map(Vec::len), Some(3));
}

#[test]
fn test_reader_bounds() {
    let readers: [Box<dyn BufferReader>; 2] = [
        Box::new(SliceReader::from("ab")),
        Box::new(BytesReader::from(Bytes::from_static(b"ab"))),
    ];
    for mut reader in readers {
        let mut two = [0u8; 2];
        let mut three = [0u8; 3];
        assert!(reader.get_bytes(1, &mut two).is_err());
        assert!(reader.get_bytes(0, &mut three).is_err());
        reader.get_bytes(0, &mut two).unwrap();
        assert_eq!(&two, b"ab");

        assert!(reader.set_read_offset(3).is_err());
        reader.set_read_offset(2).unwrap();
        assert_eq!(reader.readable_bytes(), 0);
        assert!(reader.peek_byte().is_err());
        assert!(reader.read_byte().is_err());
        assert!(reader.skip_bytes(1).is_err());
        reader.set_read_offset(0).unwrap();
        assert!(reader.read_bytes(&mut three).is_err());
        assert_eq!(reader.read_offset(), 0);
        reader.skip_bytes(2).unwrap();
        assert_eq!(reader.read_offset(), 2);
    }
}

#[test]
fn test_tokenize_from_offset_in_pooled_buffer() {
    let mut frame = BytesMut::new();
    frame.extend_from_slice(b"HDR:");
    frame.extend_from_slice(b"[\"payload\"]");
    let mut reader = BytesReader::from(frame);
    reader.skip_bytes(4).unwrap();

    let tape = tokenize(&mut reader).unwrap();
    assert_eq!(tape.tokens()[1].kind, TokenType::String);
    assert_eq!(tape.tokens()[1].span(), 6..13);
    let value: Vec<String> = decode_one(&tape, &reader).unwrap();
    assert_eq!(value, ["payload"]);
}

#[test]
fn test_writers_agree() {
    let value: Value = tapejson::from_str(DOC).unwrap();

    let mut vec: Vec<u8> = Vec::new();
    let mut pooled = BytesMut::with_capacity(8);
    encode_one(&value, &mut vec).unwrap();
    encode_one(&value, &mut pooled).unwrap();
    assert_eq!(&vec[..], &pooled[..]);
    assert_eq!(pooled.write_offset(), vec.len());

    pooled.set_write_offset(1).unwrap();
    assert_eq!(&pooled[..], b"{");
    assert!(pooled.set_write_offset(2).is_err());
}
