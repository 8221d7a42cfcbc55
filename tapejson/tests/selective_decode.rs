// SPDX-License-Identifier: Apache-2.0

// Selective decoding of a larger document: skipping with child counts must
// land on exactly the tokens a full decode would have visited.

use tapejson::{tokenize, BufferReader, SliceReader, Tape, TapeCursor, TokenType, Value};
use test_log::test;

const REAL_WORLD_JSON: &str = r#"
{
    "user_id": "u-12345",
    "username": "jdoe",
    "email": "jdoe@example.com",
    "is_active": true,
    "feature_flags": {
        "new_dashboard": true,
        "beta_access": false,
        "experimental_api": null
    },
    "products": [
        {
            "product_id": "p-001",
            "name": "Widget A",
            "stock": 99,
            "tags": ["gadget", "tech"]
        },
        {
            "product_id": "p-002",
            "name": "Widget B",
            "stock": 150,
            "tags": ["gadget", "classic"]
        },
        {
            "product_id": "p-003",
            "name": "Widget C",
            "stock": 42,
            "tags": ["new", "tech"]
        }
    ],
    "metadata": {
        "last_login": "2025-06-29T10:00:00Z",
        "notes": "A string with an escape sequence \n here."
    }
}
"#;

fn tape() -> (Tape, SliceReader<'static>) {
    let mut reader = SliceReader::from(REAL_WORLD_JSON);
    let tape = tokenize(&mut reader).unwrap();
    (tape, reader)
}

/// Walks the tape by hand and checks every container owns exactly the
/// tokens its child count says.
fn check_subtree<R: BufferReader + ?Sized>(cursor: &mut TapeCursor<'_, R>) -> usize {
    let token = cursor.next().unwrap();
    let mut consumed = 1;
    match token.kind {
        TokenType::Object => {
            for _ in 0..token.child_count {
                assert_eq!(cursor.next().unwrap().kind, TokenType::String);
                consumed += 1 + check_subtree(cursor);
            }
        }
        TokenType::Array => {
            for _ in 0..token.child_count {
                consumed += check_subtree(cursor);
            }
        }
        _ => assert_eq!(token.child_count, 0),
    }
    consumed
}

/// Finds `key` among the members of the object at the cursor, skipping the
/// values of every other member. Leaves the cursor on the member's value.
fn seek_member<R: BufferReader + ?Sized>(cursor: &mut TapeCursor<'_, R>, key: &str) -> bool {
    let pairs = cursor.begin_object().unwrap();
    for _ in 0..pairs {
        if cursor.read_key().unwrap() == key {
            return true;
        }
        cursor.skip_value().unwrap();
    }
    false
}

#[test]
fn test_tape_invariant() {
    let (tape, reader) = tape();

    let mut cursor = tape.cursor(&reader);
    assert_eq!(check_subtree(&mut cursor), tape.len());
    assert!(cursor.at_end());

    let mut cursor = tape.cursor(&reader);
    cursor.skip_value().unwrap();
    assert!(cursor.at_end());
}

#[test]
fn test_skip_equivalence() {
    let (tape, reader) = tape();
    let full: Value = tapejson::decode_one(&tape, &reader).unwrap();

    for (key, expected) in full.as_object().unwrap() {
        let mut cursor = tape.cursor(&reader);
        assert!(seek_member(&mut cursor, key), "{key}");
        let value: Value = tapejson::Decode::decode(&mut cursor).unwrap();
        assert_eq!(&value, expected, "{key}");
    }
}

#[test]
fn test_selective_extraction() {
    let (tape, reader) = tape();

    let mut cursor = tape.cursor(&reader);
    assert!(seek_member(&mut cursor, "email"));
    assert_eq!(cursor.read_string().unwrap(), "jdoe@example.com");

    let mut cursor = tape.cursor(&reader);
    assert!(seek_member(&mut cursor, "feature_flags"));
    assert!(seek_member(&mut cursor, "new_dashboard"));
    assert!(cursor.read_bool().unwrap());

    let mut cursor = tape.cursor(&reader);
    assert!(seek_member(&mut cursor, "products"));
    assert_eq!(cursor.begin_array().unwrap(), 3);
    cursor.skip_value().unwrap();
    assert!(seek_member(&mut cursor, "product_id"));
    assert_eq!(cursor.read_string().unwrap(), "p-002");

    let mut cursor = tape.cursor(&reader);
    assert!(seek_member(&mut cursor, "metadata"));
    assert!(seek_member(&mut cursor, "notes"));
    assert_eq!(
        cursor.read_string().unwrap(),
        "A string with an escape sequence \n here."
    );

    let mut cursor = tape.cursor(&reader);
    assert!(!seek_member(&mut cursor, "missing"));
    assert!(cursor.at_end());
}

#[test]
fn test_skip_does_not_decode() {
    // A bad escape inside a skipped member never surfaces.
    let json = r#"{"broken":["\q", {"deeper": "\x"}], "fine": 1}"#;
    let mut reader = SliceReader::from(json);
    let tape = tokenize(&mut reader).unwrap();

    let mut cursor = tape.cursor(&reader);
    assert!(seek_member(&mut cursor, "fine"));
    assert_eq!(cursor.read_integer::<u8>().unwrap(), 1);

    let err = tapejson::decode_one::<Value, _>(&tape, &reader).unwrap_err();
    assert_eq!(err.as_syntax().unwrap().message(), "Bad escape");
}
