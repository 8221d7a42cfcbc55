// SPDX-License-Identifier: Apache-2.0

// Hand-written DTOs of the kind a service registry exchanges.

use tapejson::catalog::BigInteger;
use tapejson::{
    decode_many, encode_many, from_str, missing_field, to_string, tokenize, ArrayWriter,
    BufferReader, BufferWriter, CodecError, Decode, Encode, ObjectWriter, SliceReader, TapeCursor,
};
use test_log::test;

#[derive(Debug, Clone, PartialEq)]
struct Interface {
    name: String,
    secure: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct ServiceRecord {
    id: u64,
    definition: String,
    port: u16,
    interfaces: Vec<Interface>,
    version: Option<i32>,
    sequence: BigInteger,
}

impl Decode for Interface {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        let object = cursor.peek()?;
        let (mut name, mut secure) = (None, false);
        for _ in 0..cursor.begin_object()? {
            match cursor.read_key()?.as_str() {
                "name" => name = Some(cursor.read_string()?),
                "secure" => secure = cursor.read_bool()?,
                _ => cursor.skip_value()?,
            }
        }
        Ok(Interface {
            name: name.ok_or_else(|| missing_field("name", &object))?,
            secure,
        })
    }
}

impl Encode for Interface {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        let mut object = ObjectWriter::new(writer)?;
        object.field("name", &self.name)?;
        object.field("secure", &self.secure)?;
        object.finish()
    }
}

impl Decode for ServiceRecord {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        let object = cursor.peek()?;
        let mut id = None;
        let mut definition = None;
        let mut port = None;
        let mut interfaces: Vec<Interface> = Vec::new();
        let mut version: Option<i32> = None;
        let mut sequence = None;
        for _ in 0..cursor.begin_object()? {
            match cursor.read_key()?.as_str() {
                "id" => id = Some(cursor.read_integer()?),
                "serviceDefinition" => definition = Some(cursor.read_string()?),
                "port" => port = Some(cursor.read_integer()?),
                "interfaces" => interfaces = Decode::decode(cursor)?,
                "version" => version = Decode::decode(cursor)?,
                "sequence" => sequence = Some(BigInteger::decode(cursor)?),
                _ => cursor.skip_value()?,
            }
        }
        Ok(ServiceRecord {
            id: id.ok_or_else(|| missing_field("id", &object))?,
            definition: definition.ok_or_else(|| missing_field("serviceDefinition", &object))?,
            port: port.ok_or_else(|| missing_field("port", &object))?,
            interfaces,
            version,
            sequence: sequence.ok_or_else(|| missing_field("sequence", &object))?,
        })
    }
}

impl Encode for ServiceRecord {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        let mut object = ObjectWriter::new(writer)?;
        object.field("id", &self.id)?;
        object.field("serviceDefinition", &self.definition)?;
        object.field("port", &self.port)?;
        object.field("interfaces", &self.interfaces)?;
        object.optional_field("version", self.version.as_ref())?;
        object.field("sequence", &self.sequence)?;
        object.finish()
    }
}

fn record() -> ServiceRecord {
    ServiceRecord {
        id: 17,
        definition: "temperature \"celsius\"".into(),
        port: 8443,
        interfaces: vec![
            Interface {
                name: "HTTP-SECURE-JSON".into(),
                secure: true,
            },
            Interface {
                name: "HTTP-INSECURE-JSON".into(),
                secure: false,
            },
        ],
        version: None,
        sequence: "98765432109876543210987654321".parse().unwrap(),
    }
}

#[test]
fn test_record_encoding() {
    let json = to_string(&record()).unwrap();
    assert_eq!(
        json,
        concat!(
            r#"{"id":17,"serviceDefinition":"temperature \"celsius\"","port":8443,"#,
            r#""interfaces":[{"name":"HTTP-SECURE-JSON","secure":true},"#,
            r#"{"name":"HTTP-INSECURE-JSON","secure":false}],"#,
            r#""sequence":98765432109876543210987654321}"#
        )
    );
    assert_eq!(from_str::<ServiceRecord>(&json).unwrap(), record());
}

#[test]
fn test_record_ignores_unknown_members() {
    let json = r#"{
        "metadata": {"owner": ["ops", {"pager": null}]},
        "port": 1,
        "id": 2,
        "serviceDefinition": "x",
        "version": 3,
        "interfaces": [{"name": "A", "extra": [1, 2, 3]}],
        "sequence": -1
    }"#;
    let record = from_str::<ServiceRecord>(json).unwrap();
    assert_eq!(record.port, 1);
    assert_eq!(record.version, Some(3));
    assert_eq!(record.interfaces[0].name, "A");
    assert!(!record.interfaces[0].secure);
    assert_eq!(record.sequence.as_str(), "-1");
}

#[test]
fn test_missing_member() {
    let err = from_str::<ServiceRecord>(r#"  {"id": 1, "port": 2, "sequence": 0}"#).unwrap_err();
    let fault = err.as_syntax().unwrap();
    assert_eq!(fault.message(), "Missing field 'serviceDefinition'");
    assert_eq!(fault.offset(), 2);
}

#[test]
fn test_many_records() {
    let records = vec![record(), ServiceRecord { id: 18, version: Some(2), ..record() }];
    let mut out: Vec<u8> = Vec::new();
    encode_many(&records, &mut out).unwrap();

    let mut reader = SliceReader::new(&out);
    let tape = tokenize(&mut reader).unwrap();
    let decoded: Vec<ServiceRecord> = decode_many(&tape, &reader).unwrap();
    assert_eq!(decoded, records);
}

#[test]
fn test_array_writer_nesting() {
    let mut out: Vec<u8> = Vec::new();
    let mut outer = ArrayWriter::new(&mut out).unwrap();
    outer.element(&Vec::<i32>::new()).unwrap();
    outer.element(&vec![Some(1), None]).unwrap();
    outer.finish().unwrap();
    assert_eq!(out, b"[[],[1,null]]");
}
