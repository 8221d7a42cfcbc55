// SPDX-License-Identifier: Apache-2.0

//! Tape-based JSON codec for data-transfer objects.
//!
//! Decoding is two-phase. [`tokenize`] makes one pass over the input and
//! records every value as a fixed-size [`Token`] in a flat preorder [`Tape`],
//! without decoding strings or numbers. A [`TapeCursor`] then walks the tape,
//! decoding only the values a DTO asks for and skipping whole subtrees of the
//! rest by their child counts.
//!
//! Encoding goes straight from native values into a [`BufferWriter`].
//!
//! ```
//! use tapejson::{tokenize, SliceReader};
//!
//! let json = br#"{"service":"echo","meta":{"tags":["a","b"]},"port":8080}"#;
//! let mut reader = SliceReader::new(json);
//! let tape = tokenize(&mut reader).unwrap();
//!
//! let mut cursor = tape.cursor(&reader);
//! let mut port = None;
//! for _ in 0..cursor.begin_object().unwrap() {
//!     if cursor.read_key().unwrap() == "port" {
//!         port = Some(cursor.read_integer::<u16>().unwrap());
//!     } else {
//!         cursor.skip_value().unwrap();
//!     }
//! }
//! assert_eq!(port, Some(8080));
//! ```

mod buffer;
pub mod catalog;
mod dto;
mod error;
pub mod scalar;
mod tape;
mod token;
mod tokenizer;
mod value;

#[cfg(feature = "bytes")]
pub use buffer::BytesReader;
pub use buffer::{BufferReader, BufferWriter, SliceReader, SliceWriter};
pub use dto::{
    decode_many, decode_one, encode_many, encode_one, from_slice, from_str, missing_field,
    to_string, to_vec, ArrayWriter, Decode, Encode, ObjectWriter,
};
pub use error::{CodecError, EncodeFault, OutOfBounds, SyntaxFault, MAX_FAULT_TEXT};
pub use tape::{Tape, TapeCursor};
pub use token::{Token, TokenType};
pub use tokenizer::{tokenize, Tokenizer, TokenizerConfig};
pub use value::{Members, Value};
