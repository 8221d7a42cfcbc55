// SPDX-License-Identifier: Apache-2.0

//! The token tape and a forward-only cursor over it.

use core::str::FromStr;

use crate::buffer::BufferReader;
use crate::error::{CodecError, OutOfBounds, SyntaxFault};
use crate::scalar::{self, expect_kind};
use crate::token::{Token, TokenType};

/// Preorder sequence of [`Token`]s describing one JSON document.
///
/// Produced by [`tokenize`](crate::tokenize). Spans point into the source the
/// tape was tokenized from, so the same source must be handed to
/// [`Tape::cursor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tape {
    tokens: Vec<Token>,
}

impl Tape {
    pub(crate) fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The document's top-level value.
    pub fn root(&self) -> Option<&Token> {
        self.tokens.first()
    }

    /// Starts a traversal at the root, resolving spans against `source`.
    pub fn cursor<'a, R: BufferReader + ?Sized>(&'a self, source: &'a R) -> TapeCursor<'a, R> {
        TapeCursor {
            tokens: &self.tokens,
            source,
            position: 0,
        }
    }
}

/// Forward-only position in a [`Tape`], bound to the tape's source.
///
/// Structural moves ([`next`](Self::next), [`skip_value`](Self::skip_value),
/// ...) never look at the source. Typed reads consume one token and decode its
/// span.
#[derive(Debug)]
pub struct TapeCursor<'a, R: ?Sized> {
    tokens: &'a [Token],
    source: &'a R,
    position: usize,
}

impl<'a, R: BufferReader + ?Sized> TapeCursor<'a, R> {
    /// Index of the next token to be returned.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn source(&self) -> &'a R {
        self.source
    }

    /// Tokens not yet consumed.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    pub fn at_end(&self) -> bool {
        self.position == self.tokens.len()
    }

    pub fn peek(&self) -> Result<Token, OutOfBounds> {
        OutOfBounds::check(self.position, 1, self.tokens.len())?;
        Ok(self.tokens[self.position])
    }

    pub fn next(&mut self) -> Result<Token, OutOfBounds> {
        let token = self.peek()?;
        self.position += 1;
        Ok(token)
    }

    /// Steps over exactly one token, e.g. an object key that is not needed.
    pub fn skip_element(&mut self) -> Result<(), OutOfBounds> {
        self.next().map(drop)
    }

    /// Steps over one whole value, including every token nested inside it.
    pub fn skip_value(&mut self) -> Result<(), OutOfBounds> {
        let mut pending = 1usize;
        while pending > 0 {
            let token = self.next()?;
            pending = pending - 1 + token.owned_entries();
        }
        Ok(())
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        let token = self.next()?;
        scalar::decode_number(&token, self.source)
    }

    /// Reads an integer literal exactly; fractions and out-of-range values fail.
    pub fn read_integer<T: FromStr>(&mut self) -> Result<T, CodecError> {
        let token = self.next()?;
        scalar::decode_integer(&token, self.source)
    }

    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let token = self.next()?;
        scalar::decode_string(&token, self.source)
    }

    /// Reads the key of the next object member.
    pub fn read_key(&mut self) -> Result<String, CodecError> {
        self.read_string()
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        let token = self.next()?;
        scalar::decode_bool(&token, self.source)
    }

    pub fn read_null(&mut self) -> Result<(), CodecError> {
        let token = self.next()?;
        scalar::decode_null(&token, self.source)
    }

    /// Enters an object, returning its number of key/value pairs.
    pub fn begin_object(&mut self) -> Result<usize, CodecError> {
        self.begin(TokenType::Object)
    }

    /// Enters an array, returning its number of elements.
    pub fn begin_array(&mut self) -> Result<usize, CodecError> {
        self.begin(TokenType::Array)
    }

    fn begin(&mut self, kind: TokenType) -> Result<usize, CodecError> {
        let token = self.next()?;
        expect_kind(&token, kind, self.source)?;
        Ok(token.child_count)
    }

    /// Whether the next token is `null`, without consuming it.
    pub fn is_null(&self) -> Result<bool, OutOfBounds> {
        Ok(self.peek()?.kind == TokenType::Null)
    }

    /// Leading source text of `token`, for diagnostics.
    pub fn token_text(&self, token: &Token) -> String {
        String::from_utf8_lossy(&scalar::token_text(token, self.source)).into_owned()
    }

    /// A fault for `token` naming what the caller expected instead.
    pub fn unexpected(&self, expected: &str, token: &Token) -> SyntaxFault {
        scalar::mismatch(expected, token, self.source)
    }
}
