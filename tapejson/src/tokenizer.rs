// SPDX-License-Identifier: Apache-2.0

//! Single forward pass from bytes to a preorder token tape.
//!
//! Containers are pushed before their children and their `child_count` is
//! patched when the closing delimiter is seen. Strings and numbers are only
//! delimited here; escapes and numeric values are decoded later, on demand,
//! which keeps skipping unwanted subtrees cheap.

use crate::buffer::BufferReader;
use crate::error::{SyntaxFault, MAX_FAULT_TEXT};
use crate::scalar::number::{looks_hexadecimal, scan_number};
use crate::tape::Tape;
use crate::token::{Token, TokenType};

/// Runtime limits for a [`Tokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Deepest container nesting accepted; deeper input is a syntax fault.
    pub max_depth: usize,
    /// Initial tape allocation, in tokens.
    pub tape_capacity: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            tape_capacity: 0,
        }
    }
}

/// Converts one JSON document into a [`Tape`].
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TokenizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Tokenizes the document starting at the reader's offset.
    ///
    /// On success the reader is left at its limit: the whole remaining range
    /// must be one JSON value surrounded by optional whitespace.
    pub fn tokenize<R: BufferReader + ?Sized>(&self, reader: &mut R) -> Result<Tape, SyntaxFault> {
        let start = reader.read_offset();
        let mut scan = Scan {
            reader,
            tokens: Vec::with_capacity(self.config.tape_capacity),
            max_depth: self.config.max_depth,
        };
        scan.document()?;
        let tape = Tape::from_tokens(scan.tokens);
        log::debug!(
            "tokenized {} bytes into {} tokens",
            scan.reader.read_offset().saturating_sub(start),
            tape.len()
        );
        Ok(tape)
    }
}

/// Tokenizes with the default configuration.
pub fn tokenize<R: BufferReader + ?Sized>(reader: &mut R) -> Result<Tape, SyntaxFault> {
    Tokenizer::new().tokenize(reader)
}

struct Scan<'r, R: ?Sized> {
    reader: &'r mut R,
    tokens: Vec<Token>,
    max_depth: usize,
}

/// A container whose closing delimiter has not been seen yet.
struct Frame {
    /// Tape index of the container token, patched on close.
    index: usize,
    /// Members completed so far.
    count: usize,
    object: bool,
}

impl Frame {
    fn delimiter(&self) -> (u8, &'static str) {
        if self.object {
            (b'}', "Expected ',' or '}'")
        } else {
            (b']', "Expected ',' or ']'")
        }
    }
}

impl<R: BufferReader + ?Sized> Scan<'_, R> {
    /// Open containers live on an explicit stack, so nesting depth costs heap
    /// frames rather than call stack.
    fn document(&mut self) -> Result<(), SyntaxFault> {
        let mut open: Vec<Frame> = Vec::new();
        'value: loop {
            if let Some(frame) = self.open_value(open.len())? {
                open.push(frame);
                continue;
            }
            // One value is complete: count it and close what it completes.
            loop {
                let Some(frame) = open.last_mut() else {
                    break 'value;
                };
                frame.count += 1;
                let (close, message) = frame.delimiter();
                let object = frame.object;
                if !self.separator(close, message)? {
                    if object {
                        self.member_key()?;
                    }
                    continue 'value;
                }
                if let Some(done) = open.pop() {
                    self.close_container(done.index, done.count);
                }
            }
        }
        self.skip_whitespace();
        if self.peek().is_some() {
            return Err(self.fault("Trailing garbage", self.pos()));
        }
        Ok(())
    }

    fn pos(&self) -> usize {
        self.reader.read_offset()
    }

    fn peek(&self) -> Option<u8> {
        self.reader.peek_byte().ok()
    }

    fn next_byte(&mut self) -> Option<u8> {
        self.reader.read_byte().ok()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.next_byte();
        }
    }

    fn fault(&self, message: &'static str, offset: usize) -> SyntaxFault {
        let available = self.reader.limit().saturating_sub(offset);
        let mut text = vec![0u8; available.min(MAX_FAULT_TEXT + 3)];
        if self.reader.get_bytes(offset, &mut text).is_err() {
            text.clear();
        }
        let fault = SyntaxFault::new(message, &text, offset);
        log::trace!("tokenizer fault: {fault}");
        fault
    }

    fn end_of_input(&self) -> SyntaxFault {
        self.fault("Unexpected end of input", self.reader.limit())
    }

    fn push(&mut self, token: Token) -> usize {
        self.tokens.push(token);
        self.tokens.len() - 1
    }


    /// Scans the start of one value at `depth`.
    ///
    /// Scalars and empty containers are complete on return. A non-empty
    /// container comes back as a new frame, positioned at its first member
    /// value.
    fn open_value(&mut self, depth: usize) -> Result<Option<Frame>, SyntaxFault> {
        self.skip_whitespace();
        let start = self.pos();
        let object = match self.peek() {
            None => return Err(self.end_of_input()),
            Some(b'{') => true,
            Some(b'[') => false,
            Some(b'"') => return self.string().map(|()| None),
            Some(b't') => return self.literal(b"true", TokenType::True).map(|()| None),
            Some(b'f') => return self.literal(b"false", TokenType::False).map(|()| None),
            Some(b'n') => return self.literal(b"null", TokenType::Null).map(|()| None),
            Some(b'-' | b'0'..=b'9') => return self.number().map(|()| None),
            Some(_) => return Err(self.fault("Unexpected character", start)),
        };

        let (kind, close) = if object {
            (TokenType::Object, b'}')
        } else {
            (TokenType::Array, b']')
        };
        let index = self.open_container(kind, depth)?;
        self.skip_whitespace();
        if self.peek() == Some(close) {
            self.next_byte();
            self.close_container(index, 0);
            return Ok(None);
        }
        if object {
            self.member_key()?;
        }
        Ok(Some(Frame {
            index,
            count: 0,
            object,
        }))
    }

    fn open_container(&mut self, kind: TokenType, depth: usize) -> Result<usize, SyntaxFault> {
        let begin = self.pos();
        if depth >= self.max_depth {
            return Err(self.fault("Maximum nesting depth exceeded", begin));
        }
        self.next_byte();
        Ok(self.push(Token {
            kind,
            begin,
            end: begin,
            child_count: 0,
        }))
    }

    fn close_container(&mut self, index: usize, child_count: usize) {
        let end = self.pos();
        let token = &mut self.tokens[index];
        token.child_count = child_count;
        token.end = end;
    }

    /// Consumes the separator after a container member. Returns `true` when
    /// the container is closed.
    fn separator(&mut self, close: u8, message: &'static str) -> Result<bool, SyntaxFault> {
        self.skip_whitespace();
        let at = self.pos();
        match self.next_byte() {
            Some(b',') => {
                self.skip_whitespace();
                if self.peek() == Some(close) {
                    return Err(self.fault("Trailing comma", at));
                }
                Ok(false)
            }
            Some(byte) if byte == close => Ok(true),
            Some(_) => Err(self.fault(message, at)),
            None => Err(self.end_of_input()),
        }
    }

    /// Scans an object key and the `:` after it.
    fn member_key(&mut self) -> Result<(), SyntaxFault> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'"') => self.string()?,
            Some(_) => return Err(self.fault("Expected object key", self.pos())),
            None => return Err(self.end_of_input()),
        }

        self.skip_whitespace();
        let at = self.pos();
        match self.next_byte() {
            Some(b':') => Ok(()),
            Some(_) => Err(self.fault("Expected ':'", at)),
            None => Err(self.end_of_input()),
        }
    }

    fn string(&mut self) -> Result<(), SyntaxFault> {
        let quote = self.pos();
        self.next_byte();
        let begin = self.pos();
        loop {
            match self.next_byte() {
                Some(b'"') => break,
                // Only the terminator matters here; escape validity is
                // checked when the string is decoded.
                Some(b'\\') => {
                    if self.next_byte().is_none() {
                        return Err(self.fault("Unterminated string", quote));
                    }
                }
                Some(byte) if byte < 0x20 => {
                    return Err(self.fault("Unescaped control character", self.pos() - 1));
                }
                Some(_) => {}
                None => return Err(self.fault("Unterminated string", quote)),
            }
        }
        let end = self.pos() - 1;
        self.push(Token::scalar(TokenType::String, begin, end));
        Ok(())
    }

    fn literal(&mut self, expected: &'static [u8], kind: TokenType) -> Result<(), SyntaxFault> {
        let begin = self.pos();
        for &byte in expected {
            match self.next_byte() {
                Some(actual) if actual == byte => {}
                Some(_) => return Err(self.fault("Invalid literal", begin)),
                None => return Err(self.end_of_input()),
            }
        }
        self.push(Token::scalar(kind, begin, self.pos()));
        Ok(())
    }

    fn number(&mut self) -> Result<(), SyntaxFault> {
        let begin = self.pos();
        let reader = &*self.reader;
        let scanned = scan_number(|i| reader.get_byte(begin + i).ok());
        let len = match scanned {
            Ok(len) => len,
            Err(bad) if begin + bad >= self.reader.limit() => return Err(self.end_of_input()),
            Err(_) => return Err(self.fault("Invalid number", begin)),
        };

        let mut head = [0u8; 3];
        let head_len = self.reader.limit().saturating_sub(begin).min(head.len());
        if self
            .reader
            .get_bytes(begin, &mut head[..head_len])
            .is_ok()
            && looks_hexadecimal(&head[..head_len])
        {
            return Err(self.fault("Hexadecimal numbers are not permitted", begin));
        }

        if self.reader.skip_bytes(len).is_err() {
            return Err(self.end_of_input());
        }
        self.push(Token::scalar(TokenType::Number, begin, begin + len));
        Ok(())
    }
}
