// SPDX-License-Identifier: Apache-2.0

use core::ops::Range;

/// Lexical class of a tape entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Object,
    Array,
    String,
    Number,
    True,
    False,
    Null,
}

impl TokenType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenType::Object => "object",
            TokenType::Array => "array",
            TokenType::String => "string",
            TokenType::Number => "number",
            TokenType::True => "true",
            TokenType::False => "false",
            TokenType::Null => "null",
        }
    }

    pub const fn is_container(&self) -> bool {
        matches!(self, TokenType::Object | TokenType::Array)
    }
}

impl core::fmt::Display for TokenType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fixed-size entry of a [`Tape`](crate::Tape).
///
/// `begin..end` is a half-open span into the tokenized source:
/// * strings: the raw content between the quotes, escapes still encoded
/// * numbers and literals: the literal text
/// * objects and arrays: opening through closing delimiter
///
/// `child_count` is the number of elements of an array, the number of
/// key/value pairs of an object, and zero for scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenType,
    pub begin: usize,
    pub end: usize,
    pub child_count: usize,
}

impl Token {
    pub(crate) const fn scalar(kind: TokenType, begin: usize, end: usize) -> Self {
        Self {
            kind,
            begin,
            end,
            child_count: 0,
        }
    }

    pub fn span(&self) -> Range<usize> {
        self.begin..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of tape entries directly owned by this token: one per array
    /// element, two (key and value) per object pair.
    pub fn owned_entries(&self) -> usize {
        match self.kind {
            TokenType::Object => self.child_count.saturating_mul(2),
            TokenType::Array => self.child_count,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_owned_entries() {
        let object = Token {
            kind: TokenType::Object,
            begin: 0,
            end: 10,
            child_count: 3,
        };
        assert_eq!(object.owned_entries(), 6);

        let array = Token {
            child_count: 3,
            kind: TokenType::Array,
            ..object
        };
        assert_eq!(array.owned_entries(), 3);

        let string = Token::scalar(TokenType::String, 4, 4);
        assert_eq!(string.owned_entries(), 0);
        assert!(string.is_empty());
        assert_eq!(string.span(), 4..4);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(TokenType::Number.to_string(), "number");
        assert!(TokenType::Array.is_container());
        assert!(!TokenType::Null.is_container());
    }
}
