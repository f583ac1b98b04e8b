// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Source location tracking for the parser
//!
//! Positions are character offsets into the full template text, not byte
//! offsets, so they can be reported to users as-is.

use std::fmt;

/// A value with source location information
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    /// The value
    pub value: T,
    /// Start position in the input
    pub start: usize,
    /// End position in the input (exclusive)
    pub end: usize,
}

impl<T> Spanned<T> {
    /// Create a new spanned value
    pub fn new(value: T, start: usize, end: usize) -> Self {
        Self { value, start, end }
    }

    /// Get the span length
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Map the value while preserving the span
    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            value: f(self.value),
            start: self.start,
            end: self.end,
        }
    }

    /// Get a reference to the inner value
    pub fn as_ref(&self) -> Spanned<&T> {
        Spanned {
            value: &self.value,
            start: self.start,
            end: self.end,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Character-indexed view of a source string
///
/// The lexer and the template splitter both walk this instead of the raw
/// `&str` so every offset they produce is a character offset.
#[derive(Debug, Clone)]
pub struct SourceText<'a> {
    text: &'a str,
    chars: Vec<char>,
}

impl<'a> SourceText<'a> {
    /// Index the given text
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.chars().collect(),
        }
    }

    /// The original text
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Number of characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the text is empty
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at `pos`
    pub fn at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    /// Whether the text continues with `pattern` at `pos`
    pub fn starts_with_at(&self, pos: usize, pattern: &str) -> bool {
        let mut idx = pos;
        for c in pattern.chars() {
            if self.at(idx) != Some(c) {
                return false;
            }
            idx += 1;
        }
        true
    }

    /// Characters in `start..end` as a string
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start.min(self.len())..end.min(self.len())]
            .iter()
            .collect()
    }
}
