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

//! Lexical helpers shared by enhancers
//!
//! Positions are byte offsets into UTF-8 text; every offset returned falls
//! on a character boundary.

/// Offset just past the string literal opening at `start`, or the end of
/// `text` when the literal is unterminated
pub(super) fn string_end(text: &str, start: usize) -> usize {
    let mut chars = text[start..].char_indices();
    let Some((_, quote)) = chars.next() else {
        return text.len();
    };
    while let Some((offset, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            c if c == quote => return start + offset + c.len_utf8(),
            _ => {}
        }
    }
    text.len()
}

/// Apply `rewrite` to the body of every `${...}` and `#{...}` in `text`
///
/// Escaped openers, literal text and unterminated expressions are copied
/// unchanged.
pub(super) fn rewrite_embedded(text: &str, mut rewrite: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while pos < text.len() {
        let rest = &text[pos..];
        if rest.starts_with("\\${") || rest.starts_with("\\#{") {
            out.push_str(&rest[..3]);
            pos += 3;
            continue;
        }
        if rest.starts_with("${") || rest.starts_with("#{") {
            let body_start = pos + 2;
            match expression_end(text, body_start) {
                Some(close) => {
                    out.push_str(&rest[..2]);
                    out.push_str(&rewrite(&text[body_start..close]));
                    out.push('}');
                    pos = close + 1;
                }
                None => {
                    out.push_str(rest);
                    pos = text.len();
                }
            }
            continue;
        }
        let Some(c) = rest.chars().next() else { break };
        out.push(c);
        pos += c.len_utf8();
    }
    out
}

/// Offset of the `}` closing the expression whose body starts at `start`
fn expression_end(text: &str, start: usize) -> Option<usize> {
    let mut pos = start;
    while pos < text.len() {
        let c = text[pos..].chars().next()?;
        match c {
            '\'' | '"' => pos = string_end(text, pos),
            '}' => return Some(pos),
            c => pos += c.len_utf8(),
        }
    }
    None
}

/// Split the argument list following an opening parenthesis
///
/// `text` starts right after the `(`. Returns the raw top-level arguments
/// and the offset just past the matching `)`, or `None` when the list is
/// not closed.
pub(super) fn split_arguments(text: &str) -> Option<(Vec<&str>, usize)> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut arg_start = 0;
    let mut pos = 0;
    while pos < text.len() {
        let c = text[pos..].chars().next()?;
        match c {
            '\'' | '"' => {
                pos = string_end(text, pos);
                continue;
            }
            '(' | '[' => depth += 1,
            ')' if depth == 0 => {
                let last = &text[arg_start..pos];
                if !(args.is_empty() && last.trim().is_empty()) {
                    args.push(last);
                }
                return Some((args, pos + 1));
            }
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(&text[arg_start..pos]);
                arg_start = pos + 1;
            }
            '}' => return None,
            _ => {}
        }
        pos += c.len_utf8();
    }
    None
}

/// Whether `c` can continue an identifier
pub(super) fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_end_skips_escapes() {
        assert_eq!(string_end(r"'it\'s' rest", 0), 7);
        assert_eq!(string_end(r#""a}b""#, 0), 5);
        assert_eq!(string_end("'open", 0), 5);
    }

    #[test]
    fn test_split_arguments_respects_nesting_and_quotes() {
        let (args, end) = split_arguments("a, f(b, c), 'x,)' ) + 1").unwrap();
        assert_eq!(args, ["a", " f(b, c)", " 'x,)' "]);
        assert_eq!(end, 19);
        assert_eq!(split_arguments(" )").unwrap(), (vec![], 2));
        assert_eq!(split_arguments("a, b"), None);
    }

    #[test]
    fn test_rewrite_embedded_only_touches_expressions() {
        let upper = |body: &str| body.to_uppercase();
        assert_eq!(
            rewrite_embedded("a ${b} \\${c} #{'}'} ${d", upper),
            "a ${B} \\${c} #{'}'} ${d"
        );
    }
}
