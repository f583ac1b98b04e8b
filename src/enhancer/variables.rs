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

//! Shorthand syntax for the `variables:*` functions
//!
//! `${var:eq(status, 'open')}` becomes
//! `${variables:equals(planItemInstance,'status','open')}`. The prefixes
//! `variables`, `vars` and `var` are accepted, every function has a set of
//! aliases, and the variable name may be bare, single-quoted or
//! double-quoted. A call with one argument more than the shorthand takes
//! is the container form (`var:eq(other, 'status', 'open')`) and keeps its
//! first argument as the container instead of injecting the scope.
//!
//! The rewrite only looks inside `${...}` and `#{...}`, skips string
//! literals, and is idempotent: canonical calls rewrite to themselves.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;

use super::ExpressionEnhancer;
use super::scan::{is_identifier_char, rewrite_embedded, split_arguments, string_end};
use crate::registry::functions::variables::VARIABLES_PREFIX;

static SHORTHAND_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:variables|vars|var)\s*:\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(")
        .expect("shorthand call pattern is valid")
});

static BARE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("bare name pattern is valid")
});

/// A canonical variable function and the aliases that expand to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shorthand {
    /// Function name under the `variables` prefix
    pub canonical: &'static str,
    /// Accepted spellings, the canonical name included
    pub aliases: &'static [&'static str],
    /// Arguments the author writes, not counting the container
    pub arity: usize,
    /// Whether trailing arguments repeat
    pub variadic: bool,
}

const fn fixed(canonical: &'static str, aliases: &'static [&'static str], arity: usize) -> Shorthand {
    Shorthand {
        canonical,
        aliases,
        arity,
        variadic: false,
    }
}

const fn variadic(canonical: &'static str, aliases: &'static [&'static str]) -> Shorthand {
    Shorthand {
        canonical,
        aliases,
        arity: 2,
        variadic: true,
    }
}

/// The standard shorthand table
pub const SHORTHANDS: &[Shorthand] = &[
    fixed("equals", &["equals", "eq"], 2),
    fixed("notEquals", &["notEquals", "ne"], 2),
    fixed("exists", &["exists", "exist"], 1),
    fixed("get", &["get"], 1),
    fixed("getOrDefault", &["getOrDefault"], 2),
    fixed("lowerThan", &["lowerThan", "lessThan", "lt"], 2),
    fixed(
        "lowerThanOrEquals",
        &["lowerThanOrEquals", "lessThanOrEquals", "lte"],
        2,
    ),
    fixed("greaterThan", &["greaterThan", "gt"], 2),
    fixed("greaterThanOrEquals", &["greaterThanOrEquals", "gte"], 2),
    fixed("isEmpty", &["isEmpty", "empty"], 1),
    fixed("isNotEmpty", &["isNotEmpty", "notEmpty"], 1),
    variadic("contains", &["contains"]),
    variadic("containsAny", &["containsAny"]),
];

/// Expands shorthand variable function calls
#[derive(Debug, Clone)]
pub struct VariableFunctionEnhancer {
    scope_variable: String,
    by_alias: FxHashMap<&'static str, Shorthand>,
}

impl VariableFunctionEnhancer {
    /// Enhancer injecting `scope_variable` as the container
    pub fn new(scope_variable: impl Into<String>) -> Self {
        let by_alias = SHORTHANDS
            .iter()
            .flat_map(|s| s.aliases.iter().map(move |alias| (*alias, *s)))
            .collect();
        Self {
            scope_variable: scope_variable.into(),
            by_alias,
        }
    }

    /// Identifier injected as the container argument
    pub fn scope_variable(&self) -> &str {
        &self.scope_variable
    }

    /// Rewrite one expression body
    fn rewrite_expression(&self, body: &str) -> String {
        let mut out = String::with_capacity(body.len());
        let mut pos = 0;
        while pos < body.len() {
            let rest = &body[pos..];
            let Some(c) = rest.chars().next() else { break };
            if c == '\'' || c == '"' {
                let end = string_end(body, pos);
                out.push_str(&body[pos..end]);
                pos = end;
                continue;
            }
            let at_word_start = body[..pos]
                .chars()
                .next_back()
                .is_none_or(|prev| !is_identifier_char(prev) && prev != '.');
            if at_word_start {
                if let Some((call, consumed)) = self.rewrite_call(rest) {
                    out.push_str(&call);
                    pos += consumed;
                    continue;
                }
            }
            out.push(c);
            pos += c.len_utf8();
        }
        out
    }

    /// Rewrite the call starting at the beginning of `text`, returning the
    /// canonical call and the length of the text it replaces
    fn rewrite_call(&self, text: &str) -> Option<(String, usize)> {
        let captures = SHORTHAND_CALL.captures(text)?;
        let shorthand = self.by_alias.get(captures.get(1)?.as_str())?;
        let open = captures.get(0)?.end();
        let (raw_args, close) = split_arguments(&text[open..])?;

        let args: Vec<String> = raw_args
            .iter()
            .map(|arg| self.rewrite_expression(arg.trim()))
            .collect();

        let has_container = if shorthand.variadic {
            args.first().is_some_and(|first| *first == self.scope_variable)
        } else {
            args.len() == shorthand.arity + 1
        };
        let (container, rest) = match args.split_first() {
            Some((first, rest)) if has_container => (first.clone(), rest),
            _ => (self.scope_variable.clone(), args.as_slice()),
        };

        let mut canonical = Vec::with_capacity(rest.len() + 1);
        canonical.push(container);
        for (i, arg) in rest.iter().enumerate() {
            canonical.push(if i == 0 { quote_name(arg) } else { arg.clone() });
        }
        let call = format!(
            "{VARIABLES_PREFIX}:{}({})",
            shorthand.canonical,
            canonical.join(",")
        );
        Some((call, open + close))
    }
}

impl ExpressionEnhancer for VariableFunctionEnhancer {
    fn name(&self) -> &str {
        VARIABLES_PREFIX
    }

    fn enhance(&self, template: &str) -> String {
        rewrite_embedded(template, |body| self.rewrite_expression(body))
    }
}

/// A variable name argument as a single-quoted literal
///
/// Bare names and double-quoted literals are converted; anything else,
/// such as a nested call, is kept.
fn quote_name(arg: &str) -> String {
    if BARE_NAME.is_match(arg) && !matches!(arg, "true" | "false" | "null") {
        return format!("'{arg}'");
    }
    if arg.starts_with('"') && arg.len() >= 2 && string_end(arg, 0) == arg.len() {
        let inner = &arg[1..arg.len() - 1];
        let mut quoted = String::with_capacity(arg.len());
        quoted.push('\'');
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('"') => quoted.push('"'),
                    Some(escaped) => {
                        quoted.push('\\');
                        quoted.push(escaped);
                    }
                    None => quoted.push('\\'),
                },
                '\'' => quoted.push_str("\\'"),
                c => quoted.push(c),
            }
        }
        quoted.push('\'');
        return quoted;
    }
    arg.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn enhance(template: &str) -> String {
        VariableFunctionEnhancer::new("planItemInstance").enhance(template)
    }

    #[rstest]
    #[case("${var:eq(myVar,123)}", "${variables:equals(planItemInstance,'myVar',123)}")]
    #[case("${vars:equals('myVar', 123)}", "${variables:equals(planItemInstance,'myVar',123)}")]
    #[case("${variables:eq(\"myVar\", 123)}", "${variables:equals(planItemInstance,'myVar',123)}")]
    #[case("${var : ne ( myVar , 'a' )}", "${variables:notEquals(planItemInstance,'myVar','a')}")]
    #[case("${var:exist(myVar)}", "${variables:exists(planItemInstance,'myVar')}")]
    #[case("${var:lt(a, 5)}", "${variables:lowerThan(planItemInstance,'a',5)}")]
    #[case("${var:lessThanOrEquals(a, 5)}", "${variables:lowerThanOrEquals(planItemInstance,'a',5)}")]
    #[case("${var:gte(a, 5)}", "${variables:greaterThanOrEquals(planItemInstance,'a',5)}")]
    #[case("${var:empty(a)}", "${variables:isEmpty(planItemInstance,'a')}")]
    #[case("${var:notEmpty(a)}", "${variables:isNotEmpty(planItemInstance,'a')}")]
    #[case("${var:getOrDefault(a, 'x')}", "${variables:getOrDefault(planItemInstance,'a','x')}")]
    #[case("${var:contains(a, 'x', 'y')}", "${variables:contains(planItemInstance,'a','x','y')}")]
    #[case("${var:containsAny(a, 'x')}", "${variables:containsAny(planItemInstance,'a','x')}")]
    fn test_aliases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(enhance(input), expected);
    }

    #[test]
    fn test_container_form_keeps_container() {
        assert_eq!(
            enhance("${var:eq(other, 'myVar', 123)}"),
            "${variables:equals(other,'myVar',123)}"
        );
    }

    #[test]
    fn test_nested_calls_rewrite_independently() {
        assert_eq!(
            enhance("${var:get(var:get(holder), 'inner')}"),
            "${variables:get(variables:get(planItemInstance,'holder'),'inner')}"
        );
        assert_eq!(
            enhance("${var:eq(a, 1) && vars:gt(b, 2)}"),
            "${variables:equals(planItemInstance,'a',1) && variables:greaterThan(planItemInstance,'b',2)}"
        );
    }

    #[rstest]
    #[case("var:eq(a, 1)")]
    #[case("${'var:eq(a, 1)'}")]
    #[case("\\${var:eq(a, 1)}")]
    #[case("${myvar:eq(a, 1)}")]
    #[case("${var:unknown(a)}")]
    #[case("${var:eq(a, 1}")]
    fn test_untouched(#[case] input: &str) {
        assert_eq!(enhance(input), input);
    }

    #[rstest]
    #[case("${var:eq(myVar,123)}")]
    #[case("${var:contains(a, 'x')}")]
    #[case("${var:get(var:get(holder), \"it's\")}")]
    fn test_idempotent(#[case] input: &str) {
        let once = enhance(input);
        assert_eq!(enhance(&once), once);
    }

    #[test]
    fn test_double_quoted_name_escapes() {
        assert_eq!(quote_name(r#""it's""#), r"'it\'s'");
        assert_eq!(quote_name(r#""say \"hi\"""#), r#"'say "hi"'"#);
        assert_eq!(quote_name("f(x)"), "f(x)");
    }
}
