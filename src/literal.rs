//! Literal extraction: pulls quoted strings and substitution placeholders out
//! of a raw query and replaces each one with an opaque label.

use std::collections::HashMap;

use crate::{
    error::{QueryError, Result},
    value::Value,
};

const LABEL_PREFIX: &str = "_LIT";

/// Values bound to the placeholders of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Substitutions {
    /// Fills `:name` placeholders by key.
    Named(HashMap<String, Value>),
    /// Fills `?` placeholders in order.
    Positional(Vec<Value>),
}

impl Substitutions {
    /// Builds named substitutions from `(key, value)` pairs.
    ///
    /// ```
    /// # use storeql::{Substitutions, Value};
    /// let subs = Substitutions::named([("id", 1), ("age", 30)]);
    /// assert!(matches!(subs, Substitutions::Named(m) if m["id"] == Value::Int(1)));
    /// ```
    pub fn named<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds positional substitutions, consumed by `?` from left to right.
    pub fn positional<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Positional(values.into_iter().map(Into::into).collect())
    }
}

/// A query with every literal and placeholder replaced by a label, plus the
/// label → value map needed to restore them.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    text: String,
    literals: HashMap<String, Value>,
}

impl Extraction {
    /// The de-literalized query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the value bound to `token` if it is a label of this query.
    ///
    /// Any other token yields `None`, so the resolver can be applied to every
    /// token of the query without first checking what it is.
    pub fn resolve(&self, token: &str) -> Option<&Value> {
        self.literals.get(token)
    }

    /// Number of labels handed out.
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    fn bind(&mut self, value: Value) {
        let label = format!("{LABEL_PREFIX}{}_", self.literals.len() + 1);
        self.text.push_str(&label);
        self.literals.insert(label, value);
    }
}

/// Replaces quoted literals, then placeholders, with labels.
///
/// Quoted literals use `'...'` or `"..."`; a backslash escapes the matching
/// quote or another backslash. Placeholders are `:name` (looked up in named
/// substitutions) and `?` (filled from positional substitutions in order).
///
/// # Errors
/// - [QueryError::MalformedQuery] for an unterminated quote.
/// - [QueryError::UnresolvedSubstitution] when a placeholder has no value.
/// - [QueryError::UnusedSubstitution] when positional values are left over.
pub fn extract_literals(input: &str, subs: Option<&Substitutions>) -> Result<Extraction> {
    let mut extraction = Extraction::default();
    let quoted = replace_quoted(input, &mut extraction)?;
    replace_placeholders(&quoted, subs, &mut extraction)?;
    Ok(extraction)
}

fn replace_quoted(input: &str, extraction: &mut Extraction) -> Result<String> {
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\'' && ch != '"' {
            extraction.text.push(ch);
            continue;
        }

        let quote = ch;
        let mut content = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' if matches!(chars.peek(), Some(&n) if n == quote || n == '\\') => {
                    if let Some(escaped) = chars.next() {
                        content.push(escaped);
                    }
                }
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => content.push(c),
            }
        }

        if !closed {
            return Err(QueryError::malformed(format!(
                "unterminated {quote} literal"
            )));
        }
        extraction.bind(Value::from(content));
    }

    Ok(std::mem::take(&mut extraction.text))
}

fn replace_placeholders(
    text: &str,
    subs: Option<&Substitutions>,
    extraction: &mut Extraction,
) -> Result<()> {
    let values: &[Value] = match subs {
        Some(Substitutions::Positional(values)) => values,
        _ => Default::default(),
    };
    let mut positional = values.iter();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if matches!(chars.peek(), Some(c) if c.is_alphabetic() || *c == '_') => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if !(c.is_alphanumeric() || c == '_') {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                let value = match subs {
                    Some(Substitutions::Named(map)) => map.get(&name),
                    _ => None,
                }
                .ok_or_else(|| QueryError::UnresolvedSubstitution(format!(":{name}")))?;
                extraction.bind(value.clone());
            }
            '?' => {
                let value = positional.next().ok_or_else(|| {
                    QueryError::UnresolvedSubstitution(format!(
                        "more ? placeholders than the {} positional value(s)",
                        values.len()
                    ))
                })?;
                extraction.bind(value.clone());
            }
            c => extraction.text.push(c),
        }
    }

    match positional.len() {
        0 => Ok(()),
        left => Err(QueryError::UnusedSubstitution(left)),
    }
}
