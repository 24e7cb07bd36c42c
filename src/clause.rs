//! `WHERE` clause representation and evaluation.

use std::cmp::Ordering;

use crate::{
    config::ChainEvaluation,
    error::{QueryError, Result},
    table::Row,
    tokenizer::Comparator,
    value::Value,
};

/// A single `field OP value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub field: String,
    pub op: Comparator,
    pub value: Value,
}

impl Term {
    pub fn new(field: impl Into<String>, op: Comparator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Compares the row's field against the term's value.
    ///
    /// A field missing from the row fails every ordering comparator and is
    /// only equal to `NULL`. A stored `NULL` compares like any other value.
    pub fn matches(&self, row: &Row) -> bool {
        let Some(field) = row.get(&self.field) else {
            return match self.op {
                Comparator::Eq => self.value.is_null(),
                Comparator::NotEq => !self.value.is_null(),
                _ => false,
            };
        };

        match self.op {
            Comparator::Eq => field.loose_eq(&self.value),
            Comparator::NotEq => !field.loose_eq(&self.value),
            Comparator::Lt => field.loose_cmp(&self.value) == Some(Ordering::Less),
            Comparator::LtEq => matches!(
                field.loose_cmp(&self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Comparator::Gt => field.loose_cmp(&self.value) == Some(Ordering::Greater),
            Comparator::GtEq => matches!(
                field.loose_cmp(&self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClauseToken {
    Term(Term),
    And,
    Or,
    Open,
    Close,
}

/// A `WHERE` clause kept as the flat token sequence it was written as.
///
/// Parenthesized groups are only resolved at evaluation time, innermost first,
/// so that the left-to-right chain rule applies inside every group.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    tokens: Vec<ClauseToken>,
}

/// Working copy of a clause during evaluation: groups already resolved are
/// replaced by their truth value.
#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
    Term(&'a Term),
    Resolved(bool),
    And,
    Or,
    Open,
    Close,
}

impl Clause {
    /// Checks that the tokens form `operand ((AND|OR) operand)*`, where an operand
    /// is a term or a non-empty parenthesized clause.
    ///
    /// # Errors
    /// Returns [QueryError::MalformedQuery] for empty clauses, unbalanced
    /// parentheses, or misplaced `AND`/`OR`.
    pub fn new(tokens: Vec<ClauseToken>) -> Result<Self> {
        let end = check_chain(&tokens, 0)?;
        if end != tokens.len() {
            return Err(QueryError::malformed(format!(
                "unexpected {:?} in WHERE clause",
                tokens[end]
            )));
        }
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[ClauseToken] {
        &self.tokens
    }

    /// Evaluates the clause against one row.
    ///
    /// The rightmost `(` is always resolved first together with the first `)`
    /// after it, which guarantees innermost-first resolution for any nesting.
    pub fn evaluate(&self, row: &Row, mode: ChainEvaluation) -> bool {
        let mut slots: Vec<Slot<'_>> = self
            .tokens
            .iter()
            .map(|token| match token {
                ClauseToken::Term(term) => Slot::Term(term),
                ClauseToken::And => Slot::And,
                ClauseToken::Or => Slot::Or,
                ClauseToken::Open => Slot::Open,
                ClauseToken::Close => Slot::Close,
            })
            .collect();

        while let Some(open) = slots.iter().rposition(|s| matches!(s, Slot::Open)) {
            let Some(close) = slots[open..]
                .iter()
                .position(|s| matches!(s, Slot::Close))
                .map(|offset| open + offset)
            else {
                break;
            };
            let value = evaluate_chain(&slots[open + 1..close], row, mode);
            slots.splice(open..=close, [Slot::Resolved(value)]);
        }

        evaluate_chain(&slots, row, mode)
    }
}

/// Returns the index right after the chain starting at `pos`.
fn check_chain(tokens: &[ClauseToken], mut pos: usize) -> Result<usize> {
    loop {
        pos = match tokens.get(pos) {
            Some(ClauseToken::Term(_)) => pos + 1,
            Some(ClauseToken::Open) => {
                let close = check_chain(tokens, pos + 1)?;
                if !matches!(tokens.get(close), Some(ClauseToken::Close)) {
                    return Err(QueryError::malformed("unbalanced parentheses in WHERE clause"));
                }
                close + 1
            }
            Some(other) => {
                return Err(QueryError::malformed(format!(
                    "expected a comparison, found {other:?}"
                )));
            }
            None => return Err(QueryError::malformed("incomplete WHERE clause")),
        };

        match tokens.get(pos) {
            Some(ClauseToken::And | ClauseToken::Or) => pos += 1,
            _ => return Ok(pos),
        }
    }
}

fn evaluate_chain(slots: &[Slot<'_>], row: &Row, mode: ChainEvaluation) -> bool {
    match mode {
        ChainEvaluation::Sequential => evaluate_sequential(slots, row),
        ChainEvaluation::Precedence => evaluate_precedence(slots, row),
    }
}

fn truth(slot: &Slot<'_>, row: &Row) -> bool {
    match slot {
        Slot::Term(term) => term.matches(row),
        Slot::Resolved(value) => *value,
        // Clause::new only lets operands sit at even positions
        Slot::And | Slot::Or | Slot::Open | Slot::Close => false,
    }
}

/// Strict left-to-right reading: stop at the first operand whose value,
/// together with the operator right after it, settles the outcome.
fn evaluate_sequential(slots: &[Slot<'_>], row: &Row) -> bool {
    let mut i = 0;
    while i < slots.len() {
        let result = truth(&slots[i], row);
        match (result, slots.get(i + 1)) {
            (true, None | Some(Slot::Or)) => return true,
            (false, None | Some(Slot::And)) => return false,
            _ => i += 2,
        }
    }
    false
}

/// Conventional precedence: `AND` binds tighter, the chain is an `OR` of `AND` groups.
fn evaluate_precedence(slots: &[Slot<'_>], row: &Row) -> bool {
    let mut group = true;
    let mut i = 0;
    while i < slots.len() {
        group = group && truth(&slots[i], row);
        match slots.get(i + 1) {
            Some(Slot::Or) => {
                if group {
                    return true;
                }
                group = true;
            }
            Some(_) => {}
            None => break,
        }
        i += 2;
    }
    group
}
