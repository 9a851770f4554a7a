//! Input stream parsing
//!
//! The input is line-oriented: lines beginning with `#` name the answer-key
//! variables for deduction mode (the last such line wins), and all remaining
//! lines together form one CSP description in the backend's grammar. The
//! description is split into balanced-parenthesis top-level terms; `(int ..)`
//! and `(bool ..)` heads declare variables, everything else is an opaque
//! constraint term.

use super::{Expr, ModelError, ProblemModel, VarKind};
use log::debug;
use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read input")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("unbalanced parentheses in CSP description")]
    Unbalanced,
    #[error("unexpected token `{0}` outside any term")]
    StrayToken(String),
    #[error("{kind} declaration is missing a variable name")]
    MissingName { kind: VarKind },
    #[error("answer key `{0}` does not name a declared variable")]
    UnknownAnswerKey(String),
}

/// A parsed problem plus the designated answer keys, if any. `None` selects
/// answer-finder mode; `Some` with an empty list is deduction mode with
/// nothing to deduce.
#[derive(Debug)]
pub struct LoadedProblem {
    pub model: ProblemModel,
    pub answer_keys: Option<Vec<String>>,
}

/// Read a problem from a line-oriented stream
pub fn load_problem<R: BufRead>(reader: R) -> Result<LoadedProblem, ParseError> {
    let mut answer_keys: Option<Vec<String>> = None;
    let mut description = String::new();

    for line in reader.lines() {
        let line = line?;
        if let Some(keys) = line.strip_prefix('#') {
            answer_keys = Some(keys.split_whitespace().map(str::to_string).collect());
        } else {
            description.push_str(&line);
            description.push('\n');
        }
    }

    let mut model = ProblemModel::new();
    for term in split_terms(&description)? {
        match declaration_head(&term)? {
            Some((kind, name)) => model.declare(kind, name, Expr::raw(term))?,
            None => model.add_constraint(Expr::raw(term)),
        }
    }

    if let Some(keys) = &answer_keys {
        for key in keys {
            if !model.mark_answer_key(key) {
                return Err(ParseError::UnknownAnswerKey(key.clone()));
            }
        }
    }

    debug!(
        "loaded problem: {} int vars, {} bool vars, {} terms, answer keys: {:?}",
        model.variables(VarKind::Int).len(),
        model.variables(VarKind::Bool).len(),
        model.terms().len(),
        answer_keys.as_ref().map(|k| k.len()),
    );

    Ok(LoadedProblem { model, answer_keys })
}

/// Split a CSP description into top-level balanced-parenthesis terms.
/// `;` starts a comment running to end of line.
fn split_terms(description: &str) -> Result<Vec<String>, ParseError> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = description.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                if depth > 0 {
                    current.push(' ');
                }
            }
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                if depth == 0 {
                    return Err(ParseError::Unbalanced);
                }
                depth -= 1;
                current.push(ch);
                if depth == 0 {
                    terms.push(std::mem::take(&mut current));
                }
            }
            c if c.is_whitespace() => {
                if depth > 0 {
                    current.push(c);
                }
            }
            c => {
                if depth == 0 {
                    let mut token = String::from(c);
                    while let Some(&next) = chars.peek() {
                        if next.is_whitespace() || next == '(' || next == ')' {
                            break;
                        }
                        token.push(next);
                        chars.next();
                    }
                    return Err(ParseError::StrayToken(token));
                }
                current.push(c);
            }
        }
    }

    if depth != 0 {
        return Err(ParseError::Unbalanced);
    }
    Ok(terms)
}

/// If the term is a variable declaration, return its kind and name
fn declaration_head(term: &str) -> Result<Option<(VarKind, String)>, ParseError> {
    let mut tokens = term
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split_whitespace();

    let kind = match tokens.next() {
        Some("int") => VarKind::Int,
        Some("bool") => VarKind::Bool,
        _ => return Ok(None),
    };
    match tokens.next() {
        Some(name) => Ok(Some((kind, name.to_string()))),
        None => Err(ParseError::MissingName { kind }),
    }
}
