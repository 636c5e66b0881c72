use crate::core::config::Syntax;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Polarity;
use crate::dnf::scan::{skip_space, token};

/// Upper bound on membership assignments per conjunction. The conjunction
/// size is the secondary index bucket key and is stored as a `u8`, so the
/// bound is a hard error rather than a truncation.
pub const MAX_CONJUNCTION_SIZE: usize = 255;

/// One `key in {..}` / `key not in {..}` constraint, borrowed from the
/// source text.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ParsedAssignment<'a> {
    pub key: &'a str,
    pub polarity: Polarity,
    pub vals: Vec<&'a str>,
}

/// One AND-group of assignments. `size` counts the membership assignments.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ParsedConjunction<'a> {
    pub assignments: Vec<ParsedAssignment<'a>>,
    pub size: u8,
}

/// Build-pass scan: re-reads validated text into parsed conjunctions.
///
/// The scan itself is side-effect free; interning happens afterwards from
/// the parsed form, so nothing is mutated on the error paths here. Runs
/// after [`check`](crate::dnf::check::check) and shares its tokenizer, but
/// still reports structural mismatches as format errors of its own.
pub(crate) fn parse<'a>(syntax: &Syntax, dnf: &'a str) -> Result<Vec<ParsedConjunction<'a>>> {
    let s = dnf.as_bytes();
    let mut conjunctions = Vec::new();
    let mut i = skip_space(s, 0);
    loop {
        let (conj, end) = parse_conjunction(syntax, dnf, i)?;
        conjunctions.push(conj);
        i = skip_space(s, end);
        if i >= s.len() {
            return Ok(conjunctions);
        }
        let (word, j) = token(syntax, dnf, i);
        if word != "or" {
            return Err(format_error(i));
        }
        i = skip_space(s, j);
    }
}

/// Parses one parenthesized conjunction starting at `i`; returns it with
/// the index just past the closing delimiter.
fn parse_conjunction<'a>(
    syntax: &Syntax,
    dnf: &'a str,
    mut i: usize,
) -> Result<(ParsedConjunction<'a>, usize)> {
    let s = dnf.as_bytes();
    if i >= s.len() || s[i] != syntax.conj_open {
        return Err(format_error(i));
    }

    let mut assignments = Vec::new();
    let mut in_count: usize = 0;
    i = skip_space(s, i + 1);

    loop {
        // assignment key
        let (key, j) = token(syntax, dnf, i);
        i = skip_space(s, j);

        // assignment op: "in" or "not in"
        let (op, mut j) = token(syntax, dnf, i);
        let polarity = match op {
            "in" => Polarity::In,
            "not" => {
                i = skip_space(s, j);
                let (op2, j2) = token(syntax, dnf, i);
                if op2 != "in" {
                    return Err(format_error(i));
                }
                j = j2;
                Polarity::NotIn
            }
            _ => return Err(format_error(i)),
        };
        i = skip_space(s, j);

        // assignment value set
        if i >= s.len() || s[i] != syntax.set_open {
            return Err(format_error(i));
        }
        let mut vals = Vec::with_capacity(1);
        loop {
            i = skip_space(s, i + 1);
            if i >= s.len() {
                return Err(format_error(i));
            }
            let (val, j) = token(syntax, dnf, i);
            vals.push(val);
            i = skip_space(s, j);
            if i >= s.len() {
                return Err(format_error(i));
            }
            if s[i] == syntax.set_close {
                break;
            }
            if s[i] != syntax.separator {
                return Err(format_error(i));
            }
        }

        if polarity.is_in() {
            in_count += 1;
        }
        assignments.push(ParsedAssignment {
            key,
            polarity,
            vals,
        });

        // next assignment or end of this conjunction
        i = skip_space(s, i + 1);
        if i >= s.len() {
            return Err(format_error(i));
        }
        if s[i] == syntax.conj_close {
            if in_count > MAX_CONJUNCTION_SIZE {
                return Err(Error::new(
                    ErrorKind::SizeLimit,
                    format!(
                        "conjunction has {} membership assignments, limit is {}",
                        in_count, MAX_CONJUNCTION_SIZE
                    ),
                ));
            }
            let conj = ParsedConjunction {
                assignments,
                size: in_count as u8,
            };
            return Ok((conj, i + 1));
        }
        let (word, j) = token(syntax, dnf, i);
        if word != "and" {
            return Err(format_error(i));
        }
        i = skip_space(s, j);
    }
}

fn format_error(i: usize) -> Error {
    Error::new(ErrorKind::Format, format!("dnf format error at byte {}", i))
}
