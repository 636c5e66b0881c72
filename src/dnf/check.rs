use std::collections::HashSet;

use crate::core::config::Syntax;
use crate::core::error::{Error, ErrorKind, Result};
use crate::dnf::scan::{skip_space, token};

/// Validation pass position in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expect the conjunction opener.
    ConjOpen,
    /// Expect an assignment key.
    Key,
    /// Expect `in` or `not`.
    Op,
    /// After `not`, expect `in`.
    NotIn,
    /// Expect the set opener.
    SetOpen,
    /// Expect a set value.
    Val,
    /// Expect a separator or the set closer.
    AfterVal,
    /// Expect `and` or the conjunction closer.
    AfterSet,
    /// Expect end of input or `or`.
    AfterConj,
}

/// Checks DNF syntax without touching any stored state.
///
/// Within one conjunction the assignment keys must be pairwise distinct;
/// a duplicate is reported as a format-class error, not a crash. The pass
/// is pure, so a failing `add_document` leaves the index untouched.
pub fn check(syntax: &Syntax, dnf: &str) -> Result<()> {
    let s = dnf.as_bytes();
    let mut keys: HashSet<&str> = HashSet::new();
    let mut state = State::ConjOpen;
    let mut i = skip_space(s, 0);

    loop {
        if i >= s.len() {
            return match state {
                State::AfterConj => Ok(()),
                _ => Err(format_error(i)),
            };
        }
        match state {
            State::ConjOpen => {
                if s[i] != syntax.conj_open {
                    return Err(format_error(i));
                }
                keys.clear();
                i = skip_space(s, i + 1);
                state = State::Key;
            }
            State::Key => {
                let (key, j) = token(syntax, dnf, i);
                if !keys.insert(key) {
                    return Err(Error::new(
                        ErrorKind::Format,
                        format!("conjunction key {} duplicate", key),
                    ));
                }
                i = skip_space(s, j);
                state = State::Op;
            }
            State::Op => {
                let (op, j) = token(syntax, dnf, i);
                state = match op {
                    "in" => State::SetOpen,
                    "not" => State::NotIn,
                    _ => return Err(format_error(i)),
                };
                i = skip_space(s, j);
            }
            State::NotIn => {
                let (op, j) = token(syntax, dnf, i);
                if op != "in" {
                    return Err(format_error(i));
                }
                i = skip_space(s, j);
                state = State::SetOpen;
            }
            State::SetOpen => {
                if s[i] != syntax.set_open {
                    return Err(format_error(i));
                }
                i = skip_space(s, i + 1);
                state = State::Val;
            }
            State::Val => {
                let (_, j) = token(syntax, dnf, i);
                i = skip_space(s, j);
                state = State::AfterVal;
            }
            State::AfterVal => {
                if s[i] == syntax.separator {
                    i = skip_space(s, i + 1);
                    state = State::Val;
                } else if s[i] == syntax.set_close {
                    i = skip_space(s, i + 1);
                    state = State::AfterSet;
                } else {
                    return Err(format_error(i));
                }
            }
            State::AfterSet => {
                if s[i] == syntax.conj_close {
                    i = skip_space(s, i + 1);
                    state = State::AfterConj;
                } else {
                    let (word, j) = token(syntax, dnf, i);
                    if word != "and" {
                        return Err(format_error(i));
                    }
                    i = skip_space(s, j);
                    state = State::Key;
                }
            }
            State::AfterConj => {
                let (word, j) = token(syntax, dnf, i);
                if word != "or" {
                    return Err(format_error(i));
                }
                i = skip_space(s, j);
                state = State::ConjOpen;
            }
        }
    }
}

fn format_error(i: usize) -> Error {
    Error::new(ErrorKind::Format, format!("dnf format error at byte {}", i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(dnf: &str) -> bool {
        check(&Syntax::default(), dnf).is_ok()
    }

    #[test]
    fn validation_corpus() {
        assert!(!ok(""));
        assert!(!ok("  "));

        assert!(!ok("("));
        assert!(!ok("(   "));
        assert!(!ok(" [ city in { Beijing }]  "));

        assert!(ok(" (city in{Beijing})  "));

        assert!(ok("  ( city in { Beijing }) "));
        assert!(ok(" ( city not in { Beijing })"));
        assert!(!ok(" ( city not on { Beijing })"));
        assert!(!ok(" ( city at { Beijing })"));

        assert!(!ok("(city in [ Beijing })"));

        assert!(!ok("( city in { ShangHai ShenZheng })"));

        assert!(!ok("( city in { ShangHai ])"));
        assert!(!ok("( city in { ShangHai, ShenZheng ))"));

        assert!(ok(
            "(city in {SH} and gender not in { female}) or (age in {3, 5})"
        ));
        assert!(ok(
            "(city in {SH} and gender not in { female}) or (age in {3, 5} and city in {HZ})"
        ));
        assert!(!ok(
            "(city in {SH} and city not in { BJ }) or (age in {3, 5} and city in {HZ})"
        ));
        assert!(!ok("(city in {SH}) or (age in {3, 5} and city in {HZ}"));
    }

    #[test]
    fn duplicate_key_is_scoped_to_one_conjunction() {
        // Same key in different conjunctions is fine.
        assert!(ok("(age in {3}) or (age in {4})"));
        let err = check(&Syntax::default(), "(age in {3} and age in {4})").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Format);
        assert!(err.context.contains("duplicate"));
    }

    #[test]
    fn custom_delimiters() {
        let syntax = Syntax::new(('[', ']'), ('<', '>'), ';').unwrap();
        assert!(check(&syntax, "[city in <SH; BJ> and age not in <3>]").is_ok());
        assert!(check(&syntax, "(city in {SH, BJ})").is_err());
    }
}
