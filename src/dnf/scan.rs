use crate::core::config::Syntax;

/// Advances past a run of spaces.
pub(crate) fn skip_space(s: &[u8], mut i: usize) -> usize {
    while i < s.len() && s[i] == b' ' {
        i += 1;
    }
    i
}

/// End index of the token starting at `i`: the token always takes the byte
/// at `i` and extends until a space, separator or set delimiter.
pub(crate) fn token_end(syntax: &Syntax, s: &[u8], i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    let mut j = i + 1;
    while j < s.len() && !syntax.is_break(s[j]) {
        j += 1;
    }
    j
}

/// The token starting at byte `i` and its end index. Break positions are
/// always ASCII, so the slice stays on char boundaries.
pub(crate) fn token<'a>(syntax: &Syntax, s: &'a str, i: usize) -> (&'a str, usize) {
    let j = token_end(syntax, s.as_bytes(), i);
    (&s[i..j], j)
}
