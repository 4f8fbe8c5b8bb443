//! Code-point level helpers.

/// Number of Unicode scalar values in `s`.
///
/// Characters outside the BMP count once, unlike UTF-16 code units.
pub fn code_point_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset where the last `n` code points of `s` begin.
///
/// Returns 0 when `s` has `n` or fewer code points.
pub fn suffix_start(s: &str, n: usize) -> usize {
    if n == 0 {
        return s.len();
    }
    s.char_indices()
        .rev()
        .nth(n - 1)
        .map_or(0, |(offset, _)| offset)
}
