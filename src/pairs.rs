// src/pairs.rs

//! Canonical enumeration of unordered item pairs.
//!
//! The enumeration order is part of the wire contract: pair index `k` must
//! resolve to the same `(i, j)` for a given item count `n` on every run,
//! because batch manifests and completeness diagnostics identify pairs by
//! index alone. The order is lexicographic over `(i, j)` with `i < j`:
//! outer loop `i` ascending, inner loop `j` ascending from `i + 1`.

/// Unordered pair of item ordinals, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    pub a: usize,
    pub b: usize,
}

impl Pair {
    /// Build a pair from two distinct ordinals, normalising the order.
    ///
    /// The two ordinals must differ; callers that take untrusted input
    /// (e.g. result parsing) reject equal ordinals before constructing.
    pub fn new(a: usize, b: usize) -> Self {
        debug_assert_ne!(a, b, "a pair requires two distinct ordinals");
        if a < b { Self { a, b } } else { Self { a: b, b: a } }
    }
}

/// Total number of unordered pairs over `n` items: `n * (n - 1) / 2`.
///
/// `n` of 0 or 1 yields 0.
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Enumerate all pairs `(i, j)` with `0 <= i < j < n` in canonical order.
///
/// The iterator is lazy and finite; calling this function again restarts the
/// enumeration from the beginning (no state is retained between calls).
pub fn enumerate(n: usize) -> impl Iterator<Item = Pair> {
    (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| Pair { a: i, b: j }))
}

/// Enumerate pairs starting at canonical index `k`.
///
/// Equivalent to `enumerate(n).skip(k)` without paying for the skip; used to
/// stream one batch's slice of the sequence.
pub fn enumerate_from(k: usize, n: usize) -> impl Iterator<Item = Pair> {
    let first = if k < pair_count(n) {
        Some(pair_at(k, n))
    } else {
        None
    };
    std::iter::successors(first, move |p| {
        if p.b + 1 < n {
            Some(Pair { a: p.a, b: p.b + 1 })
        } else if p.a + 2 < n {
            Some(Pair {
                a: p.a + 1,
                b: p.a + 2,
            })
        } else {
            None
        }
    })
}

/// Canonical index of `pair` within the enumeration over `n` items.
///
/// Inverse of [`pair_at`].
pub fn index_of(pair: Pair, n: usize) -> usize {
    debug_assert!(pair.b < n, "pair ordinal out of range");
    // Pairs before row `a`: sum of row lengths (n-1) + (n-2) + ... (n-a),
    // then the offset of `b` within row `a`.
    pair.a * n - pair.a * (pair.a + 1) / 2 + (pair.b - pair.a - 1)
}

/// Pair at canonical index `k` within the enumeration over `n` items.
///
/// Inverse of [`index_of`]. `k` must be `< pair_count(n)`.
pub fn pair_at(k: usize, n: usize) -> Pair {
    debug_assert!(k < pair_count(n), "pair index out of range");
    let mut k = k;
    let mut i = 0;
    // Walk rows; row i holds n - 1 - i pairs.
    loop {
        let row_len = n - 1 - i;
        if k < row_len {
            return Pair { a: i, b: i + 1 + k };
        }
        k -= row_len;
        i += 1;
    }
}
