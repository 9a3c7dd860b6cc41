//! Myers LCS over matched orderings
//!
//! Used by [`MoveStrategy::LongestCommonSubsequence`](super::MoveStrategy):
//! given the new indices of matched items listed in their old order, the
//! items on a longest common subsequence with the new order keep their
//! relative placement and need no explicit move.
//!
//! Common prefixes and suffixes are trimmed first. What remains is solved
//! with a small table when both sides fit in `SMALL_LEN`, and with the Myers
//! O((n+m)·d) greedy search otherwise. A list update usually displaces a
//! handful of items, so `d` stays small.
//!
//! When `d` exceeds `MAX_EDIT_DISTANCE` the search gives up and the LCS is
//! empty. Callers then move every matched item, which is always a valid
//! (if verbose) batch.
//!
//! Reference: Myers, E.W. "An O(ND) Difference Algorithm and Its Variations"
//! (1986).

/// Edit distance beyond which the LCS is abandoned.
const MAX_EDIT_DISTANCE: usize = 512;

/// Sequences this short use the table.
const SMALL_LEN: usize = 8;

// =============================================================================
// Main API
// =============================================================================

/// Longest common subsequence of two sequences as `(old_idx, new_idx)` pairs,
/// ascending in both coordinates.
pub fn lcs_pairs<T: PartialEq>(old: &[T], new: &[T]) -> Vec<(usize, usize)> {
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mid = if old_mid.is_empty() || new_mid.is_empty() {
        Vec::new()
    } else if old_mid.len() <= SMALL_LEN && new_mid.len() <= SMALL_LEN {
        table_lcs(old_mid, new_mid)
    } else {
        match greedy_lcs(old_mid, new_mid) {
            Some(mid) => mid,
            None => return Vec::new(),
        }
    };

    let old_tail = old.len() - suffix;
    let new_tail = new.len() - suffix;

    (0..prefix)
        .map(|i| (i, i))
        .chain(mid.into_iter().map(|(o, n)| (o + prefix, n + prefix)))
        .chain((0..suffix).map(|i| (old_tail + i, new_tail + i)))
        .collect()
}

// =============================================================================
// Greedy search
// =============================================================================

/// Furthest-reaching `x` per diagonal `k = x - y` after `d` edits.
///
/// Only diagonals `-d..=d` are reachable, so a frontier holds `2d + 1`
/// slots and the whole trace is O(d²).
struct Frontier {
    d: isize,
    xs: Vec<isize>,
}

impl Frontier {
    fn new(d: isize) -> Self {
        Self {
            d,
            xs: vec![0; (2 * d + 1) as usize],
        }
    }

    #[inline]
    fn x(&self, k: isize) -> isize {
        self.xs[(k + self.d) as usize]
    }

    #[inline]
    fn set(&mut self, k: isize, x: isize) {
        self.xs[(k + self.d) as usize] = x;
    }

    /// Whether diagonal `k` of the next round is reached by an insertion
    /// from `k + 1` rather than a deletion from `k - 1`.
    #[inline]
    fn descends_into(&self, k: isize) -> bool {
        let d = self.d + 1;
        k == -d || (k != d && self.x(k - 1) < self.x(k + 1))
    }
}

/// Returns `None` past `MAX_EDIT_DISTANCE`.
fn greedy_lcs<T: PartialEq>(old: &[T], new: &[T]) -> Option<Vec<(usize, usize)>> {
    let n = old.len() as isize;
    let m = new.len() as isize;
    let mut rounds: Vec<Frontier> = Vec::new();

    for d in 0..=(n + m) {
        if d as usize > MAX_EDIT_DISTANCE {
            return None;
        }

        let mut frontier = Frontier::new(d);
        for k in (-d..=d).step_by(2) {
            let mut x = match rounds.last() {
                None => 0,
                Some(prev) if prev.descends_into(k) => prev.x(k + 1),
                Some(prev) => prev.x(k - 1) + 1,
            };
            let mut y = x - k;

            while x < n && y < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }
            frontier.set(k, x);

            if x >= n && y >= m {
                return Some(backtrack(&rounds, n, m));
            }
        }
        rounds.push(frontier);
    }

    // Every path reaches (n, m) by d = n + m
    None
}

/// Walk from `(n, m)` back to the origin, collecting the snake of each
/// round. `rounds[d]` is the frontier completed before round `d + 1`.
fn backtrack(rounds: &[Frontier], n: isize, m: isize) -> Vec<(usize, usize)> {
    let (mut x, mut y) = (n, m);
    let mut pairs = Vec::new();

    for prev in rounds.iter().rev() {
        let k = x - y;
        let from_k = if prev.descends_into(k) { k + 1 } else { k - 1 };
        let snake_start = if from_k == k + 1 { prev.x(from_k) } else { prev.x(from_k) + 1 };

        while x > snake_start {
            x -= 1;
            y -= 1;
            pairs.push((x as usize, y as usize));
        }

        x = prev.x(from_k);
        y = x - from_k;
    }

    // Leading snake of round 0
    while x > 0 && y > 0 {
        x -= 1;
        y -= 1;
        pairs.push((x as usize, y as usize));
    }

    pairs.reverse();
    pairs
}

// =============================================================================
// Small inputs
// =============================================================================

/// Suffix table: `table[i][j]` is the LCS length of `old[i..]` and
/// `new[j..]`. Lives on the stack.
fn table_lcs<T: PartialEq>(old: &[T], new: &[T]) -> Vec<(usize, usize)> {
    let (n, m) = (old.len(), new.len());
    let mut table = [[0u8; SMALL_LEN + 1]; SMALL_LEN + 1];

    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if old[i] == new[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(table[0][0] as usize);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

// =============================================================================
// Tests
// =============================================================================
