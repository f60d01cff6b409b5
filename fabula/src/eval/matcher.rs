//! Greedy key-indexed matching with single-use consumption.
//!
//! Characters, relationships and events are all matched the same way:
//!
//! 1. Index the reference items by one or more keys each.
//! 2. Walk the candidates in declaration order. For each candidate, try its
//!    keys in order; the first key that resolves to a reference item not yet
//!    consumed wins, and that item is consumed.
//!
//! Two index shapes exist. [`KeyIndex::from_items`] keeps only the first
//! reference item (file order) per key, so a later duplicate is unreachable;
//! relationships and events use it. [`KeyIndex::pooled`] keeps every item per
//! key, primary keys ranked ahead of secondary ones, and a lookup falls
//! through to the next unconsumed item; characters use it so that an alias
//! never hides another character's own name.
//!
//! Neither is an optimal assignment: an early candidate can consume a
//! reference item that a later candidate would have matched better.
//! Reported benchmark numbers depend on this exact tie-break order.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Key → reference positions in lookup order.
#[derive(Debug, Clone)]
pub struct KeyIndex<K> {
    positions: HashMap<K, Vec<usize>>,
}

impl<K: Eq + Hash> KeyIndex<K> {
    /// Index `items` by every key `keys_of` yields for them, first writer wins.
    pub fn from_items<T, I, F>(items: &[T], mut keys_of: F) -> Self
    where
        F: FnMut(&T) -> I,
        I: IntoIterator<Item = K>,
    {
        let mut positions = HashMap::new();
        for (idx, item) in items.iter().enumerate() {
            for key in keys_of(item) {
                positions.entry(key).or_insert_with(|| vec![idx]);
            }
        }
        Self { positions }
    }

    /// Index every item under each of its keys. All `primary` keys of all
    /// items come ahead of any `secondary` key, each group in file order.
    pub fn pooled<T, IP, IS, FP, FS>(items: &[T], mut primary: FP, mut secondary: FS) -> Self
    where
        FP: FnMut(&T) -> IP,
        FS: FnMut(&T) -> IS,
        IP: IntoIterator<Item = K>,
        IS: IntoIterator<Item = K>,
    {
        let mut positions: HashMap<K, Vec<usize>> = HashMap::new();
        for (idx, item) in items.iter().enumerate() {
            for key in primary(item) {
                push_unique(positions.entry(key).or_default(), idx);
            }
        }
        for (idx, item) in items.iter().enumerate() {
            for key in secondary(item) {
                push_unique(positions.entry(key).or_default(), idx);
            }
        }
        Self { positions }
    }

    /// Highest-ranked position indexed under `key`, consumed or not.
    pub fn get<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.positions.get(key)?.first().copied()
    }

    /// Consume the first position under `key` that is still available.
    pub fn take<Q>(&self, key: &Q, consumed: &mut SingleUse) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.positions
            .get(key)?
            .iter()
            .copied()
            .find(|&idx| consumed.try_take(idx))
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn push_unique(positions: &mut Vec<usize>, idx: usize) {
    if !positions.contains(&idx) {
        positions.push(idx);
    }
}

/// Tracks which reference positions have been consumed.
#[derive(Debug, Clone)]
pub struct SingleUse {
    used: Vec<bool>,
}

impl SingleUse {
    /// Nothing consumed among `len` positions.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            used: vec![false; len],
        }
    }

    /// Consume `idx` if it is still available.
    pub fn try_take(&mut self, idx: usize) -> bool {
        match self.used.get_mut(idx) {
            Some(used) if !*used => {
                *used = true;
                true
            }
            _ => false,
        }
    }

    /// Whether `idx` has been consumed.
    #[must_use]
    pub fn is_used(&self, idx: usize) -> bool {
        self.used.get(idx).copied().unwrap_or(false)
    }

    /// Positions never consumed, ascending.
    pub fn unused(&self) -> impl Iterator<Item = usize> + '_ {
        self.used
            .iter()
            .enumerate()
            .filter(|(_, used)| !**used)
            .map(|(idx, _)| idx)
    }
}

/// One successful candidate → reference match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMatch {
    /// Reference position.
    pub reference: usize,
    /// Which of the candidate's keys produced the match (0 = first).
    pub key_rank: usize,
}

/// Result of [`match_by_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    /// One entry per candidate, in candidate order.
    pub pairs: Vec<Option<KeyMatch>>,
    /// Reference positions no candidate consumed, ascending.
    pub unmatched_references: Vec<usize>,
}

impl Matching {
    /// Number of matched candidates.
    #[must_use]
    pub fn matched(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_some()).count()
    }

    /// Candidate positions with no match, ascending.
    pub fn unmatched_candidates(&self) -> impl Iterator<Item = usize> + '_ {
        self.pairs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(idx, _)| idx)
    }

    /// `(candidate, reference)` position pairs, in candidate order.
    pub fn matched_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs
            .iter()
            .enumerate()
            .filter_map(|(c, p)| p.map(|m| (c, m.reference)))
    }
}

/// Greedy single-use matching of `candidates` against `references`, with the
/// references indexed first writer wins.
///
/// ```rust
/// use fabula::eval::matcher::match_by_key;
///
/// let reference = ["a", "b", "a"];
/// let candidate = ["a", "a", "c"];
/// let m = match_by_key(&candidate, &reference, |c| [c.to_string()], |r| [r.to_string()]);
///
/// // The duplicate reference "a" at position 2 is never indexed.
/// assert_eq!(m.matched(), 1);
/// assert_eq!(m.unmatched_references, vec![1, 2]);
/// ```
pub fn match_by_key<C, R, K, IC, IR, FC, FR>(
    candidates: &[C],
    references: &[R],
    candidate_keys: FC,
    reference_keys: FR,
) -> Matching
where
    K: Eq + Hash,
    FC: FnMut(&C) -> IC,
    FR: FnMut(&R) -> IR,
    IC: IntoIterator<Item = K>,
    IR: IntoIterator<Item = K>,
{
    let index = KeyIndex::from_items(references, reference_keys);
    match_with_index(candidates, &index, references.len(), candidate_keys)
}

/// Greedy single-use matching of `candidates` against a prebuilt index over
/// `reference_count` reference positions.
pub fn match_with_index<C, K, IC, FC>(
    candidates: &[C],
    index: &KeyIndex<K>,
    reference_count: usize,
    mut candidate_keys: FC,
) -> Matching
where
    K: Eq + Hash,
    FC: FnMut(&C) -> IC,
    IC: IntoIterator<Item = K>,
{
    let mut consumed = SingleUse::new(reference_count);

    let pairs = candidates
        .iter()
        .map(|candidate| {
            candidate_keys(candidate)
                .into_iter()
                .enumerate()
                .find_map(|(rank, key)| {
                    index.take(&key, &mut consumed).map(|idx| KeyMatch {
                        reference: idx,
                        key_rank: rank,
                    })
                })
        })
        .collect();

    Matching {
        pairs,
        unmatched_references: consumed.unused().collect(),
    }
}
