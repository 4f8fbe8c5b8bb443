//! Weight-ordered prefix trie with dense key ids.
//!
//! Ids are handed out by descending weight (ties by key bytes), so a
//! best-first walk in ascending id order is also a walk in non-increasing
//! weight order. Every node records the smallest id in its subtree, which
//! lets [`PredictiveSearch`] expand the most promising branch first and
//! stop early once the caller has enough results.
//!
//! Nodes are stored breadth-first with path-compressed edge labels cut at
//! code-point boundaries. Siblings are sorted by the first code point of
//! their label so a child is found by binary search.

mod builder;
mod io;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

pub(crate) const NO_KEY: u32 = u32::MAX;

#[derive(Debug, thiserror::Error)]
pub enum TrieError {
    #[error("duplicate key: {0:?}")]
    DuplicateKey(String),

    #[error("too many keys: {0}")]
    TooManyKeys(usize),

    #[error("trie too large: {0}")]
    TooLarge(String),

    #[error("truncated trie data")]
    Truncated,

    #[error("corrupt trie data: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Node {
    label_start: u32,
    label_len: u32,
    first_child: u32,
    child_count: u32,
    key_id: u32,
    best_id: u32,
}

impl Node {
    fn children(&self) -> std::ops::Range<usize> {
        let start = self.first_child as usize;
        start..start + self.child_count as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedTrie {
    nodes: Vec<Node>,
    labels: String,
    key_count: u32,
}

/// A key found by [`WeightedTrie::predictive_search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieMatch {
    pub key: String,
    pub id: u32,
}

impl WeightedTrie {
    /// Number of keys; ids are `0..len()`.
    pub fn len(&self) -> usize {
        self.key_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn label(&self, node: &Node) -> &str {
        let start = node.label_start as usize;
        &self.labels[start..start + node.label_len as usize]
    }

    fn find_child(&self, node: usize, rest: &str) -> Option<usize> {
        let c = rest.chars().next()?;
        let range = self.nodes[node].children();
        let start = range.start;
        self.nodes[range]
            .binary_search_by(|child| self.label(child).chars().next().cmp(&Some(c)))
            .ok()
            .map(|i| start + i)
    }

    /// Exact match.
    pub fn lookup(&self, key: &str) -> Option<u32> {
        let mut node = 0;
        let mut rest = key;
        while !rest.is_empty() {
            let child = self.find_child(node, rest)?;
            rest = rest.strip_prefix(self.label(&self.nodes[child]))?;
            node = child;
        }
        let id = self.nodes[node].key_id;
        (id != NO_KEY).then_some(id)
    }

    /// The node whose subtree holds exactly the keys starting with `prefix`,
    /// with the full text spelled out down to that node.
    fn locate(&self, prefix: &str) -> Option<(usize, String)> {
        let mut node = 0;
        let mut consumed = 0;
        loop {
            let rest = &prefix[consumed..];
            if rest.is_empty() {
                return Some((node, prefix.to_string()));
            }
            let child = self.find_child(node, rest)?;
            let label = self.label(&self.nodes[child]);
            if rest.starts_with(label) {
                consumed += label.len();
                node = child;
            } else if label.starts_with(rest) {
                let mut text = prefix[..consumed].to_string();
                text.push_str(label);
                return Some((child, text));
            } else {
                return None;
            }
        }
    }

    /// All keys starting with `prefix`, heaviest first.
    pub fn predictive_search(&self, prefix: &str) -> PredictiveSearch<'_> {
        let mut search = PredictiveSearch {
            trie: self,
            frontier: BinaryHeap::new(),
        };
        if let Some((node, text)) = self.locate(prefix) {
            search.push_node(node, text);
        }
        search
    }

    /// Every key, heaviest first.
    pub fn iter(&self) -> PredictiveSearch<'_> {
        self.predictive_search("")
    }
}

struct Pending {
    rank: u32,
    node: Option<usize>,
    text: String,
}

// Ranks in the frontier are unique: a key rank is pushed only when its
// node is expanded, and disjoint subtrees hold disjoint ids.
impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        other.rank.cmp(&self.rank)
    }
}

/// Best-first iterator over a subtree, yielding ids in ascending order.
pub struct PredictiveSearch<'a> {
    trie: &'a WeightedTrie,
    frontier: BinaryHeap<Pending>,
}

impl PredictiveSearch<'_> {
    fn push_node(&mut self, node: usize, text: String) {
        let rank = self.trie.nodes[node].best_id;
        if rank != NO_KEY {
            self.frontier.push(Pending {
                rank,
                node: Some(node),
                text,
            });
        }
    }
}

impl Iterator for PredictiveSearch<'_> {
    type Item = TrieMatch;

    fn next(&mut self) -> Option<TrieMatch> {
        loop {
            let Pending { rank, node, text } = self.frontier.pop()?;
            let Some(node) = node else {
                return Some(TrieMatch { key: text, id: rank });
            };

            let trie = self.trie;
            let current = trie.nodes[node];
            for child in current.children() {
                let mut child_text = text.clone();
                child_text.push_str(trie.label(&trie.nodes[child]));
                self.push_node(child, child_text);
            }
            if current.key_id != NO_KEY {
                self.frontier.push(Pending {
                    rank: current.key_id,
                    node: None,
                    text,
                });
            }
        }
    }
}
