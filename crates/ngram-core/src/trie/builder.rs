use std::collections::VecDeque;

use tracing::debug;

use super::{Node, TrieError, WeightedTrie, NO_KEY};

struct BuildNode<'a> {
    label: &'a str,
    key_id: u32,
    best_id: u32,
    children: Vec<BuildNode<'a>>,
}

fn first_char(key: &str, depth: usize) -> Option<char> {
    key[depth..].chars().next()
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(c, _)| c.len_utf8())
        .sum()
}

/// `keys` are sorted by bytes, unique, and all longer than `depth`.
fn build_children<'a>(keys: &[(&'a str, u32)], depth: usize) -> Vec<BuildNode<'a>> {
    let mut children = Vec::new();
    let mut start = 0;
    while start < keys.len() {
        let head = first_char(keys[start].0, depth);
        let mut end = start + 1;
        while end < keys.len() && first_char(keys[end].0, depth) == head {
            end += 1;
        }
        children.push(build_node(&keys[start..end], depth));
        start = end;
    }
    children
}

/// `group` shares at least one code point past `depth`. Sorted order makes
/// the common prefix of the first and last key common to the whole group.
fn build_node<'a>(group: &[(&'a str, u32)], depth: usize) -> BuildNode<'a> {
    let first = group[0].0;
    let last = group[group.len() - 1].0;
    let split = depth + common_prefix_len(&first[depth..], &last[depth..]);

    let (key_id, rest) = if first.len() == split {
        (group[0].1, &group[1..])
    } else {
        (NO_KEY, group)
    };
    let children = build_children(rest, split);
    let best_id = children
        .iter()
        .map(|c| c.best_id)
        .fold(key_id, u32::min);

    BuildNode {
        label: &first[depth..split],
        key_id,
        best_id,
        children,
    }
}

impl WeightedTrie {
    /// Build from unique `(key, weight)` pairs.
    ///
    /// Ids follow descending weight, ties broken by ascending key bytes, so
    /// the same input always yields the same ids and the same bytes.
    pub fn build<K: AsRef<str>>(
        entries: impl IntoIterator<Item = (K, f32)>,
    ) -> Result<Self, TrieError> {
        let mut ranked: Vec<(K, f32)> = entries.into_iter().collect();
        if ranked.len() >= NO_KEY as usize {
            return Err(TrieError::TooManyKeys(ranked.len()));
        }
        ranked.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| a.0.as_ref().as_bytes().cmp(b.0.as_ref().as_bytes()))
        });

        let mut keyed: Vec<(&str, u32)> = ranked
            .iter()
            .enumerate()
            .map(|(id, (key, _))| (key.as_ref(), id as u32))
            .collect();
        keyed.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        if let Some(pair) = keyed.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(TrieError::DuplicateKey(pair[0].0.to_string()));
        }

        let (root_key, rest) = match keyed.first() {
            Some(&("", id)) => (id, &keyed[1..]),
            _ => (NO_KEY, &keyed[..]),
        };
        let children = build_children(rest, 0);
        let best_id = children
            .iter()
            .map(|c| c.best_id)
            .fold(root_key, u32::min);
        let root = BuildNode {
            label: "",
            key_id: root_key,
            best_id,
            children,
        };

        let trie = Self::flatten(&root, keyed.len() as u32)?;
        debug!(
            keys = trie.len(),
            nodes = trie.node_count(),
            label_bytes = trie.labels.len(),
            "trie built"
        );
        Ok(trie)
    }

    fn flatten(root: &BuildNode<'_>, key_count: u32) -> Result<Self, TrieError> {
        let mut nodes = vec![Node {
            label_start: 0,
            label_len: 0,
            first_child: 0,
            child_count: 0,
            key_id: root.key_id,
            best_id: root.best_id,
        }];
        let mut labels = String::new();
        let mut queue = VecDeque::from([(0usize, root)]);

        while let Some((index, node)) = queue.pop_front() {
            nodes[index].first_child = to_u32(nodes.len(), "node count")?;
            nodes[index].child_count = to_u32(node.children.len(), "child count")?;
            for child in &node.children {
                let label_start = to_u32(labels.len(), "label pool")?;
                labels.push_str(child.label);
                nodes.push(Node {
                    label_start,
                    label_len: to_u32(child.label.len(), "label")?,
                    first_child: 0,
                    child_count: 0,
                    key_id: child.key_id,
                    best_id: child.best_id,
                });
                queue.push_back((nodes.len() - 1, child));
            }
        }
        to_u32(labels.len(), "label pool")?;

        Ok(Self {
            nodes,
            labels,
            key_count,
        })
    }
}

fn to_u32(value: usize, what: &str) -> Result<u32, TrieError> {
    u32::try_from(value).map_err(|_| TrieError::TooLarge(format!("{what} is {value}")))
}
