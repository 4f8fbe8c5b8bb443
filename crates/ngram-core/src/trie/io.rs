use super::{Node, TrieError, WeightedTrie, NO_KEY};

/// node_count + key_count + label_bytes.
const BLOB_HEADER_SIZE: usize = 3 * 4;
const NODE_SIZE: usize = 6 * 4;

fn read_u32(data: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[at..at + 4]);
    u32::from_ne_bytes(buf)
}

impl WeightedTrie {
    /// Serialized size in bytes.
    pub fn io_size(&self) -> usize {
        BLOB_HEADER_SIZE + self.nodes.len() * NODE_SIZE + self.labels.len()
    }

    /// Native-endian blob: header, breadth-first node table, label pool.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.io_size());
        buf.extend_from_slice(&(self.nodes.len() as u32).to_ne_bytes());
        buf.extend_from_slice(&self.key_count.to_ne_bytes());
        buf.extend_from_slice(&(self.labels.len() as u32).to_ne_bytes());
        for node in &self.nodes {
            for field in [
                node.label_start,
                node.label_len,
                node.first_child,
                node.child_count,
                node.key_id,
                node.best_id,
            ] {
                buf.extend_from_slice(&field.to_ne_bytes());
            }
        }
        buf.extend_from_slice(self.labels.as_bytes());
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, TrieError> {
        if data.len() < BLOB_HEADER_SIZE {
            return Err(TrieError::Truncated);
        }
        let node_count = read_u32(data, 0) as usize;
        let key_count = read_u32(data, 4);
        let label_len = read_u32(data, 8) as usize;
        if node_count == 0 {
            return Err(TrieError::Corrupt("missing root node".to_string()));
        }
        if key_count == NO_KEY {
            return Err(TrieError::Corrupt("key count out of range".to_string()));
        }

        let expected = node_count
            .checked_mul(NODE_SIZE)
            .and_then(|n| n.checked_add(BLOB_HEADER_SIZE + label_len))
            .ok_or(TrieError::Truncated)?;
        if data.len() < expected {
            return Err(TrieError::Truncated);
        }
        if data.len() > expected {
            return Err(TrieError::Corrupt(format!(
                "{} trailing bytes",
                data.len() - expected
            )));
        }

        let labels_start = BLOB_HEADER_SIZE + node_count * NODE_SIZE;
        let labels = std::str::from_utf8(&data[labels_start..])
            .map_err(|e| TrieError::Corrupt(format!("label pool: {e}")))?
            .to_string();

        let mut nodes = Vec::with_capacity(node_count);
        for index in 0..node_count {
            let at = BLOB_HEADER_SIZE + index * NODE_SIZE;
            let node = Node {
                label_start: read_u32(data, at),
                label_len: read_u32(data, at + 4),
                first_child: read_u32(data, at + 8),
                child_count: read_u32(data, at + 12),
                key_id: read_u32(data, at + 16),
                best_id: read_u32(data, at + 20),
            };
            validate_node(index, &node, node_count, key_count, &labels)?;
            nodes.push(node);
        }

        Ok(Self {
            nodes,
            labels,
            key_count,
        })
    }
}

fn validate_node(
    index: usize,
    node: &Node,
    node_count: usize,
    key_count: u32,
    labels: &str,
) -> Result<(), TrieError> {
    let corrupt = |what: &str| TrieError::Corrupt(format!("node {index}: {what}"));

    let start = node.label_start as usize;
    let end = start + node.label_len as usize;
    if labels.get(start..end).is_none() {
        return Err(corrupt("label outside pool or not on a char boundary"));
    }
    if (index == 0) != (node.label_len == 0) {
        return Err(corrupt("only the root may have an empty label"));
    }

    let children = node.children();
    if children.end > node_count || (node.child_count > 0 && children.start <= index) {
        return Err(corrupt("children out of range"));
    }
    if node.key_id != NO_KEY && node.key_id >= key_count {
        return Err(corrupt("key id out of range"));
    }
    if node.best_id != NO_KEY && node.best_id >= key_count {
        return Err(corrupt("best id out of range"));
    }
    Ok(())
}
