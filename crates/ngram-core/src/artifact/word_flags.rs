/// One bit per key id, eight ids per byte, least significant bit first.
/// Trailing bits of the last byte are zero on write and ignored on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordFlags {
    bits: Vec<u8>,
    len: usize,
}

impl WordFlags {
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![0; Self::byte_len(len)],
            len,
        }
    }

    pub fn byte_len(len: usize) -> usize {
        len.div_ceil(8)
    }

    /// `None` unless `bits` is exactly `byte_len(len)` long.
    pub fn from_bytes(bits: Vec<u8>, len: usize) -> Option<Self> {
        (bits.len() == Self::byte_len(len)).then_some(Self { bits, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn set(&mut self, id: usize, value: bool) {
        assert!(id < self.len, "word flag {id} out of range ({})", self.len);
        let mask = 1u8 << (id % 8);
        if value {
            self.bits[id / 8] |= mask;
        } else {
            self.bits[id / 8] &= !mask;
        }
    }

    pub fn get(&self, id: usize) -> bool {
        id < self.len && self.bits[id / 8] & (1u8 << (id % 8)) != 0
    }

    pub fn count_set(&self) -> usize {
        (0..self.len).filter(|&id| self.get(id)).count()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }
}
