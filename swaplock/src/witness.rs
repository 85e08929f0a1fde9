//! Wire encoding of witness stacks.

/// Appends `value` to `out` as a compact-size integer.
pub fn write_compact_size(out: &mut Vec<u8>, value: u64) {
    let bytes = value.to_le_bytes();
    match value {
        0..=0xfc => out.push(bytes[0]),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&bytes[..2]);
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&bytes[..4]);
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&bytes);
        }
    }
}

#[must_use]
pub fn compact_size_len(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// `WitnessStack` is the ordered list of byte strings attached to a spending input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessStack {
    items: Vec<Vec<u8>>,
}

impl WitnessStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: impl Into<Vec<u8>>) {
        self.items.push(item.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[Vec<u8>] {
        &self.items
    }

    #[must_use]
    pub fn serialized_len(&self) -> usize {
        compact_size_len(self.items.len() as u64)
            + self
                .items
                .iter()
                .map(|item| compact_size_len(item.len() as u64) + item.len())
                .sum::<usize>()
    }

    /// Item count, then each item as a length-prefixed byte string.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        write_compact_size(&mut out, self.items.len() as u64);
        for item in &self.items {
            write_compact_size(&mut out, item.len() as u64);
            out.extend_from_slice(item);
        }
        out
    }
}

impl From<Vec<Vec<u8>>> for WitnessStack {
    fn from(items: Vec<Vec<u8>>) -> Self {
        Self { items }
    }
}
