use super::{Equality, Order};
use std::cmp::Ordering;
use std::sync::Arc;

/// Bytes of the key packed into one bucket index.
const PACKED_BYTES: usize = 4;

/// Packs the `PACKED_BYTES` bytes starting at `from` big-endian, padding
/// with zeros past the end of the key.
#[inline]
fn pack(bytes: impl Iterator<Item = u8>, from: usize) -> u32 {
    let mut index = 0u32;
    let mut taken = 0;
    for b in bytes.skip(from).take(PACKED_BYTES) {
        index = (index << 8) | b as u32;
        taken += 1;
    }
    index << (8 * (PACKED_BYTES - taken))
}

/// Lexical order on UTF-8 strings.
///
/// The bucket index packs four bytes starting at `from_index`; keys sharing
/// those bytes are bucketed again by a sub-order starting four bytes later.
/// Byte order of UTF-8 matches code point order, so iteration is lexical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexicalOrder {
    from_index: usize,
}

impl LexicalOrder {
    /// Order indexing from the first byte.
    pub fn new() -> Self {
        Self { from_index: 0 }
    }

    /// Byte offset this order indexes from.
    pub fn from_index(&self) -> usize {
        self.from_index
    }
}

impl Equality<str> for LexicalOrder {
    #[inline]
    fn are_equal(&self, left: &str, right: &str) -> bool {
        left == right
    }
}

impl Order<str> for LexicalOrder {
    #[inline]
    fn compare(&self, left: &str, right: &str) -> Ordering {
        left.as_bytes().cmp(right.as_bytes())
    }

    #[inline]
    fn index_of(&self, value: &str) -> u32 {
        pack(value.bytes(), self.from_index)
    }

    fn sub_order(&self, value: &str) -> Option<Arc<dyn Order<str>>> {
        let next = self.from_index + PACKED_BYTES;
        (value.len() > next).then(|| Arc::new(LexicalOrder { from_index: next }) as Arc<dyn Order<str>>)
    }
}

impl Equality<String> for LexicalOrder {
    #[inline]
    fn are_equal(&self, left: &String, right: &String) -> bool {
        left == right
    }
}

impl Order<String> for LexicalOrder {
    #[inline]
    fn compare(&self, left: &String, right: &String) -> Ordering {
        Order::<str>::compare(self, left, right)
    }

    #[inline]
    fn index_of(&self, value: &String) -> u32 {
        Order::<str>::index_of(self, value)
    }

    fn sub_order(&self, value: &String) -> Option<Arc<dyn Order<String>>> {
        let next = self.from_index + PACKED_BYTES;
        (value.len() > next)
            .then(|| Arc::new(LexicalOrder { from_index: next }) as Arc<dyn Order<String>>)
    }
}

/// Lexical order ignoring ASCII case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseInsensitiveLexicalOrder {
    from_index: usize,
}

impl CaseInsensitiveLexicalOrder {
    /// Order indexing from the first byte.
    pub fn new() -> Self {
        Self { from_index: 0 }
    }

    fn folded(value: &str) -> impl Iterator<Item = u8> + '_ {
        value.bytes().map(|b| b.to_ascii_lowercase())
    }
}

impl Equality<str> for CaseInsensitiveLexicalOrder {
    #[inline]
    fn are_equal(&self, left: &str, right: &str) -> bool {
        left.eq_ignore_ascii_case(right)
    }
}

impl Order<str> for CaseInsensitiveLexicalOrder {
    fn compare(&self, left: &str, right: &str) -> Ordering {
        Self::folded(left).cmp(Self::folded(right))
    }

    #[inline]
    fn index_of(&self, value: &str) -> u32 {
        pack(Self::folded(value), self.from_index)
    }

    fn sub_order(&self, value: &str) -> Option<Arc<dyn Order<str>>> {
        let next = self.from_index + PACKED_BYTES;
        (value.len() > next).then(|| {
            Arc::new(CaseInsensitiveLexicalOrder { from_index: next }) as Arc<dyn Order<str>>
        })
    }
}

impl Equality<String> for CaseInsensitiveLexicalOrder {
    #[inline]
    fn are_equal(&self, left: &String, right: &String) -> bool {
        left.eq_ignore_ascii_case(right)
    }
}

impl Order<String> for CaseInsensitiveLexicalOrder {
    #[inline]
    fn compare(&self, left: &String, right: &String) -> Ordering {
        Order::<str>::compare(self, left, right)
    }

    #[inline]
    fn index_of(&self, value: &String) -> u32 {
        Order::<str>::index_of(self, value)
    }

    fn sub_order(&self, value: &String) -> Option<Arc<dyn Order<String>>> {
        let next = self.from_index + PACKED_BYTES;
        (value.len() > next).then(|| {
            Arc::new(CaseInsensitiveLexicalOrder { from_index: next }) as Arc<dyn Order<String>>
        })
    }
}
