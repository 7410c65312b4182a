use std::fmt;
use std::iter::FusedIterator;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

const WORD_BITS: usize = u64::BITS as usize;

/// Fixed-capacity set over the integer universe `[0, size)`.
///
/// Membership is packed into `u64` words. Bits at positions `>= size` are
/// always zero, so word-wise algebra never leaks elements past the universe.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBitSet"))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    size: usize,
    words: Vec<u64>, // len == size.div_ceil(64)
}

#[derive(Debug, Error)]
pub enum BitSetError {
    #[error("invalid bitset size {size}: must be non-negative")]
    InvalidArgument { size: i64 },
    #[error("element {element} out of range [0, {size})")]
    OutOfRange { element: i64, size: usize },
    #[error("bitset sizes differ: {left} vs {right}")]
    SizeMismatch { left: usize, right: usize },
    #[error("corrupt bitset data: {0}")]
    Corrupt(String),
    #[cfg(feature = "serde")]
    #[error("serialization error: {0}")]
    Serde(#[from] Box<bincode::ErrorKind>),
}

impl BitSet {
    /// Empty set over `[0, size)`. Fails on a negative size; zero is allowed.
    pub fn new(size: i64) -> Result<Self, BitSetError> {
        let size = usize::try_from(size).map_err(|_| BitSetError::InvalidArgument { size })?;
        Ok(Self::with_size(size))
    }

    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            words: vec![0; size.div_ceil(WORD_BITS)],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of elements present.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn add(&mut self, element: i64) -> Result<(), BitSetError> {
        let (w, b) = self.locate(element)?;
        self.words[w] |= 1u64 << b;
        Ok(())
    }

    pub fn remove(&mut self, element: i64) -> Result<(), BitSetError> {
        let (w, b) = self.locate(element)?;
        self.words[w] &= !(1u64 << b);
        Ok(())
    }

    pub fn contains(&self, element: i64) -> Result<bool, BitSetError> {
        let (w, b) = self.locate(element)?;
        Ok((self.words[w] >> b) & 1 == 1)
    }

    /// Elements present in either operand.
    pub fn union(&self, other: &BitSet) -> Result<BitSet, BitSetError> {
        self.combine(other, |a, b| a | b)
    }

    /// Elements present in both operands.
    pub fn intersection(&self, other: &BitSet) -> Result<BitSet, BitSetError> {
        self.combine(other, |a, b| a & b)
    }

    /// Elements present in `self` but not in `other`.
    pub fn difference(&self, other: &BitSet) -> Result<BitSet, BitSetError> {
        self.combine(other, |a, b| a & !b)
    }

    /// Present elements in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    #[cfg(feature = "serde")]
    pub fn to_bytes(&self) -> Result<Vec<u8>, BitSetError> {
        Ok(bincode::serialize(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BitSetError> {
        // Decode the raw shape first so invariant violations surface as `Corrupt`.
        let raw: RawBitSet = bincode::deserialize(bytes)?;
        BitSet::try_from(raw)
    }

    /// Word index and bit offset for `element`, or `OutOfRange`.
    #[inline]
    fn locate(&self, element: i64) -> Result<(usize, usize), BitSetError> {
        let idx = usize::try_from(element)
            .ok()
            .filter(|&i| i < self.size)
            .ok_or(BitSetError::OutOfRange {
                element,
                size: self.size,
            })?;
        Ok((idx / WORD_BITS, idx % WORD_BITS))
    }

    fn combine(&self, other: &BitSet, op: impl Fn(u64, u64) -> u64) -> Result<BitSet, BitSetError> {
        if self.size != other.size {
            return Err(BitSetError::SizeMismatch {
                left: self.size,
                right: other.size,
            });
        }
        let words = self
            .words
            .iter()
            .zip(&other.words)
            .map(|(&a, &b)| op(a, b))
            .collect();
        Ok(BitSet {
            size: self.size,
            words,
        })
    }
}

/// Renders as `{e0, e1, ..., en}`; an empty set is `{}`.
impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, element) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{element}")?;
        }
        f.write_str("}")
    }
}

/// Ascending iterator over the elements of a [`BitSet`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    words: &'a [u64],
    index: usize,
    current: u64, // unvisited bits of words[index]
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.index * WORD_BITS + bit);
            }
            self.index += 1;
            self.current = *self.words.get(self.index)?;
        }
    }
}

impl FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a BitSet {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Wire shape of a [`BitSet`]; validated before it becomes one.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawBitSet {
    size: usize,
    words: Vec<u64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawBitSet> for BitSet {
    type Error = BitSetError;

    fn try_from(raw: RawBitSet) -> Result<Self, BitSetError> {
        let expected = raw.size.div_ceil(WORD_BITS);
        if raw.words.len() != expected {
            return Err(BitSetError::Corrupt(format!(
                "{} words for size {}, expected {expected}",
                raw.words.len(),
                raw.size
            )));
        }
        let tail = raw.size % WORD_BITS;
        if tail != 0 {
            if let Some(&last) = raw.words.last() {
                if last >> tail != 0 {
                    return Err(BitSetError::Corrupt(format!(
                        "bits set beyond size {}",
                        raw.size
                    )));
                }
            }
        }
        Ok(BitSet {
            size: raw.size,
            words: raw.words,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(size: i64, elements: &[i64]) -> BitSet {
        let mut set = BitSet::new(size).unwrap();
        for &e in elements {
            set.add(e).unwrap();
        }
        set
    }

    #[test]
    fn negative_size_is_rejected() {
        assert!(matches!(
            BitSet::new(-1),
            Err(BitSetError::InvalidArgument { size: -1 })
        ));
    }

    #[test]
    fn zero_size_is_empty_universe() {
        let mut set = BitSet::new(0).unwrap();
        assert_eq!(set.size(), 0);
        assert!(set.is_empty());
        assert_eq!(set.to_string(), "{}");
        assert!(matches!(set.add(0), Err(BitSetError::OutOfRange { element: 0, size: 0 })));
    }

    #[test]
    fn add_remove_contains() {
        let mut set = set_of(10, &[2, 5, 9]);
        assert_eq!(set.to_string(), "{2, 5, 9}");

        set.remove(5).unwrap();
        assert_eq!(set.to_string(), "{2, 9}");
        assert!(!set.contains(5).unwrap());
        assert!(set.contains(9).unwrap());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let mut once = BitSet::new(8).unwrap();
        once.add(3).unwrap();
        let mut twice = once.clone();
        twice.add(3).unwrap();
        assert_eq!(once, twice);

        once.remove(3).unwrap();
        twice.remove(3).unwrap();
        twice.remove(3).unwrap();
        assert_eq!(once, twice);
        assert!(twice.is_empty());
    }

    #[test]
    fn out_of_range_leaves_set_untouched() {
        let mut set = set_of(4, &[1]);
        let before = set.clone();
        for e in [-1, 4, 100, i64::MIN, i64::MAX] {
            assert!(matches!(set.add(e), Err(BitSetError::OutOfRange { .. })));
            assert!(matches!(set.remove(e), Err(BitSetError::OutOfRange { .. })));
            assert!(matches!(set.contains(e), Err(BitSetError::OutOfRange { .. })));
        }
        assert_eq!(set, before);
    }

    #[test]
    fn set_algebra() {
        let a = set_of(5, &[1, 2, 3]);
        let b = set_of(5, &[2, 3, 4]);
        assert_eq!(a.union(&b).unwrap().to_string(), "{1, 2, 3, 4}");
        assert_eq!(a.intersection(&b).unwrap().to_string(), "{2, 3}");
        assert_eq!(a.difference(&b).unwrap().to_string(), "{1}");
        assert_eq!(a.to_string(), "{1, 2, 3}");
        assert_eq!(b.to_string(), "{2, 3, 4}");
    }

    #[test]
    fn size_mismatch() {
        let a = BitSet::new(5).unwrap();
        let b = BitSet::new(6).unwrap();
        assert!(matches!(
            a.union(&b),
            Err(BitSetError::SizeMismatch { left: 5, right: 6 })
        ));
        assert!(a.intersection(&b).is_err());
        assert!(b.difference(&a).is_err());
    }

    #[test]
    fn word_boundaries() {
        for size in [1i64, 63, 64, 65, 130] {
            let mut set = BitSet::new(size).unwrap();
            set.add(0).unwrap();
            set.add(size - 1).unwrap();
            assert!(set.contains(size - 1).unwrap());
            assert!(set.add(size).is_err());

            let expected: Vec<usize> = if size == 1 {
                vec![0]
            } else {
                vec![0, size as usize - 1]
            };
            assert_eq!(set.iter().collect::<Vec<_>>(), expected);
        }
    }

    #[test]
    fn error_messages() {
        let err = BitSet::new(3).unwrap().add(7).unwrap_err();
        assert_eq!(err.to_string(), "element 7 out of range [0, 3)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn bytes_roundtrip() {
        let set = set_of(70, &[0, 33, 64, 69]);
        let bytes = set.to_bytes().unwrap();
        assert_eq!(BitSet::from_bytes(&bytes).unwrap(), set);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn bits_beyond_size_are_corrupt() {
        let raw = RawBitSet {
            size: 3,
            words: vec![0b1001],
        };
        assert!(matches!(BitSet::try_from(raw), Err(BitSetError::Corrupt(_))));

        let raw = RawBitSet {
            size: 65,
            words: vec![0],
        };
        assert!(matches!(BitSet::try_from(raw), Err(BitSetError::Corrupt(_))));
    }
}
