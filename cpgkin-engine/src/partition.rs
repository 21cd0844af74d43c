use std::fmt::{self, Display};
use std::ops::Range;

use crate::errors::{EngineError, Result};

/// A contiguous `[from, to)` range of region indices handed to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slice {
    pub from: usize,
    pub to: usize,
}

impl Slice {
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }
}

impl Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.from, self.to)
    }
}

///
/// Split `n` items into `parts` contiguous slices whose sizes differ by at most
/// one. The first `n % parts` slices get the extra item; when `parts > n` the
/// trailing slices are empty.
///
/// # Arguments
/// - n: number of items
/// - parts: number of slices, must be positive
///
pub fn split_range(n: usize, parts: usize) -> Result<Vec<Slice>> {
    if parts == 0 {
        return Err(EngineError::Configuration(
            "cannot split a range into 0 slices".to_string(),
        ));
    }

    let base = n / parts;
    let remainder = n % parts;

    let mut slices = Vec::with_capacity(parts);
    let mut from = 0;
    for i in 0..parts {
        let size = if i < remainder { base + 1 } else { base };
        slices.push(Slice {
            from,
            to: from + size,
        });
        from += size;
    }

    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn s(from: usize, to: usize) -> Slice {
        Slice { from, to }
    }

    #[rstest]
    fn test_ten_items_three_slices() {
        assert_eq!(
            split_range(10, 3).unwrap(),
            vec![s(0, 4), s(4, 7), s(7, 10)]
        );
    }

    #[rstest]
    fn test_no_items() {
        let slices = split_range(0, 4).unwrap();
        assert_eq!(slices, vec![s(0, 0); 4]);
        assert!(slices.iter().all(Slice::is_empty));
    }

    #[rstest]
    fn test_more_slices_than_items() {
        assert_eq!(
            split_range(2, 4).unwrap(),
            vec![s(0, 1), s(1, 2), s(2, 2), s(2, 2)]
        );
    }

    #[rstest]
    fn test_zero_slices_is_rejected() {
        assert!(matches!(
            split_range(10, 0),
            Err(EngineError::Configuration(_))
        ));
    }

    #[rstest]
    fn test_partition_is_complete_balanced_and_deterministic() {
        for n in 0..60 {
            for parts in 1..12 {
                let slices = split_range(n, parts).unwrap();
                assert_eq!(slices.len(), parts);

                // contiguous from 0 to n, hence disjoint, ordered and complete
                assert_eq!(slices[0].from, 0);
                assert_eq!(slices[parts - 1].to, n);
                for pair in slices.windows(2) {
                    assert_eq!(pair[0].to, pair[1].from);
                }

                let sizes: Vec<usize> = slices.iter().map(Slice::len).collect();
                let max = *sizes.iter().max().unwrap();
                let min = *sizes.iter().min().unwrap();
                assert!(max - min <= 1, "n={} parts={} sizes={:?}", n, parts, sizes);

                assert_eq!(slices, split_range(n, parts).unwrap());
            }
        }
    }

    #[rstest]
    fn test_slice_display() {
        assert_eq!(s(4, 7).to_string(), "[4,7)");
    }
}
