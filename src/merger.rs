//! Binary heap merger.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::error::Error;

/// Frontier entry: the current head of an input along with the input index.
struct HeapEntry<T, F> {
    item: T,
    idx: usize,
    compare: F,
}

impl<T, F> Ord for HeapEntry<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    // binary heap is max-heap so the order is reversed to pop the smallest item first,
    // equal items are popped in input order
    fn cmp(&self, other: &Self) -> Ordering {
        (self.compare)(&other.item, &self.item).then_with(|| other.idx.cmp(&self.idx))
    }
}

impl<T, F> PartialOrd for HeapEntry<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, F> PartialEq for HeapEntry<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T, F> Eq for HeapEntry<T, F> where F: Fn(&T, &T) -> Ordering {}

/// Binary heap merger implementation.
/// Merges multiple sorted inputs into a single sorted output.
/// Time complexity is *m* \* log(*n*) in worst case where *m* is the number of items,
/// *n* is the number of chunks (inputs).
///
/// Items comparing equal are yielded in the order of their inputs. Callers should not rely on that:
/// with a case-insensitive comparator, lines differing only in case come out in no particular order.
pub struct BinaryHeapMerger<T, E, F, C>
where
    E: Error,
    F: Fn(&T, &T) -> Ordering + Copy,
    C: IntoIterator<Item = Result<T, E>>,
{
    items: BinaryHeap<HeapEntry<T, F>>,
    chunks: Vec<C::IntoIter>,
    compare: F,
    initiated: bool,
    failed: bool,
    pending_error: Option<E>,
}

impl<T, E, F, C> BinaryHeapMerger<T, E, F, C>
where
    E: Error,
    F: Fn(&T, &T) -> Ordering + Copy,
    C: IntoIterator<Item = Result<T, E>>,
{
    /// Creates an instance of a binary heap merger using chunks as inputs.
    /// Chunk items should be sorted in ascending order otherwise the result is undefined.
    ///
    /// # Arguments
    /// * `chunks` - Chunks to be merged in a single sorted one
    /// * `compare` - Function to be used to compare items
    pub fn new<I>(chunks: I, compare: F) -> Self
    where
        I: IntoIterator<Item = C>,
    {
        let chunks = Vec::from_iter(chunks.into_iter().map(|c| c.into_iter()));
        let items = BinaryHeap::with_capacity(chunks.len());

        return BinaryHeapMerger {
            chunks,
            items,
            compare,
            initiated: false,
            failed: false,
            pending_error: None,
        };
    }

    fn pull(&mut self, idx: usize) -> Result<(), E> {
        if let Some(item) = self.chunks[idx].next() {
            self.items.push(HeapEntry {
                item: item?,
                idx,
                compare: self.compare,
            });
        }

        return Ok(());
    }
}

impl<T, E, F, C> Iterator for BinaryHeapMerger<T, E, F, C>
where
    E: Error,
    F: Fn(&T, &T) -> Ordering + Copy,
    C: IntoIterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    /// Returns the next item from the inputs in ascending order.
    /// After an input error is returned the merger yields nothing.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some(err) = self.pending_error.take() {
            self.failed = true;
            return Some(Err(err));
        }

        if !self.initiated {
            self.initiated = true;
            for idx in 0..self.chunks.len() {
                if let Err(err) = self.pull(idx) {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }

        // the popped item is still the smallest one, the input error is reported on the next call
        let entry = self.items.pop()?;
        if let Err(err) = self.pull(entry.idx) {
            self.pending_error = Some(err);
        }

        return Some(Ok(entry.item));
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use std::error::Error;
    use std::io::{self, ErrorKind};

    use super::BinaryHeapMerger;
    use crate::compare::compare_ignore_case;

    #[rstest]
    #[case(
        vec![],
        vec![],
    )]
    #[case(
        vec![
            vec![],
            vec![]
        ],
        vec![],
    )]
    #[case(
        vec![
            vec![Ok(4), Ok(5), Ok(7)],
            vec![Ok(1), Ok(6)],
            vec![Ok(3)],
            vec![],
        ],
        vec![Ok(1), Ok(3), Ok(4), Ok(5), Ok(6), Ok(7)],
    )]
    #[case(
        vec![
            vec![Result::Err(io::Error::new(ErrorKind::Other, "test error"))]
        ],
        vec![
            Result::Err(io::Error::new(ErrorKind::Other, "test error"))
        ],
    )]
    #[case(
        vec![
            vec![Ok(3), Result::Err(io::Error::new(ErrorKind::Other, "test error"))],
            vec![Ok(1), Ok(2)],
        ],
        vec![
            Ok(1),
            Ok(2),
            Ok(3),
            Result::Err(io::Error::new(ErrorKind::Other, "test error")),
        ],
    )]
    fn test_merger(
        #[case] chunks: Vec<Vec<Result<i32, io::Error>>>,
        #[case] expected_result: Vec<Result<i32, io::Error>>,
    ) {
        let merger = BinaryHeapMerger::new(chunks, |a: &i32, b: &i32| a.cmp(b));
        let actual_result: Vec<_> = merger.collect();
        assert_eq!(actual_result.len(), expected_result.len());
        assert!(
            compare_vectors_of_result::<_, io::Error>(&actual_result, &expected_result),
            "actual={:?}, expected={:?}",
            actual_result,
            expected_result
        );
    }

    #[test]
    fn test_merger_ignore_case() {
        let chunks = vec![
            vec!["Apple", "cherry"],
            vec!["apple", "Banana", "date"],
            vec!["APRICOT"],
        ];
        let chunks = chunks
            .into_iter()
            .map(|chunk| Vec::from_iter(chunk.into_iter().map(|line| Ok::<_, io::Error>(line.to_string()))));

        let merger = BinaryHeapMerger::new(chunks, |a: &String, b: &String| compare_ignore_case(a, b));
        let merged: Vec<String> = merger.collect::<Result<_, _>>().unwrap();

        assert_eq!(merged.len(), 6);
        for pair in merged.windows(2) {
            assert!(pair[0].to_lowercase() <= pair[1].to_lowercase(), "{:?}", merged);
        }
        // "Apple" and "apple" are ties, their relative order is unspecified
        let mut ties = merged[..2].to_vec();
        ties.sort();
        assert_eq!(ties, vec!["Apple", "apple"]);
        assert_eq!(&merged[2..], &["APRICOT", "Banana", "cherry", "date"]);
    }

    #[test]
    fn test_merger_stops_after_error() {
        let chunks = vec![
            vec![Ok(1), Err(io::Error::new(ErrorKind::Other, "test error")), Ok(5)],
            vec![Ok(2), Ok(3), Ok(4)],
        ];

        let mut merger = BinaryHeapMerger::new(chunks, |a: &i32, b: &i32| a.cmp(b));

        assert_eq!(merger.next().unwrap().unwrap(), 1);
        assert!(merger.next().unwrap().is_err());
        assert!(merger.next().is_none());
    }

    fn compare_vectors_of_result<T: PartialEq, E: Error + 'static>(
        actual: &Vec<Result<T, E>>,
        expected: &Vec<Result<T, E>>,
    ) -> bool {
        actual
            .into_iter()
            .zip(expected)
            .all(
                |(actual_result, expected_result)| match (actual_result, expected_result) {
                    (Ok(actual_result), Ok(expected_result)) if actual_result == expected_result => true,
                    (Err(actual_err), Err(expected_err)) => actual_err.to_string() == expected_err.to_string(),
                    _ => false,
                },
            )
    }
}
