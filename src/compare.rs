//! Line ordering.

use std::cmp::Ordering;

/// Compares two lines ignoring letter case.
///
/// Characters are folded to lower case one by one, so lines that differ only in case compare equal.
/// Does not allocate.
///
/// Folding is per character and ignores context, so the order may differ from comparing
/// [`str::to_lowercase`] results: a word-final `Σ` folds to `σ` here, not to `ς`.
pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Comparator signature shared by the fragment sorter and the merger.
pub type LineCompare = fn(&str, &str) -> Ordering;

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use rstest::*;

    use super::compare_ignore_case;

    #[rstest]
    #[case("apple", "apple", Ordering::Equal)]
    #[case("Apple", "apple", Ordering::Equal)]
    #[case("APPLE", "apple", Ordering::Equal)]
    #[case("apple", "Banana", Ordering::Less)]
    #[case("Banana", "apple", Ordering::Greater)]
    #[case("app", "apple", Ordering::Less)]
    #[case("", "a", Ordering::Less)]
    #[case("a1", "A0", Ordering::Greater)]
    #[case("ÄPFEL", "äpfel", Ordering::Equal)]
    #[case("ΟΔΟΣ", "οδοσ", Ordering::Equal)]
    fn test_compare_ignore_case(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare_ignore_case(a, b), expected);
    }

    #[test]
    fn test_matches_lowercase_order() {
        let words = ["Zeta", "alpha", "Beta", "gamma", "ALPHA", "b", "Z"];
        for a in words {
            for b in words {
                assert_eq!(compare_ignore_case(a, b), a.to_lowercase().cmp(&b.to_lowercase()));
            }
        }
    }
}
