//! Fragment planning.

use crate::sort::SortError;

/// Number and approximate size of the fragments a source is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentPlan {
    fragment_count: u64,
    bytes_per_fragment: u64,
}

impl FragmentPlan {
    /// Computes a plan for a file of `file_size` bytes and fragments of at most `max_fragment_size` bytes.
    ///
    /// When the file size is not a multiple of the fragment count extra fragments are planned for the
    /// remainder, a single one unless the remainder is larger than a fragment. An empty file yields a
    /// single empty fragment.
    pub fn new(file_size: u64, max_fragment_size: u64) -> Result<Self, SortError> {
        if max_fragment_size == 0 {
            return Err(SortError::Config("fragment size must be positive".to_string()));
        }

        let mut fragment_count = u64::max(1, (file_size + max_fragment_size - 1) / max_fragment_size);
        let bytes_per_fragment = file_size / fragment_count;
        let remainder = file_size % fragment_count;
        if remainder > 0 {
            fragment_count += (remainder + bytes_per_fragment - 1) / bytes_per_fragment;
        }

        return Ok(FragmentPlan {
            fragment_count,
            bytes_per_fragment,
        });
    }

    pub fn fragment_count(&self) -> u64 {
        self.fragment_count
    }

    pub fn bytes_per_fragment(&self) -> u64 {
        self.bytes_per_fragment
    }
}
