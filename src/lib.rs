//! `ext-line-sort` sorts text files that do not fit in memory.
//!
//! It implements the classic external merge sort. During the first pass the input file is split into
//! line-aligned fragments of bounded size, every fragment is sorted in memory and saved to a temporary
//! directory. During the second pass the sorted fragments are merged into the output file with a binary heap.
//! For more information see [External Sorting](https://en.wikipedia.org/wiki/External_sorting).
//!
//! # Overview
//!
//! * **Bounded memory:**
//!   only one fragment is held in memory at a time, its size is controlled by the fragment size parameter.
//! * **Line aligned:**
//!   fragments never split a line, every input line ends up in exactly one fragment.
//! * **Case-insensitive:**
//!   lines are compared ignoring letter case, lines differing only in case come out in no particular order.
//! * **Self-cleaning:**
//!   the temporary directory is removed after the sort whether it succeeded or not.
//!
//! Output lines are terminated by `\r\n`.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use log;
//!
//! use ext_line_sort::ExternalSorterBuilder;
//!
//! fn main() {
//!     let sorter = ExternalSorterBuilder::new()
//!         .with_fragment_size(50 * 1024 * 1024)
//!         .with_tmp_dir(Path::new("./"))
//!         .build()
//!         .unwrap();
//!
//!     let summary = sorter.sort(Path::new("input.txt"), Path::new("sorted_input.txt")).unwrap();
//!     log::info!("{} lines sorted", summary.lines);
//! }
//! ```

pub mod compare;
pub mod fragment;
pub mod generate;
pub mod merger;
pub mod plan;
pub mod reader;
pub mod sort;
pub mod workspace;

pub use compare::compare_ignore_case;
pub use fragment::Fragment;
pub use merger::BinaryHeapMerger;
pub use plan::FragmentPlan;
pub use reader::LineBoundaryReader;
pub use sort::{ExternalSorter, ExternalSorterBuilder, SortError, SortSummary};
pub use workspace::Workspace;
