//! Sorted fragments of a source file stored on the file system.

use std::fs;
use std::io::{self, prelude::*};
use std::path::{Path, PathBuf};

use log;

use crate::compare::LineCompare;
use crate::reader::LineBoundaryReader;
use crate::sort::SortError;

/// Terminator written after every line of a sorted fragment and of the merged output.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// A line-aligned slice of the source file held in a temporary file.
#[derive(Debug)]
pub struct Fragment {
    index: usize,
    path: PathBuf,
    len: u64,
}

impl Fragment {
    /// Builds a fragment by copying whole lines from the source until the byte `budget` is consumed
    /// or the source is exhausted.
    ///
    /// Reads are done in windows of `chunk_size` bytes, the last window being exactly the budget left.
    /// A window that cannot be aligned to a line boundary is an error unless it is that last short window,
    /// whose bytes are left in the source for the next fragment. A fragment whose budget cannot hold the
    /// next line still takes the lines of one full window, so only lines longer than `chunk_size` fail.
    ///
    /// # Arguments
    /// * `dir` - Directory the fragment file is created in
    /// * `index` - Fragment ordinal, used in the file name
    /// * `source` - Shared source cursor
    /// * `budget` - Fragment target size in bytes
    /// * `chunk_size` - Read window size
    /// * `buf_size` - Fragment file write buffer size
    pub fn build<R>(
        dir: &Path,
        index: usize,
        source: &mut LineBoundaryReader<R>,
        budget: u64,
        chunk_size: usize,
        buf_size: Option<usize>,
    ) -> Result<Self, SortError>
    where
        R: Read + Seek,
    {
        let path = dir.join(format!("fragment-{:06}.txt", index));
        let file = fs::File::create(&path).map_err(SortError::IO)?;
        let mut writer = match buf_size {
            Some(buf_size) => io::BufWriter::with_capacity(buf_size, file),
            None => io::BufWriter::new(file),
        };

        let mut len = 0;
        while len < budget {
            let remaining = budget - len;
            let lines = if remaining >= chunk_size as u64 {
                source.read_lines(chunk_size)?
            } else {
                match source.try_read_lines(remaining as usize).map_err(SortError::IO)? {
                    Some(lines) => lines,
                    None => break,
                }
            };
            if lines.is_empty() {
                break;
            }

            writer.write_all(lines).map_err(SortError::IO)?;
            len += lines.len() as u64;
        }
        if len == 0 && budget > 0 && !source.is_exhausted() {
            // the budget is smaller than the next line, the fragment takes at least one whole line
            let lines = source.read_lines(chunk_size)?;
            writer.write_all(lines).map_err(SortError::IO)?;
            len += lines.len() as u64;
        }
        writer.flush().map_err(SortError::IO)?;

        log::debug!("fragment {} written ({} bytes)", path.display(), len);

        return Ok(Fragment { index, path, len });
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of source bytes copied into the fragment.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sorts fragment lines in memory and rewrites the fragment file, terminating every line with
    /// [`LINE_TERMINATOR`]. Returns the number of lines.
    ///
    /// The whole fragment has to fit in memory. Lines that are not valid UTF-8 are reported as an I/O error.
    pub fn sort_lines(&self, compare: LineCompare, buf_size: Option<usize>) -> Result<usize, SortError> {
        if self.is_empty() {
            return Ok(0);
        }

        let mut lines: Vec<String> = self
            .lines(buf_size)
            .map_err(SortError::IO)?
            .collect::<Result<_, _>>()
            .map_err(SortError::IO)?;

        lines.sort_unstable_by(|a, b| compare(a, b));

        let file = fs::File::create(&self.path).map_err(SortError::IO)?;
        let mut writer = match buf_size {
            Some(buf_size) => io::BufWriter::with_capacity(buf_size, file),
            None => io::BufWriter::new(file),
        };
        for line in lines.iter() {
            writer.write_all(line.as_bytes()).map_err(SortError::IO)?;
            writer.write_all(LINE_TERMINATOR).map_err(SortError::IO)?;
        }
        writer.flush().map_err(SortError::IO)?;

        log::debug!("fragment {} sorted ({} lines)", self.path.display(), lines.len());

        return Ok(lines.len());
    }

    /// Opens the fragment as a sequence of lines with terminators stripped.
    pub fn lines(&self, buf_size: Option<usize>) -> io::Result<io::Lines<io::BufReader<fs::File>>> {
        let file = fs::File::open(&self.path)?;
        let reader = match buf_size {
            Some(buf_size) => io::BufReader::with_capacity(buf_size, file),
            None => io::BufReader::new(file),
        };

        return Ok(reader.lines());
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::io;

    use rstest::*;

    use super::Fragment;
    use crate::compare::compare_ignore_case;
    use crate::reader::LineBoundaryReader;
    use crate::sort::SortError;

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn source(data: &str) -> LineBoundaryReader<io::Cursor<Vec<u8>>> {
        LineBoundaryReader::new(io::Cursor::new(data.as_bytes().to_vec())).unwrap()
    }

    const LINES: &str = "pear\nfig\nwatermelon\nkiwi\napple\nbanana\nplum\ncherry\nlime\ngrape\nmango\n";

    #[rstest]
    #[case(11, 12)]
    #[case(13, 16)]
    #[case(17, 12)]
    #[case(23, 16)]
    #[case(29, 4096)]
    fn test_fragments_partition_source(
        tmp_dir: tempfile::TempDir,
        #[case] budget: u64,
        #[case] chunk_size: usize,
    ) {
        let mut source = source(LINES);

        let mut fragments = Vec::new();
        while !source.is_exhausted() {
            let fragment =
                Fragment::build(tmp_dir.path(), fragments.len(), &mut source, budget, chunk_size, None).unwrap();
            fragments.push(fragment);
        }

        let mut restored = String::new();
        for fragment in fragments.iter() {
            let content = fs::read_to_string(fragment.path()).unwrap();
            assert!(content.ends_with('\n'), "fragment {} splits a line", fragment.index());
            assert!(fragment.len() <= budget);
            assert_eq!(content.len() as u64, fragment.len());
            restored.push_str(&content);
        }

        assert_eq!(restored, LINES);
    }

    #[rstest]
    fn test_fragment_smaller_than_line(tmp_dir: tempfile::TempDir) {
        let mut source = source("watermelon\nfig\n");

        let fragment = Fragment::build(tmp_dir.path(), 0, &mut source, 5, 12, None).unwrap();

        assert_eq!(fs::read_to_string(fragment.path()).unwrap(), "watermelon\n");
        assert_eq!(fragment.len(), 11);
        assert_eq!(source.position(), 11);
    }

    #[rstest]
    fn test_fragment_and_chunk_smaller_than_line(tmp_dir: tempfile::TempDir) {
        let mut source = source("watermelon\nfig\n");

        let result = Fragment::build(tmp_dir.path(), 0, &mut source, 5, 8, None);

        assert!(matches!(result, Err(SortError::LineBoundary { offset: 0, window: 8 })));
    }

    #[rstest]
    fn test_chunk_smaller_than_line(tmp_dir: tempfile::TempDir) {
        let mut source = source("fig\nwatermelon\n");

        let result = Fragment::build(tmp_dir.path(), 0, &mut source, 100, 8, None);

        assert!(matches!(result, Err(SortError::LineBoundary { offset: 4, window: 8 })));
    }

    #[rstest]
    fn test_sort_lines(tmp_dir: tempfile::TempDir) {
        let mut source = source("banana\nApple\ncherry\r\napple\n");
        let fragment = Fragment::build(tmp_dir.path(), 0, &mut source, 1024, 4096, None).unwrap();

        let count = fragment.sort_lines(compare_ignore_case, None).unwrap();
        assert_eq!(count, 4);

        let content = fs::read_to_string(fragment.path()).unwrap();
        let lines: Vec<&str> = content.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 4);
        // "Apple" and "apple" compare equal, their relative order is unspecified
        let mut ties = lines[..2].to_vec();
        ties.sort();
        assert_eq!(ties, vec!["Apple", "apple"]);
        assert_eq!(&lines[2..], &["banana", "cherry"]);
    }

    #[rstest]
    fn test_sort_empty_fragment(tmp_dir: tempfile::TempDir) {
        let mut source = source("");
        let fragment = Fragment::build(tmp_dir.path(), 0, &mut source, 0, 4096, None).unwrap();

        assert!(fragment.is_empty());
        assert_eq!(fragment.sort_lines(compare_ignore_case, None).unwrap(), 0);
        assert_eq!(fs::metadata(fragment.path()).unwrap().len(), 0);
    }

    #[rstest]
    fn test_sort_invalid_utf8(tmp_dir: tempfile::TempDir) {
        let mut source = LineBoundaryReader::new(io::Cursor::new(vec![b'a', b'\n', 0xff, 0xfe, b'\n'])).unwrap();
        let fragment = Fragment::build(tmp_dir.path(), 0, &mut source, 1024, 4096, None).unwrap();

        assert!(matches!(fragment.sort_lines(compare_ignore_case, None), Err(SortError::IO(_))));
    }
}
