//! External sorter.

use log;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;

use crate::compare::{compare_ignore_case, LineCompare};
use crate::fragment::{Fragment, LINE_TERMINATOR};
use crate::merger::BinaryHeapMerger;
use crate::plan::FragmentPlan;
use crate::reader::LineBoundaryReader;
use crate::workspace::Workspace;

/// Default maximum fragment size (100 MiB).
pub const DEFAULT_FRAGMENT_SIZE: u64 = 100 * 1024 * 1024;
/// Default line boundary read window (8 KiB).
pub const DEFAULT_READ_CHUNK_SIZE: usize = 8 * 1024;

/// Sorting error.
#[derive(Debug)]
pub enum SortError {
    /// Invalid sorter configuration or missing input.
    Config(String),
    /// Temporary directory creation error.
    TempDir(io::Error),
    /// No line terminator found within a read window: the window is smaller than a line.
    LineBoundary { offset: u64, window: usize },
    /// Common I/O error.
    IO(io::Error),
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self {
            SortError::TempDir(err) => Some(err),
            SortError::IO(err) => Some(err),
            SortError::Config(_) | SortError::LineBoundary { .. } => None,
        }
    }
}

impl Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            SortError::Config(msg) => write!(f, "invalid configuration: {}", msg),
            SortError::TempDir(err) => write!(f, "temporary directory not created: {}", err),
            SortError::LineBoundary { offset, window } => write!(
                f,
                "no line boundary within {} bytes at offset {}, the window is smaller than a line",
                window, offset
            ),
            SortError::IO(err) => write!(f, "I/O operation failed: {}", err),
        }
    }
}

/// Outcome of a successful sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSummary {
    /// Number of fragments the input was split into.
    pub fragments: usize,
    /// Number of lines written to the output.
    pub lines: u64,
}

/// External sorter builder. Provides methods for [`ExternalSorter`] initialization.
#[derive(Clone, Debug)]
pub struct ExternalSorterBuilder {
    /// Maximum fragment size in bytes.
    fragment_size: u64,
    /// Line boundary read window size.
    read_chunk_size: usize,
    /// Directory to be used to store temporary data.
    tmp_dir: Option<Box<Path>>,
    /// Fragment and output read/write buffer size.
    rw_buf_size: Option<usize>,
}

impl ExternalSorterBuilder {
    /// Creates an instance of a builder with default parameters.
    pub fn new() -> Self {
        ExternalSorterBuilder::default()
    }

    /// Builds an [`ExternalSorter`] instance using provided configuration.
    pub fn build(self) -> Result<ExternalSorter, SortError> {
        ExternalSorter::new(
            self.fragment_size,
            self.read_chunk_size,
            self.tmp_dir.as_deref(),
            self.rw_buf_size,
        )
    }

    /// Sets maximum fragment size in bytes. A whole fragment has to fit in memory while it is sorted.
    pub fn with_fragment_size(mut self, fragment_size: u64) -> ExternalSorterBuilder {
        self.fragment_size = fragment_size;
        return self;
    }

    /// Sets line boundary read window size. It must be larger than the longest input line.
    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> ExternalSorterBuilder {
        self.read_chunk_size = read_chunk_size;
        return self;
    }

    /// Sets directory to be used to store temporary data.
    pub fn with_tmp_dir(mut self, path: &Path) -> ExternalSorterBuilder {
        self.tmp_dir = Some(path.into());
        return self;
    }

    /// Sets fragment and output read/write buffer size.
    pub fn with_rw_buf_size(mut self, buf_size: usize) -> ExternalSorterBuilder {
        self.rw_buf_size = Some(buf_size);
        return self;
    }
}

impl Default for ExternalSorterBuilder {
    fn default() -> Self {
        ExternalSorterBuilder {
            fragment_size: DEFAULT_FRAGMENT_SIZE,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            tmp_dir: None,
            rw_buf_size: None,
        }
    }
}

/// External sorter of text file lines.
///
/// The input is split into line-aligned fragments, every fragment is sorted in memory, then
/// the fragments are merged into the output. Lines are compared ignoring case.
pub struct ExternalSorter {
    /// Maximum fragment size in bytes.
    fragment_size: u64,
    /// Line boundary read window size.
    read_chunk_size: usize,
    /// Directory to be used to store temporary data.
    tmp_dir: Option<Box<Path>>,
    /// Fragment and output read/write buffer size.
    rw_buf_size: Option<usize>,
    /// Line comparator.
    compare: LineCompare,
}

impl ExternalSorter {
    /// Creates a new external sorter instance.
    ///
    /// # Arguments
    /// * `fragment_size` - Maximum fragment size in bytes
    /// * `read_chunk_size` - Line boundary read window size, must be larger than the longest line
    /// * `tmp_path` - Directory to be used to store temporary data. If paramater is [`None`] default OS temporary
    ///   directory will be used.
    /// * `rw_buf_size` - Fragments and output file read/write buffer size.
    pub fn new(
        fragment_size: u64,
        read_chunk_size: usize,
        tmp_path: Option<&Path>,
        rw_buf_size: Option<usize>,
    ) -> Result<Self, SortError> {
        if fragment_size == 0 {
            return Err(SortError::Config("fragment size must be positive".to_string()));
        }
        if read_chunk_size == 0 {
            return Err(SortError::Config("read chunk size must be positive".to_string()));
        }

        return Ok(ExternalSorter {
            fragment_size,
            read_chunk_size,
            tmp_dir: tmp_path.map(|path| path.into()),
            rw_buf_size,
            compare: compare_ignore_case,
        });
    }

    /// Sorts lines of the `input` file into the `output` file.
    /// An existing output file is replaced. The output is created only after the input is fully split,
    /// so it may be the input file itself.
    pub fn sort(&self, input: &Path, output: &Path) -> Result<SortSummary, SortError> {
        let summary = self.sort_with(input, || {
            let file = fs::File::create(output)?;
            return Ok(match self.rw_buf_size {
                Some(buf_size) => io::BufWriter::with_capacity(buf_size, file),
                None => io::BufWriter::new(file),
            });
        })?;

        log::info!("sorted output saved to {}", output.display());

        return Ok(summary);
    }

    /// Sorts lines of the `input` file into `output`.
    pub fn sort_to_writer<W: Write>(&self, input: &Path, output: W) -> Result<SortSummary, SortError> {
        self.sort_with(input, || Ok(output))
    }

    fn sort_with<W, O>(&self, input: &Path, open_output: O) -> Result<SortSummary, SortError>
    where
        W: Write,
        O: FnOnce() -> io::Result<W>,
    {
        let mut source = Self::open_source(input)?;
        let plan = FragmentPlan::new(source.len(), self.fragment_size)?;

        log::info!(
            "sorting {} ({} bytes, {} fragments of {} bytes planned)",
            input.display(),
            source.len(),
            plan.fragment_count(),
            plan.bytes_per_fragment()
        );

        let mut workspace = Workspace::new(self.tmp_dir.as_deref())?;

        let result = self
            .create_fragments(&mut source, &plan, &mut workspace)
            .and_then(|()| {
                let output = open_output().map_err(SortError::IO)?;
                self.merge_fragments(workspace.fragments(), output)
            })
            .map(|lines| SortSummary {
                fragments: workspace.fragments().len(),
                lines,
            });

        workspace.cleanup();

        return result;
    }

    fn open_source(input: &Path) -> Result<LineBoundaryReader<fs::File>, SortError> {
        let file = fs::File::open(input).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SortError::Config(format!("input file {} not found", input.display())),
            _ => SortError::IO(err),
        })?;

        return LineBoundaryReader::new(file).map_err(SortError::IO);
    }

    /// Splits the source into sorted fragments. Fragments are produced after the planned count as long as
    /// the source is not exhausted since line alignment leaves every fragment slightly short of its budget.
    fn create_fragments<R>(
        &self,
        source: &mut LineBoundaryReader<R>,
        plan: &FragmentPlan,
        workspace: &mut Workspace,
    ) -> Result<(), SortError>
    where
        R: Read + Seek,
    {
        let mut index = 0;
        while (index as u64) < plan.fragment_count() || !source.is_exhausted() {
            let fragment = Fragment::build(
                workspace.path(),
                index,
                source,
                plan.bytes_per_fragment(),
                self.read_chunk_size,
                self.rw_buf_size,
            )?;
            fragment.sort_lines(self.compare, self.rw_buf_size)?;
            workspace.push(fragment);
            index += 1;
        }

        log::debug!("external sort preparation done ({} fragments)", index);

        return Ok(());
    }

    fn merge_fragments<W: Write>(&self, fragments: &[Fragment], mut output: W) -> Result<u64, SortError> {
        let readers = fragments
            .iter()
            .map(|fragment| fragment.lines(self.rw_buf_size))
            .collect::<Result<Vec<_>, _>>()
            .map_err(SortError::IO)?;

        let compare = self.compare;
        let merger = BinaryHeapMerger::new(readers, |a: &String, b: &String| compare(a, b));

        let mut lines = 0;
        for line in merger {
            let line = line.map_err(SortError::IO)?;
            output.write_all(line.as_bytes()).map_err(SortError::IO)?;
            output.write_all(LINE_TERMINATOR).map_err(SortError::IO)?;
            lines += 1;
        }
        output.flush().map_err(SortError::IO)?;

        log::info!("{} lines merged from {} fragments", lines, fragments.len());

        return Ok(lines);
    }
}
