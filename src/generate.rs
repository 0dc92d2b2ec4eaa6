//! Random test file generation.

use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;

use rand::Rng;

/// Characters generated lines are made of.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Writes `lines` random lines, each between 1 and `max_line_length` characters long and terminated by `\n`.
/// Returns the number of bytes written.
pub fn generate_lines<W, R>(writer: &mut W, lines: usize, max_line_length: usize, rng: &mut R) -> io::Result<u64>
where
    W: Write,
    R: Rng,
{
    if max_line_length == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "maximum line length must be positive",
        ));
    }

    let mut line = Vec::with_capacity(max_line_length + 1);
    let mut written = 0;
    for _ in 0..lines {
        line.clear();
        let len = rng.gen_range(1..=max_line_length);
        line.extend((0..len).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())]));
        line.push(b'\n');

        writer.write_all(&line)?;
        written += line.len() as u64;
    }

    return Ok(written);
}

/// Creates (or replaces) the file at `path` filled with random lines, see [`generate_lines`].
pub fn generate_file<R: Rng>(path: &Path, lines: usize, max_line_length: usize, rng: &mut R) -> io::Result<u64> {
    let mut writer = io::BufWriter::new(fs::File::create(path)?);
    let written = generate_lines(&mut writer, lines, max_line_length, rng)?;
    writer.flush()?;

    log::info!("{} generated ({} lines, {} bytes)", path.display(), lines, written);

    return Ok(written);
}
