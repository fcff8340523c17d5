// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Entry, WriterError};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// The outcome of closing the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
    /// The temporary file was renamed to the final path.
    Published(PathBuf),
    /// The final path already existed. It was not touched, and the result
    /// stays in the temporary file.
    Preserved { existing: PathBuf, temporary: PathBuf },
}

/// Writes a JSON compilation database as a stream of entries.
///
/// The entries are written into a temporary file next to the final one.
/// Only [`DatabaseWriter::close`] promotes the temporary file, so a session
/// which dies mid-way never leaves a partial document at the final path.
pub struct DatabaseWriter {
    output: io::BufWriter<fs::File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    first: bool,
    written: usize,
}

impl DatabaseWriter {
    /// Create (or truncate) the temporary file and start the JSON array.
    pub fn open(final_path: &Path) -> Result<Self, WriterError> {
        let temp_path = temporary_path(final_path);

        let mut output = fs::File::create(&temp_path)
            .map(io::BufWriter::new)
            .map_err(|err| WriterError::Create(temp_path.clone(), err))?;
        output
            .write_all(b"[\n")
            .map_err(|err| WriterError::Create(temp_path.clone(), err))?;
        log::debug!("Database opened: {}", temp_path.display());

        Ok(Self {
            output,
            temp_path,
            final_path: final_path.to_path_buf(),
            first: true,
            written: 0,
        })
    }

    /// Write the entry as the next element of the array.
    pub fn append(&mut self, entry: &Entry) -> Result<(), WriterError> {
        if self.first {
            self.first = false;
        } else {
            self.output
                .write_all(b",\n")
                .map_err(|err| WriterError::Write(self.temp_path.clone(), err))?;
        }
        serde_json::to_writer(&mut self.output, entry)
            .map_err(|err| WriterError::Serialize(self.temp_path.clone(), err))?;
        self.written += 1;

        Ok(())
    }

    /// Number of entries appended so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Close the JSON array, flush the file and publish it.
    ///
    /// An already existing file at the final path is never overwritten.
    pub fn close(self) -> Result<Publication, WriterError> {
        let Self { mut output, temp_path, final_path, first, .. } = self;

        let closing: &[u8] = if first { b"]\n" } else { b"\n]\n" };
        output
            .write_all(closing)
            .map_err(|err| WriterError::Write(temp_path.clone(), err))?;
        let file = output
            .into_inner()
            .map_err(|err| WriterError::Write(temp_path.clone(), err.into_error()))?;
        file.sync_all()
            .map_err(|err| WriterError::Write(temp_path.clone(), err))?;
        drop(file);

        if final_path.exists() {
            log::warn!(
                "The output file {} already exists, the result is left in {}.",
                final_path.display(),
                temp_path.display()
            );
            return Ok(Publication::Preserved { existing: final_path, temporary: temp_path });
        }

        fs::rename(&temp_path, &final_path)
            .map_err(|err| WriterError::Rename(temp_path, final_path.clone(), err))?;
        log::debug!("Database published: {}", final_path.display());

        Ok(Publication::Published(final_path))
    }
}

/// The temporary file name is the final one with the `.tmp` suffix appended.
fn temporary_path(final_path: &Path) -> PathBuf {
    let mut name = OsString::from(final_path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
