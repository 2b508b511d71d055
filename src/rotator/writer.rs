// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::num::NonZeroU64;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;

use crate::Error;
use crate::ErrorKind;
use crate::rotator::backup;

/// The rotation size used when none is configured: 100 MiB.
pub const DEFAULT_ROTATION_SIZE: NonZeroU64 = NonZeroU64::new(100 * 1024 * 1024).unwrap();

/// A writer that appends to a file and rotates it into numbered backups once it grows past the
/// rotation size.
///
/// Backups are named `path.1`, `path.2`, ...; `path.1` always holds the most recently
/// rotated-out content.
///
/// A rotator is not internally synchronized. Every mutating operation takes `&mut self`; share
/// it between threads behind a lock that covers the whole write call, since the size check and
/// the rotation are not atomic.
#[derive(Debug)]
pub struct Rotator {
    path: PathBuf,
    file: Option<File>,
    current_size: u64,
    rotation_size: NonZeroU64,
    max_rotation: Option<NonZeroUsize>,
    // raised by `io::Write::write` after bytes were consumed; returned by `io::Write::flush`
    deferred: Option<Error>,
}

impl Write for Rotator {
    /// Appends the buffer and returns the number of bytes consumed.
    ///
    /// Once any byte has been appended the call returns `Ok`, so buffering wrappers never write
    /// the same bytes twice. An error raised after that point, e.g. a failed rotation, is kept
    /// and returned by the next [`Write::flush`]. Use [`Rotator::write`] to observe such errors
    /// at the write that raised them.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.write_inner(buf) {
            (n, None) => Ok(n),
            (0, Some(err)) => Err(err.into()),
            (n, Some(err)) => {
                self.deferred = Some(err);
                Ok(n)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(err) = self.deferred.take() {
            return Err(err.into());
        }
        Rotator::flush(self).map_err(io::Error::from)
    }
}

impl Rotator {
    /// Opens `path` for appending with the default configuration, creating it if absent.
    ///
    /// # Errors
    ///
    /// Return an [`ErrorKind::Open`] error if the file cannot be created or opened. Missing
    /// parent directories are not created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Rotator, Error> {
        RotatorBuilder::new(path).build()
    }

    /// Creates a new [`RotatorBuilder`] for `path`.
    #[must_use]
    pub fn builder(path: impl Into<PathBuf>) -> RotatorBuilder {
        RotatorBuilder::new(path)
    }

    /// Appends `data` to the active file, rotating it first if the write would push a non-empty
    /// file past the rotation size.
    ///
    /// Writing zero bytes is a no-op and returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// * [`ErrorKind::Write`] if the rotator is closed or the data cannot be written. Only bytes
    ///   confirmed by the OS are counted.
    /// * [`ErrorKind::RotationExceeded`] or [`ErrorKind::RotationIo`] if the rotation failed. In
    ///   both cases `data` has still been appended to the active file, which now exceeds the
    ///   rotation size.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        match self.write_inner(data) {
            (n, None) => Ok(n),
            (_, Some(err)) => Err(err),
        }
    }

    /// Appends a string; see [`Rotator::write`].
    pub fn write_str(&mut self, data: &str) -> Result<usize, Error> {
        self.write(data.as_bytes())
    }

    /// Flushes the active file.
    pub fn flush(&mut self) -> Result<(), Error> {
        match self.file.as_mut() {
            None => Ok(()),
            Some(file) => file.flush().map_err(|err| {
                Error::new(ErrorKind::Write, "failed to flush file")
                    .with_context("path", self.path.display())
                    .with_source(err)
            }),
        }
    }

    /// Syncs and closes the active file. No rotation happens on close.
    ///
    /// # Errors
    ///
    /// Return an [`ErrorKind::Close`] error if the file has already been closed, or if syncing it
    /// failed. The handle is released in both cases.
    pub fn close(&mut self) -> Result<(), Error> {
        let Some(file) = self.file.take() else {
            return Err(Error::closed(ErrorKind::Close).with_context("path", self.path.display()));
        };

        file.sync_all().map_err(|err| {
            Error::new(ErrorKind::Close, "failed to sync file")
                .with_context("path", self.path.display())
                .with_source(err)
        })
    }

    /// The path of the active file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The path of backup slot `index`, i.e. `path.index`.
    pub fn backup_path(&self, index: usize) -> PathBuf {
        backup::backup_path(&self.path, index)
    }

    /// The size in bytes of the active file as tracked by this rotator.
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// The configured rotation size in bytes.
    pub fn rotation_size(&self) -> u64 {
        self.rotation_size.get()
    }

    /// The configured maximum number of backups; `0` means unlimited.
    pub fn max_rotation(&self) -> usize {
        self.max_rotation.map_or(0, NonZeroUsize::get)
    }

    /// Whether [`Rotator::close`] has released the active file.
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Set the size in bytes at which the active file is rotated.
    pub fn set_rotation_size(&mut self, n: NonZeroU64) {
        self.rotation_size = n;
    }

    /// Set the maximum number of backups to keep; `0` means unlimited.
    pub fn set_max_rotation(&mut self, n: usize) {
        self.max_rotation = NonZeroUsize::new(n);
    }

    fn should_rotate(&self, incoming: usize) -> bool {
        self.current_size > 0
            && self.current_size.saturating_add(incoming as u64) > self.rotation_size.get()
    }

    /// Returns the number of bytes appended, and the error raised along the way if any.
    fn write_inner(&mut self, data: &[u8]) -> (usize, Option<Error>) {
        if data.is_empty() {
            return (0, None);
        }
        if self.file.is_none() {
            let err = Error::closed(ErrorKind::Write).with_context("path", self.path.display());
            return (0, Some(err));
        }

        let rotated = if self.should_rotate(data.len()) {
            self.rotate()
        } else {
            Ok(())
        };

        let (written, write_err) = self.append(data);
        let err = match (rotated, write_err) {
            (Ok(()), err) => err,
            (Err(err), None) => Some(err),
            (Err(err), Some(write_err)) => Some(err.with_source(write_err)),
        };
        (written, err)
    }

    fn append(&mut self, data: &[u8]) -> (usize, Option<Error>) {
        let Some(file) = self.file.as_mut() else {
            let err = Error::closed(ErrorKind::Write).with_context("path", self.path.display());
            return (0, Some(err));
        };

        // count partial writes so the tracked size stays equal to the file length
        let mut written = 0;
        let mut failure = None;
        while written < data.len() {
            match file.write(&data[written..]) {
                Ok(0) => {
                    failure = Some(
                        Error::new(ErrorKind::Write, "failed to write whole buffer")
                            .with_source(io::Error::from(io::ErrorKind::WriteZero)),
                    );
                    break;
                }
                Ok(n) => written += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    failure =
                        Some(Error::new(ErrorKind::Write, "failed to write file").with_source(err));
                    break;
                }
            }
        }

        self.current_size += written as u64;
        let failure = failure.map(|err| {
            err.with_context("path", self.path.display())
                .with_context("written", written)
        });
        (written, failure)
    }

    fn rotate(&mut self) -> Result<(), Error> {
        let slots = backup::list_slots(&self.path)?;
        let exceeded = self.max_rotation.is_some_and(|max_rotation| {
            slots
                .last()
                .is_some_and(|&highest| highest >= max_rotation.get())
        });
        if exceeded {
            return Err(Error::rotation_exceeded());
        }

        let result = self.rotate_files(&slots);
        if result.is_err() && self.file.is_none() {
            // keep appending to whatever sits at the active path now
            match open_file(&self.path) {
                Ok((file, size)) => {
                    self.file = Some(file);
                    self.current_size = size;
                }
                Err(err) => {
                    return result.map_err(|rotate_err| rotate_err.with_source(err));
                }
            }
        }
        result
    }

    fn rotate_files(&mut self, slots: &[usize]) -> Result<(), Error> {
        if let Some(mut file) = self.file.take() {
            let flushed = file.flush();
            drop(file);
            flushed.map_err(|err| {
                Error::new(ErrorKind::RotationIo, "failed to flush file before rotation")
                    .with_context("path", self.path.display())
                    .with_source(err)
            })?;
        }

        backup::shift_slots(&self.path, slots)?;

        let archive = backup::backup_path(&self.path, 1);
        fs::rename(&self.path, &archive).map_err(|err| {
            Error::new(ErrorKind::RotationIo, "failed to archive file")
                .with_context("from", self.path.display())
                .with_context("to", archive.display())
                .with_source(err)
        })?;

        let (file, size) = open_file(&self.path).map_err(|err| {
            Error::new(ErrorKind::RotationIo, "failed to reopen file").with_source(err)
        })?;
        self.file = Some(file);
        self.current_size = size;
        Ok(())
    }
}

/// A builder for configuring [`Rotator`].
#[derive(Debug)]
pub struct RotatorBuilder {
    // required
    path: PathBuf,

    // has default
    rotation_size: NonZeroU64,
    max_rotation: Option<NonZeroUsize>,
}

impl RotatorBuilder {
    /// Creates a new [`RotatorBuilder`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rotation_size: DEFAULT_ROTATION_SIZE,
            max_rotation: None,
        }
    }

    /// Set the size in bytes at which the active file is rotated.
    ///
    /// Default to [`DEFAULT_ROTATION_SIZE`].
    #[must_use]
    pub fn rotation_size(mut self, n: NonZeroU64) -> Self {
        self.rotation_size = n;
        self
    }

    /// Set the maximum number of backups to keep; `0` means unlimited.
    ///
    /// Default to unlimited.
    #[must_use]
    pub fn max_rotation(mut self, n: usize) -> Self {
        self.max_rotation = NonZeroUsize::new(n);
        self
    }

    /// Builds the [`Rotator`].
    ///
    /// # Errors
    ///
    /// Return an [`ErrorKind::Open`] error if the file cannot be created or opened.
    pub fn build(self) -> Result<Rotator, Error> {
        let RotatorBuilder {
            path,
            rotation_size,
            max_rotation,
        } = self;

        if path.as_os_str().is_empty() {
            return Err(Error::new(ErrorKind::Open, "path must not be empty"));
        }

        let (file, current_size) = open_file(&path)?;
        Ok(Rotator {
            path,
            file: Some(file),
            current_size,
            rotation_size,
            max_rotation,
            deferred: None,
        })
    }
}

fn open_file(path: &Path) -> Result<(File, u64), Error> {
    let mut options = OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let file = options.open(path).map_err(|err| {
        Error::new(ErrorKind::Open, "failed to open file")
            .with_context("path", path.display())
            .with_source(err)
    })?;
    let metadata = file.metadata().map_err(|err| {
        Error::new(ErrorKind::Open, "failed to stat file")
            .with_context("path", path.display())
            .with_source(err)
    })?;
    Ok((file, metadata.len()))
}
