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

use std::fmt;
use std::io;

/// The kind of an [`Error`].
///
/// Each kind tells the caller what happened to the data and to the files on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The target file cannot be created or opened.
    Open,
    /// The data cannot be written to the active file, or the rotator is closed.
    ///
    /// Only bytes confirmed by the OS are counted; the write may be retried.
    Write,
    /// The backup retention limit is reached.
    ///
    /// The data of the triggering write has been appended, but the active file was not rotated
    /// and now exceeds the rotation size.
    RotationExceeded,
    /// A filesystem operation failed while shifting backups.
    ///
    /// Renames that succeeded before the failure are kept.
    RotationIo,
    /// The file handle cannot be released, or it has already been released.
    Close,
}

impl ErrorKind {
    /// Return the name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Open => "Open",
            ErrorKind::Write => "Write",
            ErrorKind::RotationExceeded => "RotationExceeded",
            ErrorKind::RotationIo => "RotationIo",
            ErrorKind::Close => "Close",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error struct of sizeroll.
pub struct Error {
    kind: ErrorKind,
    message: String,
    sources: Vec<anyhow::Error>,
    context: Vec<(&'static str, String)>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            write!(
                f,
                "{}",
                self.context
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            write!(f, " }}")?;
        }

        if !self.sources.is_empty() {
            write!(f, ", sources: [")?;
            for (i, source) in self.sources.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{source}")?;
            }
            write!(f, "]")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            de.field("sources", &self.sources);
            return de.finish();
        }

        write!(f, "{} ({})", self.message, self.kind)?;
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }
        if !self.sources.is_empty() {
            writeln!(f)?;
            writeln!(f, "Sources:")?;
            for source in self.sources.iter() {
                writeln!(f, "   {source:#}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.sources.first().map(|v| v.as_ref())
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::other(err)
    }
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            sources: vec![],
            context: vec![],
        }
    }

    /// Return the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the message of this error, without context and sources.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Add one more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Add one more source in error.
    pub fn with_source(mut self, src: impl Into<anyhow::Error>) -> Self {
        self.sources.push(src.into());
        self
    }

    /// Return an iterator over all sources of this error.
    pub fn sources(&self) -> impl ExactSizeIterator<Item = &(dyn std::error::Error + 'static)> {
        self.sources.iter().map(|v| v.as_ref())
    }

    /// The error returned when the backup retention limit is reached.
    pub(crate) fn rotation_exceeded() -> Error {
        Error::new(ErrorKind::RotationExceeded, "rotation count has been exceeded")
    }

    /// The error returned when operating on a closed rotator.
    pub(crate) fn closed(kind: ErrorKind) -> Error {
        Error::new(kind, "file has already been closed")
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::Error;
    use super::ErrorKind;

    #[test]
    fn test_display_with_context_and_sources() {
        let err = Error::new(ErrorKind::Open, "failed to open file")
            .with_context("path", "app.log")
            .with_source(io::Error::new(io::ErrorKind::NotFound, "missing"));

        assert_eq!(
            err.to_string(),
            "failed to open file, context: { path: app.log }, sources: [missing]"
        );
        assert_eq!(err.kind(), ErrorKind::Open);
        assert_eq!(err.message(), "failed to open file");
        assert_eq!(err.sources().len(), 1);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_rotation_exceeded_message() {
        let err = Error::rotation_exceeded();
        assert_eq!(err.to_string(), "rotation count has been exceeded");
        assert_eq!(err.kind(), ErrorKind::RotationExceeded);
        assert!(err.source().is_none());
    }

    #[test]
    fn test_into_io_error() {
        let err: io::Error = Error::closed(ErrorKind::Write).into();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(err.to_string(), "file has already been closed");
    }

    #[test]
    fn test_debug_output() {
        let err = Error::new(ErrorKind::Close, "failed to sync file").with_context("path", "a");
        let debug = format!("{err:?}");
        assert!(debug.starts_with("failed to sync file (Close)"));
        assert!(debug.contains("Context:"));

        let alternate = format!("{err:#?}");
        assert!(alternate.contains("kind: Close"));
    }
}
