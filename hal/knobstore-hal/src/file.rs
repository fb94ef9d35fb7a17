//! Flat file abstractions
//!
//! Provides traits for a flat (directory-less) file system as found on
//! small flash file systems. Files are addressed by a single path such as
//! `/Knob.jsn`, are read front to back, and are replaced as a whole when
//! opened for writing. There is no append-in-place.

/// Maximum length of a file path, including the leading `/`
pub const MAX_NAME_LEN: usize = 32;

/// How a file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpenMode {
    /// Read from the start; the file must exist
    Read,
    /// Create or truncate, then write from the start
    Write,
}

/// Errors from file operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FileError {
    /// File does not exist
    NotFound,
    /// Path is empty, too long, or names a directory
    InvalidName,
    /// Read on a file opened for writing, or the reverse
    WrongMode,
    /// No space left for the file contents
    Full,
    /// No free slot for another file
    TooManyFiles,
    /// Underlying storage failed
    Io,
}

/// An open file
///
/// Dropping a file closes it. Implementations that buffer writes must make
/// the data durable no later than [`File::close`] or drop.
pub trait File {
    /// Read up to `buf.len()` bytes from the current position
    ///
    /// Returns the number of bytes read; `0` means end of file.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FileError>;

    /// Write bytes at the current position
    ///
    /// Returns the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, FileError>;

    /// Write the whole buffer
    fn write_all(&mut self, mut data: &[u8]) -> Result<(), FileError> {
        while !data.is_empty() {
            let written = self.write(data)?;
            if written == 0 {
                return Err(FileError::Full);
            }
            data = &data[written..];
        }
        Ok(())
    }

    /// Close the file, reporting any deferred write error
    fn close(self) -> Result<(), FileError>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Flat file system
///
/// A file handle borrows the file system, so at most one file is open at a
/// time. That matches how the store uses it: every operation opens one file,
/// walks it, and closes it before returning.
pub trait FileSystem {
    /// Handle type for an open file
    type File<'a>: File
    where
        Self: 'a;

    /// Open the file at `path`
    ///
    /// [`OpenMode::Read`] fails with [`FileError::NotFound`] if the file is
    /// absent. [`OpenMode::Write`] creates the file or truncates it.
    fn open(&mut self, path: &str, mode: OpenMode) -> Result<Self::File<'_>, FileError>;

    /// Check if a file exists
    fn exists(&mut self, path: &str) -> bool {
        self.open(path, OpenMode::Read).is_ok()
    }
}

/// Validate a flat file path
///
/// Accepts `name` or `/name`. Rejects empty names, names longer than
/// [`MAX_NAME_LEN`], and anything with a further `/`.
pub fn validate_path(path: &str) -> Result<&str, FileError> {
    if path.is_empty() || path.len() > MAX_NAME_LEN {
        return Err(FileError::InvalidName);
    }
    let name = path.strip_prefix('/').unwrap_or(path);
    if name.is_empty() || name.contains('/') {
        return Err(FileError::InvalidName);
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert_eq!(validate_path("/Knob.jsn"), Ok("Knob.jsn"));
        assert_eq!(validate_path("Motor.jsn"), Ok("Motor.jsn"));
        assert_eq!(validate_path(""), Err(FileError::InvalidName));
        assert_eq!(validate_path("/"), Err(FileError::InvalidName));
        assert_eq!(validate_path("/cfg/Knob.jsn"), Err(FileError::InvalidName));

        let long = "/aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        assert!(long.len() > MAX_NAME_LEN);
        assert_eq!(validate_path(long), Err(FileError::InvalidName));
    }
}
