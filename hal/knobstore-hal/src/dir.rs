//! Directory-backed file system for host builds
//!
//! Maps each flat path (`/Knob.jsn`) to a file directly inside a root
//! directory. Used for running the store against real files on a PC, e.g.
//! when preparing a configuration image.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use crate::file::{validate_path, File, FileError, FileSystem, OpenMode};

/// Flat file system rooted at a host directory
#[derive(Debug, Clone)]
pub struct DirFileSystem {
    root: PathBuf,
}

impl DirFileSystem {
    /// Use `root` as the backing directory; it must already exist
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The backing directory
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

fn map_io(err: io::Error) -> FileError {
    match err.kind() {
        io::ErrorKind::NotFound => FileError::NotFound,
        _ => FileError::Io,
    }
}

impl FileSystem for DirFileSystem {
    type File<'a> = DirFile;

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<DirFile, FileError> {
        let name = validate_path(path)?;
        let full = self.root.join(name);
        let file = match mode {
            OpenMode::Read => fs::File::open(full),
            OpenMode::Write => fs::File::create(full),
        }
        .map_err(map_io)?;
        Ok(DirFile { file, mode })
    }
}

/// Open file in a [`DirFileSystem`]
#[derive(Debug)]
pub struct DirFile {
    file: fs::File,
    mode: OpenMode,
}

impl File for DirFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FileError> {
        if self.mode != OpenMode::Read {
            return Err(FileError::WrongMode);
        }
        self.file.read(buf).map_err(map_io)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, FileError> {
        if self.mode != OpenMode::Write {
            return Err(FileError::WrongMode);
        }
        self.file.write(data).map_err(map_io)
    }

    fn close(mut self) -> Result<(), FileError> {
        self.file.flush().map_err(map_io)?;
        if self.mode == OpenMode::Write {
            self.file.sync_all().map_err(map_io)?;
        }
        Ok(())
    }
}
