//! In-memory file system
//!
//! Fixed-capacity flat file system backed by heapless storage: up to
//! `FILES` files of up to `SIZE` bytes each. Used for host testing and for
//! boards that mirror a small configuration partition into RAM.

use heapless::{String, Vec};

use crate::file::{validate_path, File, FileError, FileSystem, OpenMode, MAX_NAME_LEN};

struct RamEntry<const SIZE: usize> {
    name: String<MAX_NAME_LEN>,
    data: Vec<u8, SIZE>,
}

/// RAM file system with `FILES` slots of `SIZE` bytes
pub struct RamFileSystem<const FILES: usize, const SIZE: usize> {
    entries: Vec<RamEntry<SIZE>, FILES>,
}

impl<const FILES: usize, const SIZE: usize> Default for RamFileSystem<FILES, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const FILES: usize, const SIZE: usize> RamFileSystem<FILES, SIZE> {
    /// Create an empty file system
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name.as_str() == name)
    }

    /// Replace the whole contents of a file, creating it if needed
    pub fn store(&mut self, path: &str, data: &[u8]) -> Result<(), FileError> {
        let mut file = self.open(path, OpenMode::Write)?;
        file.write_all(data)?;
        file.close()
    }

    /// Borrow the contents of a file
    pub fn contents(&self, path: &str) -> Option<&[u8]> {
        let name = validate_path(path).ok()?;
        self.position(name)
            .map(|i| self.entries[i].data.as_slice())
    }

    /// Remove a file; returns true if it existed
    pub fn remove(&mut self, path: &str) -> bool {
        let Ok(name) = validate_path(path) else {
            return false;
        };
        match self.position(name) {
            Some(i) => {
                self.entries.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Number of files present
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no files are present
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const FILES: usize, const SIZE: usize> FileSystem for RamFileSystem<FILES, SIZE> {
    type File<'a> = RamFile<'a, SIZE>;

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<RamFile<'_, SIZE>, FileError> {
        let name = validate_path(path)?;
        let index = match (self.position(name), mode) {
            (Some(i), _) => i,
            (None, OpenMode::Read) => return Err(FileError::NotFound),
            (None, OpenMode::Write) => {
                let name = String::try_from(name).map_err(|_| FileError::InvalidName)?;
                self.entries
                    .push(RamEntry {
                        name,
                        data: Vec::new(),
                    })
                    .map_err(|_| FileError::TooManyFiles)?;
                self.entries.len() - 1
            }
        };

        let data = &mut self.entries[index].data;
        if mode == OpenMode::Write {
            data.clear();
        }
        Ok(RamFile {
            data,
            cursor: 0,
            mode,
        })
    }
}

/// Open file in a [`RamFileSystem`]
pub struct RamFile<'a, const SIZE: usize> {
    data: &'a mut Vec<u8, SIZE>,
    cursor: usize,
    mode: OpenMode,
}

impl<const SIZE: usize> File for RamFile<'_, SIZE> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FileError> {
        if self.mode != OpenMode::Read {
            return Err(FileError::WrongMode);
        }
        let remaining = &self.data[self.cursor..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.cursor += n;
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, FileError> {
        if self.mode != OpenMode::Write {
            return Err(FileError::WrongMode);
        }
        let n = (SIZE - self.data.len()).min(data.len());
        if n == 0 && !data.is_empty() {
            return Err(FileError::Full);
        }
        // Cannot fail, n fits the remaining capacity
        let _ = self.data.extend_from_slice(&data[..n]);
        Ok(n)
    }
}
