//! Loading migrations from files, directories and embedded bundles
//!
//! Every loader produces [`QueryMigration`]s whose id is the entry's name.
//! The runner never depends on this module; it only consumes the
//! `Box<dyn Migration>` values produced here.

use crate::migration::{Migration, MigrationError, QueryMigration};
use include_dir::{Dir, File};
use std::fs;
use std::path::{Path, PathBuf};

/// How migration bytes are turned into SQL text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Strict UTF-8; invalid input is an error
    #[default]
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD
    Utf8Lossy,
    /// ISO-8859-1, every byte maps to the code point of the same value
    Latin1,
}

impl Encoding {
    fn label(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf8Lossy => "UTF-8 (lossy)",
            Encoding::Latin1 => "ISO-8859-1",
        }
    }

    /// Decode `bytes`; `origin` is only used for the error
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::Decode` for invalid strict UTF-8.
    pub fn decode(self, bytes: Vec<u8>, origin: &Path) -> Result<String, MigrationError> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes).map_err(|_| MigrationError::Decode {
                path: origin.to_path_buf(),
                encoding: self.label(),
            }),
            Encoding::Utf8Lossy => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

/// A listable collection of migration bodies
///
/// The host decides where bodies live (a directory, bytes compiled into the
/// binary, an archive); loaders only need to list entry names and read them.
pub trait MigrationSource {
    /// Entry names, in the order the migrations must run
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::Source` if the listing cannot be produced.
    fn list(&self) -> Result<Vec<String>, MigrationError>;

    /// Raw contents of one listed entry
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::Source` if the entry cannot be read.
    fn read(&self, name: &str) -> Result<Vec<u8>, MigrationError>;

    /// Path used in error messages for `name`
    fn origin(&self, name: &str) -> PathBuf {
        PathBuf::from(name)
    }
}

/// Regular files of one directory, listed alphabetically
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl MigrationSource for DirSource {
    fn list(&self) -> Result<Vec<String>, MigrationError> {
        let source_err = |source: std::io::Error| MigrationError::Source {
            path: self.dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(source_err)? {
            let entry = entry.map_err(source_err)?;
            if !entry.file_type().map_err(source_err)?.is_file() {
                continue;
            }
            let name = entry.file_name().into_string().map_err(|raw| MigrationError::Source {
                path: self.dir.join(&raw),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "migration file name is not valid UTF-8"),
            })?;
            names.push(name);
        }

        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, MigrationError> {
        let path = self.origin(name);
        fs::read(&path).map_err(|source| MigrationError::Source { path, source })
    }

    fn origin(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// A migration folder compiled into the binary with `include_dir!`
///
/// Only files directly inside the folder are listed, sorted by file name.
///
/// ```rust
/// use include_dir::{include_dir, Dir};
/// use schemashift::migration::{load, EmbeddedSource, Encoding};
///
/// static MIGRATIONS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/testdata/migrations");
///
/// let migrations = load(&EmbeddedSource::new(&MIGRATIONS), Encoding::Utf8).unwrap();
/// assert_eq!(migrations[0].id(), "001_users.sql");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedSource {
    dir: &'static Dir<'static>,
}

impl EmbeddedSource {
    #[must_use]
    pub fn new(dir: &'static Dir<'static>) -> Self {
        Self { dir }
    }

    fn file(&self, name: &str) -> Option<&'static File<'static>> {
        self.dir
            .files()
            .find(|file| file.path().file_name().and_then(|n| n.to_str()) == Some(name))
    }
}

impl MigrationSource for EmbeddedSource {
    fn list(&self) -> Result<Vec<String>, MigrationError> {
        let mut names = Vec::new();
        for file in self.dir.files() {
            let name = file
                .path()
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| MigrationError::Source {
                    path: file.path().to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "embedded migration file name is not valid UTF-8",
                    ),
                })?;
            names.push(name.to_string());
        }

        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, MigrationError> {
        self.file(name)
            .map(|file| file.contents().to_vec())
            .ok_or_else(|| MigrationError::Source {
                path: self.origin(name),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no embedded migration with that name"),
            })
    }

    fn origin(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// One migration per listed entry, named after the entry
///
/// # Errors
///
/// Returns the first listing, read, decode or construction error.
pub fn load(
    source: &dyn MigrationSource,
    encoding: Encoding,
) -> Result<Vec<Box<dyn Migration>>, MigrationError> {
    source
        .list()?
        .into_iter()
        .map(|name| -> Result<Box<dyn Migration>, MigrationError> {
            let sql = encoding.decode(source.read(&name)?, &source.origin(&name))?;
            Ok(Box::new(QueryMigration::new(name, sql)?))
        })
        .collect()
}

/// Every regular file in `dir`, alphabetically, decoded as UTF-8
///
/// # Errors
///
/// See [`load`].
pub fn from_dir(dir: impl AsRef<Path>) -> Result<Vec<Box<dyn Migration>>, MigrationError> {
    load(&DirSource::new(dir), Encoding::Utf8)
}

/// A migration read from `path`, with the file name as id, decoded as UTF-8
///
/// # Errors
///
/// Returns `MigrationError::Source` if the file cannot be read or has no
/// UTF-8 file name, and `MigrationError::Decode` for invalid UTF-8.
pub fn from_file(path: impl AsRef<Path>) -> Result<Box<dyn Migration>, MigrationError> {
    let path = path.as_ref();
    let id = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| MigrationError::Source {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no UTF-8 file name"),
        })?;
    from_file_with(id, path, Encoding::Utf8)
}

/// A migration read from `path` with an explicit id and encoding
///
/// # Errors
///
/// Same as [`from_file`], plus `MigrationError::InvalidArgument` for a blank id or file.
pub fn from_file_with(
    id: impl Into<String>,
    path: impl AsRef<Path>,
    encoding: Encoding,
) -> Result<Box<dyn Migration>, MigrationError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| MigrationError::Source {
        path: path.to_path_buf(),
        source,
    })?;
    let sql = encoding.decode(bytes, path)?;
    Ok(Box::new(QueryMigration::new(id, sql)?))
}
