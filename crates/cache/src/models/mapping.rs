use crate::error::{Error, ErrorKind};
use exn::OptionExt;
use std::path::{Path, PathBuf};

/// A source file and the link that was created for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mapping {
    /// Absolute path of the original file. Unique across the store.
    pub source: PathBuf,
    /// Absolute path of the derived hardlink.
    pub target: PathBuf,
}
impl Mapping {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self { source: source.into(), target: target.into() }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct MappingRow {
    pub(crate) source_filename: String,
    pub(crate) target_filename: String,
}
impl MappingRow {
    pub(crate) fn text(path: &Path, what: &'static str) -> Result<String, Error> {
        Ok(path.to_str().ok_or_raise(|| ErrorKind::InvalidData(what))?.to_string())
    }
}
impl TryFrom<&Mapping> for MappingRow {
    type Error = Error;
    fn try_from(mapping: &Mapping) -> Result<Self, Self::Error> {
        Ok(Self {
            source_filename: Self::text(&mapping.source, "source path")?,
            target_filename: Self::text(&mapping.target, "target path")?,
        })
    }
}
impl From<MappingRow> for Mapping {
    fn from(row: MappingRow) -> Self {
        Self::new(row.source_filename, row.target_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_model() {
        let row = MappingRow {
            source_filename: "/source/Naruto/Naruto - v02 - c015.cbz".to_string(),
            target_filename: "/target/Naruto/Naruto Chapter 15.cbz".to_string(),
        };
        let model = Mapping::from(row);
        assert_eq!(model.source, Path::new("/source/Naruto/Naruto - v02 - c015.cbz"));
        assert_eq!(model.target, Path::new("/target/Naruto/Naruto Chapter 15.cbz"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_are_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let source = Path::new(OsStr::from_bytes(b"/source/\xff.cbz"));
        let mapping = Mapping::new(source, "/target/a.cbz");
        let err = MappingRow::try_from(&mapping).err().unwrap();
        assert!(matches!(&*err, ErrorKind::InvalidData("source path")));
    }
}
