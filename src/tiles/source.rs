use std::io;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::tiles::provider::{TileError, TileProvider};
use crate::tiles::types::TileAddress;

/// Reads tiles laid out on disk as `{root}/{level}/{row}/{col}.{extension}`
/// and decodes them to RGBA. A missing file is an absent tile, not an error.
#[derive(Debug, Clone)]
pub struct DirectoryTileProvider {
    root: PathBuf,
    extension: String,
}

impl DirectoryTileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "png".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tile_path(&self, address: TileAddress) -> PathBuf {
        self.root
            .join(address.level.to_string())
            .join(address.row.to_string())
            .join(format!("{}.{}", address.col, self.extension))
    }
}

impl TileProvider<RgbaImage> for DirectoryTileProvider {
    fn fetch(&self, address: TileAddress) -> Result<Option<RgbaImage>, TileError> {
        let path = self.tile_path(address);
        match image::open(&path) {
            Ok(decoded) => Ok(Some(decoded.to_rgba8())),
            Err(image::ImageError::IoError(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(image::ImageError::IoError(e)) => Err(TileError::Io(e)),
            Err(e) => Err(TileError::Decode(format!("{}: {}", path.display(), e))),
        }
    }
}
