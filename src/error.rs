//! Error types.
//!
//! Asset loading is the only thing that fails at runtime once a window is up, so
//! [`AssetError`] carries the path and underlying cause for logging. [`AppError`]
//! covers window and GPU bring-up, which aborts the program.

use std::path::PathBuf;

/// Failure while reading or decoding an asset file.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image could not be decoded.
    #[error("image decode error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The glTF/GLB document could not be imported.
    #[error("glTF import error for {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    /// The STL file could not be parsed.
    #[error("STL parse error for {path}: {message}")]
    Stl { path: PathBuf, message: String },

    /// The file extension does not map to a known loader.
    #[error("unsupported asset format '{extension}' for {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The model decoded but contained no drawable triangles.
    #[error("model {path} contains no triangle geometry")]
    EmptyModel { path: PathBuf },
}

impl AssetError {
    /// The path of the asset that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            AssetError::Io { path, .. }
            | AssetError::Image { path, .. }
            | AssetError::Gltf { path, .. }
            | AssetError::Stl { path, .. }
            | AssetError::UnsupportedFormat { path, .. }
            | AssetError::EmptyModel { path } => path,
        }
    }
}

/// Fatal error while bringing up the window or GPU.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("font {path} could not be loaded: {message}")]
    Font { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_error_reports_path() {
        let err = AssetError::UnsupportedFormat {
            path: PathBuf::from("models/thing.fbx"),
            extension: "fbx".to_string(),
        };
        assert_eq!(err.path(), std::path::Path::new("models/thing.fbx"));
        assert!(err.to_string().contains("fbx"));
    }
}
