//! Background asset loading.
//!
//! Every request runs on its own thread: the file is read and decoded there and the
//! outcome comes back over a channel. The frame loop calls [`AssetLoader::poll`] once
//! per frame, which never blocks, and hands each finished asset to
//! [`SceneWorld::attach`](crate::SceneWorld::attach). Loads cannot be cancelled and
//! failures are not retried.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::error::AssetError;
use crate::material::TextureId;
use crate::model::ModelData;
use crate::scene::ModelDesc;
use crate::texture::ImageData;

/// Something to load, with enough context to attach it afterwards.
#[derive(Clone, Debug, PartialEq)]
pub enum AssetRequest {
    Texture { slot: TextureId, path: PathBuf },
    Model(ModelDesc),
}

impl AssetRequest {
    /// Path relative to the asset root.
    pub fn path(&self) -> &Path {
        match self {
            AssetRequest::Texture { path, .. } => path,
            AssetRequest::Model(desc) => &desc.path,
        }
    }

    /// Reads and decodes the asset synchronously.
    pub fn load(&self, root: &Path) -> Result<LoadedAsset, AssetError> {
        let full_path = root.join(self.path());
        match self {
            AssetRequest::Texture { slot, .. } => Ok(LoadedAsset::Texture {
                slot: *slot,
                image: ImageData::from_file(&full_path)?,
            }),
            AssetRequest::Model(desc) => Ok(LoadedAsset::Model {
                desc: desc.clone(),
                model: ModelData::load(&full_path)?,
            }),
        }
    }
}

/// A decoded asset, ready to attach.
#[derive(Clone, Debug)]
pub enum LoadedAsset {
    Texture { slot: TextureId, image: ImageData },
    Model { desc: ModelDesc, model: ModelData },
}

/// The outcome of one request.
#[derive(Debug)]
pub struct LoadResult {
    pub request: AssetRequest,
    pub outcome: Result<LoadedAsset, AssetError>,
}

impl LoadResult {
    /// Logs the outcome. Missing images are warnings; model failures are errors.
    pub fn report(&self) {
        match (&self.outcome, &self.request) {
            (Ok(_), request) => log::debug!("loaded {}", request.path().display()),
            (Err(err), AssetRequest::Texture { .. }) => {
                log::warn!("texture unavailable: {err}");
            }
            (Err(err), AssetRequest::Model(_)) => log::error!("model failed to load: {err}"),
        }
    }
}

/// Runs asset loads off the frame thread.
pub struct AssetLoader {
    root: PathBuf,
    tx: mpsc::Sender<LoadResult>,
    rx: mpsc::Receiver<LoadResult>,
    in_flight: usize,
}

impl AssetLoader {
    /// Relative request paths resolve against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            root: root.into(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of requests not yet returned by [`poll`](Self::poll).
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Starts loading in the background.
    pub fn request(&mut self, request: AssetRequest) {
        let tx = self.tx.clone();
        let root = self.root.clone();
        self.in_flight += 1;

        let spawned = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                let outcome = request.load(&root);
                // The receiver only disappears when the app is shutting down.
                let _ = tx.send(LoadResult { request, outcome });
            });

        if let Err(err) = spawned {
            self.in_flight -= 1;
            log::error!("could not start asset loader thread: {err}");
        }
    }

    pub fn request_all(&mut self, requests: impl IntoIterator<Item = AssetRequest>) {
        for request in requests {
            self.request(request);
        }
    }

    /// Every result that has arrived since the last call, without blocking.
    pub fn poll(&mut self) -> Vec<LoadResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            results.push(result);
        }
        self.in_flight -= results.len().min(self.in_flight);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelFit, ModelPlacement};
    use glam::Vec3;
    use std::time::{Duration, Instant};

    /// Blocks until every request in flight has reported or `timeout` elapses.
    fn wait(loader: &mut AssetLoader, timeout: Duration) -> Vec<LoadResult> {
        let deadline = Instant::now() + timeout;
        let mut results = Vec::new();
        while loader.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match loader.rx.recv_timeout(remaining) {
                Ok(result) => {
                    loader.in_flight -= 1;
                    results.push(result);
                }
                Err(_) => break,
            }
        }
        results
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tableau-loader-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn poll_on_idle_loader_is_empty() {
        let mut loader = AssetLoader::new("assets");
        assert!(loader.poll().is_empty());
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn missing_files_fail_without_blocking_others() {
        let dir = temp_dir("mixed");
        let png = dir.join("ok.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 10, 10, 255]))
            .save(&png)
            .unwrap();

        let mut loader = AssetLoader::new(&dir);
        loader.request(AssetRequest::Texture {
            slot: TextureId(0),
            path: "missing.jpg".into(),
        });
        loader.request(AssetRequest::Texture {
            slot: TextureId(1),
            path: "ok.png".into(),
        });
        loader.request(AssetRequest::Model(ModelDesc::new(
            "models/lantern.glb",
            ModelPlacement::new(ModelFit::Height(1.4), Vec3::ZERO),
        )));

        let results = wait(&mut loader, Duration::from_secs(10));
        assert_eq!(results.len(), 3);
        assert_eq!(loader.pending(), 0);

        let ok = results
            .iter()
            .filter(|r| r.outcome.is_ok())
            .map(|r| r.request.path().to_path_buf())
            .collect::<Vec<_>>();
        assert_eq!(ok, vec![PathBuf::from("ok.png")]);

        for result in &results {
            result.report();
            if let Err(err) = &result.outcome {
                assert!(err.path().starts_with(&dir));
            }
        }
    }

    #[test]
    fn texture_load_keeps_slot() {
        let dir = temp_dir("slot");
        image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]))
            .save(dir.join("wood.png"))
            .unwrap();
        let request = AssetRequest::Texture {
            slot: TextureId(4),
            path: "wood.png".into(),
        };
        match request.load(&dir).unwrap() {
            LoadedAsset::Texture { slot, image } => {
                assert_eq!(slot, TextureId(4));
                assert_eq!(image.width, 1);
            }
            other => panic!("unexpected asset {other:?}"),
        }
    }
}
