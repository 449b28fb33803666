//! Background asset loading.
//!
//! Decoding images and importing meshes happens on a worker thread so a
//! frame never waits for the disk. Requests go out with a [`Ticket`];
//! finished loads are collected with [`AssetLoader::poll`] at the start of
//! a tick and matched back by the caller, which drops stale results.

use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};

use crate::config::AppConfig;
use crate::configurator::Ticket;
use crate::error::AssetError;
use crate::material::MapKind;
use crate::mesh::{load_obj, Mesh};
use crate::texture::{procedural, EnvironmentMap, MipChain, Texture};

/// Names of the procedural images available without any files.
pub const BUILTIN_IMAGES: [&str; 4] = ["checker", "noise", "egg-height", "egg-normal"];
/// Names of the procedural environment maps.
pub const BUILTIN_ENVIRONMENTS: [&str; 1] = ["sky"];

const BUILTIN_SIZE: u32 = 256;
const SKY_FACE_SIZE: u32 = 128;

/// Where an asset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Builtin(String),
    Image(PathBuf),
    /// Directory with `posx`..`negz` face images.
    EnvironmentDir(PathBuf),
    Obj(PathBuf),
    /// The eight images of a visible mip chain, finest first.
    MipLevels(Vec<PathBuf>),
}

/// A loaded asset.
#[derive(Debug)]
pub enum Asset {
    Image(Texture),
    Environment(EnvironmentMap),
    Mesh(Mesh),
    Mips(MipChain),
}

/// Load an asset on the calling thread.
pub fn load(source: &AssetSource) -> Result<Asset, AssetError> {
    match source {
        AssetSource::Builtin(name) => builtin(name),
        AssetSource::Image(path) => Texture::from_file(path).map(Asset::Image),
        AssetSource::EnvironmentDir(dir) => EnvironmentMap::from_directory(dir).map(Asset::Environment),
        AssetSource::Obj(path) => load_obj(path).map(Asset::Mesh),
        AssetSource::MipLevels(paths) => {
            let levels = paths
                .iter()
                .map(Texture::from_file)
                .collect::<Result<Vec<_>, _>>()?;
            MipChain::from_levels(levels).map(Asset::Mips)
        }
    }
}

fn builtin(name: &str) -> Result<Asset, AssetError> {
    let asset = match name {
        "checker" => Asset::Image(procedural::checkerboard(128, 8)),
        "noise" => Asset::Image(procedural::pixel_noise(BUILTIN_SIZE, 0x5EED)),
        "egg-height" => Asset::Image(procedural::egg_crate_height(BUILTIN_SIZE, 8)),
        "egg-normal" => {
            let height = procedural::egg_crate_height(BUILTIN_SIZE, 8);
            Asset::Image(procedural::normal_map_from_height(&height, 4.0))
        }
        "sky" => Asset::Environment(procedural::sky_environment(SKY_FACE_SIZE)),
        _ => return Err(AssetError::UnknownBuiltin(name.to_string())),
    };
    Ok(asset)
}

/// Resolves the names the UI offers to asset sources. Configured files
/// shadow built-ins of the same name.
#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    textures: Vec<(String, PathBuf)>,
    environments: Vec<(String, PathBuf)>,
}

impl AssetLibrary {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            textures: config
                .textures
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            environments: config
                .environments
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Source for `name` in a slot of the given kind.
    pub fn resolve(&self, kind: MapKind, name: &str) -> Option<AssetSource> {
        let (files, builtins): (&[(String, PathBuf)], &[&str]) = match kind {
            MapKind::Environment => (&self.environments, &BUILTIN_ENVIRONMENTS),
            _ => (&self.textures, &BUILTIN_IMAGES),
        };
        if let Some((_, path)) = files.iter().find(|(n, _)| n == name) {
            return Some(match kind {
                MapKind::Environment => AssetSource::EnvironmentDir(path.clone()),
                _ => AssetSource::Image(path.clone()),
            });
        }
        builtins
            .contains(&name)
            .then(|| AssetSource::Builtin(name.to_string()))
    }

    /// Every name selectable for a slot kind, configured files first.
    pub fn names(&self, kind: MapKind) -> Vec<String> {
        let (files, builtins): (&[(String, PathBuf)], &[&str]) = match kind {
            MapKind::Environment => (&self.environments, &BUILTIN_ENVIRONMENTS),
            _ => (&self.textures, &BUILTIN_IMAGES),
        };
        let mut names: Vec<String> = files.iter().map(|(n, _)| n.clone()).collect();
        for b in builtins {
            if !names.iter().any(|n| n == b) {
                names.push(b.to_string());
            }
        }
        names
    }
}

/// A finished load.
#[derive(Debug)]
pub struct Completed {
    pub ticket: Ticket,
    pub result: Result<Asset, AssetError>,
}

/// Loads assets on a worker thread.
pub struct AssetLoader {
    requests: Option<Sender<(Ticket, AssetSource)>>,
    completed: Receiver<Completed>,
    worker: Option<JoinHandle<()>>,
    in_flight: usize,
}

impl AssetLoader {
    pub fn new() -> Self {
        let (request_tx, request_rx) = unbounded::<(Ticket, AssetSource)>();
        let (done_tx, done_rx) = unbounded();

        let worker = thread::spawn(move || {
            for (ticket, source) in request_rx {
                debug!("loading {:?}", source);
                let result = load(&source);
                if done_tx.send(Completed { ticket, result }).is_err() {
                    break;
                }
            }
        });

        Self {
            requests: Some(request_tx),
            completed: done_rx,
            worker: Some(worker),
            in_flight: 0,
        }
    }

    pub fn request(&mut self, ticket: Ticket, source: AssetSource) -> Result<(), AssetError> {
        let sender = self.requests.as_ref().ok_or(AssetError::LoaderGone)?;
        sender
            .send((ticket, source))
            .map_err(|_| AssetError::LoaderGone)?;
        self.in_flight += 1;
        Ok(())
    }

    /// Loads requested but not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Every load that finished since the last call. Never blocks.
    pub fn poll(&mut self) -> Vec<Completed> {
        let done: Vec<Completed> = self.completed.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(done.len());
        done
    }

    /// Block until one load finishes or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<Completed> {
        match self.completed.recv_timeout(timeout) {
            Ok(done) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(done)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("asset loader thread stopped with {} loads in flight", self.in_flight);
                self.in_flight = 0;
                None
            }
        }
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("asset loader thread panicked");
            }
        }
    }
}
