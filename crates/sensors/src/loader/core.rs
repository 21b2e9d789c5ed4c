//! Core [`DescriptorLoader`] struct: filesystem-backed descriptor loading with optional hot-reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use racker_core::{EquipmentModel, RackConfig};
use tracing::{info, warn};

use super::catalog::{Descriptor, DescriptorCatalog, DescriptorKind, ModelStatus};
use super::error::{LoadResult, LoadStatus, LoaderError, Result};
use super::watcher::handle_fs_event;

/// Filesystem-backed descriptor loader with optional hot-reload.
///
/// Scans `<root>/racks` and `<root>/models` (recursively) and keeps the
/// parsed descriptors in a shared [`DescriptorCatalog`] keyed by file stem.
pub struct DescriptorLoader {
    /// Descriptor root directory.
    root: PathBuf,
    /// Shared catalog, also updated by the watcher thread.
    catalog: Arc<DescriptorCatalog>,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl DescriptorLoader {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            catalog: Arc::new(DescriptorCatalog::default()),
            _watcher: None,
        }
    }

    /// Scan both descriptor directories and load every descriptor file.
    ///
    /// Missing directories are treated as empty. Dotfiles and files with the
    /// wrong extension are skipped. Parse errors are reported per-file but do
    /// not abort the scan.
    pub fn load_all(&self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        for kind in [DescriptorKind::Model, DescriptorKind::Rack] {
            let dir = self.root.join(kind.dir_name());
            if !dir.is_dir() {
                warn!(path = %dir.display(), "descriptor directory missing");
                continue;
            }
            self.scan_dir_recursive(kind, &dir, &mut results)?;
        }
        Ok(results)
    }

    fn scan_dir_recursive(
        &self,
        kind: DescriptorKind,
        dir: &Path,
        results: &mut Vec<LoadResult>,
    ) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            // Skip dotfiles/dotdirs
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(kind, &path, results)?;
                continue;
            }

            if !kind.accepts(&path) {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: format!("not a {} descriptor", kind),
                    },
                });
                continue;
            }

            let status = self.load_file(kind, &path);
            results.push(LoadResult { path, status });
        }

        Ok(())
    }

    /// Load one descriptor file into the catalog and report what happened.
    pub fn load_file(&self, kind: DescriptorKind, path: &Path) -> LoadStatus {
        let Some(id) = descriptor_id(path) else {
            return LoadStatus::Skipped {
                reason: "file name is not valid UTF-8".to_string(),
            };
        };

        match Descriptor::read(kind, path) {
            Ok(descriptor) => {
                info!(id = %id, kind = %kind, path = %path.display(), "loaded descriptor");
                self.catalog.insert(id.clone(), descriptor);
                LoadStatus::Loaded { kind, id }
            }
            Err(e) => {
                warn!(id = %id, kind = %kind, path = %path.display(), error = %e, "failed to load descriptor");
                let error = format!("Failed to load {}: {}", path.display(), e);
                if kind == DescriptorKind::Model {
                    self.catalog.record_model_error(id, error.clone());
                }
                LoadStatus::Failed { error }
            }
        }
    }

    /// Start a filesystem watcher over the descriptor root.
    ///
    /// On create/modify the descriptor is re-parsed and upserted; on delete it
    /// is removed. Parse errors are logged and the previous version is kept.
    pub fn watch(&mut self) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => handle_fs_event(&event, &catalog),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;

        let _ = watcher.configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(path = %self.root.display(), "watching descriptor directory for changes");
        self._watcher = Some(watcher);
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shared catalog, for callers that read descriptors from other threads.
    pub fn catalog(&self) -> Arc<DescriptorCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn rack(&self, id: &str) -> Result<RackConfig> {
        self.catalog.rack(id).ok_or_else(|| LoaderError::NotFound {
            kind: DescriptorKind::Rack,
            id: id.to_string(),
        })
    }

    pub fn model(&self, id: &str) -> Option<EquipmentModel> {
        self.catalog.model(id)
    }

    /// Error text of a model that failed to load.
    pub fn model_error(&self, id: &str) -> Option<String> {
        self.catalog.model_error(id)
    }

    pub fn model_status(&self, id: &str) -> ModelStatus {
        self.catalog.model_status(id)
    }
}

/// Descriptor id: the file name without its extension.
pub(super) fn descriptor_id(path: &Path) -> Option<String> {
    path.file_stem()?.to_str().map(str::to_string)
}
