//! Filesystem event handler for the notify watcher (hot-reload).

use std::path::Path;

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tracing::{info, warn};

use super::catalog::{Descriptor, DescriptorCatalog, DescriptorKind};
use super::core::descriptor_id;

/// Handle a single filesystem event from the notify watcher.
pub(super) fn handle_fs_event(event: &Event, catalog: &DescriptorCatalog) {
    for (index, path) in event.paths.iter().enumerate() {
        // Skip dotfiles (editor swap files, partial writes)
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                continue;
            }
        }

        let Some(kind) = DescriptorKind::for_path(path) else {
            continue;
        };
        if !kind.accepts(path) {
            continue;
        }
        let Some(id) = descriptor_id(path) else {
            continue;
        };

        if is_removal(&event.kind, index, path) {
            if catalog.remove(kind, &id) {
                info!(id = %id, kind = %kind, path = %path.display(), "removed descriptor after file deletion");
            }
            continue;
        }

        match &event.kind {
            EventKind::Create(CreateKind::File)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_)) => match Descriptor::read(kind, path) {
                Ok(descriptor) => {
                    info!(id = %id, kind = %kind, path = %path.display(), "hot-reloaded descriptor");
                    catalog.insert(id, descriptor);
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to parse descriptor during hot-reload, keeping previous version"
                    );
                    if kind == DescriptorKind::Model {
                        catalog.record_model_error(id, format!("Failed to load {}: {}", path.display(), e));
                    }
                }
            },
            _ => {}
        }
    }
}

/// Deletions, and the old path of a rename (the first path of a `Both`
/// event). Renames the backend cannot classify count as removals when the
/// path is gone.
fn is_removal(kind: &EventKind, index: usize, path: &Path) -> bool {
    match kind {
        EventKind::Remove(RemoveKind::File) => true,
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => true,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => index == 0,
        EventKind::Modify(ModifyKind::Name(_)) => !path.exists(),
        _ => false,
    }
}
