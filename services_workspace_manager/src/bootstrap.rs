//! Backend construction from settings

use services_settings::BackendSettings;
use services_storage::{seed_demo_data, LocalDirBackend, MemoryBackend, StorageBackend, StorageResult};
use std::sync::Arc;
use tracing::info;

/// Opens the backend a configuration names
///
/// A memory backend with `seed_demo` is filled with sample content; the
/// seed is skipped for stores that already hold objects.
pub async fn open_backend(settings: &BackendSettings) -> StorageResult<Arc<dyn StorageBackend>> {
    match settings {
        BackendSettings::Memory { seed_demo } => {
            let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
            if *seed_demo {
                let written = seed_demo_data(backend.as_ref()).await?;
                info!(objects = written, "memory backend seeded");
            }
            Ok(backend)
        }
        BackendSettings::LocalDir { root } => {
            let backend = LocalDirBackend::open(root.clone()).await?;
            info!(root = %root.display(), "local directory backend opened");
            Ok(Arc::new(backend))
        }
    }
}
