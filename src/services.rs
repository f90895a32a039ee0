//! Collaborator ports consumed by the grid.
//!
//! The engine never talks to a UI, filesystem or thread pool directly. It is
//! handed these ports at construction; anything not supplied falls back to a
//! quiet default (see [`GridServices::default`]).

use crate::error::PersistenceError;
use crate::export::ExportJob;
use crate::notifications::ToastVariant;
use crate::storage::MemoryStore;
use crate::types::ExportFormat;
use std::path::PathBuf;
use std::sync::Arc;

/// Asks the user to confirm a destructive action.
pub trait Confirmation: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Confirms everything. For scripted hosts and the CLI.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoConfirm;

impl Confirmation for AutoConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Declines everything. The default when no confirmation surface exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclineAll;

impl Confirmation for DeclineAll {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!("No confirmation surface, declining: {}", message);
        false
    }
}

/// Shows a short, human-readable message to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, variant: ToastVariant);
}

/// Routes notifications to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, variant: ToastVariant) {
        match variant {
            ToastVariant::Error => tracing::error!("{}", message),
            ToastVariant::Warning => tracing::warn!("{}", message),
            ToastVariant::Success | ToastVariant::Info => tracing::info!("{}", message),
        }
    }
}

/// Durable string key-value storage for snapshots.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// Serialized export content ready to be handed to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveredFile {
    pub filename: String,
    pub content: String,
    pub mime: &'static str,
    pub format: ExportFormat,
}

/// Turns export content into a user-facing download or saved file.
pub trait FileDelivery: Send + Sync {
    fn deliver(&self, file: &DeliveredFile) -> std::io::Result<()>;
}

/// Logs and discards exports. Hosts that only listen for
/// `ExportCompleted` events need nothing more.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDelivery;

impl FileDelivery for LogDelivery {
    fn deliver(&self, file: &DeliveredFile) -> std::io::Result<()> {
        tracing::debug!(
            filename = %file.filename,
            bytes = file.content.len(),
            "Export ready (no delivery configured)"
        );
        Ok(())
    }
}

/// Writes exports into a directory.
#[derive(Clone, Debug)]
pub struct DirectoryDelivery {
    dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

impl FileDelivery for DirectoryDelivery {
    fn deliver(&self, file: &DeliveredFile) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&file.filename);
        std::fs::write(&path, &file.content)?;
        tracing::info!("Wrote export to {}", path.display());
        Ok(())
    }
}

/// Completion callback for an offloaded export: serialized content or an
/// error message.
pub type ExportCallback = Box<dyn FnOnce(Result<String, String>) + Send + 'static>;

/// Runs export serialization off the interaction thread.
pub trait TaskOffload: Send + Sync {
    fn submit(&self, job: ExportJob, on_complete: ExportCallback);
}

/// The ports a grid talks to.
#[derive(Clone)]
pub struct GridServices {
    pub confirmation: Arc<dyn Confirmation>,
    pub notifier: Arc<dyn Notifier>,
    pub store: Arc<dyn KeyValueStore>,
    pub delivery: Arc<dyn FileDelivery>,
    pub offload: Option<Arc<dyn TaskOffload>>,
}

impl Default for GridServices {
    fn default() -> Self {
        Self {
            confirmation: Arc::new(DeclineAll),
            notifier: Arc::new(LogNotifier),
            store: Arc::new(MemoryStore::new()),
            delivery: Arc::new(LogDelivery),
            offload: None,
        }
    }
}

impl std::fmt::Debug for GridServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridServices")
            .field("offload", &self.offload.is_some())
            .finish_non_exhaustive()
    }
}
