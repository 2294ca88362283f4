//! File watching and the re-render consumer.
//!
//! Raw notify events are bridged onto a channel and consumed by a single
//! task that owns the watcher, debounces bursts, re-establishes the watch
//! when the path is replaced, and runs the re-render-and-notify sequence.
//! That task is the only writer to the document cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use mdlive_render::{DocumentCache, Renderer};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};

use super::debouncer::{ChangeDebouncer, ChangeKind};
use super::registry::SubscriberRegistry;
use crate::error::ServerError;

/// Debounce window for filesystem events.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// How often the consumer checks for a ready change.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Attempts to re-establish a watch after the path was replaced.
const REWATCH_ATTEMPTS: u32 = 10;

/// Delay between re-watch attempts.
const REWATCH_DELAY: Duration = Duration::from_millis(50);

/// Start watching `source` and spawn the re-render consumer task.
///
/// The returned receiver resolves if the consumer loses the watch for
/// good; the server treats that as fatal.
///
/// # Errors
///
/// Fails if the initial watch cannot be established.
pub(crate) fn spawn_watcher(
    source: PathBuf,
    document: DocumentCache,
    renderer: Arc<dyn Renderer>,
    registry: Arc<SubscriberRegistry>,
) -> Result<oneshot::Receiver<ServerError>, ServerError> {
    let (tx, rx) = mpsc::channel::<Event>(100);
    let (failure_tx, failure_rx) = oneshot::channel();

    // notify's callback is sync; bridge events onto the channel
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            let _ = tx.blocking_send(event);
        }
        Err(e) => tracing::warn!(error = %e, "Watch error"),
    })
    .map_err(|e| ServerError::Watch(source.clone(), e))?;

    watcher
        .watch(&source, RecursiveMode::NonRecursive)
        .map_err(|e| ServerError::Watch(source.clone(), e))?;

    tokio::spawn(run_consumer(
        watcher, rx, failure_tx, source, document, renderer, registry,
    ));

    Ok(failure_rx)
}

/// Consumer loop: debounce raw events, then re-render and notify.
///
/// Ends by reporting over `failure` if the watch cannot be re-established.
async fn run_consumer(
    mut watcher: RecommendedWatcher,
    mut rx: mpsc::Receiver<Event>,
    failure: oneshot::Sender<ServerError>,
    source: PathBuf,
    document: DocumentCache,
    renderer: Arc<dyn Renderer>,
    registry: Arc<SubscriberRegistry>,
) {
    let mut debouncer = ChangeDebouncer::new(DEBOUNCE);
    let mut interval = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            maybe = rx.recv() => {
                let Some(event) = maybe else { break };
                if let Some(kind) = classify(&event.kind) {
                    debouncer.record(kind);
                }
            }
            _ = interval.tick() => {
                let Some(change) = debouncer.take_ready() else { continue };
                tracing::info!(path = %source.display(), kind = ?change, "Source file changed");

                if matches!(change, ChangeKind::Removed | ChangeKind::Created) {
                    if let Err(e) = rewatch(&mut watcher, &source).await {
                        tracing::error!(path = %source.display(), error = %e, "Failed to re-establish watch");
                        let _ = failure.send(ServerError::Watch(source, e));
                        return;
                    }
                }

                apply_update(&source, renderer.as_ref(), &document, &registry);
            }
        }
    }
}

/// Map a raw notify event to a change on the watched file.
///
/// A rename detaches the watch from the path just like a remove does, so
/// both count as `Removed`. Metadata-only events (chmod, utime) carry no
/// content change and are ignored.
fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) | EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => Some(ChangeKind::Modified),
        _ => None,
    }
}

/// Re-establish the watch after the path was removed or replaced.
///
/// Editors that save via write-temp-and-rename leave the old watch
/// attached to a dead inode, so the path must be watched again. The new
/// file may not be in place yet when the event drains, hence the bounded
/// retries.
async fn rewatch(watcher: &mut RecommendedWatcher, source: &Path) -> Result<(), notify::Error> {
    let _ = watcher.unwatch(source);

    let mut attempt = 1;
    loop {
        match watcher.watch(source, RecursiveMode::NonRecursive) {
            Ok(()) => {
                tracing::debug!(path = %source.display(), attempt, "Watch re-established");
                return Ok(());
            }
            Err(e) if attempt >= REWATCH_ATTEMPTS => return Err(e),
            Err(e) => {
                tracing::debug!(path = %source.display(), attempt, error = %e, "Re-watch failed, retrying");
                tokio::time::sleep(REWATCH_DELAY).await;
                attempt += 1;
            }
        }
    }
}

/// Re-render the document and fan out reload notifications.
///
/// The cache is updated before any notification goes out, so a client that
/// reloads fetches the new content. A failed render leaves the previous
/// document in place and notifies nobody.
fn apply_update(
    source: &Path,
    renderer: &dyn Renderer,
    document: &DocumentCache,
    registry: &SubscriberRegistry,
) {
    match renderer.render_file(source) {
        Ok(html) => {
            document.store(html);
            let notified = registry.notify_all();
            tracing::info!(path = %source.display(), subscribers = notified, "Document updated");
        }
        Err(e) => {
            tracing::error!(error = %e, "Re-render failed, serving previous document");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::FakeRenderer;
    use mdlive_render::DocumentCache;
    use notify::event::{
        AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode,
    };
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_classify_content_write() {
        let kind = EventKind::Modify(ModifyKind::Data(DataChange::Any));
        assert_eq!(classify(&kind), Some(ChangeKind::Modified));
    }

    #[test]
    fn test_classify_unqualified_modify() {
        let kind = EventKind::Modify(ModifyKind::Any);
        assert_eq!(classify(&kind), Some(ChangeKind::Modified));
    }

    #[test]
    fn test_classify_ignores_metadata_change() {
        // chmod / touch -m must not trigger a re-render
        let kind = EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any));
        assert_eq!(classify(&kind), None);
    }

    #[test]
    fn test_classify_rename_counts_as_removed() {
        let kind = EventKind::Modify(ModifyKind::Name(RenameMode::Any));
        assert_eq!(classify(&kind), Some(ChangeKind::Removed));
    }

    #[test]
    fn test_classify_remove() {
        let kind = EventKind::Remove(RemoveKind::File);
        assert_eq!(classify(&kind), Some(ChangeKind::Removed));
    }

    #[test]
    fn test_classify_create() {
        let kind = EventKind::Create(CreateKind::File);
        assert_eq!(classify(&kind), Some(ChangeKind::Created));
    }

    #[test]
    fn test_classify_ignores_access() {
        let kind = EventKind::Access(AccessKind::Any);
        assert_eq!(classify(&kind), None);
    }

    #[tokio::test]
    async fn test_rewatch_gives_up_when_path_cannot_be_watched() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone").join("notes.md");

        let mut watcher = notify::recommended_watcher(|_res: notify::Result<Event>| {}).unwrap();

        assert!(rewatch(&mut watcher, &missing).await.is_err());
    }

    #[tokio::test]
    async fn test_rewatch_succeeds_once_path_exists() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "# hello").unwrap();

        let mut watcher = notify::recommended_watcher(|_res: notify::Result<Event>| {}).unwrap();

        assert!(rewatch(&mut watcher, file.path()).await.is_ok());
    }

    #[test]
    fn test_apply_update_stores_before_notifying() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "# changed").unwrap();

        let document = DocumentCache::new("<p>old</p>".to_owned());
        let registry = SubscriberRegistry::new();
        let (_id, mut rx) = registry.register();
        let renderer = FakeRenderer::ok("<p>new</p>");

        apply_update(file.path(), &renderer, &document, &registry);

        // Notification arrived, and the cache already held the new value.
        assert!(rx.try_recv().is_ok());
        assert_eq!(document.read().as_str(), "<p>new</p>");
    }

    #[test]
    fn test_failed_render_keeps_previous_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "# changed").unwrap();

        let document = DocumentCache::new("<p>old</p>".to_owned());
        let registry = SubscriberRegistry::new();
        let (_id, mut rx) = registry.register();
        let renderer = FakeRenderer::failing();

        apply_update(file.path(), &renderer, &document, &registry);

        assert_eq!(document.read().as_str(), "<p>old</p>");
        // No notification for a failed update
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unreadable_source_keeps_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.md");

        let document = DocumentCache::new("<p>old</p>".to_owned());
        let registry = SubscriberRegistry::new();
        let renderer = FakeRenderer::ok("<p>new</p>");

        apply_update(&missing, &renderer, &document, &registry);

        assert_eq!(document.read().as_str(), "<p>old</p>");
    }
}
