//! Background image loading on worker threads

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use flume::{Receiver, Sender};
use log::{debug, warn};

use super::prefetch::{ImageLoader, ImageRequest, LoadError, LoadTicket};

/// Resolves one request to a finished image, blocking the calling worker
pub type Resolver = Arc<dyn Fn(&ImageRequest) -> Result<(), LoadError> + Send + Sync>;

struct Job {
    request: ImageRequest,
    ticket: LoadTicket,
}

/// [`ImageLoader`] that hands requests to a pool of worker threads.
///
/// Requests are served in the order they were issued, which puts the
/// displayed leaves ahead of their neighbours. Dropping the loader lets the
/// workers finish what was already queued and joins them.
pub struct ThreadedLoader {
    request_tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    dispatched: usize,
}

impl ThreadedLoader {
    pub fn new(num_workers: usize, resolver: Resolver) -> Self {
        // flume receivers are cloneable, so every worker pulls from one queue
        let (request_tx, request_rx) = flume::unbounded();

        let workers = (0..num_workers.max(1))
            .map(|id| {
                let rx = request_rx.clone();
                let resolver = resolver.clone();
                std::thread::spawn(move || load_worker(id, &rx, &resolver))
            })
            .collect();

        Self {
            request_tx: Some(request_tx),
            workers,
            dispatched: 0,
        }
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Requests handed to the workers so far
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }
}

impl ImageLoader for ThreadedLoader {
    fn load(&mut self, request: ImageRequest, ticket: LoadTicket) {
        let Some(tx) = self.request_tx.as_ref() else {
            ticket.complete(Err(LoadError::Disconnected));
            return;
        };
        match tx.send(Job { request, ticket }) {
            Ok(()) => self.dispatched += 1,
            Err(flume::SendError(job)) => job.ticket.complete(Err(LoadError::Disconnected)),
        }
    }
}

impl Drop for ThreadedLoader {
    fn drop(&mut self) {
        self.request_tx.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("Image worker panicked");
            }
        }
    }
}

fn load_worker(id: usize, rx: &Receiver<Job>, resolver: &Resolver) {
    debug!("Image worker {id} started");
    while let Ok(job) = rx.recv() {
        let outcome = resolver(&job.request);
        if let Err(e) = &outcome {
            debug!("worker {id}: page {} failed: {e}", job.request.index);
        }
        job.ticket.complete(outcome);
    }
    debug!("Image worker {id} stopped");
}

/// Resolves `file://` and plain-path URIs against a root directory by reading
/// the image header
#[derive(Debug, Clone)]
pub struct FileResolver {
    root: PathBuf,
}

impl FileResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, uri: &str) -> PathBuf {
        let stripped = uri.strip_prefix("file://").unwrap_or(uri);
        let path = Path::new(stripped);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Pixel size of the image behind `request`
    pub fn resolve(&self, request: &ImageRequest) -> Result<(usize, usize), LoadError> {
        let path = self.path_for(&request.uri);
        if !path.is_file() {
            return Err(LoadError::NotFound(request.uri.clone()));
        }
        let size = imagesize::size(&path).map_err(|e| LoadError::Undecodable {
            uri: request.uri.clone(),
            detail: e.to_string(),
        })?;
        Ok((size.width, size.height))
    }

    pub fn into_resolver(self) -> Resolver {
        Arc::new(move |request| self.resolve(request).map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Book, PageProgression, PageRecord};
    use crate::spread::prefetch::{PrefetchScheduler, RequestKind};

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        bytes
    }

    fn request(uri: &str) -> ImageRequest {
        ImageRequest {
            index: 0,
            uri: uri.to_string(),
            reduce: 1.0,
            kind: RequestKind::Display,
        }
    }

    fn book(uris: &[&str]) -> Book {
        let data = uris
            .iter()
            .map(|uri| {
                vec![PageRecord {
                    width: 100,
                    height: 150,
                    uri: uri.to_string(),
                    page_num: None,
                    viewable: true,
                    page_side: None,
                }]
            })
            .collect();
        Book::from_spreads(data, PageProgression::Lr).unwrap()
    }

    #[test]
    fn file_resolver_reads_image_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.png"), png_header(640, 960)).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();
        let resolver = FileResolver::new(dir.path());

        assert_eq!(resolver.resolve(&request("page.png")), Ok((640, 960)));
        assert_eq!(resolver.resolve(&request("file://page.png")), Ok((640, 960)));
        assert_eq!(
            resolver.resolve(&request("missing.png")),
            Err(LoadError::NotFound("missing.png".to_string()))
        );
        assert!(matches!(
            resolver.resolve(&request("notes.txt")),
            Err(LoadError::Undecodable { .. })
        ));
    }

    #[test]
    fn workers_report_every_request() {
        let mut book = book(&["a", "b", "c", "d"]);
        let mut scheduler = PrefetchScheduler::new(2);
        let resolver: Resolver = Arc::new(|request: &ImageRequest| {
            if request.uri == "c" {
                Err(LoadError::NotFound(request.uri.clone()))
            } else {
                Ok(())
            }
        });
        let mut loader = ThreadedLoader::new(2, resolver);
        assert_eq!(loader.num_workers(), 2);

        assert!(scheduler.request_display(&mut book, 0, 1.0, &mut loader));
        for index in 1..4 {
            assert!(scheduler.prefetch_img(&mut book, index, 1.0, &mut loader));
        }
        assert_eq!(loader.dispatched(), 4);
        // joins the workers after the queue drains
        drop(loader);

        let mut events = scheduler.drain_completions();
        events.sort_by_key(|e| e.index);
        assert_eq!(events.len(), 4);
        assert!(events[2].outcome.is_err());
        assert!(events.iter().filter(|e| e.index != 2).all(|e| e.outcome.is_ok()));
    }
}
