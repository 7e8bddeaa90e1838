//! Debug side channel: raw member pages dumped to local files.

use std::fs;
use std::path::PathBuf;

/// Sink for raw page bodies, fed one page at a time by the paginator.
pub trait PageSink {
    fn record(&mut self, page: usize, body: &[u8]);
}

/// Discards everything; used when debug mode is off.
pub struct NullSink;

impl PageSink for NullSink {
    fn record(&mut self, _page: usize, _body: &[u8]) {}
}

/// Writes each page to `<dir>/page-<N>.json`. A write failure is logged as a
/// warning and does not abort the run.
pub struct FilePageDump {
    dir: PathBuf,
}

impl FilePageDump {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl PageSink for FilePageDump {
    fn record(&mut self, page: usize, body: &[u8]) {
        let path = self.dir.join(format!("page-{}.json", page));
        tracing::info!(path = %path.display(), "writing raw member page");
        if let Err(e) = fs::write(&path, body) {
            tracing::warn!(path = %path.display(), error = %e, "failed to write raw member page");
        }
    }
}
