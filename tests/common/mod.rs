//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod mock;

pub use self::mock::{MockHostingClient, MockRepo};

use repol::hosting::RepositoryStub;
use repol::inventory::OrganizationSnapshot;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Builds a stub with GitHub-style URLs for `acme/<name>`
pub fn stub(name: &str) -> RepositoryStub {
    RepositoryStub {
        name: name.to_string(),
        git_url: format!("git://github.com/acme/{name}.git"),
        clone_url: format!("https://github.com/acme/{name}.git"),
    }
}

/// Keys the snapshot by repository name; record order is not deterministic
pub fn by_name(snapshot: &OrganizationSnapshot) -> HashMap<String, Vec<String>> {
    snapshot
        .repos
        .iter()
        .map(|record| (record.name.clone(), record.branches.clone()))
        .collect()
}

/// Shared buffer that a test subscriber formats log lines into
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
