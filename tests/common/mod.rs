#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use registry_spray_rs::report::StatusReporter;
use wiremock::MockServer;

/// In-memory sink so tests can read back what the reporter printed.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

pub fn reporter() -> (Arc<StatusReporter>, SharedBuf) {
    let buf = SharedBuf::default();
    (Arc::new(StatusReporter::new(Box::new(buf.clone()), false)), buf)
}

/// `host:port` of a mock registry, as it would appear in a target list.
pub fn target_of(server: &MockServer) -> String {
    server.address().to_string()
}
