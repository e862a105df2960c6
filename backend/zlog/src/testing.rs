//! Test doubles shared by the unit tests.

use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::exit::ExitHook;

/// In-memory console capture.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Records exit codes instead of terminating the test process.
#[derive(Debug, Default)]
pub struct RecordingExit(Mutex<Vec<i32>>);

impl RecordingExit {
    pub fn codes(&self) -> Vec<i32> {
        self.0.lock().unwrap().clone()
    }
}

impl ExitHook for RecordingExit {
    fn exit(&self, code: i32) {
        self.0.lock().unwrap().push(code);
    }
}
