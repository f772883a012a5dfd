//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use vhdlformat::{BeautifierSettings, CommandOptions, FormatError, Reporter};

/// Cloneable in-memory sink for capturing reporter output
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reporter plus handles on what it wrote to stdout and stderr
pub fn capture(options: &CommandOptions) -> (Reporter, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let reporter = Reporter::with_writers(out.clone(), err.clone(), options);
    (reporter, out, err)
}

/// Write `files` into `dir` and return their paths in the same order
pub fn write_files(dir: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, contents)| {
            let path = dir.join(name);
            fs::write(&path, contents).unwrap();
            path
        })
        .collect()
}

/// Uppercases its input; rejects any input containing `BROKEN`
pub fn sentinel_stub(input: &str, _: &BeautifierSettings) -> Result<String, FormatError> {
    if input.contains("BROKEN") {
        return Err(FormatError::new("sentinel rejected"));
    }
    Ok(input.to_uppercase())
}
