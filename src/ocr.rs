// OCR bridge
// Runs the external recognizer on a receipt image and parses the single
// structured receipt it prints

use crate::receipt::RawReceipt;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Invokes the external OCR script that turns a receipt image into one
/// structured receipt on stdout. The call is synchronous: it blocks until
/// the recognizer exits and returns exactly one receipt or an error.
#[derive(Debug, Clone)]
pub struct OcrEngine {
    program: String,
    script: PathBuf,
}

impl OcrEngine {
    /// Engine running `script` with the default interpreter.
    pub fn new(script: impl Into<PathBuf>) -> Self {
        OcrEngine {
            program: "python3".to_string(),
            script: script.into(),
        }
    }

    /// Builder pattern: override the interpreter.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Recognize one receipt image. The recognizer is expected to print a
    /// single JSON receipt; anything else is an error, and the caller
    /// decides whether the result ever reaches a store.
    pub fn scan(&self, image: &Path) -> Result<RawReceipt> {
        let output = Command::new(&self.program)
            .arg("-u")
            .arg(&self.script)
            .arg(image)
            .output()
            .with_context(|| {
                format!(
                    "failed to run OCR command: {} {}",
                    self.program,
                    self.script.display()
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("OCR exited with {}: {}", output.status, stderr.trim());
        }

        let receipt: RawReceipt = serde_json::from_slice(&output.stdout)
            .context("OCR produced unparseable receipt JSON")?;
        Ok(receipt)
    }
}

// ============================================================================
// TESTS
// ============================================================================
