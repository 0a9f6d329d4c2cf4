//! Print transport adapters for submitting finished pages
//!
//! Supports:
//! - OS spooler submission (`lp` on Unix, ShellExecute "printto" on Windows)
//! - A staged web queue polled by a browser-side print trigger

use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Trait for print transports
///
/// A transport takes one finished, print-ready page and an opaque target
/// identifier (printer name or destination id, resolved by the caller).
/// Submission either fully succeeds or fails; the caller's retry loop is
/// the recovery mechanism, so a failed submit must leave no state behind.
#[async_trait]
pub trait PrintTransport: Send + Sync {
    /// Submit a single print-ready page to the target
    async fn submit(&self, page: &[u8], target: &str) -> PrintResult<()>;

    /// Check if the transport is ready to accept jobs
    async fn is_available(&self) -> bool;
}

/// OS spooler transport
///
/// Writes the page to a temp file and hands it to the platform spooler:
/// `lp -d <target>` on Unix, ShellExecuteW "printto" on Windows.
#[derive(Debug, Clone)]
pub struct SpoolerPrinter {
    timeout: Duration,
}

impl SpoolerPrinter {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(15),
        }
    }

    /// Set the spooler hand-off timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(not(windows))]
    async fn spool(&self, path: &std::path::Path, target: &str) -> PrintResult<()> {
        let mut cmd = tokio::process::Command::new("lp");
        if !target.is_empty() {
            cmd.arg("-d").arg(target);
        }
        cmd.arg(path);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| PrintError::Timeout(format!("lp timed out after {:?}", self.timeout)))?
            .map_err(PrintError::Io)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrintError::Spooler(format!(
                "lp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }

    #[cfg(windows)]
    async fn spool(&self, path: &std::path::Path, target: &str) -> PrintResult<()> {
        // ShellExecuteW is synchronous, run in a blocking task
        let path = path.to_path_buf();
        let target = target.to_string();

        let spool = tokio::task::spawn_blocking(move || Self::shell_print_to(&path, &target));

        tokio::time::timeout(self.timeout, spool)
            .await
            .map_err(|_| {
                PrintError::Timeout(format!("printto timed out after {:?}", self.timeout))
            })?
            .map_err(|e| PrintError::WindowsPrinter(format!("Task join failed: {}", e)))?
    }

    /// Invoke the "printto" verb for the file against a named printer
    #[cfg(windows)]
    fn shell_print_to(path: &std::path::Path, target: &str) -> PrintResult<()> {
        use windows::Win32::UI::Shell::ShellExecuteW;
        use windows::Win32::UI::WindowsAndMessaging::SW_HIDE;
        use windows::core::PCWSTR;

        fn to_wide(s: &str) -> Vec<u16> {
            s.encode_utf16().chain(std::iter::once(0)).collect()
        }

        let verb_w = to_wide("printto");
        let file_w = to_wide(&path.to_string_lossy());
        let params_w = to_wide(&format!("\"{}\"", target));

        let result = unsafe {
            ShellExecuteW(
                None,
                PCWSTR::from_raw(verb_w.as_ptr()),
                PCWSTR::from_raw(file_w.as_ptr()),
                PCWSTR::from_raw(params_w.as_ptr()),
                PCWSTR::null(),
                SW_HIDE,
            )
        };

        // Per the ShellExecute contract, values <= 32 are error codes
        if result.0 as isize <= 32 {
            return Err(PrintError::WindowsPrinter(format!(
                "ShellExecuteW printto failed with code {}",
                result.0 as isize
            )));
        }

        Ok(())
    }
}

impl Default for SpoolerPrinter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrintTransport for SpoolerPrinter {
    #[instrument(skip(self, page), fields(target = %target, page_len = page.len()))]
    async fn submit(&self, page: &[u8], target: &str) -> PrintResult<()> {
        let mut file = tempfile::Builder::new()
            .prefix("carton-page-")
            .suffix(".pdf")
            .tempfile()?;

        std::io::Write::write_all(&mut file, page)?;
        std::io::Write::flush(&mut file)?;

        info!("Handing page to spooler");
        self.spool(file.path(), target).await?;
        info!("Page accepted by spooler");

        // The temp file is removed on drop; the spooler has its own copy by
        // the time the command returns.
        Ok(())
    }

    async fn is_available(&self) -> bool {
        #[cfg(not(windows))]
        {
            match tokio::process::Command::new("lp")
                .arg("--help")
                .output()
                .await
            {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "lp not available");
                    false
                }
            }
        }
        #[cfg(windows)]
        {
            true
        }
    }
}

/// A page staged for a browser-side print trigger
#[derive(Debug, Clone)]
pub struct QueuedPage {
    /// Opaque destination identifier the page was submitted for
    pub target: String,
    /// The print-ready page bytes
    pub data: Vec<u8>,
}

/// Web print queue
///
/// Stages submitted pages in memory; a browser client polls them off and
/// invokes its own print dialog. This is the kiosk/popup printing mode:
/// the "printer" is whatever the operator's browser is configured to do.
#[derive(Debug, Clone, Default)]
pub struct WebPrintQueue {
    inner: Arc<Mutex<VecDeque<QueuedPage>>>,
}

impl WebPrintQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest staged page, if any
    pub fn take_next(&self) -> Option<QueuedPage> {
        self.inner.lock().ok()?.pop_front()
    }

    /// Number of staged pages
    pub fn len(&self) -> usize {
        self.inner.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PrintTransport for WebPrintQueue {
    #[instrument(skip(self, page), fields(target = %target, page_len = page.len()))]
    async fn submit(&self, page: &[u8], target: &str) -> PrintResult<()> {
        let mut queue = self
            .inner
            .lock()
            .map_err(|_| PrintError::Spooler("print queue poisoned".to_string()))?;

        queue.push_back(QueuedPage {
            target: target.to_string(),
            data: page.to_vec(),
        });

        info!(staged = queue.len(), "Page staged for browser print");
        Ok(())
    }

    async fn is_available(&self) -> bool {
        true
    }
}
