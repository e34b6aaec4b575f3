//! Launch detection
//!
//! gst-launch prints progress while it negotiates and prerolls the pipeline,
//! then goes silent once buffers flow. A pipeline is treated as launched
//! after its output stays quiet for [`LAUNCH_QUIET_PERIOD`].

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::oneshot;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

/// Silence required before a pipeline counts as launched
pub const LAUNCH_QUIET_PERIOD: Duration = Duration::from_millis(1200);

/// How a launch wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchSignal {
    /// The quiet period elapsed
    Quiet,
    /// The token was cancelled (or dropped) first
    Cancelled,
}

/// Cancellation side of a launch timer, owned by the recorder
#[derive(Debug)]
pub struct LaunchToken {
    cancel: Option<oneshot::Sender<()>>,
}

impl LaunchToken {
    /// Cancel the pending launch. Returns false if it already finished.
    pub fn cancel(&mut self) -> bool {
        self.cancel
            .take()
            .map(|tx| tx.send(()).is_ok())
            .unwrap_or(false)
    }
}

/// Waiting side of a launch timer, moved into the detection task
#[derive(Debug)]
pub struct LaunchTimer {
    cancelled: oneshot::Receiver<()>,
    quiet: Duration,
}

/// Create a single-shot launch timer
pub fn launch_timer(quiet: Duration) -> (LaunchToken, LaunchTimer) {
    let (tx, rx) = oneshot::channel();
    (
        LaunchToken { cancel: Some(tx) },
        LaunchTimer {
            cancelled: rx,
            quiet,
        },
    )
}

impl LaunchTimer {
    /// Wait until `output` has been silent for the quiet period.
    ///
    /// Every chunk read restarts the period. End of output does not end the
    /// wait; the period still has to run out.
    pub async fn wait<R>(mut self, output: &mut R) -> LaunchSignal
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = [0u8; 4096];
        let mut open = true;
        let timer = sleep(self.quiet);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = &mut timer => return LaunchSignal::Quiet,
                _ = &mut self.cancelled => return LaunchSignal::Cancelled,
                read = output.read(&mut buf), if open => match read {
                    Ok(0) | Err(_) => open = false,
                    Ok(n) => {
                        trace!(bytes = n, "pipeline output, restarting quiet period");
                        timer.as_mut().reset(Instant::now() + self.quiet);
                    }
                },
            }
        }
    }
}

/// Read `output` to the end, logging each line.
///
/// The child must never block on (or get SIGPIPE from) a full stdout while
/// it finalizes, so this keeps reading until it closes the stream.
pub async fn drain_output<R>(output: R)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(output);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => debug!(target: "gst", "{}", String::from_utf8_lossy(&line).trim_end()),
        }
    }
}
