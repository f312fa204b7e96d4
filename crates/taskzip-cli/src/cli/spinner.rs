//! Stderr spinner shown between `Started` and `Finished`.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use taskzip_core::pipeline::RunSignal;
use tokio::sync::mpsc::UnboundedReceiver;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const TICK: Duration = Duration::from_millis(120);

/// Runs until `Finished` arrives or the sender is dropped.
pub async fn spin(mut signals: UnboundedReceiver<RunSignal>) {
    match signals.recv().await {
        Some(RunSignal::Started) => {}
        _ => return,
    }
    let draw = io::stderr().is_terminal();
    let mut ticker = tokio::time::interval(TICK);
    let mut frame = 0usize;
    loop {
        tokio::select! {
            signal = signals.recv() => {
                if matches!(signal, Some(RunSignal::Finished) | None) {
                    break;
                }
            }
            _ = ticker.tick() => {
                if draw {
                    eprint!("\r{} Fetching attachments...", FRAMES[frame % FRAMES.len()]);
                    let _ = io::stderr().flush();
                }
                frame += 1;
            }
        }
    }
    if draw {
        eprint!("\r{:width$}\r", "", width = 32);
        let _ = io::stderr().flush();
    }
}
