//! Headless rendering of a session's events into a bounded WebM clip.
//!
//! Grounded on the subprocess-driven model runner in
//! `examples/keerthanap8898-TextToVideoAPI`'s worker: spawn a child process,
//! feed it the job, and bound it with a hard timeout that kills the child on
//! expiry rather than leaving it to run unbounded.

use async_trait::async_trait;
use domain_retro_core::SessionEvent;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{ReplayError, ReplayResult};

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub webm: Vec<u8>,
    pub duration_ms: u64,
}

#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render_to_webm(
        &self,
        events: &[SessionEvent],
        viewport: Viewport,
        speed: f64,
        max_duration_ms: u64,
    ) -> ReplayResult<RenderOutcome>;
}

/// Bound on render wall-clock: `min(renderMaxDurationMs, ceil(timelineMs/speed)+1500)`.
pub fn render_budget_ms(timeline_ms: u64, speed: f64, render_max_duration_ms: u64) -> u64 {
    let speed = speed.max(0.01);
    let scaled = ((timeline_ms as f64) / speed).ceil() as u64 + 1_500;
    scaled.min(render_max_duration_ms)
}

/// Drives an external headless-rendering binary: events go in on stdin as
/// JSON, a WebM byte stream comes back on stdout.
pub struct SubprocessRenderer {
    command_path: String,
}

impl SubprocessRenderer {
    pub fn new(command_path: impl Into<String>) -> Self {
        Self { command_path: command_path.into() }
    }
}

#[async_trait]
impl Renderer for SubprocessRenderer {
    async fn render_to_webm(
        &self,
        events: &[SessionEvent],
        viewport: Viewport,
        speed: f64,
        max_duration_ms: u64,
    ) -> ReplayResult<RenderOutcome> {
        let timeline_ms = events.last().map(|e| e.timestamp_ms).unwrap_or(0).max(0) as u64;
        let budget_ms = render_budget_ms(timeline_ms, speed, max_duration_ms);

        let payload = serde_json::to_vec(events).map_err(|e| ReplayError::Render(e.to_string()))?;

        let mut child = Command::new(&self.command_path)
            .arg("--width")
            .arg(viewport.width.to_string())
            .arg("--height")
            .arg(viewport.height.to_string())
            .arg("--speed")
            .arg(speed.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReplayError::Render(format!("failed to spawn renderer: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await.map_err(|e| ReplayError::Render(format!("writing events to renderer: {e}")))?;
        }

        let output = tokio::time::timeout(Duration::from_millis(budget_ms), child.wait_with_output())
            .await
            .map_err(|_| ReplayError::Render(format!("renderer exceeded its {budget_ms}ms budget")))?
            .map_err(|e| ReplayError::Render(format!("renderer process error: {e}")))?;

        if !output.status.success() {
            return Err(ReplayError::Render(format!(
                "renderer exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Ok(RenderOutcome { webm: output.stdout, duration_ms: timeline_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_budget_caps_at_configured_max() {
        assert_eq!(render_budget_ms(10_000, 1.0, 60_000), 11_500);
        assert_eq!(render_budget_ms(1_000_000, 1.0, 60_000), 60_000);
    }

    #[test]
    fn render_budget_accounts_for_speed() {
        assert_eq!(render_budget_ms(10_000, 2.0, 60_000), 6_500);
    }
}
