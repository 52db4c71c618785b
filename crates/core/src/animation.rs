//! Hue cycling animation loop.

use core::future::Future;

use rand::Rng;
use tokio::time::{sleep, Instant};

use crate::{proto::CommandFrame, session::Session, CycleConfig, CycleState, Result, Transport};

/// Statistics of the finished animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSummary {
    /// Total number of frames written to the bulb.
    pub frames_sent: u64,
    /// Hue of the last frame.
    pub last_hue: f64,
}

/// Drives the bulb through the configured hue cycle.
pub struct Animator<R> {
    config: CycleConfig,
    nonce_source: R,
}

impl<R: Rng> Animator<R> {
    pub fn new(config: CycleConfig, nonce_source: R) -> Self {
        Self {
            config,
            nonce_source,
        }
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Runs the animation until the `cancel` future completes.
    ///
    /// Every tick computes the next color, sends it and then sleeps for the tick
    /// interval. Cancellation is observed before and during the sleep, an in-flight send
    /// is always completed. The session is left connected so the caller can close it.
    /// A failed send stops the animation.
    pub async fn run<T, C>(
        &mut self,
        session: &mut Session<T>,
        cancel: C,
    ) -> Result<AnimationSummary>
    where
        T: Transport,
        C: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let mut state = CycleState::new(&self.config, Instant::now());
        let mut summary = AnimationSummary {
            frames_sent: 0,
            last_hue: state.hue(),
        };

        log::info!(
            "Cycling hues {}..{} every {:?}",
            self.config.hue_min(),
            self.config.hue_max(),
            self.config.cycle_duration()
        );
        loop {
            state = state.advance(&self.config, Instant::now());
            let color = self.config.color_at(state.hue());
            let frame = CommandFrame::encode(color, &mut self.nonce_source);

            // The send is bounded by the transport, cancelling it could leave a
            // half-written command in the session.
            session.send_frame(&frame).await?;
            summary.frames_sent += 1;
            summary.last_hue = state.hue();

            tokio::select! {
                biased;
                () = &mut cancel => break,
                () = sleep(self.config.tick_interval()) => {}
            }
        }

        log::debug!("Animation stopped after {} frames", summary.frames_sent);
        Ok(summary)
    }
}
