use crate::{
    engine::message::{ScheduleReceiver, ScheduleRequest},
    error::ScheduleError,
};

/*
Sample-Accurate Block Scheduling
================================

A source node renders in fixed blocks, but its start and stop times are
arbitrary points on the render clock. Each block the scheduler answers one
question: which frames of this block should make sound?

  block:        |0 1 2 3 4 5 6 7 8 9 ...                  frames-1|
  start = 3.4:         ^ offset = round(3.4) = 3
  stop  = 9.6:                     ^ end = round(9.6) = 10 (exclusive)

  range = [offset, end) = [3, 10), length 7

Offsets are computed in seconds relative to the block start and rounded to
the nearest frame:

    offset = round((start_time - block_start_time) * sample_rate)
    end    = round((stop_time  - block_start_time) * sample_rate)

The start frame is inclusive (it plays); the stop frame is exclusive.

States
------

    Unscheduled --start--> Scheduled --block reaches start--> Playing
                                |                               |
                                +------ stop reached -----------+--> Finished

Finished is terminal until `reset`. Requests arriving from other threads go
through a `ScheduleReceiver` and are applied only by `apply_pending`, which
the node calls at the top of a block, so a block never sees a torn schedule.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    Unscheduled,
    Scheduled,
    Playing,
    Finished,
}

/// Frames of a block that must carry sound: `[offset, offset + length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderRange {
    pub offset: usize,
    pub length: usize,
}

impl RenderRange {
    pub const SILENT: Self = Self {
        offset: 0,
        length: 0,
    };

    pub fn is_silent(&self) -> bool {
        self.length == 0
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

pub struct RenderBlockScheduler {
    state: ScheduleState,
    start_time: f64,
    stop_time: Option<f64>,
    elapsed: f64,

    // Off-thread requests, drained at block boundaries
    requests: Option<Box<dyn ScheduleReceiver>>,
    last_rejection: Option<ScheduleError>,
    rejected_requests: u32,
    reset_requested: bool,
}

impl Default for RenderBlockScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBlockScheduler {
    pub fn new() -> Self {
        Self {
            state: ScheduleState::Unscheduled,
            start_time: 0.0,
            stop_time: None,
            elapsed: 0.0,
            requests: None,
            last_rejection: None,
            rejected_requests: 0,
            reset_requested: false,
        }
    }

    /// Scheduler paired with a lock-free request queue. The sender may be
    /// moved to any thread.
    #[cfg(feature = "rtrb")]
    pub fn with_queue(capacity: usize) -> (Self, crate::engine::message::ScheduleSender) {
        let (tx, rx) = crate::engine::message::schedule_queue(capacity);
        let mut scheduler = Self::new();
        scheduler.attach_receiver(Box::new(rx));
        (scheduler, tx)
    }

    pub fn attach_receiver(&mut self, receiver: Box<dyn ScheduleReceiver>) {
        self.requests = Some(receiver);
    }

    /// Schedule playback from `when` (seconds on the render clock).
    pub fn start(&mut self, when: f64) -> Result<(), ScheduleError> {
        self.schedule(when, None)
    }

    /// Schedule playback from `when` for `duration` seconds.
    pub fn start_for(&mut self, when: f64, duration: f64) -> Result<(), ScheduleError> {
        check_time(duration)?;
        self.schedule(when, Some(duration))
    }

    fn schedule(&mut self, when: f64, duration: Option<f64>) -> Result<(), ScheduleError> {
        check_time(when)?;
        match self.state {
            ScheduleState::Finished => Err(ScheduleError::AlreadyFinished),
            ScheduleState::Playing => {
                // Already sounding: only the stop boundary moves.
                if let Some(duration) = duration {
                    self.stop_time = Some(when + duration);
                }
                Ok(())
            }
            ScheduleState::Unscheduled | ScheduleState::Scheduled => {
                // A pending stop survives a restart without a duration
                let stop_time = match duration {
                    Some(duration) => Some(when + duration),
                    None => self.stop_time,
                };
                if let Some(stop) = stop_time {
                    if stop < when {
                        return Err(ScheduleError::InvalidOrdering { start: when, stop });
                    }
                }

                self.start_time = when;
                self.stop_time = stop_time;
                self.state = ScheduleState::Scheduled;
                Ok(())
            }
        }
    }

    /// Stop playback at `when`. The frame at `when` is the first silent one.
    pub fn stop(&mut self, when: f64) -> Result<(), ScheduleError> {
        check_time(when)?;
        match self.state {
            ScheduleState::Finished => Err(ScheduleError::AlreadyFinished),
            ScheduleState::Unscheduled => Err(ScheduleError::NotScheduled),
            ScheduleState::Scheduled | ScheduleState::Playing if when < self.start_time => {
                Err(ScheduleError::InvalidOrdering {
                    start: self.start_time,
                    stop: when,
                })
            }
            ScheduleState::Scheduled | ScheduleState::Playing => {
                self.stop_time = Some(when);
                Ok(())
            }
        }
    }

    /// Return to `Unscheduled`, forgetting times and elapsed playback.
    pub fn reset(&mut self) {
        self.state = ScheduleState::Unscheduled;
        self.start_time = 0.0;
        self.stop_time = None;
        self.elapsed = 0.0;
    }

    /// Apply queued off-thread requests. Call only at a block boundary.
    ///
    /// Rejected requests are recorded rather than returned; this runs on the
    /// render thread.
    pub fn apply_pending(&mut self) {
        let Some(mut requests) = self.requests.take() else {
            return;
        };

        while let Some(request) = requests.pop() {
            let result = match request {
                ScheduleRequest::Start {
                    when,
                    duration: None,
                } => self.start(when),
                ScheduleRequest::Start {
                    when,
                    duration: Some(duration),
                } => self.start_for(when, duration),
                ScheduleRequest::Stop { when } => self.stop(when),
                ScheduleRequest::Reset => {
                    self.reset();
                    self.reset_requested = true;
                    Ok(())
                }
            };

            if let Err(err) = result {
                self.last_rejection = Some(err);
                self.rejected_requests = self.rejected_requests.saturating_add(1);
            }
        }

        self.requests = Some(requests);
    }

    /// Work out which frames of the block starting at `block_start_time`
    /// should sound, advancing the state machine.
    pub fn compute_render_range(
        &mut self,
        block_start_time: f64,
        block_frame_count: usize,
        sample_rate: f32,
    ) -> RenderRange {
        let sample_rate = sample_rate as f64;
        let frames = block_frame_count as i64;

        if let Some(stop) = self.stop_time {
            if self.state != ScheduleState::Unscheduled
                && frame_offset(block_start_time, stop, sample_rate) <= 0
            {
                self.state = ScheduleState::Finished;
            }
        }

        if matches!(
            self.state,
            ScheduleState::Unscheduled | ScheduleState::Finished
        ) {
            return RenderRange::SILENT;
        }

        let start = frame_offset(block_start_time, self.start_time, sample_rate);
        if start >= frames {
            return RenderRange::SILENT;
        }

        self.state = ScheduleState::Playing;
        let offset = start.clamp(0, frames) as usize;

        let mut end = block_frame_count;
        if let Some(stop) = self.stop_time {
            let stop = frame_offset(block_start_time, stop, sample_rate);
            if stop < frames {
                end = stop.max(0) as usize;
                self.state = ScheduleState::Finished;
            }
        }

        RenderRange {
            offset,
            length: end.saturating_sub(offset),
        }
    }

    /// Account for a rendered (non-silent) block.
    pub fn advance(&mut self, frames: usize, sample_rate: f32) {
        self.elapsed += frames as f64 / sample_rate as f64;
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.stop_time
    }

    /// Seconds of audio rendered since the last reset.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_playing_or_scheduled(&self) -> bool {
        matches!(
            self.state,
            ScheduleState::Scheduled | ScheduleState::Playing
        )
    }

    pub fn has_finished(&self) -> bool {
        self.state == ScheduleState::Finished
    }

    /// True once after a queued `Reset` was applied, so the owning node can
    /// clear its generator state too.
    pub fn take_reset_request(&mut self) -> bool {
        std::mem::take(&mut self.reset_requested)
    }

    pub fn last_rejection(&self) -> Option<ScheduleError> {
        self.last_rejection
    }

    pub fn rejected_requests(&self) -> u32 {
        self.rejected_requests
    }
}

fn check_time(time: f64) -> Result<(), ScheduleError> {
    if time.is_finite() && time >= 0.0 {
        Ok(())
    } else {
        Err(ScheduleError::InvalidTime(time))
    }
}

#[inline]
fn frame_offset(block_start_time: f64, time: f64, sample_rate: f64) -> i64 {
    ((time - block_start_time) * sample_rate).round() as i64
}
