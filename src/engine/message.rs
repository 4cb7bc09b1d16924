#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

#[cfg(feature = "rtrb")]
use crate::error::ScheduleError;

/// Start/stop request sent to a source from a non-render thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ScheduleRequest {
    Start { when: f64, duration: Option<f64> },
    Stop { when: f64 },
    Reset,
}

pub trait ScheduleReceiver: Send {
    fn pop(&mut self) -> Option<ScheduleRequest>;
}

#[cfg(feature = "rtrb")]
impl ScheduleReceiver for Consumer<ScheduleRequest> {
    fn pop(&mut self) -> Option<ScheduleRequest> {
        Consumer::pop(self).ok()
    }
}

/// Producer half of a schedule queue. Pushing never blocks; a full queue is
/// reported as [`ScheduleError::QueueFull`].
#[cfg(feature = "rtrb")]
pub struct ScheduleSender {
    tx: Producer<ScheduleRequest>,
}

#[cfg(feature = "rtrb")]
impl ScheduleSender {
    pub fn start(&mut self, when: f64) -> Result<(), ScheduleError> {
        self.push(ScheduleRequest::Start {
            when,
            duration: None,
        })
    }

    pub fn start_for(&mut self, when: f64, duration: f64) -> Result<(), ScheduleError> {
        self.push(ScheduleRequest::Start {
            when,
            duration: Some(duration),
        })
    }

    pub fn stop(&mut self, when: f64) -> Result<(), ScheduleError> {
        self.push(ScheduleRequest::Stop { when })
    }

    pub fn reset(&mut self) -> Result<(), ScheduleError> {
        self.push(ScheduleRequest::Reset)
    }

    pub fn push(&mut self, request: ScheduleRequest) -> Result<(), ScheduleError> {
        self.tx.push(request).map_err(|_| ScheduleError::QueueFull)
    }
}

#[cfg(feature = "rtrb")]
pub fn schedule_queue(capacity: usize) -> (ScheduleSender, Consumer<ScheduleRequest>) {
    let (tx, rx) = RingBuffer::new(capacity);
    (ScheduleSender { tx }, rx)
}
