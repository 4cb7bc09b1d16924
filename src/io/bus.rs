use std::ops::Range;

/// Multi-channel block of samples, one contiguous run per channel.
///
/// The bus is allocated by whoever owns the node output; nodes only write
/// into it. The silent flag lets downstream stages skip known-zero audio.
#[derive(Debug, Clone)]
pub struct AudioBus {
    channels: Vec<Vec<f32>>,
    length: usize,
    sample_rate: f32,
    silent: bool,
}

impl AudioBus {
    /// Zeroed bus with `channels` channels of `length` frames.
    pub fn new(channels: usize, length: usize, sample_rate: f32) -> Self {
        Self {
            channels: vec![vec![0.0; length]; channels],
            length,
            sample_rate,
            silent: true,
        }
    }

    /// Wrap existing channel data. Channels shorter than the longest one are
    /// zero-padded.
    pub fn from_channels(mut channels: Vec<Vec<f32>>, sample_rate: f32) -> Self {
        let length = channels.iter().map(Vec::len).max().unwrap_or(0);
        for channel in &mut channels {
            channel.resize(length, 0.0);
        }
        Self {
            channels,
            length,
            sample_rate,
            silent: false,
        }
    }

    pub fn number_of_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        self.channels.get_mut(index).map(Vec::as_mut_slice)
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.channels.iter_mut().map(Vec::as_mut_slice)
    }

    /// Zero every channel and mark the bus silent.
    pub fn zero(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
        self.silent = true;
    }

    /// Zero `frames` in every channel without touching the silent flag.
    pub fn zero_range(&mut self, frames: Range<usize>) {
        let end = frames.end.min(self.length);
        let start = frames.start.min(end);
        for channel in &mut self.channels {
            channel[start..end].fill(0.0);
        }
    }

    /// Copy `frames` of channel `from` into channel `to`.
    pub fn copy_channel_range(&mut self, from: usize, to: usize, frames: Range<usize>) {
        let count = self.channels.len();
        if from == to || from >= count || to >= count {
            return;
        }
        let end = frames.end.min(self.length);
        let start = frames.start.min(end);

        let (src, dst) = if from < to {
            let (head, tail) = self.channels.split_at_mut(to);
            (&head[from], &mut tail[0])
        } else {
            let (head, tail) = self.channels.split_at_mut(from);
            (&tail[0], &mut head[to])
        };
        dst[start..end].copy_from_slice(&src[start..end]);
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn clear_silent_flag(&mut self) {
        self.silent = false;
    }

    /// Add `other` into this bus over the shared length. A mono `other` is
    /// added to every channel; otherwise channels pair up by index.
    pub fn sum_from(&mut self, other: &AudioBus) {
        if other.is_silent() {
            return;
        }
        for (index, dst) in self.channels.iter_mut().enumerate() {
            let src = match other.channels.len() {
                1 => &other.channels[0],
                _ => match other.channels.get(index) {
                    Some(src) => src,
                    None => break,
                },
            };
            for (d, s) in dst.iter_mut().zip(src) {
                *d += s;
            }
        }
        self.silent = false;
    }

    /// Interleave up to `frames` frames into `out` (`frames * out_channels`
    /// samples). Missing source channels repeat the last one.
    pub fn interleave_into(&self, out: &mut [f32], out_channels: usize) {
        if out_channels == 0 {
            return;
        }
        for (frame_idx, frame) in out.chunks_mut(out_channels).enumerate() {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let src = ch.min(self.channels.len().saturating_sub(1));
                *sample = self
                    .channels
                    .get(src)
                    .and_then(|c| c.get(frame_idx))
                    .copied()
                    .unwrap_or(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bus_is_silent_and_zeroed() {
        let bus = AudioBus::new(2, 64, 48_000.0);
        assert!(bus.is_silent());
        assert_eq!(bus.number_of_channels(), 2);
        assert!(bus.channel(1).unwrap().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn zero_range_leaves_other_frames() {
        let mut bus = AudioBus::from_channels(vec![vec![1.0; 8]], 48_000.0);
        bus.zero_range(2..5);
        assert_eq!(bus.channel(0).unwrap(), &[1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert!(!bus.is_silent());
    }

    #[test]
    fn copies_between_channels() {
        let mut bus = AudioBus::from_channels(vec![vec![1.0, 2.0, 3.0], vec![0.0; 3]], 48_000.0);
        bus.copy_channel_range(0, 1, 1..3);
        assert_eq!(bus.channel(1).unwrap(), &[0.0, 2.0, 3.0]);
    }

    #[test]
    fn mono_sums_into_every_channel() {
        let mut bus = AudioBus::new(2, 2, 48_000.0);
        bus.sum_from(&AudioBus::from_channels(vec![vec![0.5, 0.25]], 48_000.0));
        assert_eq!(bus.channel(1).unwrap(), &[0.5, 0.25]);
        assert!(!bus.is_silent());
    }

    #[test]
    fn interleave_duplicates_mono() {
        let bus = AudioBus::from_channels(vec![vec![0.25, 0.5]], 48_000.0);
        let mut out = [0.0f32; 4];
        bus.interleave_into(&mut out, 2);
        assert_eq!(out, [0.25, 0.25, 0.5, 0.5]);
    }
}
