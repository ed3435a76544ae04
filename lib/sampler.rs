use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicUsize, Ordering};

use heapless::Vec;

use crate::hw::{DownCounter, OneShotAdc, ProfilePin};

/// Derives the time between two consecutive readings of a down-counter.
///
/// The very first call has no real previous reading (it starts at zero), so
/// the first elapsed value is not meaningful.
///
/// The difference is taken modulo the reload period `max + 1`, which need not
/// be a power of two. That is exact when the counter reloaded at most once
/// between two readings, anything longer can not be told apart and is not
/// corrected.
pub struct ElapsedTracker {
    previous: u32,
    max: u32,
    primed: bool,
    wrapped: bool,
}

impl ElapsedTracker {
    pub const fn new(max: u32) -> Self {
        ElapsedTracker {
            previous: 0,
            max,
            primed: false,
            wrapped: false,
        }
    }

    /// Returns ticks since the previous call and remembers `now`. Must be
    /// called once per capture, in capture order.
    pub fn track(&mut self, now: u32) -> u32 {
        let elapsed = if now <= self.previous {
            self.previous - now
        } else {
            // Down to zero, reload to `max`, then down to `now`
            let ticks = u64::from(self.previous) + u64::from(self.max.saturating_sub(now)) + 1;
            ticks.min(u64::from(u32::MAX)) as u32
        };
        self.wrapped = self.primed && now > self.previous;
        self.previous = now;
        self.primed = true;
        elapsed
    }

    /// True when the counter reloaded between the last two readings.
    pub fn wrapped(&self) -> bool {
        self.wrapped
    }
}

/// Samples and the elapsed ticks before each of them.
pub struct Capture<const N: usize> {
    samples: Vec<u16, N>,
    elapsed: Vec<u32, N>,
}

impl<const N: usize> Capture<N> {
    pub const fn new() -> Self {
        Capture {
            samples: Vec::new(),
            elapsed: Vec::new(),
        }
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// Entry `i` is the tick count between capture `i - 1` and capture `i`,
    /// entry 0 is not meaningful.
    pub fn elapsed(&self) -> &[u32] {
        &self.elapsed
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == N
    }

    fn push(&mut self, sample: u16, elapsed: u32) -> bool {
        if self.samples.push(sample).is_err() {
            return false;
        }
        // Both vectors always have the same length
        self.elapsed.push(elapsed).is_ok()
    }
}

impl<const N: usize> Default for Capture<N> {
    fn default() -> Self {
        Capture::new()
    }
}

/// One-shot "capture finished" flag shared between the sampling interrupt and
/// the main flow.
pub struct Completion(AtomicBool);

impl Completion {
    pub const fn new() -> Self {
        Completion(AtomicBool::new(false))
    }

    fn signal(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Once this returns true the capture buffer is no longer written.
    pub fn is_complete(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for Completion {
    fn default() -> Self {
        Completion::new()
    }
}

/// Latest values for inspection with a debug probe. Each field is updated on
/// its own so readers may see values from different captures.
pub struct Readouts {
    value: AtomicU16,
    elapsed: AtomicU32,
    index: AtomicUsize,
}

impl Readouts {
    pub const fn new() -> Self {
        Readouts {
            value: AtomicU16::new(0),
            elapsed: AtomicU32::new(0),
            index: AtomicUsize::new(0),
        }
    }

    pub fn value(&self) -> u16 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed.load(Ordering::Relaxed)
    }

    pub fn index(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }
}

impl Default for Readouts {
    fn default() -> Self {
        Readouts::new()
    }
}

pub struct Sampler<'a, const LEN: usize> {
    capture: Option<&'a mut Capture<LEN>>,
    index: usize,
    tracker: ElapsedTracker,
    completion: &'a Completion,
    readouts: &'a Readouts,
}

impl<'a, const LEN: usize> Sampler<'a, LEN> {
    pub fn new(
        capture: &'a mut Capture<LEN>,
        counter_max: u32,
        completion: &'a Completion,
        readouts: &'a Readouts,
    ) -> Self {
        Sampler {
            capture: Some(capture),
            index: 0,
            tracker: ElapsedTracker::new(counter_max),
            completion,
            readouts,
        }
    }

    /// Handles one expiration of the sampling timer.
    ///
    /// Records until `LEN` entries are stored. The first call after that
    /// moves the index one past `LEN` to mark the phase as finished, later
    /// calls only refresh the readouts.
    pub fn sample<A, C, P>(&mut self, adc: &mut A, counter: &C, profile: &mut P)
    where
        A: OneShotAdc,
        C: DownCounter,
        P: ProfilePin,
    {
        profile.set_high();

        let now = counter.now();
        let value = adc.convert();
        let elapsed = self.tracker.track(now);
        if self.tracker.wrapped() {
            log!(trace, "counter reloaded between captures");
        }

        self.readouts.value.store(value, Ordering::Relaxed);
        self.readouts.elapsed.store(elapsed, Ordering::Relaxed);
        self.record(value, elapsed);
        self.readouts.index.store(self.index, Ordering::Relaxed);

        profile.set_low();
    }

    fn record(&mut self, value: u16, elapsed: u32) {
        if self.index < LEN {
            let stored = match self.capture.as_mut() {
                Some(capture) => capture.push(value, elapsed),
                None => false,
            };
            if !stored {
                return;
            }
            self.index += 1;
            if self.index == LEN {
                log!(debug, "capture complete, {=usize} entries", LEN);
                self.completion.signal();
            }
        } else if self.index == LEN {
            self.index += 1;
        }
    }

    /// Write index, `LEN + 1` once the phase has been marked finished.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Hands the filled buffer to the caller. Returns `None` until the
    /// capture is complete and after the buffer has been taken.
    pub fn take_capture(&mut self) -> Option<&'a Capture<LEN>> {
        if !self.completion.is_complete() {
            return None;
        }
        self.capture.take().map(|capture| &*capture)
    }
}
