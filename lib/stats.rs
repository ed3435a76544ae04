//! Statistics over a completed capture.

use core::ops::Sub;

use heapless::Vec;

use crate::sampler::Capture;
use crate::{ADC_FULL_SCALE, ADC_REFERENCE_MV, TICK_US};

/// Which series of a capture the jitter is measured over.
///
/// Jitter usually means the spread of the sampling interval, while the
/// analog readout has always shown the spread of the converted values.
/// Both are available and displayed side by side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JitterSource {
    /// Spread of the converted values, in converter counts.
    Samples,
    /// Spread of the elapsed time between captures, in counter ticks. The
    /// first entry has no previous capture and is skipped.
    Elapsed,
}

/// Largest minus smallest element, `None` for an empty series.
pub fn spread<T>(series: &[T]) -> Option<T>
where
    T: Copy + Ord + Sub<Output = T>,
{
    let (first, rest) = series.split_first()?;
    let (min, max) = rest.iter().fold((*first, *first), |(min, max), &value| {
        (min.min(value), max.max(value))
    });
    Some(max - min)
}

/// Jitter of a capture measured over `source`.
pub fn jitter<const N: usize>(capture: &Capture<N>, source: JitterSource) -> Option<u32> {
    match source {
        JitterSource::Samples => spread(capture.samples()).map(u32::from),
        JitterSource::Elapsed => spread(capture.elapsed().get(1..)?),
    }
}

/// Empirical probability mass function, one bin per distinct value.
///
/// Entry `i` of the result is how many elements of `series` equal
/// `series[i]`, so every entry is at least one and the counts of its
/// distinct values sum to its length. At most `N` entries are produced.
pub fn pmf<T: PartialEq, const N: usize>(series: &[T]) -> Vec<u16, N> {
    let mut frequencies = Vec::new();
    for value in series.iter().take(N) {
        let count = series.iter().filter(|other| *other == value).count();
        // take(N) bounds the length
        let _ = frequencies.push(count as u16);
    }
    frequencies
}

/// Frequency series of the converted values of a capture.
pub fn capture_pmf<const N: usize>(capture: &Capture<N>) -> Vec<u16, N> {
    pmf(capture.samples())
}

/// Highest frequency in a frequency series, the count of the most common value.
pub fn peak(frequencies: &[u16]) -> u16 {
    frequencies.iter().copied().max().unwrap_or(0)
}

/// Readout values derived from a capture and its frequency series.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Spread of the converted values, converter counts.
    pub analog_spread: u32,
    /// Spread of the sampling interval, counter ticks.
    pub timing_spread: u32,
    /// Occurrences of the most common value.
    pub peak: u16,
    pub len: usize,
}

impl Summary {
    pub fn new<const N: usize>(capture: &Capture<N>, frequencies: &[u16]) -> Self {
        Summary {
            analog_spread: jitter(capture, JitterSource::Samples).unwrap_or(0),
            timing_spread: jitter(capture, JitterSource::Elapsed).unwrap_or(0),
            peak: peak(frequencies),
            len: capture.len(),
        }
    }

    /// Analog spread in millivolts, the x 0.001 scale of a volt readout.
    pub fn analog_spread_mv(&self) -> i32 {
        let mv = u64::from(self.analog_spread) * u64::from(ADC_REFERENCE_MV)
            / u64::from(ADC_FULL_SCALE);
        clamp_i32(mv)
    }

    /// Timing spread in microseconds, the x 0.001 scale of a millisecond readout.
    pub fn timing_spread_us(&self) -> i32 {
        clamp_i32(u64::from(self.timing_spread) * u64::from(TICK_US))
    }

    /// Share of the most common value in percent, scaled by 256.
    pub fn peak_percent_q8(&self) -> u32 {
        if self.len == 0 {
            return 0;
        }
        (u32::from(self.peak) * 100 * 256) / self.len as u32
    }
}

fn clamp_i32(value: u64) -> i32 {
    value.min(i32::MAX as u64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::{DownCounter, OneShotAdc, ProfilePin};
    use crate::sampler::{Completion, Readouts, Sampler};
    use core::cell::Cell;

    #[test]
    fn spread_is_max_minus_min() {
        assert_eq!(spread(&[5u16, 9, 1, 7]), Some(8));
        assert_eq!(spread(&[3u32; 10]), Some(0));
        assert_eq!(spread(&[42u16]), Some(0));
        assert_eq!(spread::<u16>(&[]), None);
    }

    #[test]
    fn pmf_counts_exact_matches() {
        let series = [7u16, 3, 7, 7, 1, 3];
        let frequencies: Vec<u16, 6> = pmf(&series);
        assert_eq!(&frequencies[..], &[3, 2, 3, 3, 1, 2]);
    }

    #[test]
    fn distinct_value_counts_sum_to_length() {
        let series = [7u16, 3, 7, 7, 1, 3];
        let frequencies: Vec<u16, 6> = pmf(&series);
        let mut total = 0;
        for (i, value) in series.iter().enumerate() {
            if !series[..i].contains(value) {
                total += usize::from(frequencies[i]);
            }
        }
        assert_eq!(total, series.len());
        // Every entry summed counts each bin once per member
        let squared: usize = frequencies.iter().map(|&f| usize::from(f)).sum();
        assert_eq!(squared, 3 * 3 + 2 * 2 + 1);
    }

    #[test]
    fn pmf_is_recomputed_in_full() {
        let series = [2048u16, 2049, 2048, 2050];
        let first: Vec<u16, 4> = pmf(&series);
        let second: Vec<u16, 4> = pmf(&series);
        assert_eq!(first, second);
    }

    #[test]
    fn pmf_of_empty_series_is_empty() {
        let frequencies: Vec<u16, 4> = pmf::<u16, 4>(&[]);
        assert!(frequencies.is_empty());
        assert_eq!(peak(&frequencies), 0);
    }

    #[test]
    fn peak_is_largest_bin() {
        assert_eq!(peak(&[1, 4, 2, 4, 1]), 4);
    }

    struct Script<'a>(core::slice::Iter<'a, u16>);

    impl OneShotAdc for Script<'_> {
        fn convert(&mut self) -> u16 {
            self.0.next().copied().unwrap_or(0)
        }
    }

    struct Readings(Cell<usize>, &'static [u32]);

    impl DownCounter for Readings {
        const MAX: u32 = u32::MAX;

        fn now(&self) -> u32 {
            let i = self.0.get();
            self.0.set(i + 1);
            self.1[i]
        }
    }

    struct NoProbe;

    impl ProfilePin for NoProbe {
        fn set_high(&mut self) {}
        fn set_low(&mut self) {}
    }

    fn capture_of(values: &[u16], times: &'static [u32], capture: &mut Capture<4>) {
        let completion = Completion::new();
        let readouts = Readouts::new();
        let mut sampler = Sampler::new(capture, u32::MAX, &completion, &readouts);
        let mut adc = Script(values.iter());
        let counter = Readings(Cell::new(0), times);
        for _ in 0..values.len() {
            sampler.sample(&mut adc, &counter, &mut NoProbe);
        }
    }

    #[test]
    fn jitter_over_either_series() {
        let mut capture = Capture::new();
        capture_of(&[2000, 2010, 1990, 2005], &[10_000, 9_000, 7_900, 6_950], &mut capture);

        assert_eq!(jitter(&capture, JitterSource::Samples), Some(20));
        // 1000, 1100 and 950 ticks, the first delta is skipped
        assert_eq!(jitter(&capture, JitterSource::Elapsed), Some(150));
    }

    #[test]
    fn summary_scales_readouts() {
        let mut capture = Capture::new();
        capture_of(&[4095, 0, 4095, 4095], &[500, 400, 300, 200], &mut capture);
        let frequencies = capture_pmf(&capture);
        let summary = Summary::new(&capture, &frequencies);

        assert_eq!(summary.analog_spread, 4095);
        assert_eq!(summary.analog_spread_mv(), 3300);
        assert_eq!(summary.timing_spread, 0);
        assert_eq!(summary.timing_spread_us(), 0);
        assert_eq!(summary.peak, 3);
        // 75 % as x/256
        assert_eq!(summary.peak_percent_q8(), 75 * 256);
    }
}
