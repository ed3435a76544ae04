//! Capture, jitter and PMF over full 1000 entry captures with simulated hardware.

use std::cell::Cell;

use lib::hw::{DownCounter, OneShotAdc, ProfilePin};
use lib::sampler::{Capture, Completion, Readouts, Sampler};
use lib::stats::{capture_pmf, jitter, spread, JitterSource};
use lib::CAPACITY;
use proptest::prelude::*;

struct Script {
    values: Vec<u16>,
    next: usize,
}

impl OneShotAdc for Script {
    fn convert(&mut self) -> u16 {
        let value = self.values.get(self.next).copied().unwrap_or(0);
        self.next += 1;
        value
    }
}

/// Counts down by a fixed period plus a per-capture jitter.
struct Clock {
    now: Cell<u32>,
    period: u32,
    jitter: Vec<u32>,
    reads: Cell<usize>,
}

impl DownCounter for Clock {
    const MAX: u32 = u32::MAX;

    fn now(&self) -> u32 {
        let reads = self.reads.get();
        let extra = self.jitter.get(reads).copied().unwrap_or(0);
        let now = self.now.get().wrapping_sub(self.period + extra);
        self.now.set(now);
        self.reads.set(reads + 1);
        now
    }
}

struct Probe(usize);

impl ProfilePin for Probe {
    fn set_high(&mut self) {
        self.0 += 1;
    }

    fn set_low(&mut self) {
        self.0 += 1;
    }
}

fn run(values: Vec<u16>, jitter: Vec<u32>, ticks: usize) -> (Capture<CAPACITY>, usize) {
    let mut capture = Capture::new();
    let completion = Completion::new();
    let readouts = Readouts::new();
    let index = {
        let mut sampler = Sampler::new(&mut capture, Clock::MAX, &completion, &readouts);
        let mut adc = Script { values, next: 0 };
        let clock = Clock {
            now: Cell::new(u32::MAX),
            period: 10_000,
            jitter,
            reads: Cell::new(0),
        };
        let mut probe = Probe(0);
        for _ in 0..ticks {
            sampler.sample(&mut adc, &clock, &mut probe);
        }
        assert_eq!(probe.0, 2 * ticks);
        sampler.index()
    };
    (capture, index)
}

fn samples() -> impl Strategy<Value = Vec<u16>> {
    // Narrow alphabets repeat heavily, as analog noise does
    prop_oneof![
        prop::collection::vec(0u16..=4095, CAPACITY),
        prop::collection::vec(2040u16..=2056, CAPACITY),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn pmf_counts_every_entry_once(values in samples()) {
        let (capture, _) = run(values, Vec::new(), CAPACITY);
        let frequencies = capture_pmf(&capture);
        prop_assert_eq!(frequencies.len(), CAPACITY);
        prop_assert!(frequencies.iter().all(|&count| count >= 1));

        // One representative per distinct value
        let mut total = 0usize;
        for (i, value) in capture.samples().iter().enumerate() {
            if capture.samples()[..i].contains(value) {
                continue;
            }
            total += usize::from(frequencies[i]);
        }
        prop_assert_eq!(total, CAPACITY);
    }

    #[test]
    fn pmf_is_idempotent(values in samples()) {
        let (capture, _) = run(values, Vec::new(), CAPACITY);
        prop_assert_eq!(capture_pmf(&capture), capture_pmf(&capture));
    }

    #[test]
    fn jitter_is_spread_of_either_series(
        values in samples(),
        extra in prop::collection::vec(0u32..500, CAPACITY),
    ) {
        let (capture, _) = run(values.clone(), extra.clone(), CAPACITY);

        let max = *values.iter().max().unwrap();
        let min = *values.iter().min().unwrap();
        prop_assert_eq!(jitter(&capture, JitterSource::Samples), Some(u32::from(max - min)));

        let intervals = &extra[1..];
        let expected = intervals.iter().max().unwrap() - intervals.iter().min().unwrap();
        prop_assert_eq!(jitter(&capture, JitterSource::Elapsed), Some(expected));
    }

    #[test]
    fn sampler_halts_at_capacity(extra_ticks in 0usize..3000) {
        let values: Vec<u16> = (0..CAPACITY + extra_ticks).map(|i| (i % 4096) as u16).collect();
        let (capture, index) = run(values, Vec::new(), CAPACITY + extra_ticks);

        prop_assert_eq!(capture.len(), CAPACITY);
        prop_assert!(capture.is_full());
        prop_assert_eq!(capture.elapsed().len(), CAPACITY);
        let expected_index = if extra_ticks == 0 { CAPACITY } else { CAPACITY + 1 };
        prop_assert_eq!(index, expected_index);
        prop_assert_eq!(capture.samples()[CAPACITY - 1], (CAPACITY - 1) as u16);
    }
}

#[test]
fn constant_signal_has_no_jitter() {
    let (capture, _) = run(vec![1234; CAPACITY], Vec::new(), CAPACITY);
    assert_eq!(jitter(&capture, JitterSource::Samples), Some(0));
    assert_eq!(jitter(&capture, JitterSource::Elapsed), Some(0));
    assert!(capture_pmf(&capture).iter().all(|&count| usize::from(count) == CAPACITY));
    assert_eq!(spread(&capture.elapsed()[1..]), Some(0));
}

#[test]
fn elapsed_follows_the_counter_period() {
    let (capture, _) = run(vec![0; CAPACITY], Vec::new(), CAPACITY);
    assert!(capture.elapsed()[1..].iter().all(|&ticks| ticks == 10_000));
}
