#![cfg_attr(not(test), no_std)]

#[cfg(feature = "hardware")]
use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "hardware")]
use defmt_rtt as _; // global logger
#[cfg(feature = "hardware")]
use panic_probe as _;

// defmt needs a global logger at link time, host builds compile the calls out
macro_rules! log {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "hardware")]
        defmt::$level!($($arg)+);
    };
}

pub mod error;
pub mod fixed;
pub mod hw;
pub mod plot;
pub mod sampler;
pub mod stats;

/// Entries recorded before the capture phase ends.
pub const CAPACITY: usize = 1000;
/// Rate of the sampling interrupt.
pub const SAMPLE_RATE_HZ: u32 = 10;
/// Duration of one tick of the free-running down-counter.
pub const TICK_US: u32 = 10;
/// Largest value of the 12-bit converter.
pub const ADC_FULL_SCALE: u16 = 4095;
/// Converter reference in millivolts.
pub const ADC_REFERENCE_MV: u32 = 3300;

pub const PLOT_TITLE: &str = "Lab 2 PMF";
pub const PLOT_DOMAIN: plot::PlotDomain = plot::PlotDomain {
    min_x: 0,
    max_x: ADC_FULL_SCALE as i32,
    min_y: 0,
    max_y: CAPACITY as i32,
};

#[cfg(feature = "hardware")]
static COUNT: AtomicUsize = AtomicUsize::new(0);
#[cfg(feature = "hardware")]
defmt::timestamp!("{=usize}", {
    let n = COUNT.load(Ordering::Relaxed);
    COUNT.store(n + 1, Ordering::Relaxed);
    n
});
