use stm32g0xx_hal::rcc::Rcc;
use stm32g0xx_hal::stm32g0::stm32g070::{RCC, TIM3, TIM6};
use stm32g0xx_hal::time::Hertz;
use stm32g0xx_hal::timer::{Timer, TimerExt};

use crate::hw::DownCounter;

/// Periodic interrupt driving the sampler.
pub struct SampleTimer {
    timer: Timer<TIM6>,
    freq: Hertz,
}

impl SampleTimer {
    pub fn new(pac_tim: TIM6, freq: Hertz, rcc: &mut Rcc) -> Self {
        SampleTimer {
            timer: pac_tim.timer(rcc),
            freq,
        }
    }

    pub fn start(&mut self) {
        self.timer.clear_irq();
        self.timer.listen();
        self.timer.start(self.freq);
    }

    pub fn unpend(&mut self) {
        self.timer.clear_irq();
    }
}

/// 16-bit free-running down-counter.
pub struct TickCounter {
    timer: TIM3,
}

impl TickCounter {
    /// `prescaler` divides the timer kernel clock, 639 gives 10 us ticks at 64 MHz.
    pub fn new(pac_timer: TIM3, prescaler: u16, rcc: &mut Rcc) -> Self {
        TickCounter::enable_clock_and_reset(rcc);
        let mut counter = TickCounter { timer: pac_timer };
        counter.configure(prescaler);
        counter
    }

    pub fn start(&mut self) {
        self.timer.cr1.modify(|_, w| w.cen().set_bit());
    }

    fn configure(&mut self, prescaler: u16) {
        // Edge aligned, counting down
        self.timer.cr1.write(|w| w.dir().set_bit());
        self.timer.psc.write(|w| unsafe { w.psc().bits(prescaler) });
        // Reload at the top of the range
        self.timer
            .arr
            .write(|w| unsafe { w.arr_l().bits(u16::max_value()) });

        // Trigger update event to load the registers
        self.timer.cr1.modify(|_, w| w.urs().set_bit());
        self.timer.egr.write(|w| w.ug().set_bit());
        self.timer.cr1.modify(|_, w| w.urs().clear_bit());
    }

    fn enable_clock_and_reset(_: &mut Rcc) {
        let rcc = unsafe { &(*RCC::ptr()) };
        rcc.apbenr1.modify(|_, w| w.tim3en().set_bit());
        rcc.apbrstr1.modify(|_, w| w.tim3rst().set_bit());
        rcc.apbrstr1.modify(|_, w| w.tim3rst().clear_bit());
    }
}

impl DownCounter for TickCounter {
    const MAX: u32 = u16::MAX as u32;

    fn now(&self) -> u32 {
        self.timer.cnt.read().cnt_l().bits() as u32
    }
}
