#![no_main]
#![no_std]

use lib as _;

use cortex_m::singleton;
use lib::error::Result;
use lib::fixed::{signed_dec3, unsigned_bin8};
use lib::hw::{
    init_clock, init_lcd, Adc, DownCounter, HwLcd, IliError, LcdInterface, ProbePin, ProfilePin,
    SampleTimer, TickCounter, TICK_PRESCALER,
};
use lib::plot::PlotSession;
use lib::sampler::{Capture, Completion, Readouts, Sampler};
use lib::stats::{capture_pmf, Summary};
use lib::{CAPACITY, PLOT_DOMAIN, PLOT_TITLE, SAMPLE_RATE_HZ};
use rtic::app;
use stm32g0xx_hal::delay::DelayExt;
use stm32g0xx_hal::gpio::{GpioExt, Speed};
use stm32g0xx_hal::time::RateExtU32;

// Written by the sampling interrupt, polled by idle
static COMPLETION: Completion = Completion::new();
// Watched with the debugger
static READOUTS: Readouts = Readouts::new();

#[app(device = stm32g0xx_hal::stm32, peripherals = true)]
const APP: () = {
    struct Resources {
        lcd: HwLcd,
        sampler: Sampler<'static, CAPACITY>,
        sample_timer: SampleTimer,
        adc: Adc,
        counter: TickCounter,
        probe: ProbePin,
    }

    #[init]
    fn init(cx: init::Context) -> init::LateResources {
        let core: rtic::export::Peripherals = cx.core;
        let device: stm32g0xx_hal::stm32::Peripherals = cx.device;

        // Buffers
        let capture: &'static mut Capture<CAPACITY> =
            singleton!(: Capture<CAPACITY> = Capture::new()).unwrap();

        // Clock
        let mut rcc = init_clock(device.RCC);
        let mut delay = core.SYST.delay(&mut rcc);

        // GPIO
        let gpioa = device.GPIOA.split(&mut rcc);
        let gpiob = device.GPIOB.split(&mut rcc);

        // LCD
        let interface = LcdInterface::new(
            gpiob.pb0.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb1.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb2.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb3.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb4.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb5.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb6.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb7.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb8.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb9.into_push_pull_output().set_speed(Speed::VeryHigh),
        );
        let lcd = init_lcd(
            interface,
            gpioa.pa4.into_push_pull_output(),
            gpioa.pa5.into_push_pull_output(),
            &mut delay,
        )
        .unwrap();

        // Sampling
        let mut probe = gpioa.pa1.into_push_pull_output();
        probe.set_low();
        let adc = Adc::new(device.ADC, gpioa.pa0, &mut rcc, &mut delay);
        let counter = TickCounter::new(device.TIM3, TICK_PRESCALER, &mut rcc);
        let sample_timer = SampleTimer::new(device.TIM6, SAMPLE_RATE_HZ.Hz(), &mut rcc);
        let sampler = Sampler::new(capture, TickCounter::MAX, &COMPLETION, &READOUTS);

        defmt::info!(
            "sampling at {=u32} Hz into {=usize} entries",
            SAMPLE_RATE_HZ,
            CAPACITY
        );

        init::LateResources {
            lcd,
            sampler,
            sample_timer,
            adc,
            counter,
            probe,
        }
    }

    #[idle(resources = [lcd, sampler, sample_timer, counter, probe])]
    fn idle(mut cx: idle::Context) -> ! {
        cx.resources
            .counter
            .lock(|counter: &mut TickCounter| counter.start());
        cx.resources.sample_timer.lock(|timer: &mut SampleTimer| {
            timer.start();
        });

        while !COMPLETION.is_complete() {
            cortex_m::asm::wfi();
        }

        let capture = cx
            .resources
            .sampler
            .lock(|sampler: &mut Sampler<'static, CAPACITY>| sampler.take_capture());

        if let Some(capture) = capture {
            cx.resources.probe.lock(|probe: &mut ProbePin| probe.set_high());
            if analyze(capture, cx.resources.lcd).is_err() {
                defmt::error!("drawing the PMF failed");
            }
            cx.resources.probe.lock(|probe: &mut ProbePin| probe.set_low());
        }

        loop {
            cortex_m::asm::wfi();
        }
    }

    #[task(binds = TIM6, priority = 2, resources = [sampler, sample_timer, adc, counter, probe])]
    fn tim6(cx: tim6::Context) {
        let timer: &mut SampleTimer = cx.resources.sample_timer;
        let sampler: &mut Sampler<'static, CAPACITY> = cx.resources.sampler;
        let counter: &mut TickCounter = cx.resources.counter;

        timer.unpend();
        sampler.sample(cx.resources.adc, &*counter, cx.resources.probe);
    }
};

fn analyze(capture: &Capture<CAPACITY>, lcd: &mut HwLcd) -> Result<(), IliError> {
    let frequencies = capture_pmf(capture);
    let summary = Summary::new(capture, &frequencies);
    defmt::info!(
        "spread {=u32} counts, {=u32} ticks, peak {=u16} of {=usize}",
        summary.analog_spread,
        summary.timing_spread,
        summary.peak,
        summary.len
    );

    let mut session = PlotSession::new(lcd, PLOT_TITLE, PLOT_DOMAIN)?;
    session.plot(capture.samples(), &frequencies)?;
    session.readout(0, 1, "dV", signed_dec3(summary.analog_spread_mv()))?;
    session.readout(10, 1, "dT", signed_dec3(summary.timing_spread_us()))?;
    session.readout(0, 2, "peak%", unsigned_bin8(summary.peak_percent_q8()))?;
    Ok(())
}
