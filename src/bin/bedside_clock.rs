#![no_main]
#![no_std]

#[rtic::app(device = stm32f1xx_hal::pac, peripherals = true, dispatchers = [PVD, WWDG, RTC, SPI1])]
mod app {
    use dwt_systick_monotonic::{DwtSystick, ExtU32};
    use embedded_hal::blocking::delay::{DelayMs, DelayUs};
    use rotary_encoder_hal::{Direction, Rotary};
    use stm32f103_bedside_clock::clock::{Clock, ClockCommand};
    use stm32f103_bedside_clock::config::{
        DEBOUNCE_MS, ENCODER_POLL_MS, THERMO_EPSILON, THERMO_PERIOD_MS, TICK_LED_PULSE,
        TICK_PERIOD_MS,
    };
    use stm32f103_bedside_clock::display::{DisplayCommand, DisplaySink};
    use stm32f103_bedside_clock::events::{
        ActuatorCommand, EncoderEvent, SchedulerCommand, SoundCue, UiEvent,
    };
    use stm32f103_bedside_clock::hd44780::{Hd44780, DEFAULT_ADDRESS};
    use stm32f103_bedside_clock::ports::Ports;
    use stm32f103_bedside_clock::schedule::Schedules;
    use stm32f103_bedside_clock::sound::{Cued, Output as Sound, Player, Step};
    use stm32f103_bedside_clock::thermo::TemperatureFilter;
    use stm32f103_bedside_clock::ui::MenuController;
    use stm32f1xx_hal::adc::Adc;
    use stm32f1xx_hal::gpio::{
        gpioa::{PA0, PA1, PA4, PA6},
        gpiob::{PB12, PB13, PB6, PB7},
        gpioc::PC13,
        Alternate, Edge, ExtiPin, Input, OpenDrain, Output, PullUp, PushPull,
    };
    use stm32f1xx_hal::watchdog::IndependentWatchdog;
    use stm32f1xx_hal::{
        i2c::{BlockingI2c, DutyCycle, Mode},
        pac::{ADC1, EXTI, I2C1, TIM3},
        prelude::*,
        pwm::{Channel, Pwm, C1},
        timer::{Tim3NoRemap, Timer},
    };

    const FREQ: u32 = 72_000_000;
    const FREQ_MHZ: u32 = FREQ / 1_000_000;
    const BUZZER_BASE_FREQ_HZ: u32 = 1000;

    #[monotonic(binds = SysTick, default = true)]
    type MyMono = DwtSystick<FREQ>;

    /// Busy-wait delay for the LCD; SysTick belongs to the monotonic.
    pub struct AsmDelay;

    impl DelayUs<u16> for AsmDelay {
        fn delay_us(&mut self, us: u16) {
            cortex_m::asm::delay(u32::from(us) * FREQ_MHZ);
        }
    }

    impl DelayMs<u8> for AsmDelay {
        fn delay_ms(&mut self, ms: u8) {
            cortex_m::asm::delay(u32::from(ms) * 1000 * FREQ_MHZ);
        }
    }

    type Lcd = Hd44780<
        BlockingI2c<I2C1, (PB6<Alternate<OpenDrain>>, PB7<Alternate<OpenDrain>>)>,
        AsmDelay,
    >;

    /// The core's outgoing queues, mapped onto task spawns.
    struct RticPorts;

    impl Ports for RticPorts {
        fn display(&mut self, cmd: DisplayCommand) {
            if display::spawn(cmd).is_err() {
                defmt::error!("display queue full, command dropped");
            }
        }

        fn clock(&mut self, cmd: ClockCommand) {
            if time_engine::spawn(cmd).is_err() {
                defmt::warn!("clock queue full");
            }
        }

        fn scheduler(&mut self, cmd: SchedulerCommand) {
            if scheduler::spawn(cmd).is_err() {
                defmt::warn!("scheduler queue full");
            }
        }

        fn ui(&mut self, ev: UiEvent) {
            if ui::spawn(ev).is_err() {
                defmt::warn!("ui queue full");
            }
        }

        fn actuator(&mut self, cmd: ActuatorCommand) {
            if actuator::spawn(cmd).is_err() {
                defmt::warn!("actuator queue full");
            }
        }

        fn sound(&mut self, cue: SoundCue) {
            if buzzer::spawn(BuzzerEvent::Cue(cue)).is_err() {
                defmt::warn!("sound queue full");
            }
        }
    }

    #[derive(Debug, defmt::Format)]
    pub enum BuzzerEvent {
        Cue(SoundCue),
        Next,
    }

    #[shared]
    struct Shared {
        btn_pin: PA4<Input<PullUp>>,
        exti: EXTI,
    }

    #[local]
    struct Local {
        led: PC13<Output<PushPull>>,
        alarm_out: PB12<Output<PushPull>>,
        relay_out: PB13<Output<PushPull>>,
        buzz_pwm: Pwm<TIM3, Tim3NoRemap, C1, PA6<Alternate<PushPull>>>,
        rotary: Rotary<PA0<Input<PullUp>>, PA1<Input<PullUp>>>,
        adc: Adc<ADC1>,
        sink: DisplaySink<Lcd>,
        engine: Clock,
        schedules: Schedules,
        menu: MenuController,
        wdg: IndependentWatchdog,
    }

    #[init]
    fn init(mut c: init::Context) -> (Shared, Local, init::Monotonics) {
        defmt::info!("Starting !!!");

        // workaround, see: https://github.com/knurling-rs/defmt/issues/322
        #[cfg(debug_assertions)]
        c.device.DBGMCU.cr.modify(|_, w| {
            w.dbg_sleep().set_bit();
            w.dbg_standby().set_bit();
            w.dbg_stop().set_bit()
        });
        #[cfg(debug_assertions)]
        c.device.RCC.ahbenr.modify(|_, w| w.dma1en().enabled());

        let mut flash = c.device.FLASH.constrain();
        let rcc = c.device.RCC.constrain();

        let clocks = rcc
            .cfgr
            .use_hse(8.mhz())
            .sysclk(FREQ.hz())
            .pclk1(24.mhz())
            .adcclk(12.mhz())
            .freeze(&mut flash.acr);
        let mut afio = c.device.AFIO.constrain();

        let mut gpioc = c.device.GPIOC.split();
        let mut led = gpioc.pc13.into_push_pull_output(&mut gpioc.crh);
        led.set_high();

        let mut gpioa = c.device.GPIOA.split();
        let mut gpiob = c.device.GPIOB.split();

        let mut alarm_out = gpiob.pb12.into_push_pull_output(&mut gpiob.crh);
        alarm_out.set_low();
        let mut relay_out = gpiob.pb13.into_push_pull_output(&mut gpiob.crh);
        relay_out.set_low();

        let enc_a = gpioa.pa0.into_pull_up_input(&mut gpioa.crl);
        let enc_b = gpioa.pa1.into_pull_up_input(&mut gpioa.crl);
        let rotary = Rotary::new(enc_a, enc_b);

        let mut btn = gpioa.pa4.into_pull_up_input(&mut gpioa.crl);
        btn.make_interrupt_source(&mut afio);
        btn.enable_interrupt(&mut c.device.EXTI);
        btn.trigger_on_edge(&mut c.device.EXTI, Edge::Falling);

        // Set up I2C.
        let scl = gpiob.pb6.into_alternate_open_drain(&mut gpiob.crl);
        let sda = gpiob.pb7.into_alternate_open_drain(&mut gpiob.crl);
        let i2c = BlockingI2c::i2c1(
            c.device.I2C1,
            (scl, sda),
            &mut afio.mapr,
            Mode::Fast {
                frequency: 400_000.hz(),
                duty_cycle: DutyCycle::Ratio2to1,
            },
            clocks,
            1000,
            10,
            1000,
            1000,
        );
        let lcd = Hd44780::new(i2c, AsmDelay, DEFAULT_ADDRESS).unwrap();
        let sink = DisplaySink::new(lcd).unwrap();

        let buzz_pin = gpioa.pa6.into_alternate_push_pull(&mut gpioa.crl);
        let mut buzz_pwm = Timer::new(c.device.TIM3, &clocks).pwm::<Tim3NoRemap, _, _, _>(
            buzz_pin,
            &mut afio.mapr,
            BUZZER_BASE_FREQ_HZ.hz(),
        );
        buzz_pwm.set_duty(Channel::C1, buzz_pwm.get_max_duty() / 2);
        buzz_pwm.disable(Channel::C1);

        let adc = Adc::adc1(c.device.ADC1, clocks);

        let mut dcb = c.core.DCB;
        let dwt = c.core.DWT;
        let systick = c.core.SYST;
        let mono = DwtSystick::new(&mut dcb, dwt, systick, clocks.sysclk().0);

        let wdg = IndependentWatchdog::new(c.device.IWDG);

        let engine = Clock::with_defaults().unwrap();
        let mut schedules = Schedules::with_defaults().unwrap();
        let menu = MenuController::new(
            engine.current_time(),
            schedules.alarm().config(),
            schedules.relay().config(),
        );
        defmt::info!(
            "clock {}, alarm {}, relay {}",
            engine.current_time(),
            schedules.alarm().config(),
            schedules.relay().config()
        );
        schedules.announce(&mut RticPorts);

        time_engine::spawn_after(TICK_PERIOD_MS.millis(), ClockCommand::Period).unwrap();
        encoder_poll::spawn().unwrap();
        thermo::spawn().unwrap();

        (
            Shared {
                btn_pin: btn,
                exti: c.device.EXTI,
            },
            Local {
                led,
                alarm_out,
                relay_out,
                buzz_pwm,
                rotary,
                adc,
                sink,
                engine,
                schedules,
                menu,
                wdg,
            },
            init::Monotonics(mono),
        )
    }

    #[task(local = [engine], priority = 3, capacity = 4)]
    fn time_engine(cx: time_engine::Context, cmd: ClockCommand) {
        if cmd == ClockCommand::Period {
            time_engine::spawn_after(TICK_PERIOD_MS.millis(), ClockCommand::Period).ok();
        }
        if let Some(ev) = cx.local.engine.handle(cmd) {
            // ticks are dropped rather than queued up behind a busy UI
            if ui::spawn(UiEvent::Clock(ev)).is_err() {
                defmt::warn!("tick dropped");
            }
        }
    }

    #[task(local = [schedules], priority = 2, capacity = 4)]
    fn scheduler(cx: scheduler::Context, cmd: SchedulerCommand) {
        cx.local.schedules.handle(cmd, &mut RticPorts);
    }

    #[task(local = [menu], priority = 1, capacity = 8)]
    fn ui(cx: ui::Context, ev: UiEvent) {
        cx.local.menu.handle(ev, &mut RticPorts);
    }

    #[task(local = [sink], priority = 2, capacity = 16)]
    fn display(cx: display::Context, cmd: DisplayCommand) {
        cx.local.sink.apply(&cmd);
    }

    #[task(local = [alarm_out, relay_out], priority = 3, capacity = 4)]
    fn actuator(cx: actuator::Context, cmd: ActuatorCommand) {
        defmt::debug!("actuator {}", cmd);
        match cmd {
            ActuatorCommand::SetAlarmOutput(true) => cx.local.alarm_out.set_high(),
            ActuatorCommand::SetAlarmOutput(false) => cx.local.alarm_out.set_low(),
            ActuatorCommand::SetRelayOutput(true) => cx.local.relay_out.set_high(),
            ActuatorCommand::SetRelayOutput(false) => cx.local.relay_out.set_low(),
            ActuatorCommand::PulseTickLed => {
                // a pulse still running just absorbs this one
                led_pulse::spawn(0).ok();
            }
        }
    }

    #[task(local = [led], priority = 3, capacity = 1)]
    fn led_pulse(cx: led_pulse::Context, step: usize) {
        let led = cx.local.led;
        if let Some(&(on, hold)) = TICK_LED_PULSE.get(step) {
            // PC13 sinks the LED
            if on {
                led.set_low();
            } else {
                led.set_high();
            }
            if step + 1 < TICK_LED_PULSE.len() {
                led_pulse::spawn_after(hold.millis(), step + 1).ok();
            }
        }
    }

    #[task(local = [buzz_pwm,
                    player: Player = Player::new(),
                    handle: Option<buzzer::SpawnHandle> = None],
           priority = 3,
           capacity = 4)]
    fn buzzer(cx: buzzer::Context, ev: BuzzerEvent) {
        let buzzer = cx.local.buzz_pwm;
        let player = cx.local.player;
        let handle = cx.local.handle;

        let step = match ev {
            BuzzerEvent::Cue(cue) => match player.cue(cue) {
                Cued::Play(step) => Some(step),
                // the running cue keeps its scheduled step
                Cued::Queued => return,
                Cued::Stopped => {
                    if let Some(handle) = handle.take() {
                        handle.cancel().ok();
                    }
                    None
                }
            },
            BuzzerEvent::Next => player.next(),
        };

        match step {
            Some(Step { output, hold_ms }) => {
                match output {
                    Sound::Tone(freq) => {
                        buzzer.set_period(u32::from(freq).hz());
                        buzzer.set_duty(Channel::C1, buzzer.get_max_duty() / 2);
                        buzzer.enable(Channel::C1);
                    }
                    Sound::Quiet => buzzer.disable(Channel::C1),
                }
                *handle = buzzer::spawn_after(hold_ms.millis(), BuzzerEvent::Next).ok();
            }
            None => {
                buzzer.disable(Channel::C1);
                *handle = None;
            }
        }
    }

    #[task(local = [adc, filter: TemperatureFilter = TemperatureFilter::new(THERMO_EPSILON)],
           priority = 3)]
    fn thermo(cx: thermo::Context) {
        let celsius = cx.local.adc.read_temp();
        let tenths = i16::try_from(celsius.saturating_mul(10)).unwrap_or(i16::MAX);
        if let Some(t) = cx.local.filter.update(tenths) {
            defmt::debug!("temperature {} / 10 C", t);
            if ui::spawn(UiEvent::Temperature(t)).is_err() {
                defmt::warn!("temperature dropped");
            }
        }
        thermo::spawn_after(THERMO_PERIOD_MS.millis()).ok();
    }

    #[task(local = [rotary], priority = 3)]
    fn encoder_poll(cx: encoder_poll::Context) {
        let ev = match cx.local.rotary.update() {
            Ok(Direction::Clockwise) => Some(EncoderEvent::RotatedRight),
            Ok(Direction::CounterClockwise) => Some(EncoderEvent::RotatedLeft),
            Ok(Direction::None) => None,
            Err(_) => {
                defmt::warn!("encoder read failed");
                None
            }
        };
        if let Some(ev) = ev {
            if ui::spawn(ev.into()).is_err() {
                defmt::warn!("encoder event dropped");
            }
        }
        encoder_poll::spawn_after(ENCODER_POLL_MS.millis()).ok();
    }

    #[task(binds = EXTI4, shared = [btn_pin, exti],
        local = [], priority = 3)]
    fn button_isr(cx: button_isr::Context) {
        let btn = cx.shared.btn_pin;
        let exti = cx.shared.exti;

        (btn, exti).lock(|btn, exti| {
            btn.disable_interrupt(exti);
            btn.clear_interrupt_pending_bit();
            btn_debouncer::spawn_after(DEBOUNCE_MS.millis()).ok();
        });
    }

    #[task(local = [is_pressed: bool = false],
        shared = [btn_pin, exti],
        priority = 3)]
    fn btn_debouncer(cx: btn_debouncer::Context) {
        let btn = cx.shared.btn_pin;
        let exti = cx.shared.exti;
        let is_pressed = cx.local.is_pressed;

        (btn, exti).lock(|btn, exti| {
            if *is_pressed {
                if btn.is_high() {
                    btn.trigger_on_edge(exti, Edge::Falling);
                    *is_pressed = false;
                }
            } else if btn.is_low() {
                btn.trigger_on_edge(exti, Edge::Rising);
                *is_pressed = true;
                if ui::spawn(EncoderEvent::Pressed.into()).is_err() {
                    defmt::warn!("button press dropped");
                }
            }
            btn.enable_interrupt(exti);
        });
    }

    #[idle(local = [wdg])]
    fn idle(cx: idle::Context) -> ! {
        cx.local.wdg.start(4000.ms());

        loop {
            rtic::export::wfi();
            cx.local.wdg.feed();
        }
    }
}
