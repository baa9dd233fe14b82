//! Top-level UI state machine.

use core::fmt::Write;

use crate::clock::{ClockCommand, ClockEvent};
use crate::config::DISPLAY_COLS;
use crate::datetime::DateTime;
use crate::display::{DisplayCommand, Line};
use crate::events::{ActuatorCommand, MenuEvent, SchedulerCommand, SoundCue, UiEvent};
use crate::ports::Ports;
use crate::window::{AlarmConfig, RelayConfig};

use super::main_screen::MainScreen;
use super::page::Verdict;
use super::pages::{Page, SystemConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuItemKind {
    Date,
    Time,
    AlarmTime,
    AlarmConfig,
    Relay,
    System,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub index: usize,
    pub kind: MenuItemKind,
    pub name: &'static str,
    /// Help text in the list, page header while editing.
    pub header: &'static str,
}

pub static MENU_ITEMS: [MenuItem; 7] = [
    MenuItem {
        index: 0,
        kind: MenuItemKind::Date,
        name: "Clock Date",
        header: "Set Clock Date",
    },
    MenuItem {
        index: 1,
        kind: MenuItemKind::Time,
        name: "Clock Time",
        header: "Set Clock Time",
    },
    MenuItem {
        index: 2,
        kind: MenuItemKind::AlarmTime,
        name: "Alarm Time",
        header: "Set Alarm Time",
    },
    MenuItem {
        index: 3,
        kind: MenuItemKind::AlarmConfig,
        name: "Alarm Config",
        header: "Configure Alarm",
    },
    MenuItem {
        index: 4,
        kind: MenuItemKind::Relay,
        name: "Relay",
        header: "Set Relay Time",
    },
    MenuItem {
        index: 5,
        kind: MenuItemKind::System,
        name: "System",
        header: "Configure System",
    },
    MenuItem {
        index: 6,
        kind: MenuItemKind::Exit,
        name: "Exit",
        header: "Exit Menu",
    },
];

const EXIT_INDEX: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuState {
    /// Live main screen.
    Browse,
    /// Scrolling through the entries.
    Navigate,
    /// A page owns the input.
    Edit,
}

pub struct MenuController {
    state: MenuState,
    current: usize,
    page: Option<Page>,
    screen: MainScreen,
    system: SystemConfig,
}

impl MenuController {
    /// `now`, `alarm` and `relay` seed the main screen until the first
    /// events arrive.
    pub fn new(now: DateTime, alarm: AlarmConfig, relay: RelayConfig) -> Self {
        Self {
            state: MenuState::Browse,
            current: EXIT_INDEX,
            page: None,
            screen: MainScreen::new(now, alarm, relay),
            system: SystemConfig::default(),
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn current_item(&self) -> &'static MenuItem {
        &MENU_ITEMS[self.current % MENU_ITEMS.len()]
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn system(&self) -> SystemConfig {
        self.system
    }

    pub fn screen(&self) -> &MainScreen {
        &self.screen
    }

    pub fn next_item(&mut self) -> &'static MenuItem {
        self.current = (self.current + 1) % MENU_ITEMS.len();
        self.current_item()
    }

    pub fn prev_item(&mut self) -> &'static MenuItem {
        self.current = (self.current + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
        self.current_item()
    }

    pub fn handle<P: Ports>(&mut self, ev: UiEvent, ports: &mut P) {
        match ev {
            UiEvent::Menu(ev) => self.process_event(ev, ports),
            UiEvent::Clock(ClockEvent::Tick { now }) => self.on_tick(now, ports),
            UiEvent::Alarm(ev) => {
                self.screen.on_alarm(&ev);
                self.refresh(ports);
            }
            UiEvent::Relay(ev) => {
                self.screen.on_relay(&ev);
                self.refresh(ports);
            }
            UiEvent::Temperature(t) => {
                self.screen.temperature = Some(t);
                self.refresh(ports);
            }
        }
    }

    fn on_tick<P: Ports>(&mut self, now: DateTime, ports: &mut P) {
        self.screen.now = now;
        if self.state != MenuState::Browse {
            return;
        }
        ports.scheduler(SchedulerCommand::Evaluate(now));
        ports.actuator(ActuatorCommand::PulseTickLed);
        if self.system.chime && now.minute() == 0 && now.second() == 0 {
            ports.sound(SoundCue::HourlyChime);
        }
        self.screen.render(ports);
    }

    fn refresh<P: Ports>(&self, ports: &mut P) {
        if self.state == MenuState::Browse {
            self.screen.render(ports);
        }
    }

    pub fn process_event<P: Ports>(&mut self, ev: MenuEvent, ports: &mut P) {
        if ev == MenuEvent::PushButton {
            ports.sound(SoundCue::MenuBeep);
        }
        match self.state {
            MenuState::Browse => {
                if ev == MenuEvent::PushButton {
                    self.current = EXIT_INDEX;
                    self.enter(MenuState::Navigate);
                    ports.display(DisplayCommand::Clear);
                    self.render_menu(ports);
                }
            }
            MenuState::Navigate => match ev {
                MenuEvent::MoveFwd => {
                    self.next_item();
                    self.render_menu(ports);
                }
                MenuEvent::MoveBack => {
                    self.prev_item();
                    self.render_menu(ports);
                }
                MenuEvent::PushButton => self.open(ports),
            },
            MenuState::Edit => {
                let Some(page) = self.page.as_mut() else {
                    self.enter(MenuState::Navigate);
                    return;
                };
                match page.process(ev) {
                    Verdict::Continue => page.render(ports),
                    verdict => self.close(verdict, ports),
                }
            }
        }
    }

    fn enter(&mut self, state: MenuState) {
        debug!("menu {} -> {}", self.state, state);
        self.state = state;
    }

    fn open<P: Ports>(&mut self, ports: &mut P) {
        let item = self.current_item();
        let page = match item.kind {
            MenuItemKind::Exit => {
                self.enter(MenuState::Browse);
                ports.display(DisplayCommand::Clear);
                self.screen.render(ports);
                return;
            }
            MenuItemKind::Date => Page::date(self.screen.now),
            MenuItemKind::Time => Page::time(self.screen.now, true),
            MenuItemKind::AlarmTime => Page::time(self.screen.alarm.time_beg, false),
            MenuItemKind::AlarmConfig => Page::alarm_config(self.screen.alarm),
            MenuItemKind::Relay => Page::relay_range(self.screen.relay),
            MenuItemKind::System => Page::system(self.system),
        };
        ports.display(DisplayCommand::Clear);
        ports.display(DisplayCommand::print(0, 0, item.header));
        page.render(ports);
        self.page = Some(page);
        self.enter(MenuState::Edit);
    }

    fn close<P: Ports>(&mut self, verdict: Verdict, ports: &mut P) {
        let page = self.page.take();
        debug!("{} closed with {}", self.current_item().name, verdict);
        if let (Verdict::Apply, Some(page)) = (verdict, page) {
            self.commit(page, ports);
        }
        self.enter(MenuState::Navigate);
        ports.display(DisplayCommand::Clear);
        self.render_menu(ports);
    }

    fn commit<P: Ports>(&mut self, page: Page, ports: &mut P) {
        match (self.current_item().kind, page) {
            (MenuItemKind::Date, Page::Date { value, .. }) => {
                ports.clock(ClockCommand::SetDate(value));
            }
            (MenuItemKind::Time, Page::Time { value, .. }) => {
                ports.clock(ClockCommand::SetTimeOfDay(value));
            }
            (MenuItemKind::AlarmTime, Page::Time { value, .. }) => {
                let config = AlarmConfig {
                    time_beg: value,
                    ..self.screen.alarm
                };
                ports.scheduler(SchedulerCommand::SetAlarmConfig(config));
            }
            (MenuItemKind::AlarmConfig, Page::AlarmConfig { value, .. }) => {
                let config = AlarmConfig {
                    duration: value.duration,
                    enabled: value.enabled,
                    ..self.screen.alarm
                };
                ports.scheduler(SchedulerCommand::SetAlarmConfig(config));
            }
            (MenuItemKind::Relay, Page::RelayRange { value, .. }) => {
                let config = RelayConfig {
                    time_beg: value.time_beg,
                    time_end: value.time_end,
                    ..self.screen.relay
                };
                ports.scheduler(SchedulerCommand::SetRelayConfig(config));
            }
            (MenuItemKind::System, Page::System { value, .. }) => {
                self.system = value;
                ports.display(DisplayCommand::SetBacklight(value.backlight));
            }
            _ => warn!("page does not match menu entry"),
        }
    }

    fn render_menu<P: Ports>(&self, ports: &mut P) {
        let item = self.current_item();
        let mut line = Line::new();
        let _ = write!(line, "  -> {:<15}", item.name);
        ports.display(DisplayCommand::print(0, 0, "Menu"));
        ports.display(DisplayCommand::print(1, 0, &line));
        let mut help = Line::new();
        let _ = write!(help, "{:<w$}", item.header, w = usize::from(DISPLAY_COLS));
        ports.display(DisplayCommand::print(3, 0, &help));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MenuEvent::{MoveBack as Back, MoveFwd as Fwd, PushButton as Push};
    use crate::datetime::Field;
    use crate::testing::{RecordingPorts, Sent};
    use crate::window::{AlarmEvent, Transition, WindowState};

    fn controller() -> MenuController {
        MenuController::new(
            DateTime::from_ymd_hms(2025, 6, 19, 11, 59, 55).unwrap(),
            AlarmConfig::with_defaults().unwrap(),
            RelayConfig::with_defaults().unwrap(),
        )
    }

    fn feed(menu: &mut MenuController, ports: &mut RecordingPorts, events: &[MenuEvent]) {
        for &ev in events {
            menu.handle(UiEvent::Menu(ev), ports);
        }
    }

    fn scheduler_commands(ports: &RecordingPorts) -> Vec<SchedulerCommand> {
        ports
            .sent
            .iter()
            .filter_map(|s| match s {
                Sent::Scheduler(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn button_opens_menu_on_exit() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        assert_eq!(menu.state(), MenuState::Browse);

        feed(&mut menu, &mut ports, &[Push]);
        assert_eq!(menu.state(), MenuState::Navigate);
        assert_eq!(menu.current_item().kind, MenuItemKind::Exit);
        assert!(ports.sent.contains(&Sent::Sound(SoundCue::MenuBeep)));

        let screen = ports.screen();
        assert_eq!(screen.row(0), "Menu                ");
        assert_eq!(screen.row(1), "  -> Exit           ");
        assert_eq!(screen.row(3), "Exit Menu           ");
    }

    #[test]
    fn navigation_wraps_around() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        feed(&mut menu, &mut ports, &[Push, Back]);
        assert_eq!(menu.current_item().kind, MenuItemKind::System);
        feed(&mut menu, &mut ports, &[Fwd, Fwd]);
        assert_eq!(menu.current_item().kind, MenuItemKind::Date);
        feed(&mut menu, &mut ports, &[Back]);
        assert_eq!(menu.current_item().kind, MenuItemKind::Exit);
    }

    #[test]
    fn n_steps_return_to_the_start() {
        let mut menu = controller();
        for start in 0..MENU_ITEMS.len() {
            menu.current = start;
            for _ in 0..MENU_ITEMS.len() {
                menu.next_item();
            }
            assert_eq!(menu.current_item().index, start);
            for _ in 0..MENU_ITEMS.len() {
                menu.prev_item();
            }
            assert_eq!(menu.current_item().index, start);
        }
    }

    #[test]
    fn exit_returns_to_browse() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        feed(&mut menu, &mut ports, &[Push]);
        ports.sent.clear();
        feed(&mut menu, &mut ports, &[Push]);
        assert_eq!(menu.state(), MenuState::Browse);
        assert!(ports.sent.contains(&Sent::Display(DisplayCommand::Clear)));
        assert!(ports.screen().row(0).contains("11:59:55"));
    }

    #[test]
    fn entering_edit_shows_header_and_page() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        // Exit -> Date
        feed(&mut menu, &mut ports, &[Push, Fwd, Push]);
        assert_eq!(menu.state(), MenuState::Edit);
        assert!(matches!(menu.page(), Some(Page::Date { .. })));
        let screen = ports.screen();
        assert_eq!(screen.row(0), "Set Clock Date      ");
        assert_eq!(screen.row(1), "    2025.06.19      ");
        assert_eq!(screen.row(3), "^ Cancel            ");
    }

    #[test]
    fn cancel_discards_the_working_copy() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        // Exit -> Alarm Config, raise the duration, back to Cancel
        feed(&mut menu, &mut ports, &[Push, Fwd, Fwd, Fwd, Fwd, Push]);
        assert!(matches!(menu.page(), Some(Page::AlarmConfig { .. })));
        feed(&mut menu, &mut ports, &[Fwd, Push, Fwd, Fwd, Push, Back, Push]);

        assert_eq!(menu.state(), MenuState::Navigate);
        assert!(menu.page().is_none());
        assert!(scheduler_commands(&ports).is_empty());
        assert!(!ports.sent.iter().any(|s| matches!(s, Sent::Clock(_))));
        assert_eq!(menu.current_item().kind, MenuItemKind::AlarmConfig);
    }

    #[test]
    fn apply_commits_only_the_edited_fields() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        let before = menu.screen().alarm;
        feed(&mut menu, &mut ports, &[Push, Fwd, Fwd, Fwd, Fwd, Push]);
        // duration 10 -> 12, then Apply
        feed(&mut menu, &mut ports, &[Fwd, Push, Fwd, Fwd, Push, Fwd, Fwd, Push]);

        assert_eq!(menu.state(), MenuState::Navigate);
        assert_eq!(
            scheduler_commands(&ports),
            vec![SchedulerCommand::SetAlarmConfig(AlarmConfig {
                duration: 12,
                ..before
            })]
        );
    }

    #[test]
    fn relay_apply_keeps_enabled_flag() {
        let relay = RelayConfig {
            enabled: false,
            ..RelayConfig::with_defaults().unwrap()
        };
        let mut menu = MenuController::new(
            DateTime::from_ymd_hms(2025, 6, 19, 11, 59, 55).unwrap(),
            AlarmConfig::with_defaults().unwrap(),
            relay,
        );
        let mut ports = RecordingPorts::default();
        feed(&mut menu, &mut ports, &[Push, Fwd, Fwd, Fwd, Fwd, Fwd, Push]);
        assert!(matches!(menu.page(), Some(Page::RelayRange { .. })));
        // begin hour 12 -> 13, end minute 01 -> 00, Apply
        feed(&mut menu, &mut ports, &[Fwd, Push, Fwd, Push]);
        feed(&mut menu, &mut ports, &[Fwd, Fwd, Fwd, Push, Back, Push, Fwd, Push]);

        let mut expected = relay;
        expected.time_beg.roll(Field::Hour, true);
        expected.time_end.roll(Field::Minute, false);
        assert_eq!(expected.time_beg.hour(), 13);
        assert_eq!(expected.time_end.minute(), 0);
        assert_eq!(
            scheduler_commands(&ports),
            vec![SchedulerCommand::SetRelayConfig(expected)]
        );
        assert_eq!(menu.state(), MenuState::Navigate);
    }

    #[test]
    fn applying_time_sets_only_the_time_of_day() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        feed(&mut menu, &mut ports, &[Push, Fwd, Fwd, Push]);
        assert!(matches!(menu.page(), Some(Page::Time { seconds: true, .. })));
        // minute 59 -> 00 without touching the hour, Apply
        feed(&mut menu, &mut ports, &[Fwd, Fwd, Push, Fwd, Push, Fwd, Fwd, Push]);

        let clock: Vec<_> = ports
            .sent
            .iter()
            .filter_map(|s| match s {
                Sent::Clock(cmd) => Some(*cmd),
                _ => None,
            })
            .collect();
        let expected = DateTime::from_ymd_hms(2025, 6, 19, 11, 0, 55).unwrap();
        assert_eq!(clock, vec![ClockCommand::SetTimeOfDay(expected)]);
        assert!(scheduler_commands(&ports).is_empty());
    }

    #[test]
    fn applying_date_sets_only_the_date() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        feed(&mut menu, &mut ports, &[Push, Fwd, Push]);
        // day 19 -> 20, Apply
        feed(&mut menu, &mut ports, &[Fwd, Fwd, Fwd, Push, Fwd, Push, Fwd, Push]);
        let expected = DateTime::from_ymd_hms(2025, 6, 20, 11, 59, 55).unwrap();
        assert!(ports
            .sent
            .contains(&Sent::Clock(ClockCommand::SetDate(expected))));
    }

    #[test]
    fn alarm_time_edit_keeps_duration() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        feed(&mut menu, &mut ports, &[Push, Fwd, Fwd, Fwd, Push]);
        assert!(matches!(menu.page(), Some(Page::Time { seconds: false, .. })));
        // hour 12 -> 7
        feed(&mut menu, &mut ports, &[Fwd, Push, Back, Back, Back, Back, Back, Push]);
        feed(&mut menu, &mut ports, &[Fwd, Fwd, Push]);
        let commands = scheduler_commands(&ports);
        let [SchedulerCommand::SetAlarmConfig(config)] = commands.as_slice() else {
            panic!("expected one alarm update");
        };
        assert_eq!(config.time_beg.hour(), 7);
        assert_eq!(config.duration, 10);
        assert!(config.enabled);
    }

    #[test]
    fn system_apply_switches_backlight() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        feed(&mut menu, &mut ports, &[Push, Back, Push]);
        feed(&mut menu, &mut ports, &[Fwd, Push, Back, Push, Fwd, Fwd, Push]);
        assert!(ports.sent.contains(&Sent::Display(DisplayCommand::SetBacklight(false))));
        assert!(!menu.system().backlight);
        assert!(menu.system().chime);
    }

    #[test]
    fn ticks_drive_schedulers_only_in_browse() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        let now = DateTime::from_ymd_hms(2025, 6, 19, 11, 59, 56).unwrap();
        menu.handle(UiEvent::Clock(ClockEvent::Tick { now }), &mut ports);
        assert_eq!(scheduler_commands(&ports), vec![SchedulerCommand::Evaluate(now)]);
        assert!(ports.sent.contains(&Sent::Actuator(ActuatorCommand::PulseTickLed)));
        assert!(ports.screen().row(0).contains("11:59:56"));

        feed(&mut menu, &mut ports, &[Push]);
        ports.sent.clear();
        let later = DateTime::from_ymd_hms(2025, 6, 19, 11, 59, 57).unwrap();
        menu.handle(UiEvent::Clock(ClockEvent::Tick { now: later }), &mut ports);
        assert!(ports.sent.is_empty());
        assert_eq!(menu.screen().now, later);
    }

    #[test]
    fn hourly_chime_at_the_full_hour() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        let noon = DateTime::from_ymd_hms(2025, 6, 19, 12, 0, 0).unwrap();
        menu.handle(UiEvent::Clock(ClockEvent::Tick { now: noon }), &mut ports);
        assert!(ports.sent.contains(&Sent::Sound(SoundCue::HourlyChime)));

        ports.sent.clear();
        let later = DateTime::from_ymd_hms(2025, 6, 19, 12, 0, 1).unwrap();
        menu.handle(UiEvent::Clock(ClockEvent::Tick { now: later }), &mut ports);
        assert!(!ports.sent.contains(&Sent::Sound(SoundCue::HourlyChime)));
    }

    #[test]
    fn window_events_refresh_the_cache_not_the_menu() {
        let mut menu = controller();
        let mut ports = RecordingPorts::default();
        feed(&mut menu, &mut ports, &[Push]);
        ports.sent.clear();

        let ev = AlarmEvent {
            transition: Transition::On,
            state: WindowState { ringing: true },
            config: menu.screen().alarm,
        };
        menu.handle(UiEvent::Alarm(ev), &mut ports);
        assert!(menu.screen().alarm_state.ringing);
        assert!(ports.sent.is_empty());
    }
}
