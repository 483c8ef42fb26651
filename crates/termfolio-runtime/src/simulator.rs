#![forbid(unsafe_code)]

//! Headless host for tests.
//!
//! Runs a [`Model`] with no terminal and a clock that only moves when told
//! to. Periodic subscriptions go through a [`TimerSet`], so a test that
//! advances 50 ms sees exactly the ticks due in those 50 ms.
//!
//! ```ignore
//! let mut sim = ProgramSimulator::new(app);
//! sim.init();
//! sim.advance_time(Duration::from_millis(50));
//! assert_eq!(sim.capture_frame(80, 24).text_rows()[0], "Initi");
//! ```

use std::time::Duration;

use termfolio_core::event::Event;
use termfolio_render::Frame;

use crate::program::{Cmd, Model};
use crate::subscription::TimerSet;

/// Shape of a command the model returned, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    Quit,
    Msg,
    /// Number of children.
    Batch(usize),
    Sequence(usize),
    Log(String),
}

pub struct ProgramSimulator<M: Model> {
    model: M,
    timers: TimerSet<M::Message>,
    frames: Vec<Frame>,
    records: Vec<CmdRecord>,
    logs: Vec<String>,
    running: bool,
    shut_down: bool,
}

impl<M: Model> ProgramSimulator<M> {
    /// Nothing runs until [`init`](Self::init).
    pub fn new(model: M) -> Self {
        Self {
            model,
            timers: TimerSet::new(),
            frames: Vec::new(),
            records: Vec::new(),
            logs: Vec::new(),
            running: true,
            shut_down: false,
        }
    }

    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.apply(cmd);
        self.sync_timers();
    }

    /// Deliver events in order. Delivery stops at the first quit.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            self.send(M::Message::from(event.clone()));
        }
    }

    pub fn inject_event(&mut self, event: Event) {
        self.send(M::Message::from(event));
    }

    /// Deliver a message directly. Ignored once the program stopped.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.apply(cmd);
        self.sync_timers();
    }

    /// Move the clock forward by `dt`, firing every timer due on the way.
    ///
    /// Timers are re-read from the model after each firing, so one the
    /// model drops never fires again inside the same window.
    pub fn advance_time(&mut self, dt: Duration) {
        let deadline = self.timers.now() + dt;
        while self.running {
            match self.timers.poll(deadline) {
                Some(msg) => self.send(msg),
                None => break,
            }
        }
        self.timers.set_now(deadline);
    }

    /// Jump from firing to firing until no timer is left or `limit` passed.
    ///
    /// `true` when the model went quiet in time.
    pub fn run_until_idle(&mut self, limit: Duration) -> bool {
        let deadline = self.timers.now() + limit;
        while let Some(due) = self.timers.next_due().filter(|due| *due <= deadline) {
            if !self.running {
                break;
            }
            self.advance_time(due.saturating_sub(self.timers.now()));
        }
        self.timers.active_count() == 0
    }

    /// Stop timers, then call `Model::on_shutdown`. Idempotent.
    pub fn shutdown(&mut self) {
        if std::mem::replace(&mut self.shut_down, true) {
            return;
        }
        self.timers.stop_all();
        self.running = false;
        self.model.on_shutdown();
    }

    /// Render into a fresh `width` x `height` frame and keep it.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Frame {
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        self.frames.push(frame);
        &self.frames[self.frames.len() - 1]
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// `false` after a quit or [`shutdown`](Self::shutdown).
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn active_timers(&self) -> usize {
        self.timers.active_count()
    }

    /// Text of every `Cmd::Log`.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.records
    }

    fn sync_timers(&mut self) {
        if self.running {
            self.timers.reconcile(self.model.subscriptions());
        } else {
            self.timers.stop_all();
        }
    }

    fn apply(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                self.records.push(CmdRecord::Quit);
                self.running = false;
            }
            Cmd::Msg(msg) => {
                self.records.push(CmdRecord::Msg);
                let next = self.model.update(msg);
                self.apply(next);
            }
            Cmd::Batch(cmds) => {
                self.records.push(CmdRecord::Batch(cmds.len()));
                self.apply_in_order(cmds);
            }
            Cmd::Sequence(cmds) => {
                self.records.push(CmdRecord::Sequence(cmds.len()));
                self.apply_in_order(cmds);
            }
            Cmd::Log(text) => {
                self.records.push(CmdRecord::Log(text.clone()));
                self.logs.push(text);
            }
        }
    }

    fn apply_in_order(&mut self, cmds: Vec<Cmd<M::Message>>) {
        for cmd in cmds {
            if !self.running {
                return;
            }
            self.apply(cmd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::{Every, Subscription};
    use termfolio_core::event::KeyCode;
    use termfolio_render::{Line, Style};

    /// Counts ticks while armed; disarms itself after `limit` ticks.
    struct Countdown {
        ticks: u32,
        limit: u32,
        armed: bool,
        shutdowns: u32,
    }

    #[derive(Debug)]
    enum Msg {
        Arm,
        Tick,
        Quit,
        Ignore,
    }

    impl From<Event> for Msg {
        fn from(event: Event) -> Self {
            match event {
                Event::Key(k) if k.is_char('a') => Msg::Arm,
                Event::Key(k) if k.is_char('q') => Msg::Quit,
                _ => Msg::Ignore,
            }
        }
    }

    impl Model for Countdown {
        type Message = Msg;

        fn update(&mut self, msg: Msg) -> Cmd<Msg> {
            match msg {
                Msg::Arm => {
                    self.armed = true;
                    Cmd::log("armed")
                }
                Msg::Tick => {
                    self.ticks += 1;
                    if self.ticks >= self.limit {
                        self.armed = false;
                    }
                    Cmd::none()
                }
                Msg::Quit => Cmd::quit(),
                Msg::Ignore => Cmd::none(),
            }
        }

        fn view(&self, frame: &mut Frame) {
            frame.push_line(Line::styled(format!("ticks={}", self.ticks), Style::new()));
        }

        fn subscriptions(&self) -> Vec<Box<dyn Subscription<Msg>>> {
            if self.armed {
                vec![Box::new(Every::new(Duration::from_millis(10), || Msg::Tick))]
            } else {
                vec![]
            }
        }

        fn on_shutdown(&mut self) {
            self.shutdowns += 1;
        }
    }

    fn sim(limit: u32) -> ProgramSimulator<Countdown> {
        let mut sim = ProgramSimulator::new(Countdown {
            ticks: 0,
            limit,
            armed: false,
            shutdowns: 0,
        });
        sim.init();
        sim
    }

    #[test]
    fn no_timer_means_no_ticks() {
        let mut sim = sim(3);
        sim.advance_time(Duration::from_secs(1));
        assert_eq!(sim.model().ticks, 0);
        assert_eq!(sim.now(), Duration::from_secs(1));
    }

    #[test]
    fn timer_stops_as_soon_as_model_drops_it() {
        let mut sim = sim(3);
        sim.inject_event(Event::key(KeyCode::Char('a')));
        assert_eq!(sim.active_timers(), 1);

        sim.advance_time(Duration::from_secs(1));
        assert_eq!(sim.model().ticks, 3);
        assert_eq!(sim.active_timers(), 0);
        assert_eq!(sim.logs(), ["armed"]);
    }

    #[test]
    fn partial_window_fires_only_due_ticks() {
        let mut sim = sim(10);
        sim.inject_event(Event::key(KeyCode::Char('a')));
        sim.advance_time(Duration::from_millis(25));
        assert_eq!(sim.model().ticks, 2);
        sim.advance_time(Duration::from_millis(5));
        assert_eq!(sim.model().ticks, 3);
    }

    #[test]
    fn run_until_idle_stops_when_quiet() {
        let mut sim = sim(4);
        sim.inject_event(Event::key(KeyCode::Char('a')));
        assert!(sim.run_until_idle(Duration::from_secs(5)));
        assert_eq!(sim.model().ticks, 4);
        assert_eq!(sim.now(), Duration::from_millis(40));
    }

    #[test]
    fn shutdown_stops_timers_and_runs_hook_once() {
        let mut sim = sim(100);
        sim.inject_event(Event::key(KeyCode::Char('a')));
        sim.advance_time(Duration::from_millis(10));
        sim.shutdown();
        sim.shutdown();

        sim.advance_time(Duration::from_secs(1));
        sim.send(Msg::Tick);
        assert_eq!(sim.model().ticks, 1);
        assert_eq!(sim.model().shutdowns, 1);
        assert!(!sim.is_running());
    }

    #[test]
    fn quit_stops_delivery() {
        let mut sim = sim(100);
        sim.inject_events(&[
            Event::key(KeyCode::Char('a')),
            Event::key(KeyCode::Char('q')),
            Event::key(KeyCode::Char('a')),
        ]);
        assert!(!sim.is_running());
        assert_eq!(sim.active_timers(), 0);
        assert!(sim.command_log().contains(&CmdRecord::Quit));
    }

    #[test]
    fn capture_frame_renders_current_state() {
        let mut sim = sim(2);
        sim.inject_event(Event::key(KeyCode::Char('a')));
        sim.advance_time(Duration::from_millis(20));
        let frame = sim.capture_frame(20, 2);
        assert_eq!(frame.text_rows(), vec!["ticks=2"]);
        assert_eq!(sim.frames().len(), 1);
    }
}
