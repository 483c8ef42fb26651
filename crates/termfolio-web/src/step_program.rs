#![forbid(unsafe_code)]

//! One model step per host callback.
//!
//! A typical `requestAnimationFrame` handler queues whatever input arrived,
//! moves the clock, steps, and swaps in the new HTML when a frame was drawn:
//!
//! ```ignore
//! let mut term = StepProgram::new(app, 80, 24);
//! term.init()?;
//!
//! term.set_time(Duration::from_secs_f64(timestamp_ms / 1000.0));
//! if term.step()?.rendered {
//!     container.set_inner_html(&term.take_outputs().last_html.unwrap_or_default());
//! }
//! ```

use core::time::Duration;

use termfolio_core::event::Event;
use termfolio_render::Frame;
use termfolio_runtime::program::{Cmd, Model};
use termfolio_runtime::subscription::TimerSet;

use crate::{DeterministicClock, WebError, WebEventSource, WebOutputs};

/// What one [`StepProgram::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// `false` once the model quit or the host tore it down.
    pub running: bool,
    pub rendered: bool,
    pub events_processed: u32,
    pub timers_fired: u32,
    /// Frames rendered so far, including the one from `init`.
    pub frame_idx: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    Stopped,
    TornDown,
}

pub struct StepProgram<M: Model> {
    model: M,
    clock: DeterministicClock,
    events: WebEventSource,
    timers: TimerSet<M::Message>,
    outputs: WebOutputs,
    phase: Phase,
    needs_redraw: bool,
    frame_idx: u64,
}

impl<M: Model> StepProgram<M> {
    /// `width` and `height` are in cells.
    #[must_use]
    pub fn new(model: M, width: u16, height: u16) -> Self {
        Self {
            model,
            clock: DeterministicClock::new(),
            events: WebEventSource::new(width, height),
            timers: TimerSet::new(),
            outputs: WebOutputs::default(),
            phase: Phase::Created,
            needs_redraw: true,
            frame_idx: 0,
        }
    }

    /// Run `Model::init` and draw the first frame.
    ///
    /// # Errors
    ///
    /// [`WebError::AlreadyInitialized`] on any call after the first.
    pub fn init(&mut self) -> Result<(), WebError> {
        if self.phase != Phase::Created {
            return Err(WebError::AlreadyInitialized);
        }
        self.phase = Phase::Running;
        let cmd = self.model.init();
        self.apply(cmd);
        self.sync_timers();
        if self.is_running() {
            self.draw()?;
        }
        Ok(())
    }

    /// Fire timers due by the current clock, drain queued input, and draw
    /// if anything changed. A stopped program steps as a no-op.
    ///
    /// # Errors
    ///
    /// [`WebError::NotInitialized`] before [`init`](Self::init), or a frame
    /// that fails to serialize.
    pub fn step(&mut self) -> Result<StepResult, WebError> {
        if self.phase == Phase::Created {
            return Err(WebError::NotInitialized);
        }

        // Timers catch up to host time first, so anything the queued input
        // starts is scheduled from `now` and not from the previous step.
        let now = self.clock.now();
        let mut timers_fired = 0;
        while self.is_running() {
            let Some(msg) = self.timers.poll(now) else {
                break;
            };
            self.deliver(msg);
            timers_fired += 1;
        }
        self.timers.set_now(now);

        let mut events_processed = 0;
        while self.is_running() {
            let Some(event) = self.events.read_event() else {
                break;
            };
            if matches!(event, Event::Resize { .. }) {
                self.needs_redraw = true;
            }
            self.deliver(M::Message::from(event));
            events_processed += 1;
        }

        let rendered = self.is_running() && self.needs_redraw;
        if rendered {
            self.draw()?;
        }
        Ok(StepResult {
            running: self.is_running(),
            rendered,
            events_processed,
            timers_fired,
            frame_idx: self.frame_idx,
        })
    }

    /// Queue an event for the next step. Resizes take effect right away for
    /// [`size`](Self::size).
    pub fn push_event(&mut self, event: Event) {
        if let Event::Resize { width, height } = event {
            self.events.set_size(width, height);
        }
        self.events.push_event(event);
    }

    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Absolute host time, e.g. the `requestAnimationFrame` timestamp.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.push_event(Event::Resize { width, height });
    }

    /// Stop every timer and call `Model::on_shutdown` once. Steps after
    /// this do nothing.
    pub fn teardown(&mut self) {
        if self.phase == Phase::TornDown {
            return;
        }
        self.phase = Phase::TornDown;
        self.timers.stop_all();
        self.model.on_shutdown();
        tracing::debug!(target: "termfolio.web", frame_idx = self.frame_idx, "step program torn down");
    }

    /// Hand the outputs to the host and start collecting afresh.
    pub fn take_outputs(&mut self) -> WebOutputs {
        std::mem::take(&mut self.outputs)
    }

    pub fn outputs(&self) -> &WebOutputs {
        &self.outputs
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_initialized(&self) -> bool {
        self.phase != Phase::Created
    }

    pub fn frame_idx(&self) -> u64 {
        self.frame_idx
    }

    /// Viewport in cells.
    pub fn size(&self) -> (u16, u16) {
        self.events.size()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn active_timers(&self) -> usize {
        self.timers.active_count()
    }

    fn deliver(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.needs_redraw = true;
        self.apply(cmd);
        self.sync_timers();
    }

    fn sync_timers(&mut self) {
        if self.is_running() {
            self.timers.reconcile(self.model.subscriptions());
        } else {
            self.timers.stop_all();
        }
    }

    fn apply(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.phase = Phase::Stopped,
            Cmd::Msg(msg) => {
                let next = self.model.update(msg);
                self.apply(next);
            }
            Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                for cmd in cmds {
                    if !self.is_running() {
                        break;
                    }
                    self.apply(cmd);
                }
            }
            Cmd::Log(text) => self.outputs.logs.push(text),
        }
    }

    fn draw(&mut self) -> Result<(), WebError> {
        let (width, height) = self.events.size();
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        self.outputs.record_frame(frame)?;
        self.needs_redraw = false;
        self.frame_idx += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termfolio_core::event::KeyCode;
    use termfolio_render::{Line, Style};
    use termfolio_runtime::subscription::{Every, Subscription};

    struct Blinker {
        on: bool,
        blinks: u32,
        running_timer: bool,
        shutdowns: u32,
    }

    #[derive(Debug)]
    enum Msg {
        Blink,
        Toggle,
        Quit,
        Other,
    }

    impl From<Event> for Msg {
        fn from(event: Event) -> Self {
            match event {
                Event::Key(k) if k.is_char(' ') => Msg::Toggle,
                Event::Key(k) if k.is_char('q') => Msg::Quit,
                _ => Msg::Other,
            }
        }
    }

    impl Model for Blinker {
        type Message = Msg;

        fn init(&mut self) -> Cmd<Msg> {
            Cmd::log("booted")
        }

        fn update(&mut self, msg: Msg) -> Cmd<Msg> {
            match msg {
                Msg::Blink => {
                    self.on = !self.on;
                    self.blinks += 1;
                }
                Msg::Toggle => self.running_timer = !self.running_timer,
                Msg::Quit => return Cmd::quit(),
                Msg::Other => {}
            }
            Cmd::none()
        }

        fn view(&self, frame: &mut Frame) {
            let text = if self.on { "on" } else { "off" };
            frame.push_line(Line::styled(text, Style::new()));
        }

        fn subscriptions(&self) -> Vec<Box<dyn Subscription<Msg>>> {
            if self.running_timer {
                vec![Box::new(Every::new(Duration::from_millis(100), || Msg::Blink))]
            } else {
                vec![]
            }
        }

        fn on_shutdown(&mut self) {
            self.shutdowns += 1;
        }
    }

    fn program() -> StepProgram<Blinker> {
        StepProgram::new(
            Blinker {
                on: false,
                blinks: 0,
                running_timer: false,
                shutdowns: 0,
            },
            20,
            4,
        )
    }

    #[test]
    fn init_renders_and_collects_logs() {
        let mut prog = program();
        prog.init().expect("init");
        let outputs = prog.take_outputs();
        assert_eq!(outputs.logs, vec!["booted".to_owned()]);
        assert_eq!(outputs.last_frame.expect("frame").text_rows(), vec!["off"]);
        assert_eq!(prog.frame_idx(), 1);
    }

    #[test]
    fn init_twice_and_step_before_init_are_errors() {
        let mut prog = program();
        assert!(matches!(prog.step(), Err(WebError::NotInitialized)));
        prog.init().expect("init");
        assert!(matches!(prog.init(), Err(WebError::AlreadyInitialized)));
    }

    #[test]
    fn timers_follow_the_host_clock() {
        let mut prog = program();
        prog.init().expect("init");
        prog.push_event(Event::key(KeyCode::Char(' ')));
        let result = prog.step().expect("step");
        assert_eq!(result.events_processed, 1);
        assert_eq!(result.timers_fired, 0);

        prog.advance_time(Duration::from_millis(250));
        let result = prog.step().expect("step");
        assert_eq!(result.timers_fired, 2);
        assert_eq!(prog.model().blinks, 2);

        prog.advance_time(Duration::from_millis(50));
        assert_eq!(prog.step().expect("step").timers_fired, 1);
    }

    #[test]
    fn timers_started_by_input_count_from_host_time() {
        let mut prog = program();
        prog.init().expect("init");
        prog.advance_time(Duration::from_secs(5));
        prog.push_event(Event::key(KeyCode::Char(' ')));
        let result = prog.step().expect("step");
        assert_eq!(result.events_processed, 1);
        assert_eq!(result.timers_fired, 0);
        assert_eq!(prog.model().blinks, 0);

        prog.advance_time(Duration::from_millis(99));
        assert_eq!(prog.step().expect("step").timers_fired, 0);
        prog.advance_time(Duration::from_millis(1));
        assert_eq!(prog.step().expect("step").timers_fired, 1);
    }

    #[test]
    fn idle_step_does_not_render() {
        let mut prog = program();
        prog.init().expect("init");
        let result = prog.step().expect("step");
        assert!(!result.rendered);
        assert_eq!(result.frame_idx, 1);
    }

    #[test]
    fn teardown_stops_timers_and_calls_hook_once() {
        let mut prog = program();
        prog.init().expect("init");
        prog.push_event(Event::key(KeyCode::Char(' ')));
        prog.step().expect("step");
        assert_eq!(prog.active_timers(), 1);

        prog.teardown();
        prog.teardown();
        prog.advance_time(Duration::from_secs(5));
        let result = prog.step().expect("step");
        assert!(!result.running);
        assert_eq!(prog.model().blinks, 0);
        assert_eq!(prog.model().shutdowns, 1);
        assert_eq!(prog.active_timers(), 0);
    }

    #[test]
    fn resize_changes_frame_size() {
        let mut prog = program();
        prog.init().expect("init");
        prog.resize(40, 10);
        assert!(prog.step().expect("step").rendered);
        let frame = prog.take_outputs().last_frame.expect("frame");
        assert_eq!((frame.width(), frame.height()), (40, 10));
    }

    #[test]
    fn quit_stops_processing() {
        let mut prog = program();
        prog.init().expect("init");
        prog.push_event(Event::key(KeyCode::Char('q')));
        prog.push_event(Event::key(KeyCode::Char(' ')));
        let result = prog.step().expect("step");
        assert!(!result.running);
        assert_eq!(result.events_processed, 1);
        assert!(!prog.model().running_timer);
    }
}
