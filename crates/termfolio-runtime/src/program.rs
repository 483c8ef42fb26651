#![forbid(unsafe_code)]

//! The model contract and the commands it hands back.
//!
//! A [`Model`] owns all state. Hosts feed it messages, apply the [`Cmd`] it
//! returns, re-read its subscriptions, and ask it to draw. The same model runs
//! under the native [`Program`], the [`ProgramSimulator`](crate::ProgramSimulator)
//! and the browser stepper.
//!
//! ```ignore
//! impl Model for Clock {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Tick => self.ticks += 1,
//!             Msg::Key(k) if k.is_ctrl_char('c') => return Cmd::quit(),
//!             Msg::Key(_) => {}
//!         }
//!         Cmd::none()
//!     }
//!
//!     fn view(&self, frame: &mut Frame) {
//!         frame.push_line(Line::raw(self.ticks.to_string()));
//!     }
//!
//!     fn subscriptions(&self) -> Vec<Box<dyn Subscription<Msg>>> {
//!         vec![Box::new(Every::new(Duration::from_secs(1), || Msg::Tick))]
//!     }
//! }
//! ```

use termfolio_core::event::Event;
use termfolio_render::Frame;

use crate::subscription::Subscription;

pub trait Model: Sized {
    /// Host events arrive through `From<Event>`.
    type Message: From<Event> + Send + 'static;

    /// Runs once, before the first frame.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Draw into a frame already sized to the viewport.
    fn view(&self, frame: &mut Frame);

    /// The timers that should be running right now.
    ///
    /// Re-read after every update and reconciled by id, so returning the
    /// same set again is free and an empty set stops everything.
    fn subscriptions(&self) -> Vec<Box<dyn Subscription<Self::Message>>> {
        Vec::new()
    }

    /// Last call before the host lets go. Timers are already stopped and
    /// nothing is delivered afterwards.
    fn on_shutdown(&mut self) {}
}

/// What the model asks the host to do after an update.
#[derive(Debug, Default)]
pub enum Cmd<M> {
    #[default]
    None,
    /// Stop the loop. Anything queued after it is dropped.
    Quit,
    /// Run in order. Hosts do not reorder batches either.
    Batch(Vec<Cmd<M>>),
    Sequence(Vec<Cmd<M>>),
    /// Feed a message straight back into `update`.
    Msg(M),
    /// A diagnostic line. Goes to tracing natively and to the captured logs
    /// under the simulator and the stepper, never to the screen.
    Log(String),
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// `None`s are dropped and a single survivor is returned unwrapped.
    pub fn batch(cmds: Vec<Self>) -> Self {
        Self::collapse(cmds, Self::Batch)
    }

    /// Same collapsing rules as [`batch`](Self::batch).
    pub fn sequence(cmds: Vec<Self>) -> Self {
        Self::collapse(cmds, Self::Sequence)
    }

    fn collapse(cmds: Vec<Self>, wrap: fn(Vec<Self>) -> Self) -> Self {
        let mut kept: Vec<Self> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Self::None))
            .collect();
        if kept.len() > 1 {
            wrap(kept)
        } else {
            kept.pop().unwrap_or_default()
        }
    }

    /// Variant name, for logs and command records.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Sequence(_) => "Sequence",
            Self::Msg(_) => "Msg",
            Self::Log(_) => "Log",
        }
    }

    /// True if a `Quit` appears anywhere inside.
    pub fn quits(&self) -> bool {
        match self {
            Self::Quit => true,
            Self::Batch(cmds) | Self::Sequence(cmds) => cmds.iter().any(Self::quits),
            Self::None | Self::Msg(_) | Self::Log(_) => false,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::{Program, ProgramConfig};

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::{self, Stdout};
    use std::time::{Duration, Instant};

    use termfolio_core::event::Event;
    use termfolio_core::terminal_session::{SessionOptions, TerminalSession};
    use termfolio_render::Frame;
    use termfolio_render::presenter::Presenter;
    use tracing::{debug, debug_span, info, info_span, trace};

    use super::{Cmd, Model};
    use crate::subscription::SubscriptionManager;

    /// Keeps a fast timer from starving input.
    const MAX_TIMER_MESSAGES_PER_PUMP: usize = 256;

    #[derive(Debug, Clone)]
    pub struct ProgramConfig {
        /// `false` draws inline over the visible screen.
        pub alternate_screen: bool,
        /// Needed for click-to-focus.
        pub mouse: bool,
        /// Longest wait for input before timer messages are looked at.
        pub poll_interval: Duration,
        /// Quit by itself after this long (smoke runs).
        pub exit_after: Option<Duration>,
    }

    impl Default for ProgramConfig {
        fn default() -> Self {
            Self {
                alternate_screen: true,
                mouse: true,
                poll_interval: Duration::from_millis(5),
                exit_after: None,
            }
        }
    }

    impl ProgramConfig {
        fn session_options(&self) -> SessionOptions {
            SessionOptions {
                alternate_screen: self.alternate_screen,
                ..SessionOptions::fullscreen(self.mouse)
            }
        }
    }

    /// Native host: raw-mode terminal, threaded timers, wall clock.
    pub struct Program<M: Model> {
        model: M,
        session: TerminalSession,
        presenter: Presenter<Stdout>,
        timers: SubscriptionManager<M::Message>,
        config: ProgramConfig,
        viewport: (u16, u16),
        running: bool,
        needs_redraw: bool,
    }

    impl<M: Model> Program<M> {
        /// # Errors
        ///
        /// Fails when raw mode or the terminal size are unavailable.
        pub fn new(model: M, config: ProgramConfig) -> io::Result<Self> {
            let session = TerminalSession::new(config.session_options())?;
            let viewport = session.size()?;
            Ok(Self {
                model,
                session,
                presenter: Presenter::new(io::stdout()),
                timers: SubscriptionManager::new(),
                config,
                viewport,
                running: true,
                needs_redraw: true,
            })
        }

        /// Drive the model until it quits and hand it back.
        ///
        /// Timers are stopped and `on_shutdown` runs on every exit path. The
        /// terminal itself is restored when the session drops.
        pub fn run(mut self) -> io::Result<M> {
            let outcome = self.event_loop();
            self.timers.stop_all();
            self.model.on_shutdown();
            info!(target: "termfolio.runtime", ok = outcome.is_ok(), "program stopped");
            outcome.map(|()| self.model)
        }

        fn event_loop(&mut self) -> io::Result<()> {
            let cmd = info_span!("termfolio.program.init").in_scope(|| self.model.init());
            self.apply(cmd);
            self.timers.reconcile(self.model.subscriptions());
            self.draw()?;

            let started = Instant::now();
            while self.running {
                if let Some(limit) = self.config.exit_after {
                    if started.elapsed() >= limit {
                        info!(target: "termfolio.runtime", ?limit, "exit-after deadline reached");
                        return Ok(());
                    }
                }
                self.pump_input()?;
                self.pump_timers();
                if self.running && self.needs_redraw {
                    self.draw()?;
                }
            }
            Ok(())
        }

        /// Wait up to one poll interval, then take every event already queued.
        fn pump_input(&mut self) -> io::Result<()> {
            let mut wait = self.config.poll_interval;
            while self.running && self.session.poll_event(wait)? {
                if let Some(event) = self.session.read_event()? {
                    self.on_event(event);
                }
                wait = Duration::ZERO;
            }
            Ok(())
        }

        /// Deliver timer messages one by one. Each delivery may reconcile, so
        /// the next read only sees subscriptions that are still wanted.
        fn pump_timers(&mut self) {
            for _ in 0..MAX_TIMER_MESSAGES_PER_PUMP {
                if !self.running {
                    return;
                }
                let Some(msg) = self.timers.next_message() else {
                    return;
                };
                self.deliver(msg);
            }
        }

        fn on_event(&mut self, event: Event) {
            if let Event::Resize { width, height } = event {
                self.viewport = (width, height);
                self.presenter.invalidate();
            }
            self.deliver(M::Message::from(event));
        }

        fn deliver(&mut self, msg: M::Message) {
            let cmd = debug_span!("termfolio.program.update").in_scope(|| self.model.update(msg));
            self.needs_redraw = true;
            self.apply(cmd);
            self.timers.reconcile(self.model.subscriptions());
        }

        fn apply(&mut self, cmd: Cmd<M::Message>) {
            match cmd {
                Cmd::None => {}
                Cmd::Quit => {
                    debug!(target: "termfolio.runtime", "quit requested");
                    self.running = false;
                }
                Cmd::Msg(msg) => {
                    let next = self.model.update(msg);
                    self.apply(next);
                }
                Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                    for cmd in cmds {
                        if !self.running {
                            break;
                        }
                        self.apply(cmd);
                    }
                }
                Cmd::Log(text) => info!(target: "termfolio.app", "{text}"),
            }
        }

        fn draw(&mut self) -> io::Result<()> {
            let (width, height) = self.viewport;
            let mut frame = Frame::new(width, height);
            self.model.view(&mut frame);
            let rows = self.presenter.present(&frame)?;
            trace!(target: "termfolio.runtime", rows, "frame presented");
            self.needs_redraw = false;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_collapses_trivial_cases() {
        assert!(matches!(Cmd::<()>::batch(vec![]), Cmd::None));
        assert!(matches!(Cmd::<()>::batch(vec![Cmd::quit()]), Cmd::Quit));
        assert!(matches!(
            Cmd::<()>::batch(vec![Cmd::none(), Cmd::log("a")]),
            Cmd::Log(_)
        ));
        assert!(matches!(
            Cmd::<()>::sequence(vec![Cmd::log("a"), Cmd::log("b")]),
            Cmd::Sequence(ref v) if v.len() == 2
        ));
    }

    #[test]
    fn quits_sees_nested_quit() {
        let cmd = Cmd::<()>::batch(vec![Cmd::log("x"), Cmd::sequence(vec![Cmd::log("y"), Cmd::quit()])]);
        assert!(cmd.quits());
        assert!(!Cmd::<()>::log("x").quits());
    }

    #[test]
    fn type_names_are_stable() {
        assert_eq!(Cmd::<()>::none().type_name(), "None");
        assert_eq!(Cmd::msg(()).type_name(), "Msg");
        assert_eq!(Cmd::<()>::log("x").type_name(), "Log");
    }
}
