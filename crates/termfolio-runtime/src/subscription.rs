#![forbid(unsafe_code)]

//! Timers the model declares and the runtime owns.
//!
//! After every `update()` the host asks `Model::subscriptions()` for the
//! current set and reconciles by [`SubId`]: new ids start, missing ids stop,
//! unchanged ids keep running untouched. Messages come back through
//! `Model::update()`.
//!
//! [`SubscriptionManager`] runs each subscription on a thread against the
//! wall clock (native host). [`TimerSet`] runs periodic subscriptions against
//! a clock the owner moves by hand (simulator, browser stepper).

use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex, PoisonError, mpsc};
use std::thread;
use std::time::Duration;

/// Identity used to match subscriptions across reconciles.
pub type SubId = u64;

/// Smallest period a virtual timer will honor.
const MIN_VIRTUAL_PERIOD: Duration = Duration::from_millis(1);

/// A source of messages for the model.
pub trait Subscription<M: Send + 'static>: Send {
    /// Equal ids mean "the same subscription"; it is not restarted.
    fn id(&self) -> SubId;

    /// Threaded body. Send messages until `stop` fires or the receiver is gone.
    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal);

    /// Firing period, for subscriptions that are plain periodic timers.
    ///
    /// Virtual-time drivers only schedule subscriptions that report one.
    fn period(&self) -> Option<Duration> {
        None
    }

    /// Build one message, as a single firing of the timer would.
    fn emit(&self) -> Option<M> {
        None
    }
}

#[derive(Default)]
struct StopState {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Read side of a subscription's stop flag.
#[derive(Clone)]
pub struct StopSignal {
    state: Arc<StopState>,
}

impl StopSignal {
    fn pair() -> (Self, StopHandle) {
        let state = Arc::new(StopState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            StopHandle { state },
        )
    }

    pub fn is_stopped(&self) -> bool {
        *self
            .state
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep up to `duration`, waking early on stop. `true` means stopped.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let guard = self
            .state
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = self
            .state
            .wake
            .wait_timeout_while(guard, duration, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }
}

struct StopHandle {
    state: Arc<StopState>,
}

impl StopHandle {
    fn stop(&self) {
        let mut stopped = self
            .state
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        self.state.wake.notify_all();
    }
}

/// One running subscription and its private inbox. Dropping the worker drops
/// whatever it sent and nobody read.
struct Worker<M> {
    id: SubId,
    stop: StopHandle,
    inbox: mpsc::Receiver<M>,
    thread: Option<thread::JoinHandle<()>>,
}

impl<M: Send + 'static> Worker<M> {
    fn spawn(sub: Box<dyn Subscription<M>>) -> Self {
        let id = sub.id();
        let (sender, inbox) = mpsc::channel();
        let (signal, stop) = StopSignal::pair();
        let thread = thread::spawn(move || sub.run(sender, signal));
        Self {
            id,
            stop,
            inbox,
            thread: Some(thread),
        }
    }

    /// Stop and wait for the thread to exit.
    fn join(mut self) {
        self.stop.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl<M> Drop for Worker<M> {
    fn drop(&mut self) {
        // Never blocks; `join` is the waiting path.
        self.stop.stop();
    }
}

/// Threaded subscriptions for the native host.
///
/// Each worker sends into its own channel, so once a subscription is stopped
/// by a reconcile none of its queued messages can reach a later one that
/// reuses the id.
pub struct SubscriptionManager<M: Send + 'static> {
    workers: Vec<Worker<M>>,
}

impl<M: Send + 'static> Default for SubscriptionManager<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + 'static> SubscriptionManager<M> {
    pub fn new() -> Self {
        Self {
            workers: Vec::new(),
        }
    }

    /// Start new ids, stop missing ones, leave the rest alone.
    pub fn reconcile(&mut self, subscriptions: Vec<Box<dyn Subscription<M>>>) {
        let wanted: HashSet<SubId> = subscriptions.iter().map(|s| s.id()).collect();
        let (keep, stale): (Vec<_>, Vec<_>) = std::mem::take(&mut self.workers)
            .into_iter()
            .partition(|w| wanted.contains(&w.id));
        for worker in stale {
            tracing::debug!(target: "termfolio.runtime", sub_id = worker.id, "stopping subscription");
            worker.join();
        }
        self.workers = keep;

        let mut running: HashSet<SubId> = self.workers.iter().map(|w| w.id).collect();
        for sub in subscriptions {
            if running.insert(sub.id()) {
                tracing::debug!(target: "termfolio.runtime", sub_id = sub.id(), "starting subscription");
                self.workers.push(Worker::spawn(sub));
            }
        }
    }

    /// One pending message from a live subscription, if any.
    pub fn next_message(&self) -> Option<M> {
        self.workers.iter().find_map(|w| w.inbox.try_recv().ok())
    }

    /// Everything the live subscriptions sent since the last read.
    pub fn drain_messages(&self) -> Vec<M> {
        self.workers
            .iter()
            .flat_map(|w| w.inbox.try_iter())
            .collect()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.workers.len()
    }

    /// Stop every subscription and drop messages it already sent.
    pub fn stop_all(&mut self) {
        for worker in self.workers.drain(..) {
            worker.join();
        }
    }
}

impl<M: Send + 'static> Drop for SubscriptionManager<M> {
    fn drop(&mut self) {
        self.stop_all();
    }
}

struct VirtualTimer<M: Send + 'static> {
    id: SubId,
    period: Duration,
    next_due: Duration,
    source: Box<dyn Subscription<M>>,
}

/// Periodic subscriptions driven by an explicit clock.
///
/// Time only moves when the owner says so. Each timer first fires one period
/// after it was started and then every period after that. Subscriptions
/// without a [`Subscription::period`] are ignored here.
pub struct TimerSet<M: Send + 'static> {
    timers: Vec<VirtualTimer<M>>,
    now: Duration,
}

impl<M: Send + 'static> Default for TimerSet<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + 'static> TimerSet<M> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            now: Duration::ZERO,
        }
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward to `now`. Earlier values are ignored.
    pub fn set_now(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Same contract as [`SubscriptionManager::reconcile`].
    pub fn reconcile(&mut self, subscriptions: Vec<Box<dyn Subscription<M>>>) {
        let new_ids: HashSet<SubId> = subscriptions.iter().map(|s| s.id()).collect();
        self.timers.retain(|timer| {
            let keep = new_ids.contains(&timer.id);
            if !keep {
                tracing::debug!(target: "termfolio.runtime", sub_id = timer.id, "stopping virtual timer");
            }
            keep
        });

        let mut active_ids: HashSet<SubId> = self.timers.iter().map(|t| t.id).collect();
        for sub in subscriptions {
            let id = sub.id();
            if !active_ids.insert(id) {
                continue;
            }
            let Some(period) = sub.period() else {
                tracing::debug!(target: "termfolio.runtime", sub_id = id, "skipping non-periodic subscription");
                continue;
            };
            let period = period.max(MIN_VIRTUAL_PERIOD);
            tracing::debug!(target: "termfolio.runtime", sub_id = id, ?period, "starting virtual timer");
            self.timers.push(VirtualTimer {
                id,
                period,
                next_due: self.now + period,
                source: sub,
            });
        }
    }

    /// When the earliest timer fires next, if any timer is running.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.next_due).min()
    }

    /// Fire the earliest timer due at or before `deadline`.
    ///
    /// The clock moves to that timer's due time. Ties go to the timer started
    /// first. Returns `None` once nothing is due by `deadline`; the clock is
    /// then left where it is so the caller can settle it with
    /// [`set_now`](Self::set_now).
    pub fn poll(&mut self, deadline: Duration) -> Option<M> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.next_due <= deadline)
            .min_by_key(|(i, t)| (t.next_due, *i))
            .map(|(i, _)| i)?;
        let timer = &mut self.timers[idx];
        self.now = self.now.max(timer.next_due);
        timer.next_due += timer.period;
        timer.source.emit()
    }

    /// Return the number of running timers.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Stop every timer.
    pub fn stop_all(&mut self) {
        self.timers.clear();
    }
}

/// A periodic tick.
///
/// ```ignore
/// Box::new(Every::new(Duration::from_millis(15), || Msg::Tick))
/// ```
pub struct Every<M: Send + 'static> {
    id: SubId,
    interval: Duration,
    tick: Box<dyn Fn() -> M + Send + Sync>,
}

impl<M: Send + 'static> Every<M> {
    /// The id is derived from `interval`, so redeclaring the same pace
    /// keeps the running timer instead of restarting it.
    pub fn new(interval: Duration, tick: impl Fn() -> M + Send + Sync + 'static) -> Self {
        Self::with_id(interval.as_nanos() as u64 ^ 0x5449_434B, interval, tick)
    }

    /// For several timers that share a pace.
    pub fn with_id(id: SubId, interval: Duration, tick: impl Fn() -> M + Send + Sync + 'static) -> Self {
        Self {
            id,
            interval,
            tick: Box::new(tick),
        }
    }
}

impl<M: Send + 'static> Subscription<M> for Every<M> {
    fn id(&self) -> SubId {
        self.id
    }

    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal) {
        while !stop.wait_timeout(self.interval) {
            if sender.send((self.tick)()).is_err() {
                return;
            }
        }
    }

    fn period(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn emit(&self) -> Option<M> {
        Some((self.tick)())
    }
}
