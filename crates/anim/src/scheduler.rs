use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::clock::Clock;

/// Identifies a registered animation within its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(usize);

/// A float written by an animation and read elsewhere on the render thread.
///
/// Clones share storage: keep one clone, move the other into the animation.
#[derive(Debug, Clone, Default)]
pub struct AnimatedValue(Rc<Cell<f32>>);

impl AnimatedValue {
    pub fn new(initial: f32) -> Self {
        Self(Rc::new(Cell::new(initial)))
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    pub fn set(&self, value: f32) {
        self.0.set(value);
    }
}

struct Animation {
    name: String,
    period_hint: f32,
    /// Elapsed seconds passed to `func` on the most recent tick.
    phase: f32,
    func: Box<dyn FnMut(f32)>,
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("name", &self.name)
            .field("period_hint", &self.period_hint)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

/// A scheduler that has not read its baseline yet.
///
/// The only thing it can do is `initialize`, which turns it into a
/// `RunningScheduler`. Call it right before the frame loop so that the first
/// frame sees an elapsed time close to zero.
#[derive(Debug)]
pub struct AnimationScheduler<C: Clock> {
    clock: C,
}

impl<C: Clock> AnimationScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Record the baseline clock reading and start running.
    pub fn initialize(self) -> RunningScheduler<C> {
        let baseline = self.clock.now();
        tracing::debug!(?baseline, "animation scheduler initialized");
        RunningScheduler {
            clock: self.clock,
            baseline,
            elapsed: 0.0,
            ticks: 0,
            animations: Vec::new(),
        }
    }
}

/// Single-threaded cooperative scheduler.
///
/// Every registered function is called once per `update` with the seconds
/// elapsed since the baseline. Functions must return promptly: there is no
/// timeout, and a slow function stalls the frame that called `update`.
#[derive(Debug)]
pub struct RunningScheduler<C: Clock> {
    clock: C,
    baseline: Duration,
    elapsed: f32,
    ticks: u64,
    animations: Vec<Animation>,
}

impl<C: Clock> RunningScheduler<C> {
    /// Register `func` to run on every tick.
    ///
    /// `period_hint` is advisory metadata (seconds per cycle, used by
    /// `cycle_position`); it does not change when or how often `func` runs.
    pub fn add_animation(
        &mut self,
        name: impl Into<String>,
        period_hint: f32,
        func: impl FnMut(f32) + 'static,
    ) -> AnimationHandle {
        let handle = AnimationHandle(self.animations.len());
        let name = name.into();
        tracing::debug!(%name, period_hint, "animation registered");
        self.animations.push(Animation {
            name,
            period_hint,
            phase: self.elapsed,
            func: Box::new(func),
        });
        handle
    }

    /// Evaluate every animation, in registration order, at the current
    /// elapsed time. Returns that elapsed time in seconds.
    pub fn update(&mut self) -> f32 {
        let since_baseline = self.clock.now().saturating_sub(self.baseline);
        // Guard against float rounding making time appear to step back.
        let elapsed = since_baseline.as_secs_f32().max(self.elapsed);
        self.elapsed = elapsed;
        self.ticks += 1;

        for anim in &mut self.animations {
            anim.phase = elapsed;
            (anim.func)(elapsed);
        }
        tracing::trace!(elapsed, ticks = self.ticks, "animations updated");
        elapsed
    }

    /// Elapsed seconds seen by the most recent `update` (0 before the first).
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of completed `update` calls.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn name(&self, handle: AnimationHandle) -> Option<&str> {
        self.animations.get(handle.0).map(|a| a.name.as_str())
    }

    /// The elapsed time the animation was last evaluated at.
    pub fn phase(&self, handle: AnimationHandle) -> Option<f32> {
        self.animations.get(handle.0).map(|a| a.phase)
    }

    pub fn period_hint(&self, handle: AnimationHandle) -> Option<f32> {
        self.animations.get(handle.0).map(|a| a.period_hint)
    }

    /// Position within the hinted cycle, in `[0, 1)`. `None` for unknown
    /// handles or non-positive hints.
    pub fn cycle_position(&self, handle: AnimationHandle) -> Option<f32> {
        let anim = self.animations.get(handle.0)?;
        (anim.period_hint > 0.0).then(|| (anim.phase / anim.period_hint).fract())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<f32>>>, impl FnMut(f32) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |t| sink.borrow_mut().push(t))
    }

    #[test]
    fn update_passes_exact_elapsed_values_in_order() {
        let clock = ManualClock::new();
        let mut sched = AnimationScheduler::new(clock.clone()).initialize();
        let (seen, f) = recorder();
        sched.add_animation("sample", 1.0, f);

        for t in [0.0, 1.0, 2.0] {
            clock.set_secs(t);
            sched.update();
        }
        assert_eq!(*seen.borrow(), vec![0.0, 1.0, 2.0]);
        assert_eq!(sched.ticks(), 3);
    }

    #[test]
    fn elapsed_is_measured_from_baseline() {
        let clock = ManualClock::new();
        clock.set_secs(10.0);
        let mut sched = AnimationScheduler::new(clock.clone()).initialize();
        clock.set_secs(12.5);
        assert_eq!(sched.update(), 2.5);
    }

    #[test]
    fn registering_twice_runs_twice_per_tick() {
        let clock = ManualClock::new();
        let mut sched = AnimationScheduler::new(clock.clone()).initialize();
        let calls = Rc::new(Cell::new(0));
        for _ in 0..2 {
            let calls = calls.clone();
            sched.add_animation("dup", 0.0, move |_| calls.set(calls.get() + 1));
        }
        sched.update();
        sched.update();
        assert_eq!(calls.get(), 4);
        assert_eq!(sched.len(), 2);
    }

    #[test]
    fn registration_order_is_call_order() {
        let clock = ManualClock::new();
        let mut sched = AnimationScheduler::new(clock).initialize();
        let order = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b", "c"] {
            let order = order.clone();
            sched.add_animation(name, 0.0, move |_| order.borrow_mut().push(name));
        }
        sched.update();
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn elapsed_never_decreases() {
        let clock = ManualClock::new();
        clock.set_secs(5.0);
        let mut sched = AnimationScheduler::new(clock.clone()).initialize();
        clock.set_secs(7.0);
        assert_eq!(sched.update(), 2.0);
        // A clock reading before the baseline saturates instead of going negative.
        clock.set_secs(1.0);
        assert_eq!(sched.update(), 2.0);
    }

    #[test]
    fn same_call_times_give_same_values() {
        let run = || {
            let clock = ManualClock::new();
            let mut sched = AnimationScheduler::new(clock.clone()).initialize();
            let (seen, f) = recorder();
            sched.add_animation("sample", 45.0, f);
            for t in [0.016, 0.033, 0.5, 3.25] {
                clock.set_secs(t);
                sched.update();
            }
            seen.take()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn animated_value_captures_output() {
        let clock = ManualClock::new();
        let mut sched = AnimationScheduler::new(clock.clone()).initialize();
        let time = AnimatedValue::new(0.0);
        let writer = time.clone();
        let handle = sched.add_animation("time", 45.0, move |t| writer.set(t));

        clock.set_secs(90.0 + 11.25);
        sched.update();
        assert_eq!(time.get(), 101.25);
        assert_eq!(sched.phase(handle), Some(101.25));
        assert_eq!(sched.name(handle), Some("time"));
        assert_eq!(sched.period_hint(handle), Some(45.0));
        assert_eq!(sched.cycle_position(handle), Some(0.25));
    }

    #[test]
    fn cycle_position_needs_positive_hint() {
        let mut sched = AnimationScheduler::new(ManualClock::new()).initialize();
        let h = sched.add_animation("flat", 0.0, |_| {});
        assert_eq!(sched.cycle_position(h), None);
        assert_eq!(sched.cycle_position(AnimationHandle(9)), None);
    }
}
