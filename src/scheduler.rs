use std::time::{Duration, Instant};

use crate::easing::Easing;
use crate::error::{Result, WheelError};
use crate::model::Sector;
use crate::solver;

// ============================================================================
// SPIN LIFECYCLE STATE MACHINE
// ============================================================================

/// Animation lifecycle phase: `Idle -> Spinning -> Settled -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Spinning,
    Settled,
}

/// Tunable parameters of one spin. `min_full_turns` must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinParams {
    pub duration: Duration,
    pub min_full_turns: u32,
    pub easing: Easing,
}

impl Default for SpinParams {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(6000),
            min_full_turns: 4,
            easing: Easing::default(),
        }
    }
}

type TickFn = Box<dyn FnMut(f64)>;
type SettleFn = Box<dyn FnOnce(usize)>;

struct ActiveSpin {
    sectors: Vec<Sector>,
    target_index: usize,
    final_angle: f64,
    params: SpinParams,
    // Taken from the host clock at the first frame, not at start(); frame
    // delivery jitter before the first paint must not shorten the spin.
    started_at: Option<Instant>,
    current_angle: f64,
    on_tick: TickFn,
    on_settle: Option<SettleFn>,
}

struct SettledSpin {
    target_index: usize,
    final_angle: f64,
    sectors: Vec<Sector>,
}

enum State {
    Idle,
    Spinning(ActiveSpin),
    Settled(SettledSpin),
}

/// Owns the animation state for one wheel and drives it cooperatively.
///
/// The host supplies both leaf dependencies: monotonic `Instant`s passed into
/// [`advance`](Self::advance), and the decision to call `advance` again while
/// it reports that another frame is wanted. The scheduler never blocks, never
/// spawns, and never reads the clock itself, so tests can drive it with
/// synthetic timestamps.
pub struct SpinScheduler {
    state: State,
}

impl Default for SpinScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinScheduler {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Spinning(_) => Phase::Spinning,
            State::Settled(_) => Phase::Settled,
        }
    }

    /// The wheel's rotation right now: 0 while idle, the eased in-flight angle
    /// while spinning, frozen at the exact solved angle once settled.
    pub fn current_angle(&self) -> f64 {
        match &self.state {
            State::Idle => 0.0,
            State::Spinning(spin) => spin.current_angle,
            State::Settled(done) => done.final_angle,
        }
    }

    /// Target index of the settled spin, if the wheel is at rest on one.
    pub fn settled_index(&self) -> Option<usize> {
        match &self.state {
            State::Settled(done) => Some(done.target_index),
            _ => None,
        }
    }

    /// The winning sector of the settled spin, read from the snapshot taken
    /// at `start()`, valid even if the caller's own list changed since.
    pub fn settled_sector(&self) -> Option<&Sector> {
        match &self.state {
            State::Settled(done) => done.sectors.get(done.target_index),
            _ => None,
        }
    }

    /// Arm a spin toward `target_index`. Legal from `Idle` or `Settled`
    /// (starting over a settled wheel implicitly acknowledges it); starting
    /// while `Spinning` fails with `AlreadySpinning` so two frame loops can
    /// never race on the same state.
    ///
    /// The sector list is snapshotted here; callers mutating their own copy
    /// mid-spin cannot affect the running animation. The final angle is
    /// solved once, up front; an invalid index fails here and the phase is
    /// left untouched.
    pub fn start(
        &mut self,
        sectors: &[Sector],
        target_index: usize,
        params: SpinParams,
        on_tick: impl FnMut(f64) + 'static,
        on_settle: impl FnOnce(usize) + 'static,
    ) -> Result<()> {
        if matches!(self.state, State::Spinning(_)) {
            return Err(WheelError::AlreadySpinning);
        }
        if sectors.is_empty() {
            return Err(WheelError::EmptyWheel);
        }
        let final_angle = solver::solve(sectors.len(), target_index, params.min_full_turns)?;

        log::debug!(
            "spin armed: target={} of {}, final_angle={:.4} rad, duration={:?}",
            target_index,
            sectors.len(),
            final_angle,
            params.duration
        );

        self.state = State::Spinning(ActiveSpin {
            sectors: sectors.to_vec(),
            target_index,
            final_angle,
            params,
            started_at: None,
            current_angle: 0.0,
            on_tick: Box::new(on_tick),
            on_settle: Some(Box::new(on_settle)),
        });
        Ok(())
    }

    /// Process one frame at host time `now`. Returns `true` while another
    /// frame should be scheduled.
    ///
    /// While the spin is in flight this fires `on_tick` with the eased angle.
    /// On the settle frame the angle snaps to the exact solved value (not the
    /// eased approximation of it), `on_tick` fires once more with that value,
    /// then `on_settle` fires exactly once and frame scheduling stops.
    pub fn advance(&mut self, now: Instant) -> bool {
        let spin = match &mut self.state {
            State::Spinning(spin) => spin,
            _ => return false,
        };

        let started_at = *spin.started_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started_at);

        if elapsed < spin.params.duration {
            let t = elapsed.as_secs_f64() / spin.params.duration.as_secs_f64();
            spin.current_angle = spin.final_angle * spin.params.easing.apply(t);
            let angle = spin.current_angle;
            (spin.on_tick)(angle);
            return true;
        }

        // Settle frame: snap to the solved angle bit-for-bit.
        spin.current_angle = spin.final_angle;
        (spin.on_tick)(spin.final_angle);
        let on_settle = spin.on_settle.take();
        let target_index = spin.target_index;
        let final_angle = spin.final_angle;
        let sectors = std::mem::take(&mut spin.sectors);
        log::debug!("spin settled: target={target_index} at {final_angle:.4} rad");
        self.state = State::Settled(SettledSpin {
            target_index,
            final_angle,
            sectors,
        });
        if let Some(on_settle) = on_settle {
            on_settle(target_index);
        }
        false
    }

    /// Stop a spin dead. Safe from any phase: a no-op from `Idle`, drops a
    /// settled result from `Settled`, and from `Spinning` discards the
    /// in-flight spin without firing `on_settle`. After this returns no
    /// further `on_tick` or `on_settle` invocation can occur for the
    /// cancelled spin.
    pub fn cancel(&mut self) {
        if matches!(self.state, State::Spinning(_)) {
            log::debug!("spin cancelled mid-flight");
        }
        self.state = State::Idle;
    }

    /// Acknowledge a settled spin, returning its target index and resetting
    /// to `Idle`. Returns `None` in any other phase.
    pub fn acknowledge(&mut self) -> Option<usize> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Settled(done) => Some(done.target_index),
            other => {
                self.state = other;
                None
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sector_index_at_pointer;
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    fn sectors(n: usize) -> Vec<Sector> {
        (0..n)
            .map(|i| Sector::new(format!("s{i}"), "plain"))
            .collect()
    }

    fn params(ms: u64) -> SpinParams {
        SpinParams {
            duration: Duration::from_millis(ms),
            ..SpinParams::default()
        }
    }

    struct Probe {
        angles: Rc<RefCell<Vec<f64>>>,
        settled: Rc<RefCell<Vec<usize>>>,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                angles: Rc::new(RefCell::new(Vec::new())),
                settled: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn hooks(&self) -> (impl FnMut(f64) + 'static, impl FnOnce(usize) + 'static) {
            let angles = Rc::clone(&self.angles);
            let settled = Rc::clone(&self.settled);
            (
                move |a: f64| angles.borrow_mut().push(a),
                move |i: usize| settled.borrow_mut().push(i),
            )
        }
    }

    #[test]
    fn fresh_scheduler_is_idle_at_zero() {
        let sched = SpinScheduler::new();
        assert_eq!(sched.phase(), Phase::Idle);
        assert_eq!(sched.current_angle(), 0.0);
        assert_eq!(sched.settled_index(), None);
    }

    #[test]
    fn angle_sequence_is_monotone_and_ends_exact() {
        let mut sched = SpinScheduler::new();
        let probe = Probe::new();
        let (on_tick, on_settle) = probe.hooks();
        sched
            .start(&sectors(6), 3, params(1000), on_tick, on_settle)
            .unwrap();

        let t0 = Instant::now();
        let mut wanted = true;
        for ms in (0u64..=1000).step_by(50) {
            wanted = sched.advance(t0 + Duration::from_millis(ms));
        }
        assert!(!wanted);
        assert_eq!(sched.phase(), Phase::Settled);

        let angles = probe.angles.borrow();
        assert!(angles.windows(2).all(|w| w[0] <= w[1]), "angles not monotone");
        let expected = solver::solve(6, 3, 4).unwrap();
        assert_eq!(angles.last().copied().unwrap().to_bits(), expected.to_bits());
        assert_eq!(sched.current_angle().to_bits(), expected.to_bits());
    }

    #[test]
    fn settle_fires_exactly_once_even_with_extra_frames() {
        let mut sched = SpinScheduler::new();
        let probe = Probe::new();
        let (on_tick, on_settle) = probe.hooks();
        sched
            .start(&sectors(4), 1, params(100), on_tick, on_settle)
            .unwrap();

        let t0 = Instant::now();
        sched.advance(t0);
        assert!(!sched.advance(t0 + Duration::from_millis(100)));
        // A host that keeps polling after settle gets no more callbacks.
        assert!(!sched.advance(t0 + Duration::from_millis(200)));
        assert!(!sched.advance(t0 + Duration::from_millis(300)));
        assert_eq!(probe.settled.borrow().as_slice(), &[1]);
    }

    #[test]
    fn settled_pointer_reads_the_target() {
        let mut sched = SpinScheduler::new();
        sched
            .start(&sectors(5), 4, params(200), |_| {}, |_| {})
            .unwrap();
        let t0 = Instant::now();
        sched.advance(t0);
        sched.advance(t0 + Duration::from_millis(500));
        assert_eq!(sched.settled_index(), Some(4));
        assert_eq!(sector_index_at_pointer(5, sched.current_angle()), 4);
    }

    #[test]
    fn duration_runs_from_first_frame_not_from_start_call() {
        let mut sched = SpinScheduler::new();
        let probe = Probe::new();
        let (on_tick, on_settle) = probe.hooks();
        sched
            .start(&sectors(3), 0, params(100), on_tick, on_settle)
            .unwrap();

        // First frame arrives late; the clock starts there.
        let first_frame = Instant::now() + Duration::from_millis(750);
        assert!(sched.advance(first_frame));
        assert!(sched.advance(first_frame + Duration::from_millis(50)));
        assert_eq!(sched.phase(), Phase::Spinning);
        assert!(!sched.advance(first_frame + Duration::from_millis(100)));
        assert_eq!(sched.phase(), Phase::Settled);
    }

    #[test]
    fn start_while_spinning_is_rejected() {
        let mut sched = SpinScheduler::new();
        sched
            .start(&sectors(4), 0, params(1000), |_| {}, |_| {})
            .unwrap();
        let err = sched
            .start(&sectors(4), 1, params(1000), |_| {}, |_| {})
            .unwrap_err();
        assert_eq!(err, WheelError::AlreadySpinning);
        assert_eq!(sched.phase(), Phase::Spinning);
    }

    #[test]
    fn invalid_index_leaves_scheduler_idle() {
        let mut sched = SpinScheduler::new();
        let err = sched
            .start(&sectors(4), 4, params(1000), |_| {}, |_| {})
            .unwrap_err();
        assert_eq!(err, WheelError::InvalidIndex { index: 4, count: 4 });
        assert_eq!(sched.phase(), Phase::Idle);
        assert_eq!(sched.current_angle(), 0.0);
    }

    #[test]
    fn empty_sectors_are_rejected_before_spinning() {
        let mut sched = SpinScheduler::new();
        let err = sched
            .start(&[], 0, params(1000), |_| {}, |_| {})
            .unwrap_err();
        assert_eq!(err, WheelError::EmptyWheel);
        assert_eq!(sched.phase(), Phase::Idle);
    }

    #[test]
    fn cancel_suppresses_old_settle_and_new_spin_lands_new_target() {
        let mut sched = SpinScheduler::new();
        let first = Probe::new();
        let (on_tick, on_settle) = first.hooks();
        sched
            .start(&sectors(8), 2, params(1000), on_tick, on_settle)
            .unwrap();

        let t0 = Instant::now();
        for ms in (0u64..300).step_by(50) {
            sched.advance(t0 + Duration::from_millis(ms));
        }
        sched.cancel();
        assert_eq!(sched.phase(), Phase::Idle);
        assert_eq!(sched.current_angle(), 0.0);
        // Frames after cancel are inert.
        assert!(!sched.advance(t0 + Duration::from_millis(400)));

        let second = Probe::new();
        let (on_tick, on_settle) = second.hooks();
        sched
            .start(&sectors(8), 6, params(100), on_tick, on_settle)
            .unwrap();
        let t1 = t0 + Duration::from_millis(500);
        sched.advance(t1);
        sched.advance(t1 + Duration::from_millis(100));

        assert!(first.settled.borrow().is_empty(), "cancelled settle fired");
        assert_eq!(second.settled.borrow().as_slice(), &[6]);
        assert_eq!(sector_index_at_pointer(8, sched.current_angle()), 6);
    }

    #[test]
    fn cancel_is_a_noop_from_idle_and_settled() {
        let mut sched = SpinScheduler::new();
        sched.cancel();
        assert_eq!(sched.phase(), Phase::Idle);

        sched
            .start(&sectors(2), 1, params(0), |_| {}, |_| {})
            .unwrap();
        sched.advance(Instant::now());
        assert_eq!(sched.phase(), Phase::Settled);
        sched.cancel();
        assert_eq!(sched.phase(), Phase::Idle);
        sched.cancel();
        assert_eq!(sched.phase(), Phase::Idle);
    }

    #[test]
    fn zero_duration_settles_on_first_frame() {
        let mut sched = SpinScheduler::new();
        let probe = Probe::new();
        let (on_tick, on_settle) = probe.hooks();
        sched
            .start(&sectors(4), 3, params(0), on_tick, on_settle)
            .unwrap();
        assert!(!sched.advance(Instant::now()));
        assert_eq!(sched.phase(), Phase::Settled);
        let expected = solver::solve(4, 3, 4).unwrap();
        assert_eq!(probe.angles.borrow().as_slice(), &[expected]);
        assert_eq!(probe.settled.borrow().as_slice(), &[3]);
    }

    #[test]
    fn acknowledge_returns_target_and_resets() {
        let mut sched = SpinScheduler::new();
        assert_eq!(sched.acknowledge(), None);
        sched
            .start(&sectors(4), 2, params(0), |_| {}, |_| {})
            .unwrap();
        sched.advance(Instant::now());
        assert_eq!(sched.acknowledge(), Some(2));
        assert_eq!(sched.phase(), Phase::Idle);
        assert_eq!(sched.acknowledge(), None);
    }

    #[test]
    fn start_from_settled_implicitly_acknowledges() {
        let mut sched = SpinScheduler::new();
        sched
            .start(&sectors(4), 1, params(0), |_| {}, |_| {})
            .unwrap();
        sched.advance(Instant::now());
        assert_eq!(sched.phase(), Phase::Settled);
        sched
            .start(&sectors(4), 3, params(0), |_| {}, |_| {})
            .unwrap();
        assert_eq!(sched.phase(), Phase::Spinning);
    }

    #[test]
    fn each_spin_is_solved_from_zero_not_accumulated() {
        let mut sched = SpinScheduler::new();
        for _ in 0..3 {
            sched
                .start(&sectors(4), 2, params(0), |_| {}, |_| {})
                .unwrap();
            sched.advance(Instant::now());
            let expected = solver::solve(4, 2, 4).unwrap();
            assert_eq!(sched.current_angle().to_bits(), expected.to_bits());
            assert!(sched.current_angle() < 5.0 * TAU);
        }
    }

    #[test]
    fn snapshot_isolates_spin_from_caller_mutation() {
        let mut sched = SpinScheduler::new();
        let mut mine = sectors(4);
        sched
            .start(&mine, 2, params(100), |_| {}, |_| {})
            .unwrap();
        mine.clear(); // caller's copy, not the scheduler's
        let t0 = Instant::now();
        sched.advance(t0);
        sched.advance(t0 + Duration::from_millis(100));
        assert_eq!(sched.settled_index(), Some(2));
        assert_eq!(sched.settled_sector().unwrap().label, "s2");
    }
}
