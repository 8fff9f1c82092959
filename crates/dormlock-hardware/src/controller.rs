//! Motion sensor and door lock pin controller.
//!
//! [`PinController`] owns the two pins the door needs: the PIR motion sensor
//! input and the lock relay output. It acquires them from a [`GpioPlatform`],
//! leaves the door locked, lends the motion pin out for event subscription and
//! runs timed unlock windows on tokio timers.
//!
//! # Lock pin state machine
//!
//! ```text
//!              unlock_door()                 window elapses
//!   Locked ─────────────────────► Unlocked ─────────────────────► Locked
//!     ▲                                                              │
//!     └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The door starts `Locked` after a successful [`initialize`] and cycles for
//! the life of the controller. There is no terminal state.
//!
//! # Overlapping unlock requests
//!
//! How a request made while the door is already open behaves depends on the
//! configured [`UnlockPolicy`]:
//!
//! | Policy        | Requests at t=0 and t=2, window 5s                      |
//! |---------------|---------------------------------------------------------|
//! | `Independent` | `Unlocked`@0, `Unlocked`@2, `Locked`@5, `Locked`@7      |
//! | `Extend`      | `Unlocked`@0, `Locked`@7                                |
//!
//! With `Independent` the first timer re-locks the door while the second
//! request's window is still open. That matches a plain "unlock, sleep, lock"
//! sequence and is the default.
//!
//! # Examples
//!
//! ```no_run
//! use dormlock_core::LockConfig;
//! use dormlock_hardware::PinController;
//! use dormlock_hardware::mock::MockGpio;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (gpio, _handle) = MockGpio::new();
//!     let mut controller = PinController::new(gpio, LockConfig::default());
//!
//!     if !controller.initialize() {
//!         // No GPIO on this device: run without the door features.
//!         return;
//!     }
//!
//!     let mut motion = controller.subscribe_motion().unwrap();
//!     while let Some(edge) = motion.recv().await {
//!         if edge.is_rising() {
//!             controller.unlock_door();
//!         }
//!     }
//! }
//! ```
//!
//! [`initialize`]: PinController::initialize

use crate::{
    HardwareError, Result,
    traits::{GpioController, GpioPin, GpioPlatform},
    types::{LockState, PinEvents, PinMode, PinRole},
};
use dormlock_core::{LockConfig, UnlockPolicy};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Pin handle type produced by a platform's controller.
pub type PlatformPin<P> = <<P as GpioPlatform>::Controller as GpioController>::Pin;

/// Owner of the motion sensor and door lock pins.
pub struct PinController<P: GpioPlatform> {
    platform: P,
    config: LockConfig,

    /// Held for the life of the controller once acquired.
    controller: Option<P::Controller>,

    motion_pin: Option<PlatformPin<P>>,

    /// Shared with the re-lock timers.
    lock: Option<Arc<LockLine<PlatformPin<P>>>>,
}

impl<P: GpioPlatform> PinController<P> {
    /// Create an uninitialized controller. No hardware is touched until
    /// [`initialize`](Self::initialize).
    pub fn new(platform: P, config: LockConfig) -> Self {
        Self {
            platform,
            config,
            controller: None,
            motion_pin: None,
            lock: None,
        }
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Whether a previous [`initialize`](Self::initialize) succeeded.
    pub fn is_initialized(&self) -> bool {
        self.controller.is_some() && self.lock.is_some()
    }

    /// Acquire the GPIO controller, configure both pins and lock the door.
    ///
    /// Returns `false` if the device has no GPIO controller, either pin cannot
    /// be opened, or the platform faults while configuring the pins. Use
    /// [`try_initialize`](Self::try_initialize) to find out which.
    pub fn initialize(&mut self) -> bool {
        match self.try_initialize() {
            Ok(()) => true,
            Err(e) if e.is_absence() => {
                warn!(error = %e, "GPIO unavailable, door control disabled");
                false
            }
            Err(e) => {
                error!(error = %e, "GPIO initialization failed");
                false
            }
        }
    }

    /// Acquire the GPIO controller, configure both pins and lock the door.
    ///
    /// Steps run in order and stop at the first failure:
    ///
    /// 1. discover the controller
    /// 2. open the motion pin and make it an input
    /// 3. open the lock pin and make it an output
    /// 4. drive the lock pin to `Locked`
    ///
    /// Nothing is kept on failure. Pins opened before the failing step are
    /// released and the controller stays uninitialized. Calling this again
    /// after success is a no-op.
    ///
    /// # Errors
    ///
    /// - `HardwareError::Config` if the configuration does not validate
    /// - `HardwareError::NoController` if the platform has no GPIO
    /// - `HardwareError::PinUnavailable` if either pin cannot be opened
    /// - `HardwareError::ModeChangeFailed` / `WriteFailed` on platform faults
    pub fn try_initialize(&mut self) -> Result<()> {
        if self.is_initialized() {
            debug!("pin controller already initialized");
            return Ok(());
        }

        self.config.validate()?;

        let controller = self
            .platform
            .discover_controller()
            .ok_or(HardwareError::NoController)?;

        let motion_id = self.config.motion_pin;
        let motion_pin = controller
            .open_pin(motion_id)
            .ok_or_else(|| HardwareError::pin_unavailable(motion_id, PinRole::Motion))?;
        motion_pin.set_mode(PinMode::Input)?;

        let lock_id = self.config.lock_pin;
        let lock_pin = controller
            .open_pin(lock_id)
            .ok_or_else(|| HardwareError::pin_unavailable(lock_id, PinRole::Lock))?;
        lock_pin.set_mode(PinMode::Output)?;
        lock_pin.write(LockState::Locked.pin_value())?;

        self.controller = Some(controller);
        self.motion_pin = Some(motion_pin);
        self.lock = Some(Arc::new(LockLine::new(lock_pin)));

        info!(
            motion_pin = %motion_id,
            lock_pin = %lock_id,
            unlock_window_ms = self.config.unlock_duration.as_millis() as u64,
            policy = ?self.config.unlock_policy,
            "GPIO initialized, door locked"
        );
        Ok(())
    }

    /// The motion sensor pin, for attaching an edge listener.
    ///
    /// `None` until [`initialize`](Self::initialize) has succeeded.
    pub fn motion_pin(&self) -> Option<&PlatformPin<P>> {
        self.motion_pin.as_ref()
    }

    /// Subscribe to motion sensor edges.
    pub fn subscribe_motion(&self) -> Option<PinEvents> {
        self.motion_pin.as_ref().map(GpioPin::subscribe)
    }

    /// Lock state most recently driven onto the lock pin.
    pub fn lock_state(&self) -> Option<LockState> {
        self.lock.as_ref().map(|line| line.state().commanded)
    }

    /// Number of re-lock timers that have not fired yet.
    pub fn pending_relocks(&self) -> usize {
        self.lock.as_ref().map_or(0, |line| line.pending())
    }

    /// Unlock the door for the configured window, then lock it again.
    ///
    /// Returns immediately. The lock pin is driven `Unlocked` before this
    /// returns; re-locking happens on a tokio timer, so motion events keep
    /// flowing while the door is open. Pending re-locks are never cancelled
    /// implicitly, see [`lock_now`](Self::lock_now) for explicit cancellation.
    ///
    /// Write failures are logged and otherwise ignored. If the controller is
    /// not initialized, or there is no tokio runtime to run the re-lock timer
    /// on, the door is left locked.
    pub fn unlock_door(&self) {
        let Some(line) = &self.lock else {
            warn!("unlock requested before GPIO initialization, ignoring");
            return;
        };

        let Ok(runtime) = Handle::try_current() else {
            warn!("unlock requested outside a tokio runtime, door stays locked");
            return;
        };

        let window = self.config.unlock_duration;
        match self.config.unlock_policy {
            UnlockPolicy::Independent => line.unlock_independent(window, &runtime),
            UnlockPolicy::Extend => line.unlock_extending(window, &runtime),
        }
    }

    /// Cancel every pending re-lock timer and lock the door now.
    ///
    /// # Errors
    ///
    /// - `HardwareError::NotInitialized` before a successful initialize
    /// - `HardwareError::WriteFailed` if the lock pin cannot be driven
    pub fn lock_now(&self) -> Result<()> {
        let line = self.lock.as_ref().ok_or(HardwareError::NotInitialized)?;
        line.secure(true)
    }
}

impl<P: GpioPlatform> Drop for PinController<P> {
    fn drop(&mut self) {
        if let Some(line) = &self.lock {
            // Timers die with the controller; never leave the door open.
            if let Err(e) = line.secure(false) {
                error!(error = %e, "failed to lock door on shutdown");
            }
        }
    }
}

/// The lock pin together with its re-lock bookkeeping.
struct LockLine<T> {
    pin: T,
    state: Mutex<LockLineState>,
}

struct LockLineState {
    commanded: LockState,

    /// When the extendable window closes. `Some` while the door is held open
    /// under [`UnlockPolicy::Extend`].
    relock_at: Option<Instant>,

    timers: JoinSet<()>,
}

impl<T: GpioPin> LockLine<T> {
    fn new(pin: T) -> Self {
        Self {
            pin,
            state: Mutex::new(LockLineState {
                commanded: LockState::Locked,
                relock_at: None,
                timers: JoinSet::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, LockLineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, state: &mut LockLineState, target: LockState) -> Result<()> {
        self.pin.write(target.pin_value())?;
        state.commanded = target;
        info!(pin = %self.pin.id(), state = %target, "door lock driven");
        Ok(())
    }

    /// Write and swallow failures. Used where nobody is waiting for a result.
    fn drive(&self, state: &mut LockLineState, target: LockState) {
        if let Err(e) = self.write(state, target) {
            warn!(pin = %self.pin.id(), state = %target, error = %e, "failed to drive door lock");
        }
    }

    fn pending(&self) -> usize {
        let mut state = self.state();
        reap(&mut state.timers);
        state.timers.len()
    }

    fn unlock_independent(self: &Arc<Self>, window: Duration, runtime: &Handle) {
        let mut state = self.state();
        reap(&mut state.timers);
        self.drive(&mut state, LockState::Unlocked);

        let deadline = Instant::now() + window;
        let line = Arc::clone(self);
        state.timers.spawn_on(
            async move {
                tokio::time::sleep_until(deadline).await;
                line.relock();
            },
            runtime,
        );
        debug!(
            pin = %self.pin.id(),
            window_ms = window.as_millis() as u64,
            pending = state.timers.len(),
            "re-lock scheduled"
        );
    }

    fn unlock_extending(self: &Arc<Self>, window: Duration, runtime: &Handle) {
        let mut state = self.state();
        let deadline = Instant::now() + window;

        if state.relock_at.replace(deadline).is_some() {
            debug!(pin = %self.pin.id(), window_ms = window.as_millis() as u64, "unlock window extended");
            return;
        }

        reap(&mut state.timers);
        self.drive(&mut state, LockState::Unlocked);

        let line = Arc::clone(self);
        state.timers.spawn_on(
            async move {
                let mut deadline = deadline;
                loop {
                    tokio::time::sleep_until(deadline).await;
                    match line.relock_if_due() {
                        Some(extended) => deadline = extended,
                        None => return,
                    }
                }
            },
            runtime,
        );
        debug!(pin = %self.pin.id(), window_ms = window.as_millis() as u64, "re-lock scheduled");
    }

    fn relock(&self) {
        let mut state = self.state();
        self.drive(&mut state, LockState::Locked);
    }

    /// Lock if the extendable window has closed, otherwise return the new
    /// deadline to sleep until.
    fn relock_if_due(&self) -> Option<Instant> {
        let mut state = self.state();
        match state.relock_at {
            Some(deadline) if deadline > Instant::now() => Some(deadline),
            Some(_) => {
                state.relock_at = None;
                self.drive(&mut state, LockState::Locked);
                None
            }
            None => None,
        }
    }

    /// Abort every timer and lock. Without `force` the write is skipped when
    /// the door is already locked and nothing was pending.
    fn secure(&self, force: bool) -> Result<()> {
        let mut state = self.state();
        reap(&mut state.timers);
        let had_pending = !state.timers.is_empty() || state.relock_at.is_some();

        // Dropping the set aborts its tasks.
        state.timers = JoinSet::new();
        state.relock_at = None;

        if force || had_pending || state.commanded != LockState::Locked {
            self.write(&mut state, LockState::Locked)?;
        }
        Ok(())
    }
}

/// Drop finished timers from the set.
fn reap(timers: &mut JoinSet<()>) {
    while timers.try_join_next().is_some() {}
}
