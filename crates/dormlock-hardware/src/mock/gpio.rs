//! Mock GPIO platform implementation.
//!
//! [`MockGpio`] implements the capability traits on top of shared in-memory
//! state. Every call is recorded with a [`tokio::time::Instant`] timestamp, so
//! under a paused tokio clock tests can assert exactly when each write
//! happened.

use crate::{
    HardwareError, Result,
    traits::{GpioController, GpioPin, GpioPlatform},
    types::{PinEdge, PinEvents, PinMode, PinValue},
};
use dormlock_core::PinId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// Capacity of each pin's edge channel.
const EDGE_CHANNEL_CAPACITY: usize = 64;

/// One call made against the simulated platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    /// Controller discovery.
    Discover { found: bool },

    /// Pin open request.
    Open { pin: PinId, granted: bool },

    /// Pin direction change.
    SetMode { pin: PinId, mode: PinMode, ok: bool },

    /// Output write.
    Write { pin: PinId, value: PinValue, ok: bool },
}

/// A [`PlatformCall`] with the time it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub at: Instant,
    pub call: PlatformCall,
}

#[derive(Debug)]
struct PinState {
    opened: bool,
    claim: Weak<Claim>,
    mode: Option<PinMode>,
    level: PinValue,
    edges: broadcast::Sender<PinEdge>,
}

impl PinState {
    fn new() -> Self {
        let (edges, _) = broadcast::channel(EDGE_CHANNEL_CAPACITY);
        Self {
            opened: false,
            claim: Weak::new(),
            mode: None,
            level: PinValue::Low,
            edges,
        }
    }
}

#[derive(Debug)]
struct MockState {
    controller_present: bool,
    pin_count: Option<u32>,
    unavailable: HashSet<PinId>,
    failing_writes: HashSet<PinId>,
    failing_mode: HashSet<PinId>,
    failing_reads: HashSet<PinId>,
    pins: HashMap<PinId, PinState>,
    calls: Vec<RecordedCall>,
}

impl MockState {
    fn record(&mut self, call: PlatformCall) {
        self.calls.push(RecordedCall {
            at: Instant::now(),
            call,
        });
    }

    fn pin(&mut self, id: PinId) -> &mut PinState {
        self.pins.entry(id).or_insert_with(PinState::new)
    }

    fn exists(&self, id: PinId) -> bool {
        self.pin_count.is_none_or(|count| id.as_u32() < count) && !self.unavailable.contains(&id)
    }
}

#[derive(Debug, Clone)]
struct Shared(Arc<Mutex<MockState>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive claim on one opened pin, shared by every clone of its
/// [`MockPin`]. The pin is released when the last clone goes away.
#[derive(Debug)]
struct Claim {
    id: PinId,
    shared: Shared,
}

impl Drop for Claim {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        if let Some(pin) = state.pins.get_mut(&self.id) {
            pin.opened = false;
            pin.claim = Weak::new();
        }
    }
}

/// Builder for a [`MockGpio`] with specific failure modes.
///
/// # Examples
///
/// ```
/// use dormlock_core::PinId;
/// use dormlock_hardware::mock::MockGpio;
///
/// // A 28-line header with pin 5 held by another process.
/// let (gpio, handle) = MockGpio::builder()
///     .pin_count(28)
///     .unavailable_pin(PinId::new(5))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct MockGpioBuilder {
    controller_present: bool,
    pin_count: Option<u32>,
    unavailable: HashSet<PinId>,
    failing_writes: HashSet<PinId>,
    failing_mode: HashSet<PinId>,
    failing_reads: HashSet<PinId>,
}

impl MockGpioBuilder {
    /// Simulate a device without a GPIO controller.
    pub fn without_controller(mut self) -> Self {
        self.controller_present = false;
        self
    }

    /// Only pins `0..count` exist; opening any other identifier fails.
    pub fn pin_count(mut self, count: u32) -> Self {
        self.pin_count = Some(count);
        self
    }

    /// Make `open_pin` fail for this identifier.
    pub fn unavailable_pin(mut self, pin: PinId) -> Self {
        self.unavailable.insert(pin);
        self
    }

    /// Make every write to this pin fail.
    pub fn failing_writes(mut self, pin: PinId) -> Self {
        self.failing_writes.insert(pin);
        self
    }

    /// Make every mode change on this pin fail.
    pub fn failing_mode(mut self, pin: PinId) -> Self {
        self.failing_mode.insert(pin);
        self
    }

    /// Make every read of this pin fail.
    pub fn failing_reads(mut self, pin: PinId) -> Self {
        self.failing_reads.insert(pin);
        self
    }

    pub fn build(self) -> (MockGpio, MockGpioHandle) {
        let shared = Shared(Arc::new(Mutex::new(MockState {
            controller_present: self.controller_present,
            pin_count: self.pin_count,
            unavailable: self.unavailable,
            failing_writes: self.failing_writes,
            failing_mode: self.failing_mode,
            failing_reads: self.failing_reads,
            pins: HashMap::new(),
            calls: Vec::new(),
        })));

        (
            MockGpio {
                shared: shared.clone(),
            },
            MockGpioHandle { shared },
        )
    }
}

/// Simulated GPIO platform.
///
/// # Examples
///
/// ```
/// use dormlock_core::PinId;
/// use dormlock_hardware::mock::MockGpio;
/// use dormlock_hardware::traits::{GpioController, GpioPin, GpioPlatform};
/// use dormlock_hardware::types::{PinMode, PinValue};
///
/// # fn main() -> dormlock_hardware::Result<()> {
/// let (gpio, handle) = MockGpio::new();
/// let pin_id = PinId::new(4);
///
/// let controller = gpio.discover_controller().unwrap();
/// let pin = controller.open_pin(pin_id).unwrap();
/// pin.set_mode(PinMode::Output)?;
/// pin.write(PinValue::High)?;
///
/// assert_eq!(handle.last_written(pin_id), Some(PinValue::High));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockGpio {
    shared: Shared,
}

impl MockGpio {
    /// Create a platform with a controller and every pin available.
    pub fn new() -> (Self, MockGpioHandle) {
        Self::builder().build()
    }

    /// Create a platform that has no GPIO controller.
    pub fn without_controller() -> (Self, MockGpioHandle) {
        Self::builder().without_controller().build()
    }

    pub fn builder() -> MockGpioBuilder {
        MockGpioBuilder {
            controller_present: true,
            pin_count: None,
            unavailable: HashSet::new(),
            failing_writes: HashSet::new(),
            failing_mode: HashSet::new(),
            failing_reads: HashSet::new(),
        }
    }
}

impl GpioPlatform for MockGpio {
    type Controller = MockController;

    fn discover_controller(&self) -> Option<MockController> {
        let mut state = self.shared.lock();
        let found = state.controller_present;
        state.record(PlatformCall::Discover { found });

        found.then(|| MockController {
            shared: self.shared.clone(),
        })
    }
}

/// Controller handle returned by [`MockGpio`].
#[derive(Debug, Clone)]
pub struct MockController {
    shared: Shared,
}

impl GpioController for MockController {
    type Pin = MockPin;

    fn open_pin(&self, id: PinId) -> Option<MockPin> {
        let mut state = self.shared.lock();
        let granted = state.exists(id) && !state.pin(id).opened;
        state.record(PlatformCall::Open { pin: id, granted });
        if !granted {
            return None;
        }

        let claim = Arc::new(Claim {
            id,
            shared: self.shared.clone(),
        });
        let pin = state.pin(id);
        pin.opened = true;
        pin.claim = Arc::downgrade(&claim);

        Some(MockPin {
            id,
            shared: self.shared.clone(),
            claim,
        })
    }
}

/// Pin opened on a [`MockController`].
///
/// Clones share the claim on the pin; the pin is released for reopening once
/// every clone is dropped. Two `MockPin`s are equal when they come from the
/// same `open_pin` call.
#[derive(Debug, Clone)]
pub struct MockPin {
    id: PinId,
    shared: Shared,
    claim: Arc<Claim>,
}

impl PartialEq for MockPin {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.claim, &other.claim)
    }
}

impl Eq for MockPin {}

impl GpioPin for MockPin {
    fn id(&self) -> PinId {
        self.id
    }

    fn set_mode(&self, mode: PinMode) -> Result<()> {
        let mut state = self.shared.lock();
        let ok = !state.failing_mode.contains(&self.id);
        state.record(PlatformCall::SetMode {
            pin: self.id,
            mode,
            ok,
        });

        if !ok {
            return Err(HardwareError::mode_change(self.id, "simulated mode fault"));
        }
        state.pin(self.id).mode = Some(mode);
        Ok(())
    }

    fn write(&self, value: PinValue) -> Result<()> {
        let mut state = self.shared.lock();
        let is_output = state.pin(self.id).mode == Some(PinMode::Output);
        let ok = is_output && !state.failing_writes.contains(&self.id);
        state.record(PlatformCall::Write {
            pin: self.id,
            value,
            ok,
        });

        if !is_output {
            return Err(HardwareError::write_failed(
                self.id,
                "pin is not configured as output",
            ));
        }
        if !ok {
            return Err(HardwareError::write_failed(self.id, "simulated write fault"));
        }
        state.pin(self.id).level = value;
        Ok(())
    }

    fn read(&self) -> Result<PinValue> {
        let mut state = self.shared.lock();
        if state.failing_reads.contains(&self.id) {
            return Err(HardwareError::read_failed(self.id, "simulated read fault"));
        }
        Ok(state.pin(self.id).level)
    }

    fn subscribe(&self) -> PinEvents {
        PinEvents::new(self.shared.lock().pin(self.id).edges.subscribe())
    }
}

/// Handle for inspecting and driving a [`MockGpio`].
///
/// The handle shares state with the platform and every controller and pin
/// obtained from it. It can be cloned and moved into other tasks.
#[derive(Debug, Clone)]
pub struct MockGpioHandle {
    shared: Shared,
}

impl MockGpioHandle {
    /// Every call made against the platform, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.shared.lock().calls.clone()
    }

    /// Successful writes to `pin`, oldest first.
    pub fn writes(&self, pin: PinId) -> Vec<(Instant, PinValue)> {
        self.shared
            .lock()
            .calls
            .iter()
            .filter_map(|recorded| match recorded.call {
                PlatformCall::Write {
                    pin: p,
                    value,
                    ok: true,
                } if p == pin => Some((recorded.at, value)),
                _ => None,
            })
            .collect()
    }

    /// Successful writes to `pin` as offsets from `origin`.
    pub fn writes_since(&self, pin: PinId, origin: Instant) -> Vec<(Duration, PinValue)> {
        self.writes(pin)
            .into_iter()
            .map(|(at, value)| (at.saturating_duration_since(origin), value))
            .collect()
    }

    /// Value of the most recent successful write to `pin`.
    pub fn last_written(&self, pin: PinId) -> Option<PinValue> {
        self.writes(pin).last().map(|(_, value)| *value)
    }

    /// Current mode of `pin`, if it was ever set.
    pub fn mode(&self, pin: PinId) -> Option<PinMode> {
        self.shared.lock().pins.get(&pin).and_then(|p| p.mode)
    }

    /// Whether `pin` is currently claimed.
    pub fn was_opened(&self, pin: PinId) -> bool {
        self.shared.lock().pins.get(&pin).is_some_and(|p| p.opened)
    }

    /// The pin handed out for `pin`, if it is currently claimed.
    ///
    /// The returned clone shares the claim, so it compares equal to the
    /// handle held by whoever opened the pin.
    pub fn opened_pin(&self, pin: PinId) -> Option<MockPin> {
        let claim = {
            let state = self.shared.lock();
            state.pins.get(&pin).and_then(|p| p.claim.upgrade())
        }?;

        Some(MockPin {
            id: pin,
            shared: self.shared.clone(),
            claim,
        })
    }

    /// Whether any call was made after controller discovery.
    pub fn touched_pins(&self) -> bool {
        self.shared
            .lock()
            .calls
            .iter()
            .any(|recorded| !matches!(recorded.call, PlatformCall::Discover { .. }))
    }

    /// Drive the level seen on an input pin.
    ///
    /// Publishes a [`PinEdge`] to subscribers when the level changes. Returns
    /// whether an edge was published.
    pub fn set_input(&self, pin: PinId, value: PinValue) -> bool {
        let mut state = self.shared.lock();
        let pin_state = state.pin(pin);
        if pin_state.level == value {
            return false;
        }
        pin_state.level = value;
        // No subscribers is not an error for a sensor.
        let _ = pin_state.edges.send(PinEdge::new(pin, value));
        true
    }

    /// Turn write faults on or off for `pin`.
    pub fn set_write_failure(&self, pin: PinId, failing: bool) {
        let mut state = self.shared.lock();
        if failing {
            state.failing_writes.insert(pin);
        } else {
            state.failing_writes.remove(&pin);
        }
    }
}
