/// Time source abstraction.
///
/// The sync channel never reads the wall clock itself; reconnect deadlines
/// are computed from the timestamps handed to it, so tests can drive time.
///
/// # Example
///
/// ```rust
/// use gpio_panel::traits::Clock;
/// use gpio_panel::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}
