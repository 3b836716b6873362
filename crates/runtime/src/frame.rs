use foundation::time::Millis;

/// Per-frame metadata for the render loop.
///
/// The loop is driven by the browser's animation-frame timestamps, so `time`
/// is wall-clock and `index` counts callbacks since startup.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Timestamp handed to the animation-frame callback.
    pub time: Millis,
}

impl Frame {
    pub fn first(time: Millis) -> Self {
        Self { index: 0, time }
    }

    pub fn next(self, time: Millis) -> Self {
        Self {
            index: self.index.wrapping_add(1),
            time,
        }
    }

    /// Milliseconds between `previous` and this frame, never negative.
    pub fn delta_ms(self, previous: Frame) -> f64 {
        self.time.since(previous.time).max(0.0)
    }
}
