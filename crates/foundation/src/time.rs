/// Event timestamp in milliseconds, as delivered by the browser.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Millis(pub f64);

impl Millis {
    /// Elapsed milliseconds from `earlier` to `self`.
    pub fn since(self, earlier: Millis) -> f64 {
        self.0 - earlier.0
    }
}
