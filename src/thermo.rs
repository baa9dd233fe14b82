//! Temperature reporting.

/// Suppresses readings that differ from the last reported one by less than
/// `epsilon` (all values in tenths of a degree Celsius).
pub struct TemperatureFilter {
    last: Option<i16>,
    epsilon: i16,
}

impl TemperatureFilter {
    pub const fn new(epsilon: i16) -> Self {
        Self { last: None, epsilon }
    }

    /// The reading to report, if any. The first reading is always reported.
    pub fn update(&mut self, tenths: i16) -> Option<i16> {
        match self.last {
            Some(last) if tenths.abs_diff(last) < self.epsilon.unsigned_abs() => None,
            _ => {
                self.last = Some(tenths);
                Some(tenths)
            }
        }
    }
}
