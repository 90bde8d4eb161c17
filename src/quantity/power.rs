use crate::quantity::rate::UnitRate;

quantity!(Watts, "W");

impl Watts {
    pub const ONE_KILOWATT: Self = Self(1000.0);

    #[must_use]
    pub const fn kilowatts(self) -> f64 {
        self.0 / 1000.0
    }

    /// Running cost over one hour, in minor currency units.
    #[must_use]
    pub fn cost_per_hour(self, rate: UnitRate) -> f64 {
        self.kilowatts() * rate.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_cost_per_hour() {
        assert_abs_diff_eq!(Watts(1500.0).cost_per_hour(UnitRate(24.5)), 36.75);
    }
}
