quantity!(
    /// Unit rate in minor currency units (pence) per kilowatt-hour, including VAT.
    UnitRate,
    "p/kWh"
);

quantity!(
    /// Standing charge in minor currency units per day.
    StandingCharge,
    "p/day"
);

impl UnitRate {
    /// Rates below this are considered off-peak.
    pub const OFF_PEAK_THRESHOLD: Self = Self(15.0);

    /// Fallback off-peak rate when the tariff does not publish one.
    pub const DEFAULT_OFF_PEAK: Self = Self(7.0);

    /// Fallback peak rate when the tariff does not publish one.
    pub const DEFAULT_PEAK: Self = Self(30.0);

    pub fn is_off_peak(self) -> bool {
        self < Self::OFF_PEAK_THRESHOLD
    }
}
