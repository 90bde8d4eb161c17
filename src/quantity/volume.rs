quantity!(
    /// Gas volume as reported by SMETS2 meters.
    CubicMeters,
    "m³"
);
