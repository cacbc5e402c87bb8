/// Rounds to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Integer hundredths of `value`. Dose labels are compared in this unit.
pub fn to_cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

pub fn round_to_int(value: f64) -> i64 {
    value.round() as i64
}
