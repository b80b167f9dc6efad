//! Time math for activity phases
//!
//! Travel legs are derived from world distance at a fixed speed; phase
//! progress is always reported as a clamped fraction so consumers can drive
//! progress bars without defending against out-of-range values.
//!
//! All durations are f64 seconds of wall-clock time.

/// Movement speed used to convert distance into a travel duration,
/// in world units per minute.
pub const SPEED_UNITS_PER_MINUTE: f64 = 60.0;

/// Distances at or below this are treated as "already there": the travel
/// phase is skipped entirely and the job starts executing.
pub const TRAVEL_TOLERANCE_UNITS: f64 = 1.0;

/// Convert a world distance into a travel duration in seconds at a given
/// speed.
///
/// Distances within [`TRAVEL_TOLERANCE_UNITS`] yield a zero-length travel
/// phase regardless of speed.
///
/// # Panics
/// Panics if the distance is negative or not finite, or if the speed is
/// not positive.
pub fn travel_duration_secs_at(distance: f64, speed_units_per_minute: f64) -> f64 {
    assert!(distance.is_finite() && distance >= 0.0, "distance must be non-negative");
    assert!(speed_units_per_minute > 0.0, "speed must be positive");
    if distance <= TRAVEL_TOLERANCE_UNITS {
        0.0
    } else {
        distance / speed_units_per_minute * 60.0
    }
}

/// Convert a world distance into a travel duration in seconds at the
/// default speed.
///
/// # Example
/// ```
/// use activity_engine_core_rs::core::time::travel_duration_secs;
///
/// assert_eq!(travel_duration_secs(0.5), 0.0); // within tolerance
/// assert_eq!(travel_duration_secs(60.0), 60.0); // 60 units at 60 units/min
/// ```
pub fn travel_duration_secs(distance: f64) -> f64 {
    travel_duration_secs_at(distance, SPEED_UNITS_PER_MINUTE)
}

/// Seconds elapsed in a phase, given its original duration and what remains.
///
/// # Example
/// ```
/// use activity_engine_core_rs::core::time::phase_elapsed;
///
/// assert_eq!(phase_elapsed(600.0, 450.0), 150.0);
/// ```
pub fn phase_elapsed(original: f64, remaining: f64) -> f64 {
    (original - remaining).max(0.0)
}

/// Normalized progress of a phase, clamped to [0, 1].
///
/// A zero-length phase reports full progress immediately.
///
/// # Example
/// ```
/// use activity_engine_core_rs::core::time::progress_fraction;
///
/// assert_eq!(progress_fraction(600.0, 450.0), 0.25);
/// assert_eq!(progress_fraction(0.0, 0.0), 1.0);
/// ```
pub fn progress_fraction(original: f64, remaining: f64) -> f64 {
    if original <= 0.0 {
        return 1.0;
    }
    (phase_elapsed(original, remaining) / original).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_duration_at_tolerance_boundary() {
        assert_eq!(travel_duration_secs(TRAVEL_TOLERANCE_UNITS), 0.0);
        assert!(travel_duration_secs(TRAVEL_TOLERANCE_UNITS + 0.001) > 0.0);
    }

    #[test]
    #[should_panic(expected = "distance must be non-negative")]
    fn test_negative_distance_panics() {
        travel_duration_secs(-1.0);
    }

    #[test]
    fn test_progress_never_exceeds_unit_interval() {
        // Remaining larger than original (stale authoritative data) clamps to 0.
        assert_eq!(progress_fraction(10.0, 20.0), 0.0);
        // Negative remaining clamps to 1.
        assert_eq!(progress_fraction(10.0, -5.0), 1.0);
    }
}
