/// Penalty charged to the shop for overtime preparation, in currency units.
/// Bands: up to 5 minutes over → 20, up to 10 over → 50, beyond that → 100.
pub fn penalty_for_overtime(overtime_minutes: f64) -> u32 {
    if overtime_minutes <= 5.0 {
        20
    } else if overtime_minutes <= 10.0 {
        50
    } else {
        100
    }
}
