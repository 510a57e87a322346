//! Pointer movement that looks like a person glancing over the page.

use rand::Rng;
use std::time::Duration;

/// One pointer gesture: glide to `target` over `steps` intermediate points,
/// then rest for `pause`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerMove {
    pub target: (f64, f64),
    pub steps: u32,
    pub pause: Duration,
}

/// Draw 2 to 4 gestures to random points inside the usual content area.
pub fn plan_pointer_moves() -> Vec<PointerMove> {
    let mut rng = rand::thread_rng();
    let count = rng.gen_range(2..=4);
    (0..count)
        .map(|_| PointerMove {
            target: (rng.gen_range(100.0..=1200.0), rng.gen_range(100.0..=800.0)),
            steps: rng.gen_range(5..=15),
            pause: Duration::from_millis(rng.gen_range(100..=300)),
        })
        .collect()
}

/// Evenly spaced points from `from` (exclusive) to `to` (inclusive).
pub fn interpolate(from: (f64, f64), to: (f64, f64), steps: u32) -> Vec<(f64, f64)> {
    let steps = steps.max(1);
    (1..=steps)
        .map(|i| {
            let t = f64::from(i) / f64::from(steps);
            (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
        })
        .collect()
}
