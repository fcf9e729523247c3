use std::time::Instant;
use tracing::info;

/// Logs when a pipeline stage starts and how long it took once dropped.
pub struct Timer {
    stage: &'static str,
    start: Instant,
}

impl Timer {
    pub fn start(stage: &'static str) -> Self {
        info!("▶ {}", stage);
        Self {
            stage,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!("■ {} finished in {:.2?}", self.stage, self.start.elapsed());
    }
}

/// Group digits in thousands: 19208000 → "19,208,000". Fractions are rounded.
pub fn fmt_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}
