use rand::Rng;

const UNITS: [(&str, f64); 4] = [
    ("T", 1_000_000_000_000.0),
    ("B", 1_000_000_000.0),
    ("M", 1_000_000.0),
    ("K", 1_000.0),
];

fn abbreviate(n: f64, units: &[(&'static str, f64)]) -> Option<(f64, &'static str)> {
    units
        .iter()
        .find(|(_, unit)| n >= *unit)
        .map(|(suffix, unit)| (n / unit, *suffix))
}

/// Fixed-point print with ties rounded away from zero.
fn fixed(n: f64, decimals: i32) -> String {
    let scale = 10f64.powi(decimals);
    format!("{:.*}", decimals as usize, (n * scale).round() / scale)
}

/// Balance-style rendering: two decimals, abbreviated from one thousand up.
pub fn format_number(n: f64) -> String {
    match abbreviate(n, &UNITS) {
        Some((value, suffix)) => format!("{}{}", fixed(value, 2), suffix),
        None => fixed(n, 2),
    }
}

/// Rate-style rendering: one decimal when abbreviated, whole units below one thousand.
pub fn format_compact(n: f64) -> String {
    match abbreviate(n, &UNITS) {
        Some((value, suffix)) => format!("{}{}", fixed(value, 1), suffix),
        None => format!("{:.0}", n.floor()),
    }
}

/// Lifetime total as it appears in share text. Tops out at billions.
pub fn format_share_total(n: f64) -> String {
    match abbreviate(n, &UNITS[1..]) {
        Some((value, suffix)) => format!("{}{}", fixed(value, 1), suffix),
        None => format!("{:.0}", n.floor()),
    }
}

/// Uniform draw in `[min, max)`.
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    rng.gen_range(0.0..1.0) * (max - min) + min
}
