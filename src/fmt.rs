/// Group the integer part of a non-negative rounded value with commas: 1234567 -> "1,234,567".
fn thousands(val: f64) -> String {
    let digits = format!("{:.0}", val.abs());
    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

fn signed(val: f64, body: String) -> String {
    if val < 0.0 && val.round() != 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

/// Whole-unit currency with thousands separators: `R$ 1,234`.
pub fn money(val: f64, symbol: &str) -> String {
    signed(val, format!("{symbol} {}", thousands(val)))
}

/// Whole kilograms with thousands separators: `1,234 kg`.
pub fn weight(val: f64) -> String {
    signed(val, format!("{} kg", thousands(val)))
}

/// Compact axis label: 950, 1.5k, 12k, 2.5M.
pub fn compact(val: f64) -> String {
    let abs = val.abs();
    let sign = if val < 0.0 { "-" } else { "" };
    let (scaled, suffix) = if abs >= 1_000_000.0 {
        (abs / 1_000_000.0, "M")
    } else if abs >= 1000.0 {
        (abs / 1000.0, "k")
    } else {
        return format!("{sign}{:.0}", abs);
    };
    if scaled == scaled.floor() {
        format!("{sign}{}{suffix}", scaled as u64)
    } else {
        format!("{sign}{:.1}{suffix}", scaled)
    }
}
