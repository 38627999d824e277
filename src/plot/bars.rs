//! Horizontal text bar charts for terminal output.
//!
//! Deterministic, fixed-width output (labels padded by character count so
//! Vietnamese names line up).

/// Render one bar per row, scaled so the largest value spans `width` cells.
pub fn render_bars(rows: &[(String, f64)], width: usize) -> String {
    let width = width.max(1);
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = rows
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    for (label, value) in rows {
        let cells = if max > 0.0 && value.is_finite() && *value > 0.0 {
            ((value / max) * width as f64).round().max(1.0) as usize
        } else {
            0
        };
        let pad = label_width - label.chars().count();
        out.push_str(&format!(
            "  {label}{} |{} {}\n",
            " ".repeat(pad),
            "█".repeat(cells),
            fmt_value(*value)
        ));
    }
    out
}

fn fmt_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e12 {
        format!("{}", v as i64)
    } else {
        format!("{v:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_value_fills_the_width() {
        let rows = vec![("a".to_string(), 2.0), ("bbb".to_string(), 1.0), ("c".to_string(), 0.0)];
        let out = render_bars(&rows, 10);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "  a   |██████████ 2");
        assert_eq!(lines[1], "  bbb |█████ 1");
        assert_eq!(lines[2], "  c   | 0");
    }

    #[test]
    fn pads_by_characters_not_bytes() {
        let rows = vec![("ĐỐNG ĐA".to_string(), 1.0), ("BA ĐÌNH".to_string(), 1.0)];
        let out = render_bars(&rows, 4);
        let bars: Vec<usize> = out.lines().map(|l| l.chars().position(|c| c == '|').unwrap()).collect();
        assert_eq!(bars[0], bars[1]);
    }
}
