//! UI Theme - icons and formatting helpers

/// Status icons
#[derive(Debug, Clone, Copy)]
pub struct Icons {
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub info: &'static str,
    pub active: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            success: "✓",
            warning: "!",
            error: "✗",
            info: "•",
            active: "▸",
        }
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1024.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else if kb >= 1024.0 {
        format!("{mb:.1} MB")
    } else if kb >= 1.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{bytes} B")
    }
}

/// Percentage of `current` in `total`, clamped to 100. Zero when the total is unknown.
pub fn percent(current: u64, total: Option<u64>) -> u64 {
    match total {
        Some(total) if total > 0 => (current * 100 / total).min(100),
        _ => 0,
    }
}

/// Format download progress: bar, percentage and size, or just the
/// received size when the server sent no length.
pub fn format_download_progress(current: u64, total: Option<u64>) -> String {
    match total {
        Some(total) if total > 0 => {
            let bar = format_progress_bar(current, total, 24);
            let pct = percent(current, Some(total));
            format!("{bar}  {pct:>3}%  {}", format_size(total))
        }
        _ => format_size(current),
    }
}

/// Fixed-width bar using ▓ (filled) and ░ (empty).
pub fn format_progress_bar(current: u64, total: u64, width: usize) -> String {
    let filled = if total > 0 {
        (((current as f64 / total as f64) * width as f64).round() as usize).min(width)
    } else {
        0
    };
    let empty = width.saturating_sub(filled);
    format!("{}{}", "▓".repeat(filled), "░".repeat(empty))
}
