// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal display utilities for the wavedex CLI.
//!
//! OneDark colors on dark terminals, One Light on light ones. The theme comes
//! from `WAVEDEX_THEME` ("dark" or "light") if set, then the `COLORFGBG`
//! background hint, and is dark otherwise. `NO_COLOR` and non-TTY stdout turn
//! styling off.

use std::io::IsTerminal;
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
use indicatif::ProgressStyle;

use wavedex::build::{IndexSummary, Query};
use wavedex::RankedDoc;

// Width between │ and │ (excluding border chars)
pub const BOX_WIDTH: usize = 72;

// ═══════════════════════════════════════════════════════════════════════════
// THEME DETECTION
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

static THEME: OnceLock<Theme> = OnceLock::new();

fn detect_theme() -> Theme {
    if let Ok(theme) = std::env::var("WAVEDEX_THEME") {
        match theme.to_lowercase().as_str() {
            "light" | "l" => return Theme::Light,
            "dark" | "d" => return Theme::Dark,
            _ => {}
        }
    }

    // "fg;bg"; backgrounds 7 and up (except 8) are light
    if let Ok(colorfgbg) = std::env::var("COLORFGBG") {
        if let Some(Ok(bg)) = colorfgbg.split(';').next_back().map(str::parse::<u8>) {
            if bg >= 7 && bg != 8 {
                return Theme::Light;
            }
        }
    }

    Theme::Dark
}

pub fn theme() -> Theme {
    *THEME.get_or_init(detect_theme)
}

// ═══════════════════════════════════════════════════════════════════════════
// PALETTES
// ═══════════════════════════════════════════════════════════════════════════

fn rgb(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

mod onedark {
    pub const GREEN: (u8, u8, u8) = (152, 195, 121); // #98c379
    pub const YELLOW: (u8, u8, u8) = (229, 192, 123); // #e5c07b
    pub const BLUE: (u8, u8, u8) = (97, 175, 239); // #61afef
    pub const CYAN: (u8, u8, u8) = (86, 182, 194); // #56b6c2
    pub const GRAY: (u8, u8, u8) = (92, 99, 112); // #5c6370
    pub const BRIGHT_GREEN: (u8, u8, u8) = (166, 226, 46);
}

mod onelight {
    pub const GREEN: (u8, u8, u8) = (80, 161, 79); // #50a14f
    pub const YELLOW: (u8, u8, u8) = (193, 132, 1); // #c18401
    pub const BLUE: (u8, u8, u8) = (64, 120, 242); // #4078f2
    pub const CYAN: (u8, u8, u8) = (1, 132, 188); // #0184bc
    pub const GRAY: (u8, u8, u8) = (160, 161, 167); // #a0a1a7
    pub const BRIGHT_GREEN: (u8, u8, u8) = (68, 140, 39);
}

macro_rules! theme_color {
    ($name:ident) => {
        #[allow(non_snake_case)]
        pub fn $name() -> String {
            if !use_colors() {
                return String::new();
            }
            let (r, g, b) = match theme() {
                Theme::Dark => onedark::$name,
                Theme::Light => onelight::$name,
            };
            rgb(r, g, b)
        }
    };
}

theme_color!(GREEN);
theme_color!(YELLOW);
theme_color!(BLUE);
theme_color!(CYAN);
theme_color!(GRAY);
theme_color!(BRIGHT_GREEN);

// ═══════════════════════════════════════════════════════════════════════════
// CORE UTILITIES
// ═══════════════════════════════════════════════════════════════════════════

pub fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

fn reset() -> &'static str {
    if use_colors() {
        RESET
    } else {
        ""
    }
}

/// Theme color plus optional modifiers, or plain text off a TTY.
pub fn themed(color_fn: fn() -> String, modifiers: &[&str], text: &str) -> String {
    if use_colors() {
        format!("{}{}{}{}", modifiers.join(""), color_fn(), text, RESET)
    } else {
        text.to_string()
    }
}

/// Length without ANSI escapes.
pub fn visible_len(s: &str) -> usize {
    let mut in_escape = false;
    let mut len = 0;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape && c == 'm' {
            in_escape = false;
        } else if !in_escape {
            len += 1;
        }
    }
    len
}

pub fn pad_right(s: &str, width: usize) -> String {
    let visible = visible_len(s);
    if visible >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visible))
    }
}

pub fn pad_left(s: &str, width: usize) -> String {
    let visible = visible_len(s);
    if visible >= width {
        s.to_string()
    } else {
        format!("{}{}", " ".repeat(width - visible), s)
    }
}

pub fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Score colored by size relative to the best result.
pub fn score_value(score: f64, best: f64) -> String {
    let text = format!("{:>8.3}", score);
    if best <= 0.0 {
        return text;
    }
    let ratio = score / best;
    let color = if ratio >= 0.9 {
        BRIGHT_GREEN
    } else if ratio >= 0.5 {
        GREEN
    } else if ratio >= 0.2 {
        YELLOW
    } else {
        GRAY
    };
    themed(color, &[], &text)
}

#[cfg(feature = "parallel")]
pub fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━╸")
}

// ═══════════════════════════════════════════════════════════════════════════
// BOX DRAWING
// ═══════════════════════════════════════════════════════════════════════════

/// │ content          │
pub fn row(content: &str) {
    let border = GRAY();
    let pad = BOX_WIDTH.saturating_sub(visible_len(content));
    println!(
        "{}│{}{}{}{}│{}",
        border,
        reset(),
        content,
        " ".repeat(pad),
        border,
        reset()
    );
}

/// ┌─ LABEL ──────────┐
pub fn section_top(label: &str) {
    let border = GRAY();
    let label_part = format!("─ {} ", themed(CYAN, &[BOLD], label));
    let remaining = BOX_WIDTH.saturating_sub(visible_len(&label_part));
    println!(
        "{}┌{}{}{}{}┐{}",
        border,
        reset(),
        label_part,
        border,
        "─".repeat(remaining),
        reset()
    );
}

/// ├─ LABEL ──────────┤
pub fn section_mid(label: &str) {
    let border = GRAY();
    let label_part = format!("─ {} ", themed(CYAN, &[BOLD], label));
    let remaining = BOX_WIDTH.saturating_sub(visible_len(&label_part));
    println!(
        "{}├{}{}{}{}┤{}",
        border,
        reset(),
        label_part,
        border,
        "─".repeat(remaining),
        reset()
    );
}

/// └──────────────────┘
pub fn section_bot() {
    println!("{}└{}┘{}", GRAY(), "─".repeat(BOX_WIDTH), reset());
}

// ═══════════════════════════════════════════════════════════════════════════
// REPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub fn print_summary(path: &str, file_size: usize, summary: &IndexSummary) {
    section_top("INDEX");
    row(&format!(" file       {}", themed(BLUE, &[], path)));
    row(&format!(" size       {}", format_size(file_size)));
    row(&format!(" documents  {}", summary.doc_count));
    row(&format!(" in memory  {}", format_size(summary.total_bytes)));

    section_mid("PROPERTIES");
    row(&format!(
        " {} {} {} {} {}",
        pad_right("name", 20),
        pad_left("text", 10),
        pad_left("rate", 6),
        pad_right(" encoding", 13),
        pad_left("size", 10)
    ));
    for p in &summary.properties {
        row(&format!(
            " {} {} {} {} {}",
            pad_right(&themed(CYAN, &[], &p.name), 20),
            pad_left(&p.text_len.to_string(), 10),
            pad_left(&p.sample_rate.to_string(), 6),
            pad_right(&format!(" {}", p.encoding), 13),
            pad_left(&format_size(p.bytes), 10)
        ));
    }

    if !summary.filters.is_empty() {
        section_mid("FILTERS");
        for f in &summary.filters {
            row(&format!(
                " {} {} values, {} entries",
                pad_right(&themed(CYAN, &[], &f.name), 20),
                f.values,
                f.entries
            ));
        }
    }

    section_mid("DOCUMENT ARRAYS");
    row(&format!(" total      {}", format_size(summary.doc_array_bytes)));
    section_bot();
}

pub fn print_results(query: &Query, results: &[RankedDoc], key: impl Fn(&RankedDoc) -> Option<String>) {
    section_top("RESULTS");
    row(&format!(" query      {}", themed(BLUE, &[], &query.terms.join(" "))));
    if results.is_empty() {
        row(&themed(GRAY, &[], " no matching documents"));
        section_bot();
        return;
    }
    section_mid(&format!("{} documents", results.len()));
    let best = results.first().map_or(0.0, |r| r.score);
    for (rank, r) in results.iter().enumerate() {
        let key = key(r).unwrap_or_default();
        row(&format!(
            " {} {} {} {}",
            pad_left(&format!("{}.", rank + 1), 4),
            score_value(r.score, best),
            pad_left(&format!("#{}", r.doc_id.get()), 8),
            key
        ));
    }
    section_bot();
}
