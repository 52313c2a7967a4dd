//! `cache status` handler.

use std::fmt::Write as _;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use sentimeter_store::CacheEntry;

use crate::context::AppContext;

pub(crate) fn run_cache_status(ctx: &AppContext) -> anyhow::Result<()> {
    let entries = ctx
        .cache
        .entries(SystemTime::now())
        .context("failed to list cache entries")?;

    if entries.is_empty() {
        println!(
            "no cache entries in {}; run `fetch` first",
            ctx.cache.dir().display()
        );
        return Ok(());
    }
    print!("{}", render_cache_status(&entries)?);
    Ok(())
}

pub(crate) fn render_cache_status(entries: &[CacheEntry]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{:<8}{:<12}{:<8}{:<10}FILE", "WINDOW", "AGE", "FRESH", "HANDLES")?;
    for entry in entries {
        writeln!(
            out,
            "{:<8}{:<12}{:<8}{:<10}{}",
            format!("{}d", entry.window_days),
            format_age(entry.age),
            if entry.fresh { "yes" } else { "no" },
            if entry.current_handles { "current" } else { "other" },
            entry.path.display()
        )?;
    }
    Ok(out)
}

/// Coarse human-readable age: `45s`, `12m`, `3h 05m`, `2d 04h`.
pub(crate) fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60),
        _ => format!("{}d {:02}h", secs / 86_400, (secs % 86_400) / 3600),
    }
}
