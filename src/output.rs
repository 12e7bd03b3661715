use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::macros::format_description;

use crate::report::local_now;
use crate::types::{AggregatedResult, Details};

/// `<date> <HH_MM_SS>.csv`, used when no output file is given.
pub fn default_csv_path() -> PathBuf {
    let fmt = format_description!("[year]-[month]-[day] [hour]_[minute]_[second]");
    let stamp = local_now()
        .format(fmt)
        .unwrap_or_else(|_| String::from("results"));
    PathBuf::from(format!("{stamp}.csv"))
}

/// Write one `Server,Username,Password` row per successful login.
pub fn write_csv(mut w: impl Write, results: &AggregatedResult) -> std::io::Result<()> {
    writeln!(w, "Server,Username,Password")?;
    for record in results.values() {
        writeln!(
            w,
            "{},{},{}",
            csv_field(&record.target),
            csv_field(&record.credential.username),
            csv_field(&record.credential.password)
        )?;
    }
    w.flush()
}

pub fn write_csv_file(path: &Path, results: &AggregatedResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(BufWriter::new(file), results)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Target -> catalog, only for records that captured one.
pub fn details_map(results: &AggregatedResult) -> BTreeMap<&str, &Details> {
    results
        .values()
        .filter_map(|r| r.details.as_ref().map(|d| (r.target.as_str(), d)))
        .collect()
}

pub fn write_details_json(path: &Path, results: &AggregatedResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &details_map(results))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Quote a field only when it would otherwise break the row.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
