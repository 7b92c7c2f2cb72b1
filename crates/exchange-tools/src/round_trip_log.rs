//! JSONL log of translator round trips.
//!
//! Each line is one complete [`RoundTrip`] so the log can be streamed or
//! replayed through the validator later.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;
use translator::RoundTrip;

/// Append one round trip to `path`, creating parent directories as needed.
pub fn append_round_trip(trip: &RoundTrip, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let line = serde_json::to_string(trip).context("Failed to serialize round trip")?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open round-trip log {}", path.display()))?;
    writeln!(file, "{line}")
        .with_context(|| format!("Failed to append round trip to {}", path.display()))?;
    info!(path = %path.display(), accepted = trip.validation.accepted, "Appended round trip");
    Ok(())
}

/// Reads a round-trip log back.
pub struct RoundTripLogReader {
    trips: Vec<RoundTrip>,
}

impl RoundTripLogReader {
    pub fn read_from_file(path: &Path) -> std::io::Result<Self> {
        use std::fs::File;
        use std::io::{BufRead, BufReader};

        let reader = BufReader::new(File::open(path)?);
        let mut trips = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let trip: RoundTrip = serde_json::from_str(&line)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            trips.push(trip);
        }
        Ok(Self { trips })
    }

    pub fn trips(&self) -> &[RoundTrip] {
        &self.trips
    }

    pub fn accepted_count(&self) -> usize {
        self.trips.iter().filter(|t| t.validation.accepted).count()
    }
}
