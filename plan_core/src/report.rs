//! CSV export of aggregated totals.

use crate::aggregation::{format_deciseconds, Aggregate, SportTotals};
use crate::sports::SportTaxonomy;
use crate::Result;
use std::io::Write;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    sport: &'a str,
    unit: &'a str,
    workouts: u32,
    moveframes: u32,
    movelaps: u32,
    distance_m: u64,
    duration_ds: u64,
    duration: String,
    series: u64,
    repetitions: u64,
}

impl<'a> CsvRow<'a> {
    fn new(sport: &'a str, unit: &'a str, totals: &SportTotals) -> Self {
        CsvRow {
            sport,
            unit,
            workouts: totals.workout_count,
            moveframes: totals.moveframe_count,
            movelaps: totals.movelap_count,
            distance_m: totals.distance_meters,
            duration_ds: totals.duration_deciseconds,
            duration: format_deciseconds(totals.duration_deciseconds),
            series: totals.series,
            repetitions: totals.repetitions,
        }
    }
}

/// Write one row per sport plus a `total` row
pub fn write_totals_csv<W: Write>(
    aggregate: &Aggregate,
    taxonomy: &SportTaxonomy,
    out: W,
) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let mut rows = 0;

    for (sport, totals) in &aggregate.per_sport {
        let info = taxonomy.info(sport);
        writer.serialize(CsvRow::new(sport.as_str(), &info.distance_unit, totals))?;
        rows += 1;
    }
    writer.serialize(CsvRow::new("total", "", &aggregate.grand))?;
    rows += 1;

    writer.flush()?;
    tracing::debug!("Wrote {} totals rows", rows);
    Ok(rows)
}

/// Export totals to a CSV file, replacing it
pub fn export_totals_csv(aggregate: &Aggregate, taxonomy: &SportTaxonomy, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let rows = write_totals_csv(aggregate, taxonomy, std::io::BufWriter::new(file))?;
    tracing::info!("Exported {} rows to {:?}", rows, path);
    Ok(rows)
}
