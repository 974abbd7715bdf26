use crate::error::EngineError;
use crate::shared_data::Snapshot;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Consumer of finished snapshots (console, files, charts).
pub trait SnapshotSink {
    fn name(&self) -> &str;

    fn deliver(&mut self, snapshot: &Snapshot) -> Result<(), EngineError>;
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn deliver(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
        (**self).deliver(snapshot)
    }
}

/// Prints each snapshot as a status block.
pub struct ConsoleSink<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        writeln!(self.out, "\n=== Traffic Status ===")?;
        writeln!(
            self.out,
            "Cycle {} at {} ({} profile)",
            snapshot.cycle(),
            snapshot.captured_at().format("%Y-%m-%d %H:%M:%S"),
            snapshot.profile()
        )?;
        writeln!(self.out, "\nVehicle Counts:")?;
        for lane in snapshot.lanes() {
            writeln!(self.out, "\n{}:", lane.reading.lane.as_str().to_uppercase())?;
            for class in snapshot.classes() {
                writeln!(self.out, "{}: {}", class.label(), lane.reading.count(*class))?;
            }
            writeln!(self.out, "Total Vehicles: {}", lane.reading.total_vehicles())?;
            writeln!(self.out, "Total Traffic Units: {}", lane.score)?;
            writeln!(self.out, "Signal: {}", lane.signal)?;
        }
        writeln!(self.out, "\n{}", "=".repeat(20))?;
        self.out.flush()
    }
}

impl<W: Write> SnapshotSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn deliver(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
        self.render(snapshot)
            .map_err(|e| EngineError::sink("console", e))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvMode {
    /// Keep adding rows; the header is written once, when the file is new.
    /// An existing table must carry the same columns.
    Append,
    /// Replace the file with the latest snapshot on every delivery.
    Overwrite,
}

/// Writes the snapshot table to a CSV file.
pub struct CsvSink {
    path: PathBuf,
    mode: CsvMode,
}

impl CsvSink {
    pub fn append(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: CsvMode::Append,
        }
    }

    pub fn overwrite(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: CsvMode::Overwrite,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_table(&self, snapshot: &Snapshot) -> Result<(), EngineError> {
        let (file, needs_header) = match self.mode {
            CsvMode::Append => {
                let is_new = std::fs::metadata(&self.path)
                    .map(|meta| meta.len() == 0)
                    .unwrap_or(true);
                if !is_new {
                    self.check_existing_header(snapshot)?;
                }
                let file = OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(&self.path)?;
                (file, is_new)
            }
            CsvMode::Overwrite => (File::create(&self.path)?, true),
        };
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            wtr.write_record(snapshot.header())?;
        }
        for row in snapshot.rows() {
            wtr.write_record(row.to_record())?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn check_existing_header(&self, snapshot: &Snapshot) -> Result<(), EngineError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;
        let existing = match rdr.records().next() {
            Some(record) => record?,
            None => return Ok(()),
        };
        let expected = snapshot.header();
        if existing.iter().ne(expected.iter().map(String::as_str)) {
            return Err(EngineError::MalformedTable(format!(
                "existing columns [{}] do not match [{}]",
                existing.iter().collect::<Vec<_>>().join(","),
                expected.join(",")
            )));
        }
        Ok(())
    }
}

impl SnapshotSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    fn deliver(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
        self.write_table(snapshot)
            .map_err(|e| EngineError::sink(format!("csv:{}", self.path.display()), e))
    }
}

/// Appends each snapshot as one JSON document per line.
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append_line(&self, snapshot: &Snapshot) -> Result<(), EngineError> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer(&mut out, snapshot)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

impl SnapshotSink for JsonLinesSink {
    fn name(&self) -> &str {
        "json"
    }

    fn deliver(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
        self.append_line(snapshot)
            .map_err(|e| EngineError::sink(format!("json:{}", self.path.display()), e))
    }
}

/// Hands every snapshot to each inner sink, even when an earlier one fails.
#[derive(Default)]
pub struct FanOutSink {
    sinks: Vec<Box<dyn SnapshotSink>>,
}

impl FanOutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl SnapshotSink for FanOutSink {
    fn name(&self) -> &str {
        "fan-out"
    }

    fn deliver(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
        let mut failed = Vec::new();
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.deliver(snapshot) {
                log::warn!("{}", e);
                failed.push(sink.name().to_string());
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(EngineError::sink(
                "fan-out",
                format!("{} of {} sinks failed: {}", failed.len(), self.sinks.len(), failed.join(", ")),
            ))
        }
    }
}
