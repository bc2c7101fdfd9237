use crate::error::ConvertError;
use crate::metrics::{close_ring, MetricsConfig, MetricsEngine};
use crate::model::{CoordinateSequence, ErrorRecord, ReportRow, SourceFormat};
use crate::source::{InputFile, InputSource};
use log::{debug, info, warn};

/// Turns one input into its coordinate sequence. Implemented by the KML/KMZ importer.
pub trait CoordinateReader {
    fn read(
        &self,
        source: &InputSource,
        filename: &str,
    ) -> Result<CoordinateSequence, ConvertError>;
}

impl<F> CoordinateReader for F
where
    F: Fn(&InputSource, &str) -> Result<CoordinateSequence, ConvertError>,
{
    fn read(
        &self,
        source: &InputSource,
        filename: &str,
    ) -> Result<CoordinateSequence, ConvertError> {
        self(source, filename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    HasData,
    NoValidData,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub rows: Vec<ReportRow>,
    pub errors: Vec<ErrorRecord>,
}

impl BatchOutcome {
    pub fn status(&self) -> BatchStatus {
        if self.rows.is_empty() {
            BatchStatus::NoValidData
        } else {
            BatchStatus::HasData
        }
    }

    pub fn files_total(&self) -> usize {
        self.rows.len() + self.errors.len()
    }
}

pub struct BatchProcessor<R> {
    reader: R,
    metrics: MetricsEngine,
}

impl<R: CoordinateReader> BatchProcessor<R> {
    pub fn new(reader: R, cfg: MetricsConfig) -> Self {
        Self {
            reader,
            metrics: MetricsEngine::new(cfg),
        }
    }

    /// Processes every file in order. A failing file becomes an [`ErrorRecord`]
    /// and never stops the rest of the batch.
    pub fn process(&self, files: &[InputFile]) -> BatchOutcome {
        let mut rows = Vec::new();
        let mut errors = Vec::new();

        for file in files {
            match self.process_one(file) {
                Ok(row) => {
                    debug!(
                        "event=file_done file={} points={} area_ha={}",
                        file.name,
                        row.coordinates.len(),
                        row.area_hectares
                    );
                    rows.push(row);
                }
                Err(err) => {
                    warn!(
                        "event=file_failed file={} kind={:?} error={err}",
                        file.name,
                        err.kind()
                    );
                    errors.push(ErrorRecord::new(&file.name, &err));
                }
            }
        }

        info!(
            "event=batch_done files={} rows={} errors={}",
            files.len(),
            rows.len(),
            errors.len()
        );
        BatchOutcome { rows, errors }
    }

    fn process_one(&self, file: &InputFile) -> Result<ReportRow, ConvertError> {
        SourceFormat::from_filename(&file.name)?;
        let coords = self.reader.read(&file.source, &file.name)?;
        let metrics = self.metrics.compute(&coords)?;
        // The exported polygon is the closed ring the area was computed on.
        Ok(ReportRow::new(&file.name, close_ring(&coords), metrics))
    }
}

/// Runs a batch with the default metrics configuration.
pub fn process<R: CoordinateReader>(reader: R, files: &[InputFile]) -> BatchOutcome {
    BatchProcessor::new(reader, MetricsConfig::default()).process(files)
}
