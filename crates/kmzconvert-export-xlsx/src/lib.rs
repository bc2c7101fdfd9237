use anyhow::{Context, Result};
use kmzconvert_core::model::ReportRow;
use log::{info, warn};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

/// Longest text a single xlsx cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

pub const DEFAULT_FILE_NAME: &str = "resultados.xlsx";

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub sheet_name: String,
    /// File, coordinates, centroid, area.
    pub headers: [String; 4],
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Datos".to_string(),
            headers: [
                "Archivo".to_string(),
                "Polígono".to_string(),
                "Punto Referencia".to_string(),
                "Superficie".to_string(),
            ],
        }
    }
}

pub fn export_xlsx(rows: &[ReportRow], path: &Path, cfg: &ExportConfig) -> Result<()> {
    let mut workbook = build_workbook(rows, cfg)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir: {parent:?}"))?;
        }
    }
    workbook
        .save(path)
        .with_context(|| format!("write spreadsheet: {path:?}"))?;
    info!("event=export_done path={} rows={}", path.display(), rows.len());
    Ok(())
}

/// Same workbook as [`export_xlsx`], kept in memory for download-style consumers.
pub fn export_xlsx_buffer(rows: &[ReportRow], cfg: &ExportConfig) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(rows, cfg)?;
    workbook.save_to_buffer().context("serialize spreadsheet")
}

fn build_workbook(rows: &[ReportRow], cfg: &ExportConfig) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let area = Format::new().set_num_format("0.0");

    let sheet = workbook.add_worksheet();
    sheet
        .set_name(&cfg.sheet_name)
        .with_context(|| format!("invalid sheet name: {:?}", cfg.sheet_name))?;

    for (col, title) in cfg.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title, &header)?;
    }
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 60)?;
    sheet.set_column_width(2, 40)?;
    sheet.set_column_width(3, 14)?;

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        let coords = row.coordinates_text();
        let coords = if coords.chars().count() > MAX_CELL_CHARS {
            warn!(
                "event=cell_truncated file={} chars={}",
                row.source_filename,
                coords.chars().count()
            );
            truncate_chars(&coords, MAX_CELL_CHARS)
        } else {
            coords
        };
        sheet
            .write_string(r, 0, &row.source_filename)
            .with_context(|| format!("write row for {}", row.source_filename))?;
        sheet.write_string(r, 1, &coords)?;
        sheet.write_string(r, 2, &row.centroid)?;
        sheet.write_number_with_format(r, 3, row.area_hectares, &area)?;
    }

    Ok(workbook)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
