//! Render any table to a styled, downloadable XLSX byte stream

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Color, Format, Workbook};

use super::{Cell, DataTable};

/// Header row background (the application's banner blue).
const HEADER_BG: u32 = 0x1E3C72;
/// Column widths are sized to content but never wider than this.
const MAX_COL_WIDTH: f64 = 60.0;

/// Render a filtered/sorted table to XLSX bytes: bold white-on-blue header,
/// frozen header row, content-sized columns, auto-filter over the full data
/// range. Failures return an error and no bytes; callers never write a
/// partial file.
pub fn to_xlsx_bytes(table: &DataTable, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .context("invalid sheet name")?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_BG));

    for (col, label) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, label, &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_no = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_no = col_idx as u16;
            match cell {
                Cell::Empty => {}
                Cell::Int(i) => {
                    worksheet.write_number(row_no, col_no, *i as f64)?;
                }
                Cell::Float(f) => {
                    worksheet.write_number(row_no, col_no, *f)?;
                }
                _ => {
                    worksheet.write_string(row_no, col_no, cell.display())?;
                }
            }
        }
    }

    for (col_idx, label) in table.columns.iter().enumerate() {
        let mut width = label.chars().count();
        for row in &table.rows {
            if let Some(cell) = row.get(col_idx) {
                width = width.max(cell.display().chars().count());
            }
        }
        let width = ((width + 2) as f64).min(MAX_COL_WIDTH);
        worksheet.set_column_width(col_idx as u16, width)?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    if !table.columns.is_empty() {
        worksheet.autofilter(0, 0, table.rows.len() as u32, (table.columns.len() - 1) as u16)?;
    }

    workbook
        .save_to_buffer()
        .context("failed to serialize workbook")
}

/// `<prefix>_<YYYYMMDD_HHMMSS>.xlsx`
pub fn export_filename(prefix: &str) -> String {
    format!("{}_{}.xlsx", prefix, Local::now().format("%Y%m%d_%H%M%S"))
}
