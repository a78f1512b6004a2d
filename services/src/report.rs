//! Spreadsheet export
//!
//! Sheets are first laid out as plain rows of [`Cell`]s so their content can be inspected without
//! going through a file, then written out with [`rust_xlsxwriter`].

use std::path::Path;

use rust_xlsxwriter::{
    Format,
    Workbook,
    XlsxError,
};
use serde_json::Value;
use tracing::{
    debug,
    info,
};
use wrapped_core::Play;

use crate::{
    service::{
        DetailTable,
        InsightValue,
        Insights,
    },
    stats::{
        format_play_time,
        top_artists,
        top_tracks,
        Period,
        TopEntry,
    },
};

pub const SPOTIFY_REPORT: &str = "spotify_analysis_report.xlsx";
pub const TIKTOK_REPORT: &str = "tiktok_analysis_report.xlsx";

/// Rows written per ranking in the workbook
pub const DEFAULT_EXPORT_TOP: usize = 20;

const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 50;
const MAX_SHEET_NAME: usize = 31;


#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Title(String),
    Header(String),
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    fn display_len(&self) -> usize {
        match self {
            Cell::Empty => 0,
            Cell::Title(s) | Cell::Header(s) | Cell::Text(s) => s.chars().count(),
            Cell::Number(n) => n.to_string().len(),
            Cell::Bool(b) => b.to_string().len(),
        }
    }
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => n.as_f64().map_or_else(|| Cell::Text(n.to_string()), Cell::Number),
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<&InsightValue> for Cell {
    fn from(value: &InsightValue) -> Self {
        match value {
            InsightValue::Text(s) => Cell::Text(s.clone()),
            InsightValue::Count(n) => Cell::Number(*n as f64),
        }
    }
}

fn headers(names: impl IntoIterator<Item = impl Into<String>>) -> Vec<Cell> {
    names.into_iter().map(|n| Cell::Header(n.into())).collect()
}


#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetLayout {
    pub fn new(name: &str) -> Self {
        Self {
            name: sanitize_sheet_name(name),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) { self.rows.push(row) }

    /// Longest cell per column plus padding, clamped to a readable range
    pub fn column_widths(&self) -> Vec<f64> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or_default();
        (0..columns)
            .map(|c| {
                let longest = self.rows.iter().filter_map(|r| r.get(c)).map(Cell::display_len).max().unwrap_or_default();
                (longest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) as f64
            })
            .collect()
    }
}

/// Excel rejects `[]:*?/\` in sheet names and caps them at 31 characters
pub fn sanitize_sheet_name(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect()
}


fn sheet_name(period: Period) -> String {
    match period {
        Period::All => "All time".to_owned(),
        Period::Year(y) => y.to_string(),
    }
}

fn track_row(entry: &TopEntry) -> Vec<Cell> {
    vec![
        Cell::Text(entry.name.clone()),
        Cell::Text(entry.artist.clone().unwrap_or_default()),
        Cell::Number(entry.plays as f64),
        Cell::Text(format_play_time(entry.ms_played)),
    ]
}

fn artist_row(entry: &TopEntry) -> Vec<Cell> {
    vec![
        Cell::Text(entry.name.clone()),
        Cell::Number(entry.plays as f64),
        Cell::Text(format_play_time(entry.ms_played)),
    ]
}

/// Top tracks followed by top artists, separated by a blank row
pub fn period_sheet(period: Period, plays: &[Play], top_n: usize) -> SheetLayout {
    let selected = period.select(plays);
    let mut sheet = SheetLayout::new(&sheet_name(period));

    sheet.push(vec![Cell::Title(format!("Top {top_n} Tracks ({period})"))]);
    sheet.push(headers(["Track", "Artist", "Plays", "Play time"]));
    top_tracks(selected.iter().copied(), top_n).iter().for_each(|e| sheet.push(track_row(e)));

    sheet.push(Vec::new());
    sheet.push(vec![Cell::Title(format!("Top {top_n} Artists ({period})"))]);
    sheet.push(headers(["Artist", "Plays", "Total play time"]));
    top_artists(selected, top_n).iter().for_each(|e| sheet.push(artist_row(e)));

    sheet
}

/// An all time sheet plus one sheet per year, in the order given
pub fn spotify_sheets(plays: &[Play], years: &[i32], top_n: usize) -> Vec<SheetLayout> {
    std::iter::once(Period::All)
        .chain(years.iter().copied().map(Period::Year))
        .map(|p| period_sheet(p, plays, top_n))
        .collect()
}

fn detail_sheet(table: &DetailTable) -> SheetLayout {
    let mut sheet = SheetLayout::new(table.name);
    sheet.push(headers(table.columns.iter().map(String::as_str)));
    for row in &table.rows {
        sheet.push(row.iter().map(Cell::from).collect());
    }
    sheet
}

/// A summary of the insights followed by one sheet per detail table
pub fn tiktok_sheets(insights: &Insights, tables: &[DetailTable]) -> Vec<SheetLayout> {
    let mut summary = SheetLayout::new("Summary");
    summary.push(headers(["Metric", "Value"]));
    for (label, value) in insights.sections().iter().flat_map(|s| s.rows.iter()) {
        summary.push(vec![Cell::Text((*label).to_owned()), Cell::from(value)]);
    }

    std::iter::once(summary).chain(tables.iter().map(detail_sheet)).collect()
}


pub fn write_workbook(sheets: &[SheetLayout], path: &Path) -> Result<(), XlsxError> {
    let title = Format::new().set_bold().set_font_size(13);
    let header = Format::new().set_bold();

    let mut workbook = Workbook::new();
    for sheet in sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(&sheet.name)?;
        for (r, row) in sheet.rows.iter().enumerate() {
            let r = r as u32;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Empty => continue,
                    Cell::Title(s) => ws.write_string_with_format(r, c, s, &title)?,
                    Cell::Header(s) => ws.write_string_with_format(r, c, s, &header)?,
                    Cell::Text(s) => ws.write_string(r, c, s)?,
                    Cell::Number(n) => ws.write_number(r, c, *n)?,
                    Cell::Bool(b) => ws.write_boolean(r, c, *b)?,
                };
            }
        }
        for (c, width) in sheet.column_widths().into_iter().enumerate() {
            ws.set_column_width(c as u16, width)?;
        }
        debug!(sheet = %sheet.name, rows = sheet.rows.len(), "Wrote sheet");
    }

    workbook.save(path)?;
    info!(path = %path.display(), sheets = sheets.len(), "Saved workbook");
    Ok(())
}


#[cfg(test)]
mod tests {
    use std::{
        fs::File,
        io::Read,
    };

    use serde_json::json;
    use tempfile::TempDir;
    use time::macros::datetime;

    use super::*;

    fn plays() -> Vec<Play> {
        let play = |track: &str, artist: &str, at: i64| Play {
            listened_at: at,
            track: track.to_owned(),
            artist: Some(artist.to_owned()),
            album: None,
            ms_played: 180_000,
        };
        let y2023 = datetime!(2023-06-01 12:00 UTC).unix_timestamp();
        let y2024 = datetime!(2024-06-01 12:00 UTC).unix_timestamp();
        vec![
            play("Burn Brighter", "Lansdowne", y2023),
            play("Burn Brighter", "Lansdowne", y2024),
            play("Angel With A Shotgun", "The Cab", y2024),
        ]
    }

    #[test]
    fn period_sheet_layout() {
        let sheet = period_sheet(Period::Year(2024), &plays(), 20);

        assert_eq!(sheet.name, "2024");
        assert_eq!(sheet.rows[0], vec![Cell::Title("Top 20 Tracks (Year 2024)".to_owned())]);
        assert_eq!(sheet.rows[1][0], Cell::Header("Track".to_owned()));
        // 2 tracks, blank, title, header, 2 artists
        assert_eq!(sheet.rows.len(), 2 + 2 + 1 + 2 + 2);
        assert!(sheet.rows[4].is_empty());
        assert_eq!(sheet.rows[5], vec![Cell::Title("Top 20 Artists (Year 2024)".to_owned())]);
        assert_eq!(sheet.rows[7], vec![
            Cell::Text("Lansdowne".to_owned()),
            Cell::Number(1.0),
            Cell::Text("3 min (0.1 h)".to_owned()),
        ]);
    }

    #[test]
    fn spotify_sheet_order() {
        let names: Vec<_> = spotify_sheets(&plays(), &[2024, 2023], 5).into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["All time", "2024", "2023"]);
    }

    #[test]
    fn widths_are_clamped() {
        let mut sheet = SheetLayout::new("w");
        sheet.push(vec![Cell::Text("short".to_owned()), Cell::Text("x".repeat(80)), Cell::Text("exactly 16 chars".to_owned())]);
        assert_eq!(sheet.column_widths(), vec![10.0, 50.0, 18.0]);
        assert!(SheetLayout::new("empty").column_widths().is_empty());
    }

    #[test]
    fn sheet_names_are_sanitized() {
        assert_eq!(sanitize_sheet_name("Search [History]?"), "Search _History__");
        assert_eq!(sanitize_sheet_name(&"a".repeat(40)).len(), 31);
    }

    #[test]
    fn tiktok_layout() {
        let data = json!({
            "Profile": { "Profile Info": { "ProfileMap": { "userName": "night.owl" } } },
            "Your Activity": { "Searches": { "SearchList": [{ "Date": "2024-01-02", "SearchTerm": "cats", "Count": 2 }] } }
        });
        let sheets = tiktok_sheets(&Insights::extract(&data), &crate::service::detail_tables(&data));

        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "Summary");
        assert_eq!(sheets[0].rows[1], vec![Cell::Text("Username".to_owned()), Cell::Text("night.owl".to_owned())]);
        assert_eq!(sheets[1].name, "Search History");
        assert_eq!(sheets[1].rows[1], vec![
            Cell::Text("2024-01-02".to_owned()),
            Cell::Text("cats".to_owned()),
            Cell::Number(2.0)
        ]);
    }

    #[test]
    fn writes_xlsx() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SPOTIFY_REPORT);
        write_workbook(&spotify_sheets(&plays(), &[2024, 2023], 20), &path).unwrap();

        let mut zip = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut workbook = String::new();
        zip.by_name("xl/workbook.xml").unwrap().read_to_string(&mut workbook).unwrap();
        assert!(workbook.contains(r#"name="All time""#));
        assert!(workbook.contains(r#"name="2024""#));
        assert!(workbook.contains(r#"name="2023""#));
    }
}
