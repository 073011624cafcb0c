//! Map interchange: the integer-grid document in JSON and CSV form.
//!
//! # JSON
//!
//! ```json
//! { "name": "my-map", "sizeX": 3, "sizeY": 2,
//!   "grid": [[0, 1, 2], [3, 9, 0]],
//!   "startPoint": [0, 0], "endPoint": null }
//! ```
//!
//! Unknown keys (for example an export `timestamp`) are ignored on import.
//!
//! # CSV
//!
//! ```text
//! # Map Name: my-map
//! # Size: 3x2
//! # Start: 0,0
//! # End: none
//! # Legend: 0=Empty, 1=Obstacle, 2=Charging, 3=Workstation, 9=Path
//! 0,1,2
//! 3,9,0
//! ```
//!
//! Both forms round-trip exactly: cells (path markers included), dimensions
//! and endpoints.

use std::path::Path;

use agv_core::Coord;

use crate::cell::CellType;
use crate::error::{GridError, GridResult};
use crate::grid::GridMap;

const DEFAULT_NAME: &str = "my-map";
const LEGEND: &str = "0=Empty, 1=Obstacle, 2=Charging, 3=Workstation, 9=Path";

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

/// The persisted form of a [`GridMap`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    #[serde(default = "default_name")]
    pub name:        String,
    pub size_x:      u32,
    pub size_y:      u32,
    /// Rows top to bottom, cells as integer codes.
    pub grid:        Vec<Vec<u8>>,
    #[serde(default)]
    pub start_point: Option<Coord>,
    #[serde(default)]
    pub end_point:   Option<Coord>,
}

impl GridMap {
    /// Export to the interchange document.
    pub fn to_document(&self, name: impl Into<String>) -> MapDocument {
        MapDocument {
            name:        name.into(),
            size_x:      self.width(),
            size_y:      self.height(),
            grid:        self.rows().map(|r| r.iter().map(|c| c.code()).collect()).collect(),
            start_point: self.start(),
            end_point:   self.end(),
        }
    }

    /// Import, validating dimensions, row lengths, cell codes and endpoints.
    pub fn from_document(doc: &MapDocument) -> GridResult<GridMap> {
        if doc.grid.len() != doc.size_y as usize {
            return Err(GridError::Format(format!(
                "declared {} rows, found {}",
                doc.size_y,
                doc.grid.len()
            )));
        }
        let mut rows = Vec::with_capacity(doc.grid.len());
        for (y, row) in doc.grid.iter().enumerate() {
            if row.len() != doc.size_x as usize {
                return Err(GridError::Format(format!(
                    "row {y} has {} cells, declared width is {}",
                    row.len(),
                    doc.size_x
                )));
            }
            let cells = row
                .iter()
                .enumerate()
                .map(|(x, &code)| {
                    CellType::from_code(code).ok_or(GridError::UnknownCellCode {
                        code,
                        coord: Coord::new(x as u32, y as u32),
                    })
                })
                .collect::<GridResult<Vec<_>>>()?;
            rows.push(cells);
        }

        let mut grid = GridMap::from_rows(rows)?;
        if let Some(c) = doc.start_point {
            grid.set_start(c)?;
        }
        if let Some(c) = doc.end_point {
            grid.set_end(c)?;
        }
        Ok(grid)
    }
}

impl MapDocument {
    // ── JSON ──────────────────────────────────────────────────────────────

    pub fn to_json(&self) -> GridResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> GridResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    // ── CSV ───────────────────────────────────────────────────────────────

    pub fn to_csv(&self) -> GridResult<String> {
        let mut out = String::new();
        out.push_str(&format!("# Map Name: {}\n", self.name));
        out.push_str(&format!("# Size: {}x{}\n", self.size_x, self.size_y));
        out.push_str(&format!("# Start: {}\n", endpoint_field(self.start_point)));
        out.push_str(&format!("# End: {}\n", endpoint_field(self.end_point)));
        out.push_str(&format!("# Legend: {LEGEND}\n"));

        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        for row in &self.grid {
            wtr.write_record(row.iter().map(|code| code.to_string()))?;
        }
        let body = wtr.into_inner().map_err(|e| GridError::Io(e.into_error()))?;
        out.push_str(&String::from_utf8_lossy(&body));
        Ok(out)
    }

    /// Parse the CSV form.  A missing `# Size:` line is inferred from the rows.
    pub fn from_csv(text: &str) -> GridResult<Self> {
        let mut name = default_name();
        let mut size = None;
        let mut start_point = None;
        let mut end_point = None;

        for line in text.lines().map(str::trim).take_while(|l| l.starts_with('#')) {
            let meta = line.trim_start_matches('#').trim();
            if let Some(v) = meta.strip_prefix("Map Name:") {
                name = v.trim().to_string();
            } else if let Some(v) = meta.strip_prefix("Size:") {
                size = Some(parse_size(v.trim())?);
            } else if let Some(v) = meta.strip_prefix("Start:") {
                start_point = parse_endpoint(v.trim())?;
            } else if let Some(v) = meta.strip_prefix("End:") {
                end_point = parse_endpoint(v.trim())?;
            }
        }

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut grid = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let row = record
                .iter()
                .map(|field| {
                    field
                        .parse::<u8>()
                        .map_err(|_| GridError::Format(format!("bad cell value {field:?}")))
                })
                .collect::<GridResult<Vec<u8>>>()?;
            grid.push(row);
        }

        let (size_x, size_y) = match size {
            Some(s) => s,
            None => (grid.first().map_or(0, Vec::len) as u32, grid.len() as u32),
        };
        Ok(Self { name, size_x, size_y, grid, start_point, end_point })
    }

    // ── Files ─────────────────────────────────────────────────────────────

    /// Load a `.json` or `.csv` map file, chosen by extension.
    pub fn load(path: &Path) -> GridResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match extension(path).as_deref() {
            Some("csv") => Self::from_csv(&text),
            Some("json") => Self::from_json(&text),
            _ => Err(GridError::Format(format!("{}: expected a .json or .csv file", path.display()))),
        }
    }

    /// Save as `.json` or `.csv`, chosen by extension.
    pub fn save(&self, path: &Path) -> GridResult<()> {
        let text = match extension(path).as_deref() {
            Some("csv") => self.to_csv()?,
            Some("json") => self.to_json()?,
            _ => return Err(GridError::Format(format!("{}: expected a .json or .csv file", path.display()))),
        };
        std::fs::write(path, text)?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn endpoint_field(c: Option<Coord>) -> String {
    match c {
        Some(c) => format!("{},{}", c.x, c.y),
        None => "none".to_string(),
    }
}

fn parse_endpoint(s: &str) -> GridResult<Option<Coord>> {
    if s.eq_ignore_ascii_case("none") || s.is_empty() {
        return Ok(None);
    }
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| GridError::Format(format!("bad endpoint {s:?}")))?;
    let num = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|_| GridError::Format(format!("bad endpoint {s:?}")))
    };
    Ok(Some(Coord::new(num(x)?, num(y)?)))
}

fn parse_size(s: &str) -> GridResult<(u32, u32)> {
    let bad = || GridError::Format(format!("bad size {s:?}"));
    let (w, h) = s.split_once(['x', 'X']).ok_or_else(bad)?;
    let w = w.trim().parse::<u32>().map_err(|_| bad())?;
    let h = h.trim().parse::<u32>().map_err(|_| bad())?;
    Ok((w, h))
}
