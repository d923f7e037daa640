//! TOML job file: the stock list, the carpet polygons, and run options.
//!
//! The engine itself takes already-built inputs; this module is the ingest
//! boundary host applications use. Carpet ids are assigned here, in file
//! order, and every polygon is validated before the engine sees it.

use geo::{LineString, Polygon};
use serde::Deserialize;

use crate::carpet::{Carpet, CarpetId, Priority};
use crate::error::Error;
use crate::sheet::SheetSpec;
use crate::units::Unit;

#[derive(Debug, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub sheets: Vec<JobSheet>,
    #[serde(default)]
    pub carpets: Vec<JobCarpet>,
    #[serde(default)]
    pub options: JobOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobSheet {
    pub name: String,
    pub width: f64,
    pub height: f64,
    /// Unit the dimensions above are declared in.
    #[serde(default = "default_sheet_units")]
    pub units: Unit,
    pub color: String,
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobCarpet {
    pub filename: String,
    pub color: String,
    pub order: String,
    /// 1 = must place, 2 = backfill.
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Expands to this many identical carpets, each with its own id.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Exterior ring vertices in millimeters.
    pub exterior: Vec<[f64; 2]>,
    #[serde(default)]
    pub holes: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobOptions {
    pub min_gap_mm: Option<f64>,
    pub max_sheet_range_per_order: Option<u32>,
    #[serde(default)]
    pub verbose: bool,
}

fn default_sheet_units() -> Unit {
    Unit::Centimeters
}

fn default_priority() -> u8 {
    1
}

fn default_quantity() -> u32 {
    1
}

fn ring(vertices: &[[f64; 2]]) -> LineString<f64> {
    LineString::from(
        vertices
            .iter()
            .map(|v| (v[0], v[1]))
            .collect::<Vec<(f64, f64)>>(),
    )
}

impl JobFile {
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    /// Build validated engine inputs. Carpet ids are sequential from 1 in
    /// file order, with quantity expansion in between.
    pub fn into_inputs(self) -> Result<(Vec<Carpet>, Vec<SheetSpec>, JobOptions), Error> {
        let sheets: Vec<SheetSpec> = self
            .sheets
            .iter()
            .map(|s| SheetSpec {
                name: s.name.clone(),
                width_cm: s.units.convert_to(s.width, Unit::Centimeters),
                height_cm: s.units.convert_to(s.height, Unit::Centimeters),
                color: s.color.clone(),
                count: s.count,
                used: 0,
            })
            .collect();
        for sheet in &sheets {
            sheet.validate()?;
        }

        let mut carpets = Vec::new();
        let mut next_id = 1u32;
        for entry in &self.carpets {
            let priority = Priority::from_level(entry.priority).ok_or_else(|| {
                Error::InvalidJob(format!(
                    "carpet '{}': priority must be 1 or 2, got {}",
                    entry.filename, entry.priority
                ))
            })?;
            if entry.quantity == 0 {
                return Err(Error::InvalidJob(format!(
                    "carpet '{}': quantity must be at least 1",
                    entry.filename
                )));
            }
            let polygon = Polygon::new(
                ring(&entry.exterior),
                entry.holes.iter().map(|h| ring(h)).collect(),
            );
            for _ in 0..entry.quantity {
                let carpet = Carpet::new(
                    polygon.clone(),
                    entry.filename.clone(),
                    entry.color.clone(),
                    entry.order.clone(),
                    priority,
                    CarpetId(next_id),
                );
                carpet.validate()?;
                next_id += 1;
                carpets.push(carpet);
            }
        }

        Ok((carpets, sheets, self.options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB_TOML: &str = r#"
[options]
min_gap_mm = 2.0
max_sheet_range_per_order = 3
verbose = true

[[sheets]]
name = "140x200 black"
width = 140.0
height = 200.0
color = "black"
count = 5

[[carpets]]
filename = "front_left.dxf"
color = "black"
order = "ORD-17"
exterior = [[0.0, 0.0], [1000.0, 0.0], [1000.0, 500.0], [0.0, 500.0]]

[[carpets]]
filename = "trunk.dxf"
color = "black"
order = "ORD-17"
priority = 2
quantity = 3
exterior = [[0.0, 0.0], [200.0, 0.0], [200.0, 100.0], [0.0, 100.0]]
"#;

    #[test]
    fn test_parse_and_expand() {
        let job = JobFile::from_toml(JOB_TOML).expect("parse failed");
        let (carpets, sheets, options) = job.into_inputs().expect("conversion failed");

        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].used, 0);
        assert!((sheets[0].width_mm() - 1400.0).abs() < 1e-10);

        // 1 + quantity 3 = 4 carpets, ids sequential from 1.
        assert_eq!(carpets.len(), 4);
        let ids: Vec<u32> = carpets.iter().map(|c| c.carpet_id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(carpets[0].priority, Priority::Must);
        assert_eq!(carpets[1].priority, Priority::Backfill);
        assert_eq!(carpets[3].filename, "trunk.dxf");

        assert_eq!(options.min_gap_mm, Some(2.0));
        assert_eq!(options.max_sheet_range_per_order, Some(3));
        assert!(options.verbose);
    }

    #[test]
    fn test_defaults() {
        let toml = r#"
[[carpets]]
filename = "a.dxf"
color = "gray"
order = "X"
exterior = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]
"#;
        let job = JobFile::from_toml(toml).unwrap();
        let (carpets, sheets, options) = job.into_inputs().unwrap();
        assert!(sheets.is_empty());
        assert_eq!(carpets.len(), 1);
        assert_eq!(carpets[0].priority, Priority::Must);
        assert_eq!(options.min_gap_mm, None);
        assert!(!options.verbose);
    }

    #[test]
    fn test_bad_priority_rejected() {
        let toml = r#"
[[carpets]]
filename = "a.dxf"
color = "gray"
order = "X"
priority = 5
exterior = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]
"#;
        let job = JobFile::from_toml(toml).unwrap();
        let err = job.into_inputs().unwrap_err();
        assert!(matches!(err, Error::InvalidJob(_)));
        assert!(err.to_string().contains("priority"));
    }

    #[test]
    fn test_degenerate_polygon_rejected_at_ingest() {
        let toml = r#"
[[carpets]]
filename = "line.dxf"
color = "black"
order = "X"
exterior = [[0.0, 0.0], [10.0, 0.0]]
"#;
        let job = JobFile::from_toml(toml).unwrap();
        let err = job.into_inputs().unwrap_err();
        assert!(matches!(err, Error::InvalidPolygon { .. }));
    }

    #[test]
    fn test_sheet_dimensions_in_millimeters() {
        let toml = r#"
[[sheets]]
name = "1400x2000"
width = 1400.0
height = 2000.0
units = "millimeters"
color = "black"
count = 1
"#;
        let job = JobFile::from_toml(toml).unwrap();
        let (_, sheets, _) = job.into_inputs().unwrap();
        assert!((sheets[0].width_cm - 140.0).abs() < 1e-10);
        assert!((sheets[0].width_mm() - 1400.0).abs() < 1e-10);
    }

    #[test]
    fn test_carpet_with_hole() {
        let toml = r#"
[[carpets]]
filename = "ring.dxf"
color = "black"
order = "X"
exterior = [[0.0, 0.0], [100.0, 0.0], [100.0, 100.0], [0.0, 100.0]]
holes = [[[40.0, 40.0], [60.0, 40.0], [60.0, 60.0], [40.0, 60.0]]]
"#;
        let job = JobFile::from_toml(toml).unwrap();
        let (carpets, _, _) = job.into_inputs().unwrap();
        assert!((carpets[0].area() - 9600.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_error_surfaces() {
        assert!(matches!(
            JobFile::from_toml("not = [valid"),
            Err(Error::TomlParse(_))
        ));
    }
}
