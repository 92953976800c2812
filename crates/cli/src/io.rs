//! Tabular inputs (CSV / Parquet via polars) and JSON artifacts.

use anyhow::{anyhow, bail, Context, Result};
use hullmix::api::{
    Decomposition, Diagnostics, Harmonization, ImageBuffer, Palette, PointCloud, SimplifyReport,
};
use hullmix::prelude::{DVector, Vector3};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn scan(path: &Path) -> Result<LazyFrame> {
    let lf = match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(100))
            .finish()?,
        Some("parquet") => LazyFrame::scan_parquet(path, ScanArgsParquet::default())?,
        _ => bail!("unsupported table format: {}", path.display()),
    };
    Ok(lf)
}

/// Read the named columns as f64 (integer columns are cast).
fn read_columns(path: &Path, columns: &[String]) -> Result<Vec<Vec<f64>>> {
    let exprs: Vec<Expr> = columns
        .iter()
        .map(|c| col(c.as_str()).cast(DataType::Float64))
        .collect();
    let df = scan(path)?
        .select(exprs)
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    let mut out = Vec::with_capacity(columns.len());
    for name in columns {
        let values = df
            .column(name)?
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| v.ok_or_else(|| anyhow!("null in column {name} at row {row}")))
            .collect::<Result<Vec<f64>>>()?;
        out.push(values);
    }
    Ok(out)
}

/// One point per row, coordinates taken from `columns` in order.
pub fn read_points(path: &Path, columns: &[String]) -> Result<PointCloud> {
    if columns.is_empty() {
        bail!("at least one coordinate column is required");
    }
    let cols = read_columns(path, columns)?;
    let n = cols[0].len();
    let points = (0..n)
        .map(|i| DVector::from_iterator(cols.len(), cols.iter().map(|c| c[i])))
        .collect();
    Ok(PointCloud::new(points)?)
}

/// Pixel table with columns `x, y, r, g, b`; every pixel exactly once.
pub fn read_image(path: &Path) -> Result<ImageBuffer> {
    let names: Vec<String> = ["x", "y", "r", "g", "b"].iter().map(|s| s.to_string()).collect();
    let cols = read_columns(path, &names)?;
    let n = cols[0].len();
    if n == 0 {
        bail!("pixel table {} is empty", path.display());
    }
    let as_index = |v: f64, axis: &str| -> Result<usize> {
        if v < 0.0 || v.fract() != 0.0 {
            bail!("{axis} coordinate {v} is not a non-negative integer");
        }
        Ok(v as usize)
    };
    let mut coords = Vec::with_capacity(n);
    for i in 0..n {
        coords.push((as_index(cols[0][i], "x")?, as_index(cols[1][i], "y")?));
    }
    let width = coords.iter().map(|c| c.0).max().unwrap_or(0) + 1;
    let height = coords.iter().map(|c| c.1).max().unwrap_or(0) + 1;
    if width * height != n {
        bail!("pixel table has {n} rows but spans {width}x{height}");
    }
    let mut pixels: Vec<Option<Vector3<f64>>> = vec![None; n];
    for (i, &(x, y)) in coords.iter().enumerate() {
        let slot = &mut pixels[y * width + x];
        if slot.is_some() {
            bail!("pixel ({x}, {y}) appears twice");
        }
        *slot = Some(Vector3::new(cols[2][i], cols[3][i], cols[4][i]));
    }
    // Every slot is filled: n distinct coordinates inside an n-pixel grid.
    let pixels = pixels.into_iter().flatten().collect();
    Ok(ImageBuffer::new(width, height, pixels)?)
}

/// Write `image` as an `x, y, r, g, b` CSV.
pub fn write_image_csv(path: &Path, image: &ImageBuffer) -> Result<()> {
    let w = image.width();
    let xs: Vec<u32> = (0..image.len()).map(|i| (i % w) as u32).collect();
    let ys: Vec<u32> = (0..image.len()).map(|i| (i / w) as u32).collect();
    let channel = |k: usize| -> Vec<f64> { image.pixels().iter().map(|p| p[k]).collect() };
    let mut df = polars::df!(
        "x" => xs,
        "y" => ys,
        "r" => channel(0),
        "g" => channel(1),
        "b" => channel(2),
    )?;
    ensure_parent(path)?;
    let mut file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PaletteFile {
    pub colors: Vec<[f64; 3]>,
}

impl PaletteFile {
    pub fn from_palette(p: &Palette) -> Self {
        Self {
            colors: p.colors().iter().map(|c| [c.x, c.y, c.z]).collect(),
        }
    }
}

/// Palette from `{"colors": [[r, g, b], ...]}` JSON or an `r, g, b` table.
pub fn read_palette(path: &Path) -> Result<Palette> {
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let file: PaletteFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing palette {}", path.display()))?;
        return Ok(Palette::from_rows(&file.colors)?);
    }
    let names: Vec<String> = ["r", "g", "b"].iter().map(|s| s.to_string()).collect();
    let cloud = read_points(path, &names)?;
    Ok(Palette::from_points(cloud.points())?)
}

#[derive(Debug, Serialize)]
pub struct HullOut {
    pub dim: usize,
    pub vertices: Vec<Vec<f64>>,
    /// Input row of every vertex.
    pub source: Vec<usize>,
    pub facets: Vec<Vec<usize>>,
}

#[derive(Debug, Serialize)]
pub struct SimplifyOut {
    pub vertices: Vec<Vec<f64>>,
    pub iterations: usize,
    pub stop: String,
    pub status: String,
    pub rmse: f64,
}

impl SimplifyOut {
    pub fn from_report(r: &SimplifyReport) -> Self {
        Self {
            vertices: r.hull.points.iter().map(|p| p.iter().copied().collect()).collect(),
            iterations: r.iterations,
            stop: format!("{:?}", r.stop),
            status: format!("{:?}", r.status),
            rmse: r.rmse,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsOut {
    pub rmse: f64,
    pub max_error: f64,
    pub median_error: f64,
}

#[derive(Debug, Serialize)]
pub struct LayerOut {
    pub color: [f64; 3],
    /// Row-major, one weight per pixel.
    pub weights: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct DecomposeOut {
    pub width: usize,
    pub height: usize,
    pub layers: Vec<LayerOut>,
    pub hull_pixels: Vec<usize>,
    pub stats: StatsOut,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<DiagnosticsOut>,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticsOut {
    pub iteration_count: usize,
    pub final_vertex_count: usize,
    pub status: String,
}

impl From<&Diagnostics> for DiagnosticsOut {
    fn from(d: &Diagnostics) -> Self {
        Self {
            iteration_count: d.iteration_count,
            final_vertex_count: d.final_vertex_count,
            status: format!("{:?}", d.status),
        }
    }
}

impl DecomposeOut {
    pub fn new(image: &ImageBuffer, dec: &Decomposition, diagnostics: Option<&Diagnostics>) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            layers: dec
                .layers
                .iter()
                .map(|l| LayerOut {
                    color: [l.color.x, l.color.y, l.color.z],
                    weights: l.weights.clone(),
                })
                .collect(),
            hull_pixels: dec.hull_pixels.clone(),
            stats: StatsOut {
                rmse: dec.stats.rmse,
                max_error: dec.stats.max_error,
                median_error: dec.stats.median_error,
            },
            diagnostics: diagnostics.map(DiagnosticsOut::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HarmonizeOut {
    pub template: &'static str,
    pub alpha: i32,
    pub alpha2: i32,
    pub distance: f64,
    pub optimality: f64,
    pub colors: Vec<[f64; 3]>,
    /// `[L, C, h]` per color after snapping.
    pub lch: Vec<[f64; 3]>,
}

impl From<&Harmonization> for HarmonizeOut {
    fn from(h: &Harmonization) -> Self {
        Self {
            template: h.fit.template.name(),
            alpha: h.fit.alpha,
            alpha2: h.fit.alpha2,
            distance: h.fit.distance,
            optimality: h.fit.optimality(),
            colors: PaletteFile::from_palette(&h.palette).colors,
            lch: h.lch.iter().map(|c| [c.l, c.c, c.h]).collect(),
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn points_are_read_in_column_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cloud.csv");
        fs::write(&path, "g,r,b\n0.5,1,0\n0.25,0,1\n").unwrap();
        let cols: Vec<String> = ["r", "g", "b"].iter().map(|s| s.to_string()).collect();
        let cloud = read_points(&path, &cols).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.points()[0].as_slice(), &[1.0, 0.5, 0.0]);
        assert_eq!(cloud.points()[1].as_slice(), &[0.0, 0.25, 1.0]);
    }

    #[test]
    fn image_table_roundtrips_through_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("img.csv");
        let img = ImageBuffer::from_fn(3, 2, |x, y| Vector3::new(x as f64 / 4.0, y as f64 / 2.0, 0.5)).unwrap();
        write_image_csv(&path, &img).unwrap();
        let back = read_image(&path).unwrap();
        assert_eq!(back.width(), 3);
        assert_eq!(back.height(), 2);
        assert_eq!(back.get(2, 1), img.get(2, 1));
    }

    #[test]
    fn duplicate_pixels_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.csv");
        fs::write(&path, "x,y,r,g,b\n0,0,0,0,0\n0,0,1,1,1\n").unwrap();
        assert!(read_image(&path).is_err());
    }

    #[test]
    fn palette_json_is_parsed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pal.json");
        fs::write(&path, r#"{"colors": [[1, 0, 0], [0, 1, 0], [0, 0, 1]]}"#).unwrap();
        let p = read_palette(&path).unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(PaletteFile::from_palette(&p).colors[1], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn harmonization_serializes_per_template() {
        let p = Palette::from_rows(&[[0.8, 0.2, 0.2], [0.2, 0.7, 0.8]]).unwrap();
        let h = hullmix::api::harmonize(&p, hullmix::api::HueTemplate::Complementary).unwrap();
        let v = serde_json::to_value(HarmonizeOut::from(&h)).unwrap();
        assert_eq!(v["template"], "complementary");
        assert_eq!(v["colors"].as_array().unwrap().len(), 2);
        assert_eq!(v["lch"][0].as_array().unwrap().len(), 3);
        let rate = v["optimality"].as_f64().unwrap();
        assert!(rate > 0.0 && rate <= 1.0);
    }
}
