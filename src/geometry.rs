//! Region boundaries loaded from an ESRI shapefile or a GeoJSON file.

use crate::error::MapError;
use crate::models::RegionId;
use anyhow::{Context, Result, anyhow, bail};
use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};
use geojson::{FeatureCollection, GeoJson};
use serde_json::{Map, Value};
use shapefile::dbase::FieldValue;
use shapefile::{PolygonRing, Shape};
use std::path::Path;

/// Attribute holding the zipcode in the NYC zipcode shapefile.
pub const DEFAULT_ID_FIELD: &str = "ZIPCODE";

/// One region: identifier, attribute fields and boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub properties: Map<String, Value>,
    pub shape: MultiPolygon<f64>,
}

/// Ordered region boundaries. Order is the source file order and is preserved
/// by every downstream step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionGeometry {
    regions: Vec<Region>,
}

impl RegionGeometry {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Load `.shp` (with its `.dbf`) or `.geojson`/`.json`, by extension.
    pub fn from_path<P: AsRef<Path>>(path: P, id_field: &str) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let geometry = match ext.as_str() {
            "shp" => Self::from_shapefile(path, id_field),
            "geojson" | "json" => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Self::from_geojson_str(&text, id_field)
            }
            other => bail!("unsupported geometry file extension {:?}", other),
        }
        .with_context(|| format!("loading region geometry {}", path.display()))?;
        log::info!(
            "Loaded {} regions from {}",
            geometry.len(),
            path.display()
        );
        Ok(geometry)
    }

    pub fn from_shapefile(path: &Path, id_field: &str) -> Result<Self> {
        let mut reader = shapefile::Reader::from_path(path)?;
        let mut regions = Vec::new();
        for (index, item) in reader.iter_shapes_and_records().enumerate() {
            let (shape, record) = item?;
            let shape = match shape {
                Shape::Polygon(p) => rings_to_multipolygon(p.rings(), |pt| (pt.x, pt.y)),
                Shape::PolygonM(p) => rings_to_multipolygon(p.rings(), |pt| (pt.x, pt.y)),
                Shape::PolygonZ(p) => rings_to_multipolygon(p.rings(), |pt| (pt.x, pt.y)),
                Shape::NullShape => MultiPolygon::new(Vec::new()),
                other => bail!(
                    "record {index}: expected a polygon shape, found {:?}",
                    other.shapetype()
                ),
            };
            let mut properties = Map::new();
            for (name, value) in record {
                properties.insert(name, field_to_json(value));
            }
            regions.push(region_from_parts(index, properties, shape, id_field)?);
        }
        Ok(Self { regions })
    }

    pub fn from_geojson_str(text: &str, id_field: &str) -> Result<Self> {
        let gj: GeoJson = text.parse()?;
        let fc = FeatureCollection::try_from(gj)?;
        let mut regions = Vec::with_capacity(fc.features.len());
        for (index, feature) in fc.features.into_iter().enumerate() {
            let properties = feature.properties.unwrap_or_default();
            let shape = match feature.geometry {
                Some(g) => match geo::Geometry::<f64>::try_from(g)? {
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    geo::Geometry::MultiPolygon(mp) => mp,
                    _ => bail!("feature {index}: expected Polygon or MultiPolygon"),
                },
                None => MultiPolygon::new(Vec::new()),
            };
            regions.push(region_from_parts(index, properties, shape, id_field)?);
        }
        Ok(Self { regions })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Bounding rectangle of all boundaries, `None` when nothing has coordinates.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.regions
            .iter()
            .filter_map(|r| r.shape.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }
}

fn region_from_parts(
    index: usize,
    properties: Map<String, Value>,
    shape: MultiPolygon<f64>,
    id_field: &str,
) -> Result<Region> {
    let id = properties
        .get(id_field)
        .and_then(RegionId::from_json)
        .ok_or_else(|| MapError::MissingRegionId {
            index,
            field: id_field.to_string(),
        })?;
    Ok(Region {
        id,
        properties,
        shape,
    })
}

/// Group shapefile rings into polygons: each outer ring starts a polygon and
/// the inner rings that follow become its holes.
pub fn rings_to_multipolygon<P, F>(rings: &[PolygonRing<P>], xy: F) -> MultiPolygon<f64>
where
    F: Fn(&P) -> (f64, f64),
{
    let to_line = |pts: &[P]| -> LineString<f64> {
        pts.iter()
            .map(|p| {
                let (x, y) = xy(p);
                Coord { x, y }
            })
            .collect()
    };

    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();
    for ring in rings {
        match ring {
            PolygonRing::Outer(pts) => polygons.push((to_line(pts), Vec::new())),
            PolygonRing::Inner(pts) => match polygons.last_mut() {
                Some((_, holes)) => holes.push(to_line(pts)),
                // A hole before any outer ring: keep it as its own polygon.
                None => polygons.push((to_line(pts), Vec::new())),
            },
        }
    }
    MultiPolygon::new(
        polygons
            .into_iter()
            .map(|(outer, holes)| Polygon::new(outer, holes))
            .collect(),
    )
}

fn field_to_json(value: FieldValue) -> Value {
    match value {
        FieldValue::Character(Some(s)) => Value::String(s.trim().to_string()),
        FieldValue::Numeric(Some(n)) | FieldValue::Double(n) | FieldValue::Currency(n) => {
            serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
        }
        FieldValue::Float(Some(f)) => {
            serde_json::Number::from_f64(f as f64).map_or(Value::Null, Value::Number)
        }
        FieldValue::Integer(i) => Value::from(i),
        FieldValue::Logical(Some(b)) => Value::Bool(b),
        FieldValue::Memo(s) => Value::String(s),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None) => Value::Null,
        other => Value::String(format!("{other:?}")),
    }
}

/// Fail with a readable message when a geometry file yields nothing to draw.
pub fn ensure_drawable(geometry: &RegionGeometry) -> Result<Rect<f64>> {
    geometry
        .bounds()
        .ok_or_else(|| anyhow!("region geometry has no coordinates to draw"))
}
