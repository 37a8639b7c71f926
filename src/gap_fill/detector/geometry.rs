//! Static sensor geometry for the supported detector models.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::gap_fill::common::error::{GapFillError, Result};

/// Gap layout of one detector model.
///
/// Band lists hold inclusive `start, end` pairs, flattened in order.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorGeometry {
    /// Sensor height in pixels
    pub height: usize,
    /// Sensor width in pixels
    pub width: usize,
    /// Inclusive row-band boundaries of the horizontal gaps
    pub row_bands: Vec<usize>,
    /// Inclusive column-band boundaries of the vertical gaps
    pub col_bands: Vec<usize>,
    /// Pixel pitch in millimetres
    pub pixel_size_mm: f64,
}

impl DetectorGeometry {
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Iterates the row bands as inclusive `(start, end)` pairs.
    pub fn row_ranges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row_bands.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    /// Iterates the column bands as inclusive `(start, end)` pairs.
    pub fn col_ranges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.col_bands.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    fn check_invariants(&self, model: &str) {
        assert!(
            self.row_bands.len() % 2 == 0,
            "row band list of {model} has odd length {}",
            self.row_bands.len()
        );
        assert!(
            self.col_bands.len() % 2 == 0,
            "column band list of {model} has odd length {}",
            self.col_bands.len()
        );
        for (start, end) in self.row_ranges() {
            assert!(start <= end && end < self.height, "row band {start}..={end} outside {model}");
        }
        for (start, end) in self.col_ranges() {
            assert!(start <= end && end < self.width, "column band {start}..={end} outside {model}");
        }
    }
}

/// Immutable lookup of detector geometries keyed by model name.
#[derive(Debug, Clone)]
pub struct DetectorRegistry {
    models: Vec<&'static str>,
    geometries: HashMap<&'static str, DetectorGeometry>,
}

const EIGER_PIXEL_MM: f64 = 0.075;
const PILATUS_PIXEL_MM: f64 = 0.172;

static BUILTIN: LazyLock<DetectorRegistry> = LazyLock::new(|| {
    DetectorRegistry::new(vec![
        ("Eiger1M", geometry(1065, 1030, &[514, 550], &[], EIGER_PIXEL_MM)),
        (
            "Eiger4M",
            geometry(2167, 2070, &[514, 550, 1065, 1101, 1616, 1652], &[1030, 1039], EIGER_PIXEL_MM),
        ),
        (
            "Eiger9M",
            geometry(
                3269,
                3110,
                &[514, 550, 1065, 1101, 1616, 1652, 2167, 2203, 2718, 2754],
                &[1030, 1039, 2070, 2079],
                EIGER_PIXEL_MM,
            ),
        ),
        (
            "Eiger16M",
            geometry(
                4371,
                4150,
                &[514, 550, 1065, 1101, 1616, 1652, 2167, 2203, 2718, 2754, 3269, 3305, 3820, 3856],
                &[1030, 1039, 2070, 2079, 3109, 3119],
                EIGER_PIXEL_MM,
            ),
        ),
        (
            "Pilatus1M",
            geometry(1043, 981, &[195, 211, 407, 423, 619, 635, 831, 847], &[487, 493], PILATUS_PIXEL_MM),
        ),
        (
            "Pilatus2M",
            geometry(
                1679,
                1475,
                &[195, 211, 407, 423, 619, 635, 831, 847, 1043, 1059, 1255, 1271, 1467, 1483],
                &[487, 493, 981, 987],
                PILATUS_PIXEL_MM,
            ),
        ),
        ("Pilatus300K", geometry(619, 487, &[195, 211, 407, 423], &[], PILATUS_PIXEL_MM)),
        ("Pilatus300K-W", geometry(195, 1475, &[], &[487, 493, 981, 987], PILATUS_PIXEL_MM)),
    ])
});

fn geometry(height: usize, width: usize, rows: &[usize], cols: &[usize], pixel_size_mm: f64) -> DetectorGeometry {
    DetectorGeometry {
        height,
        width,
        row_bands: rows.to_vec(),
        col_bands: cols.to_vec(),
        pixel_size_mm,
    }
}

impl DetectorRegistry {
    /// Builds a registry from `(model, geometry)` entries.
    ///
    /// # Panics
    ///
    /// Panics when a band list has odd length or a band leaves the sensor area.
    pub fn new(entries: Vec<(&'static str, DetectorGeometry)>) -> Self {
        let mut models = Vec::with_capacity(entries.len());
        let mut geometries = HashMap::with_capacity(entries.len());
        for (model, geometry) in entries {
            geometry.check_invariants(model);
            models.push(model);
            geometries.insert(model, geometry);
        }
        Self { models, geometries }
    }

    /// The process-wide registry of stock detector models.
    pub fn builtin() -> &'static DetectorRegistry {
        &BUILTIN
    }

    /// Model names in declaration order.
    pub fn models(&self) -> &[&'static str] {
        &self.models
    }

    pub fn geometry(&self, model: &str) -> Result<&DetectorGeometry> {
        self.geometries
            .get(model)
            .ok_or_else(|| GapFillError::UnknownDetector(model.to_string()))
    }

    pub fn pixel_size(&self, model: &str) -> Result<f64> {
        self.geometry(model).map(|g| g.pixel_size_mm)
    }
}
