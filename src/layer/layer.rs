use anyhow::{anyhow, ensure, Context, Result};
use geo::{Centroid, Geometry, Point};
use polars::{frame::DataFrame, prelude::{Column, DataType, IdxCa, IdxSize}};

use crate::crs::Crs;

/// A collection of geometries with one attribute row per geometry.
#[derive(Debug, Clone)]
pub struct Layer {
    geoms: Vec<Geometry<f64>>,
    data: DataFrame,
    crs: Option<Crs>, // None if the source carried no CRS metadata
}

impl Layer {
    /// Construct a layer, checking that the attribute table has one row per geometry.
    /// An attribute table without columns is accepted for any number of geometries.
    pub fn new(geoms: Vec<Geometry<f64>>, data: DataFrame, crs: Option<Crs>) -> Result<Self> {
        ensure!(
            data.width() == 0 || data.height() == geoms.len(),
            "attribute table has {} rows but layer has {} geometries",
            data.height(), geoms.len(),
        );
        Ok(Self { geoms, data, crs })
    }

    /// Construct a layer with no attributes.
    pub fn from_geometries(geoms: Vec<Geometry<f64>>, crs: Option<Crs>) -> Self {
        Self { geoms, data: DataFrame::empty(), crs }
    }

    /// Get the number of records.
    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    /// Check if there are no records.
    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    /// Get a reference to the geometries.
    #[inline] pub fn geoms(&self) -> &[Geometry<f64>] { &self.geoms }

    /// Get a reference to the attribute table.
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Get the coordinate reference system, if defined.
    #[inline] pub fn crs(&self) -> Option<Crs> { self.crs }

    /// Declare the CRS without touching coordinates.
    #[inline]
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Check whether an attribute column exists.
    #[inline]
    pub fn has_column(&self, name: &str) -> bool {
        self.data.get_column_index(name).is_some()
    }

    /// Add or replace an attribute column.
    pub fn set_column(&mut self, column: Column) -> Result<()> {
        ensure!(
            column.len() == self.len(),
            "column {:?} has {} values but layer has {} records",
            column.name(), column.len(), self.len(),
        );
        self.data.with_column(column)?;
        Ok(())
    }

    /// Read a column as optional floats, casting (non-strictly) if needed.
    /// Returns `None` if the column does not exist.
    pub fn float_column(&self, name: &str) -> Result<Option<Vec<Option<f64>>>> {
        let Some(column) = self.data.column(name).ok() else { return Ok(None) };

        let values = column.cast(&DataType::Float64)
            .with_context(|| format!("column {name:?} cannot be read as numbers"))?
            .f64()?
            .into_iter()
            .collect();

        Ok(Some(values))
    }

    /// Centroid of every geometry, in layer coordinates.
    pub fn centroids(&self) -> Result<Vec<Point<f64>>> {
        self.geoms.iter().enumerate()
            .map(|(i, geometry)| geometry.centroid()
                .ok_or_else(|| anyhow!("record {i} has an empty geometry")))
            .collect()
    }

    /// Reorder (or subset) records by row positions.
    pub fn take(&self, order: &[usize]) -> Result<Self> {
        let geoms = order.iter()
            .map(|&i| self.geoms.get(i).cloned()
                .ok_or_else(|| anyhow!("row {i} out of bounds for layer of {} records", self.len())))
            .collect::<Result<Vec<_>>>()?;

        let data = if self.data.width() == 0 {
            self.data.clone()
        } else {
            let indices = order.iter().map(|&i| i as IdxSize).collect::<Vec<_>>();
            self.data.take(&IdxCa::from_vec("idx".into(), indices))?
        };

        Ok(Self { geoms, data, crs: self.crs })
    }

    /// First `n` records.
    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.len());
        Self {
            geoms: self.geoms[..n].to_vec(),
            data: if self.data.width() == 0 { self.data.clone() } else { self.data.head(Some(n)) },
            crs: self.crs,
        }
    }
}
