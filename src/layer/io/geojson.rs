use anyhow::Result;
use polars::prelude::{Column, DataType};
use serde_json::{json, Map, Value};

use crate::{common, layer::Layer};

/// JSON value of one cell, by column dtype. Nulls and unsupported dtypes become `null`.
fn cell_to_json(column: &Column, idx: usize) -> Result<Value> {
    let value = match column.dtype() {
        DataType::String => column.str()?.get(idx).map(|v| json!(v)),
        DataType::Float64 => column.f64()?.get(idx).map(|v| json!(v)),
        DataType::Float32 => column.f32()?.get(idx).map(|v| json!(v)),
        DataType::Int64 => column.i64()?.get(idx).map(|v| json!(v)),
        DataType::Int32 => column.i32()?.get(idx).map(|v| json!(v)),
        DataType::UInt32 => column.u32()?.get(idx).map(|v| json!(v)),
        DataType::Boolean => column.bool()?.get(idx).map(|v| json!(v)),
        _ => None,
    };
    Ok(value.unwrap_or(Value::Null))
}

impl Layer {
    /// Export the layer as a GeoJSON FeatureCollection.
    /// Every attribute column becomes a feature property; coordinates are written as-is.
    pub fn to_geojson(&self) -> Result<Value> {
        let columns = self.data().get_columns();

        let features = self.geoms().iter().enumerate()
            .map(|(idx, geometry)| {
                let mut properties = Map::new();
                for column in columns {
                    properties.insert(column.name().to_string(), cell_to_json(column, idx)?);
                }
                Ok((geometry, properties))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(common::feature_collection(features))
    }
}
