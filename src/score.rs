use anyhow::{Context, Result};
use polars::prelude::Column;
use tracing::{debug, warn};

use crate::{infra::InfraKey, layer::Layer};

/// Added to every min-max denominator so constant columns do not divide by zero.
pub const EPSILON: f64 = 1e-9;

/// Population density attribute read from the input.
pub const DENSITY_COLUMN: &str = "dens_sqkm";

pub const DENSITY_SCORE_COLUMN: &str = "dens_score";
pub const SCORE_COLUMN: &str = "score";

pub const DENSITY_WEIGHT: f64 = 0.4;
pub const HEALTH_WEIGHT: f64 = 0.2;
pub const POLICE_WEIGHT: f64 = 0.2;
pub const ROADS_WEIGHT: f64 = 0.2;

/// Composite weight of an infrastructure proximity score.
#[inline]
pub fn weight(key: InfraKey) -> f64 {
    match key {
        InfraKey::Health => HEALTH_WEIGHT,
        InfraKey::Police => POLICE_WEIGHT,
        InfraKey::Roads => ROADS_WEIGHT,
    }
}

/// `(value - min) / (max - min + EPSILON)` over the defined values.
/// Undefined values stay undefined; returns `None` if nothing is defined.
fn min_max(values: &[Option<f64>]) -> Option<Vec<Option<f64>>> {
    let defined = values.iter().flatten().copied();
    let min = defined.clone().reduce(f64::min)?;
    let max = defined.reduce(f64::max)?;
    let range = max - min + EPSILON;

    Some(values.iter().map(|value| value.map(|v| (v - min) / range)).collect())
}

/// Density values with absent, unparseable or non-finite entries coerced to 0.
/// A missing column means every candidate counts as density 1.
fn densities(layer: &Layer) -> Result<Vec<f64>> {
    let Some(values) = layer.float_column(DENSITY_COLUMN)? else {
        warn!("no {DENSITY_COLUMN} column, using a density of 1 for every site");
        return Ok(vec![1.0; layer.len()]);
    };

    let coerced = values.iter()
        .map(|value| value.filter(|v| v.is_finite()).unwrap_or(0.0))
        .collect::<Vec<_>>();
    let invalid = values.iter().filter(|value| !value.is_some_and(f64::is_finite)).count();
    if invalid > 0 {
        warn!(invalid, "non-numeric {DENSITY_COLUMN} values treated as 0");
    }
    Ok(coerced)
}

/// Proximity score per candidate: closest gets 1, farthest 0.
/// Undefined distances, or a column that is absent or entirely undefined, score 0.
fn proximity(layer: &Layer, key: InfraKey) -> Result<Vec<f64>> {
    let column = key.distance_column();
    let scaled = layer.float_column(&column)?
        .and_then(|distances| min_max(&distances));

    let Some(scaled) = scaled else {
        debug!(%key, "no distances available, proximity score is 0");
        return Ok(vec![0.0; layer.len()]);
    };

    Ok(scaled.into_iter().map(|s| s.map_or(0.0, |s| 1.0 - s)).collect())
}

/// Add density, proximity and composite scores, then order by composite score
/// (highest first). Equal scores keep their input order.
pub fn score(layer: &Layer) -> Result<Layer> {
    let mut scored = layer.clone();

    let density = densities(&scored)?;
    let density_score = min_max(&density.iter().copied().map(Some).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.unwrap_or(0.0))
        .collect::<Vec<f64>>();

    let mut total = density_score.iter().map(|s| DENSITY_WEIGHT * s).collect::<Vec<f64>>();

    scored.set_column(Column::new(DENSITY_COLUMN.into(), density))?;
    scored.set_column(Column::new(DENSITY_SCORE_COLUMN.into(), density_score))?;

    for key in InfraKey::ALL {
        let proximity = proximity(&scored, key)
            .with_context(|| format!("Failed to score {key} proximity"))?;
        for (total, s) in total.iter_mut().zip(&proximity) {
            *total += weight(key) * s;
        }
        scored.set_column(Column::new(key.score_column().into(), proximity))?;
    }

    let mut order = (0..scored.len()).collect::<Vec<usize>>();
    order.sort_by(|&a, &b| total[b].total_cmp(&total[a]));

    scored.set_column(Column::new(SCORE_COLUMN.into(), total))?;
    debug!(records = scored.len(), "scored candidates");

    scored.take(&order)
}
