#![allow(dead_code)]

use std::{fs, io::{Cursor, Write}, path::Path, sync::Arc};

use anyhow::Result;
use facility_siting::{Crs, InfraKey, Infrastructure, InfrastructureSource, Layer, NearestStrategy};
use geo::{line_string, point, Geometry};
use shapefile::dbase::{FieldValue, Record, TableWriterBuilder};

pub const ESRI_WGS84: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

pub const ESRI_UTM_33S: &str = r#"PROJCS["WGS_1984_UTM_Zone_33S",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",10000000.0],PARAMETER["Central_Meridian",15.0],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#;

/// Ten candidate points along a parallel in western Angola, `dens_sqkm` 1..=10.
pub fn candidate_sites() -> Vec<(String, f64, f64, f64)> {
    (0..10)
        .map(|i| (format!("site-{i}"), 15.0 + i as f64 * 0.02, -10.0 - (i % 3) as f64 * 0.01, (i + 1) as f64))
        .collect()
}

/// Write candidate points as a shapefile with `name` and `dens_sqkm` attributes.
pub fn write_candidates(path: &Path, sites: &[(String, f64, f64, f64)], prj: Option<&str>) -> Result<()> {
    let table = TableWriterBuilder::new()
        .add_character_field("name".try_into().unwrap(), 32)
        .add_numeric_field("dens_sqkm".try_into().unwrap(), 12, 3);
    let mut writer = shapefile::Writer::from_path(path, table)?;
    for (name, x, y, density) in sites {
        let mut record = Record::default();
        record.insert("name".to_string(), FieldValue::Character(Some(name.clone())));
        record.insert("dens_sqkm".to_string(), FieldValue::Numeric(Some(*density)));
        writer.write_shape_and_record(&shapefile::Point::new(*x, *y), &record)?;
    }
    drop(writer);

    if let Some(prj) = prj {
        fs::write(path.with_extension("prj"), prj)?;
    }
    Ok(())
}

/// Zip every file next to `shp` that shares its stem.
pub fn zip_shapefile(shp: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut bytes));
        for ext in ["shp", "shx", "dbf", "prj"] {
            let file = shp.with_extension(ext);
            if !file.exists() {
                continue;
            }
            let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
            zip.start_file(name, zip::write::SimpleFileOptions::default())?;
            zip.write_all(&fs::read(&file)?)?;
        }
        zip.finish()?;
    }
    Ok(bytes)
}

/// 3 health points, no police stations, 5 road segments, all near the candidates.
pub fn test_infrastructure(strategy: NearestStrategy) -> Result<Infrastructure> {
    let health: Vec<Geometry<f64>> = vec![
        point!(x: 15.01, y: -10.0).into(),
        point!(x: 15.12, y: -10.02).into(),
        point!(x: 15.30, y: -10.05).into(),
    ];
    let roads: Vec<Geometry<f64>> = (0..5)
        .map(|i| {
            let x = 14.95 + i as f64 * 0.05;
            line_string![(x: x, y: -9.97), (x: x + 0.04, y: -9.99)].into()
        })
        .collect();

    let metric = |geoms: Vec<Geometry<f64>>| Layer::from_geometries(geoms, Some(Crs::WGS84)).to_crs(Crs::UTM_33S);
    Infrastructure::from_layers([
        (InfraKey::Health, metric(health)?),
        (InfraKey::Police, metric(Vec::new())?),
        (InfraKey::Roads, metric(roads)?),
    ], strategy)
}

/// Hands out a prebuilt infrastructure set.
pub struct FixedInfrastructure(pub Arc<Infrastructure>);

impl InfrastructureSource for FixedInfrastructure {
    fn load(&self) -> Result<Arc<Infrastructure>> {
        Ok(Arc::clone(&self.0))
    }
}
