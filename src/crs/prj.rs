use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use regex::Regex;

use super::Crs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Datum {
    Wgs84,
    Nad83,
    Arc1950,
    Camacupa,
}

/// Detect the datum from the first `DATUM["..."]` name of a normalized
/// (upper-case, underscored) WKT string. `TOWGS84` clauses are not names.
fn detect_datum(normalized: &str) -> Result<Option<Datum>> {
    let token = Regex::new(r#"DATUM\[\s*"([^"]*)""#)?;
    let Some(caps) = token.captures(normalized) else { return Ok(None) };
    let name = &caps[1];

    let datum = if ["NORTH_AMERICAN_DATUM_1983", "NORTH_AMERICAN_1983", "NAD83", "NAD_1983"].iter().any(|n| name.contains(n)) {
        Some(Datum::Nad83)
    } else if name.contains("ARC_1950") {
        Some(Datum::Arc1950)
    } else if name.contains("CAMACUPA") {
        Some(Datum::Camacupa)
    } else if ["WGS_1984", "WGS_84", "WGS84"].iter().any(|n| name.contains(n)) {
        Some(Datum::Wgs84)
    } else {
        None
    };
    Ok(datum)
}

/// Parse the WKT contents of a `.prj` file into one of the supported CRSs.
///
/// A top-level EPSG authority (WKT1 `AUTHORITY`, WKT2 `ID`) wins. ESRI-style
/// files carry no authority, so their names are matched instead.
pub(crate) fn crs_from_wkt(wkt: &str) -> Result<Crs> {
    let wkt = wkt.trim();
    if wkt.is_empty() {
        bail!("empty projection definition");
    }

    let authority = Regex::new(r#"(?:AUTHORITY|ID)\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]\s*\]\s*$"#)?;
    if let Some(caps) = authority.captures(wkt) {
        let code: u32 = caps[1].parse().context("invalid EPSG code in projection definition")?;
        return Crs::from_epsg(code);
    }

    let header = Regex::new(r#"^(PROJCS|GEOGCS|PROJCRS|GEOGCRS|GEODCRS)\[\s*"([^"]*)""#)?;
    let Some(caps) = header.captures(wkt) else {
        bail!("malformed projection definition: {}", wkt.chars().take(64).collect::<String>());
    };
    let projected = caps[1].starts_with("PROJ");
    let name = caps[2].to_string();

    let normalized = wkt.to_ascii_uppercase().replace([' ', '-'], "_");
    let datum = detect_datum(&normalized)?;

    let code = if projected {
        let utm = Regex::new(r"UTM_ZONE_(\d{1,2})\s*([NS])")?;
        let name_normalized = name.to_ascii_uppercase().replace([' ', '-'], "_");
        if let Some(zone) = utm.captures(&name_normalized) {
            let number: u32 = zone[1].parse()?;
            let south = &zone[2] == "S";
            match (datum, south) {
                (Some(Datum::Wgs84), false) => 32600 + number,
                (Some(Datum::Wgs84), true) => 32700 + number,
                (Some(Datum::Nad83), false) => 26900 + number,
                (Some(Datum::Arc1950), true) => 20900 + number,
                (Some(Datum::Camacupa), true) => 22000 + number,
                _ => bail!("unsupported UTM projection: {name}"),
            }
        } else if name_normalized.contains("WEB_MERCATOR") || name_normalized.contains("PSEUDO_MERCATOR") {
            3857
        } else {
            bail!("unsupported projected coordinate system: {name}");
        }
    } else {
        match datum {
            Some(Datum::Wgs84) => 4326,
            Some(Datum::Nad83) => 4269,
            Some(Datum::Arc1950) => 4209,
            Some(Datum::Camacupa) => 4220,
            None => bail!("unsupported geographic coordinate system: {name}"),
        }
    };

    Crs::from_epsg(code)
}

/// Read the `.prj` sidecar of a shapefile, or `None` if it has none.
pub(crate) fn crs_from_shapefile(path: &Path) -> Result<Option<Crs>> {
    let sidecar = ["prj", "PRJ"].iter()
        .map(|ext| path.with_extension(ext))
        .find(|candidate| candidate.is_file());

    let Some(sidecar) = sidecar else { return Ok(None) };

    let wkt = fs::read_to_string(&sidecar)
        .with_context(|| format!("Failed to read projection file: {}", sidecar.display()))?;
    let crs = crs_from_wkt(&wkt)
        .with_context(|| format!("Malformed coordinate reference metadata in {}", sidecar.display()))?;

    Ok(Some(crs))
}
