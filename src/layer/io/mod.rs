mod geojson;
mod read;
