// tests/io_tests.rs
#![cfg(feature = "gdal")]

mod common;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use common::*;
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager, Metadata};
use sentinel_index::io::reader::{Catalog, SceneEntry};
use sentinel_index::io::writer::{NODATA_VALUE_FLOAT, NODATA_VALUE_INT};
use sentinel_index::io::{read_band, write_products, CatalogSource, OutputPaths, WriteOptions};
use sentinel_index::{CancelToken, DateWindow, Error, ImagerySource, Pipeline, PipelineRequest};

/// Write a constant single-band float GeoTIFF on the shared test grid
fn write_constant(path: &Path, value: f32) {
    write_constant_in(path, value, 4326);
}

fn write_constant_in(path: &Path, value: f32, epsg: u32) {
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<f32, _>(path, SHAPE.0, SHAPE.1, 1)
        .unwrap();
    let srs = SpatialRef::from_epsg(epsg).unwrap();
    dataset.set_projection(&srs.to_wkt().unwrap()).unwrap();
    dataset.set_geo_transform(&grid().to_gdal()).unwrap();
    {
        let mut band = dataset.rasterband(1).unwrap();
        let mut buffer = Buffer::new(SHAPE, vec![value; SHAPE.0 * SHAPE.1]);
        band.write((0, 0), SHAPE, &mut buffer).unwrap();
    }
    dataset.flush_cache().unwrap();
}

fn scene(dir: &Path, id: &str, acquired: &str, cloud: f64, qa: f32, bands: &[(&str, f32)]) -> SceneEntry {
    let mut files = BTreeMap::new();
    let qa_file = PathBuf::from(format!("{id}_QA60.tif"));
    write_constant(&dir.join(&qa_file), qa);
    files.insert("QA60".to_string(), qa_file);
    for &(name, value) in bands {
        let file = PathBuf::from(format!("{id}_{name}.tif"));
        write_constant(&dir.join(&file), value);
        files.insert(name.to_string(), file);
    }
    SceneEntry {
        id: id.to_string(),
        acquired: date(acquired),
        cloud_percentage: cloud,
        bands: files,
    }
}

fn catalog_source(dir: &Path) -> CatalogSource {
    let catalog = Catalog {
        reflectance_scale: 10000.0,
        scenes: vec![
            scene(dir, "clear", "2024-08-20", 5.0, 0.0, &[("B8", 4000.0), ("B4", 1000.0)]),
            scene(dir, "cloudy", "2024-09-10", 50.0, 1024.0, &[("B8", 9000.0), ("B4", 100.0)]),
            scene(dir, "old", "2023-09-01", 0.0, 0.0, &[("B8", 100.0), ("B4", 9000.0)]),
        ],
    };
    let path = dir.join("catalog.json");
    std::fs::write(&path, serde_json::to_string_pretty(&catalog).unwrap()).unwrap();
    CatalogSource::open(&path).unwrap()
}

#[test]
fn test_catalog_pipeline_float_output() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let source = catalog_source(dir.path());

    let request = PipelineRequest::from_aoi(&square_aoi(), "2024-09-01", "NDVI");
    let output = Pipeline::default()
        .run(&request, &source, &CancelToken::new())
        .unwrap();

    let paths = OutputPaths {
        index: dir.path().join("ndvi.tif"),
        legend: Some(dir.path().join("legend.json")),
        preview: Some(dir.path().join("preview.tif")),
        rgb: None,
    };
    write_products(&output, &paths, &WriteOptions::default()).unwrap();

    let (transform, band) = read_band(&paths.index).unwrap();
    assert_eq!(transform, grid());
    assert_eq!(band.shape(), SHAPE);
    assert_eq!(band.valid_count(), output.index.valid_count());
    for value in band.data().iter().flatten() {
        assert_relative_eq!(*value, 0.6, epsilon = 1e-5);
    }

    let dataset = Dataset::open(&paths.index).unwrap();
    let raster = dataset.rasterband(1).unwrap();
    assert_eq!(raster.no_data_value(), Some(NODATA_VALUE_FLOAT as f64));
    assert_eq!(raster.metadata_item("VIS_MIN", "").as_deref(), Some("0"));
    assert_eq!(raster.metadata_item("VIS_PALETTE", "").as_deref(), Some("red,yellow,green"));

    let legend: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(paths.legend.unwrap()).unwrap()).unwrap();
    assert_eq!(legend["gradient"].as_array().unwrap().len(), 300);

    let preview = Dataset::open(paths.preview.unwrap()).unwrap();
    assert_eq!(preview.raster_count(), 4);
}

#[test]
fn test_fixed_point_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = catalog_source(dir.path());
    let request = PipelineRequest::from_aoi(&square_aoi(), "2024-09-01", "NDVI");
    let output = Pipeline::default()
        .run(&request, &source, &CancelToken::new())
        .unwrap();

    let path = dir.path().join("ndvi_i16.tif");
    let paths = OutputPaths {
        index: path.clone(),
        ..OutputPaths::default()
    };
    let options = WriteOptions {
        fixed_point: true,
        ..WriteOptions::default()
    };
    write_products(&output, &paths, &options).unwrap();

    let dataset = Dataset::open(&path).unwrap();
    let band = dataset.rasterband(1).unwrap();
    assert_eq!(band.no_data_value(), Some(NODATA_VALUE_INT as f64));
    assert_eq!(band.metadata_item("SCALE", "").as_deref(), Some("0.0001"));

    let data = band.read_as::<i16>((0, 0), SHAPE, SHAPE, None).unwrap();
    let center = 10 * SHAPE.0 + 10;
    assert_eq!(data.data()[center], 6000);
    assert_eq!(data.data()[0], NODATA_VALUE_INT);
}

#[test]
fn test_catalog_query_filters_window() {
    let dir = tempfile::tempdir().unwrap();
    let source = catalog_source(dir.path());
    let window = DateWindow::around("2024-09-01", 2).unwrap();

    let images = source.query(&square_aoi(), &window).unwrap();
    let ids: Vec<&str> = images.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["clear", "cloudy"]);
    assert_eq!(images[0].reflectance_scale, 10000.0);
}

#[test]
fn test_projected_bands_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("utm_B8.tif");
    write_constant_in(&path, 4000.0, 32632);

    match read_band(&path) {
        Err(Error::UnsupportedCrs { crs, .. }) => assert!(crs.contains("32632"), "{crs}"),
        other => panic!("expected UnsupportedCrs, got {:?}", other.map(|(t, _)| t)),
    }

    let mut bands = BTreeMap::new();
    bands.insert("B8".to_string(), PathBuf::from("utm_B8.tif"));
    let catalog = Catalog {
        reflectance_scale: 10000.0,
        scenes: vec![SceneEntry {
            id: "utm".to_string(),
            acquired: date("2024-08-20"),
            cloud_percentage: 0.0,
            bands,
        }],
    };
    let source = CatalogSource::from_catalog(dir.path(), catalog);
    let window = DateWindow::around("2024-09-01", 2).unwrap();
    assert!(matches!(
        source.query(&square_aoi(), &window),
        Err(Error::UnsupportedCrs { .. })
    ));
}

#[test]
fn test_geographic_bands_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wgs84_B8.tif");
    write_constant_in(&path, 4000.0, 4326);

    let (transform, band) = read_band(&path).unwrap();
    assert_eq!(transform, grid());
    assert_eq!(band.valid_count(), SHAPE.0 * SHAPE.1);
}
