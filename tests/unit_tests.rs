// tests/unit_tests.rs
use approx::assert_relative_eq;
use sentinel_index::processing::indices::savi::savi_with;
use sentinel_index::processing::indices::{lookup, names, resolve_vis, IndexCalculator, REGISTRY};
use sentinel_index::processing::legend::build_legend;
use sentinel_index::Error;

/// Evaluate a registered index on one pixel
fn compute(index: &str, bands: &[f32]) -> Option<f32> {
    lookup(index).unwrap().compute(bands)
}

/// Test NDVI calculation with known values
#[test]
fn test_ndvi_calculation() {
    let test_cases = [
        // NIR, RED, Expected NDVI
        (0.5, 0.25, Some(0.33333)),
        (0.3, 0.3, Some(0.0)),
        (0.4, 0.1, Some(0.6)),
        (0.0, 0.0, None), // zero denominator
    ];

    for (nir, red, expected) in test_cases {
        match (compute("NDVI", &[nir, red]), expected) {
            (Some(got), Some(want)) => assert_relative_eq!(got, want, epsilon = 1e-4),
            (got, want) => assert_eq!(got, want, "NDVI({nir}, {red})"),
        }
    }
}

/// Every two-band normalized difference index reads its bands in registry order
#[test]
fn test_normalized_difference_band_order() {
    let cases = [
        ("NDVI", ["B8", "B4"]),
        ("GNDVI", ["B8", "B3"]),
        ("NDWI", ["B3", "B8"]),
        ("NDMI", ["B8A", "B11"]),
        ("NDMI_MoistureStress", ["B8", "B11"]),
        ("NDCI", ["B5", "B4"]),
    ];
    for (name, bands) in cases {
        let def = lookup(name).unwrap();
        assert_eq!(def.required_bands(), bands, "{name}");
        assert_relative_eq!(def.compute(&[0.6, 0.2]).unwrap(), 0.5, epsilon = 1e-6);
        assert_relative_eq!(def.compute(&[0.2, 0.6]).unwrap(), -0.5, epsilon = 1e-6);
    }
}

/// Normalized differences of reflectances stay within [-1, 1], including
/// pairs where one band is zero
#[test]
fn test_normalized_difference_stays_in_unit_range() {
    let indices = ["NDVI", "GNDVI", "NDMI", "NDWI", "NDMI_MoistureStress", "NDCI"];
    let steps: Vec<f32> = (0..=20).map(|i| i as f32 / 20.0).collect();
    for name in indices {
        for &a in &steps {
            for &b in &steps {
                match compute(name, &[a, b]) {
                    Some(v) => assert!((-1.0..=1.0).contains(&v), "{name}({a}, {b}) = {v}"),
                    None => assert_eq!(a + b, 0.0, "{name}({a}, {b}) undefined"),
                }
            }
        }
        assert_eq!(compute(name, &[0.0, 0.3]), Some(-1.0), "{name}");
        assert_eq!(compute(name, &[0.3, 0.0]), Some(1.0), "{name}");
    }
}

/// Test EVI calculation with known values
#[test]
fn test_evi_calculation() {
    // EVI = 2.5 * (NIR - RED) / (NIR + 6*RED - 7.5*BLUE + 1)
    let evi = compute("EVI", &[0.5, 0.25, 0.15]).unwrap();
    assert_relative_eq!(evi, 0.33333, epsilon = 1e-4);

    // NIR = RED, so numerator is 0
    assert_relative_eq!(compute("EVI", &[0.3, 0.3, 0.1]).unwrap(), 0.0);

    // 2 + 0 - 3 + 1 = 0
    assert_eq!(compute("EVI", &[2.0, 0.0, 0.4]), None);
}

/// Test SAVI with the registry soil factor and others
#[test]
fn test_savi_calculation() {
    assert_relative_eq!(compute("SAVI", &[0.5, 0.25]).unwrap(), 0.303056, epsilon = 1e-4);

    let factors_and_expected = [
        (0.0, 0.33333), // L=0: SAVI = NDVI
        (0.5, 0.3),
        (1.0, 0.28571),
    ];
    for (soil_factor, expected) in factors_and_expected {
        let got = savi_with(0.5, 0.25, soil_factor).unwrap();
        assert_relative_eq!(got, expected, epsilon = 1e-4);
    }
}

/// Pigment and ratio indices
#[test]
fn test_pigment_and_ratio_indices() {
    assert_relative_eq!(compute("ARI", &[0.1, 0.2]).unwrap(), 5.0, epsilon = 1e-4);
    assert_relative_eq!(compute("mARI", &[0.1, 0.2, 0.4]).unwrap(), 2.0, epsilon = 1e-4);
    assert_relative_eq!(compute("CHL-RED-EDGE", &[0.4, 0.2]).unwrap(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(compute("MCARI", &[0.3, 0.1, 0.2]).unwrap(), 0.54, epsilon = 1e-4);
    assert_relative_eq!(compute("MSI", &[0.2, 0.4]).unwrap(), 0.5, epsilon = 1e-6);
    assert_relative_eq!(compute("PSSRb1", &[0.4, 0.1]).unwrap(), 4.0, epsilon = 1e-5);
    assert_relative_eq!(compute("SIPI", &[0.5, 0.1, 0.1]).unwrap(), 1.0, epsilon = 1e-5);

    // Singular pixels
    assert_eq!(compute("ARI", &[0.0, 0.2]), None);
    assert_eq!(compute("CHL-RED-EDGE", &[0.4, 0.0]), None);
    assert_eq!(compute("MSI", &[0.2, 0.0]), None);
    assert_eq!(compute("SIPI", &[0.5, 0.1, 0.5]), None);
}

/// All fifteen indices are registered
#[test]
fn test_registry_contents() {
    let expected = [
        "NDVI",
        "ARI",
        "mARI",
        "CHL-RED-EDGE",
        "EVI",
        "GNDVI",
        "MCARI",
        "MSI",
        "NDMI",
        "NDWI",
        "NDMI_MoistureStress",
        "NDCI",
        "PSSRb1",
        "SAVI",
        "SIPI",
    ];
    assert_eq!(names().collect::<Vec<_>>(), expected);
    for def in &REGISTRY {
        assert!(!def.bands.is_empty(), "{}", def.name);
    }
}

#[test]
fn test_lookup_is_case_insensitive_fallback() {
    assert_eq!(lookup("ndvi").unwrap().name, "NDVI");
    assert_eq!(lookup("MARI").unwrap().name, "mARI");
    assert_eq!(lookup("pssrb1").unwrap().name, "PSSRb1");
    assert!(matches!(lookup("FOO"), Err(Error::UnknownIndex(name)) if name == "FOO"));
}

#[test]
fn test_resolve_vis() {
    let vis = resolve_vis("NDVI").unwrap();
    assert_eq!(vis.min, 0.0);
    assert_eq!(vis.max, 1.0);
    assert_eq!(vis.palette, vec!["red", "yellow", "green"]);

    let savi = resolve_vis("SAVI").unwrap();
    assert_eq!(savi.palette.len(), 21);
    let ndmi = resolve_vis("NDMI").unwrap();
    assert_eq!(ndmi.palette.len(), 6);

    // Stable across calls
    assert_eq!(resolve_vis("EVI").unwrap(), resolve_vis("EVI").unwrap());
    assert!(matches!(resolve_vis("FOO"), Err(Error::UnknownIndex(_))));
}

#[test]
fn test_legend_gradient() {
    let vis = resolve_vis("NDVI").unwrap();
    let legend = build_legend("NDVI", &vis, 5).unwrap();
    assert_eq!(legend.gradient, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    assert_eq!(legend.shape(), (5, 1));
    assert_eq!(legend.min_label, "0");
    assert_eq!(legend.max_label, "1");
    assert_eq!(legend.vis(), vis);

    // Last column is exactly max even when the step doesn't divide evenly
    let ndmi = resolve_vis("NDMI").unwrap();
    let legend = build_legend("NDMI", &ndmi, 300).unwrap();
    assert_eq!(legend.gradient.len(), 300);
    assert_eq!(legend.gradient[0], -0.8);
    assert_eq!(legend.gradient[299], 0.8);
    assert!(legend.gradient.windows(2).all(|w| w[0] < w[1]));

    assert!(matches!(
        build_legend("NDVI", &vis, 1),
        Err(Error::InvalidParameter { name: "legend_width", .. })
    ));
}
