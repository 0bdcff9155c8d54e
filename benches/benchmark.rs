use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sentinel_index::processing::{Compositor, Evaluator, TiledProcessor};
use sentinel_index::raster::{Band, Composite, GeoTransform, MultispectralImage, QA_BAND};
use sentinel_index::{Aoi, DateWindow, PipelineConfig};

const SIZE: (usize, usize) = (1024, 1024);

fn transform() -> GeoTransform {
    GeoTransform::new(11.0, 46.0, 0.0001, -0.0001)
}

fn synthetic_band(base: f32, modulo: usize) -> Band {
    let values = (0..SIZE.0 * SIZE.1)
        .map(|i| base + (i % modulo) as f32 / 10000.0)
        .collect();
    Band::from_values(SIZE, values).unwrap()
}

/// Benchmark the core NDVI evaluation in isolation
fn benchmark_ndvi_evaluation(c: &mut Criterion) {
    let composite = Composite::new(transform(), SIZE)
        .with_band("B8", synthetic_band(0.5, 100))
        .unwrap()
        .with_band("B4", synthetic_band(0.25, 50))
        .unwrap();
    let evaluator = Evaluator::default();

    c.bench_function("ndvi_evaluation", |b| {
        b.iter(|| evaluator.evaluate("NDVI", black_box(&composite)).unwrap())
    });

    let sequential = Evaluator::default().with_processor(TiledProcessor::new(Some(1), 64));
    c.bench_function("ndvi_evaluation_single_worker", |b| {
        b.iter(|| sequential.evaluate("NDVI", black_box(&composite)).unwrap())
    });
}

/// Benchmark masking and mosaicking three scenes
fn benchmark_composite(c: &mut Criterion) {
    let scene = |id: &str, day: u32, qa: f32| {
        let qa = Band::from_values(SIZE, vec![qa; SIZE.0 * SIZE.1]).unwrap();
        MultispectralImage::new(
            id,
            NaiveDate::from_ymd_opt(2024, 8, day).unwrap(),
            1.0,
            transform(),
            SIZE,
        )
        .with_band(QA_BAND, qa)
        .unwrap()
        .with_band("B8", synthetic_band(0.5, 100))
        .unwrap()
        .with_band("B4", synthetic_band(0.25, 50))
        .unwrap()
    };
    let images = vec![scene("a", 1, 1024.0), scene("b", 10, 0.0), scene("c", 20, 0.0)];
    let aoi = Aoi::new(
        vec![(11.01, 45.91), (11.09, 45.91), (11.09, 45.99), (11.01, 45.99)],
        Vec::new(),
    )
    .unwrap();
    let window = DateWindow::around("2024-09-01", 2).unwrap();
    let compositor = Compositor::new(&PipelineConfig::default());

    c.bench_function("composite_three_scenes", |b| {
        b.iter(|| {
            compositor
                .composite(black_box(&aoi), &window, images.clone())
                .unwrap()
        })
    });
}

criterion_group!(benches, benchmark_ndvi_evaluation, benchmark_composite);
criterion_main!(benches);
