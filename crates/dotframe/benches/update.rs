use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dotframe::detect::synthetic::{apply_motion, clutter_dots, frame_dots, SyntheticFrame};
use dotframe::{DetectorParams, Dot, DotFrameDetector, Frame, Homography};
use nalgebra::{Point2, Vector2};

const PITCH: f32 = 160.0;

fn marker_grid(count: usize) -> Vec<Dot> {
    let cols = (count as f32).sqrt().ceil() as usize;
    (0..count)
        .flat_map(|i| {
            let layout = SyntheticFrame {
                origin: Point2::new(
                    40.0 + PITCH * (i % cols) as f32,
                    40.0 + PITCH * (i / cols) as f32,
                ),
                angle: 0.05 * (i % 7) as f32,
                ..SyntheticFrame::default()
            };
            frame_dots(1_000 + 37 * i as u32, &layout).unwrap_or_default()
        })
        .collect()
}

fn with_clutter(mut dots: Vec<Dot>, count: usize) -> Vec<Dot> {
    let extent = dots
        .iter()
        .fold(Point2::new(0.0f32, 0.0), |acc, d| {
            Point2::new(acc.x.max(d.position.x), acc.y.max(d.position.y))
        });
    dots.extend(clutter_dots(
        count,
        Point2::new(extent.x + 60.0, 0.0),
        Point2::new(extent.x + 1060.0, extent.y.max(500.0)),
        20.0,
        3,
    ));
    dots
}

fn detector() -> DotFrameDetector {
    let mut params = DetectorParams::default();
    params.tracker.seed = Some(1);
    DotFrameDetector::new(params).unwrap_or_else(|err| panic!("default params: {err}"))
}

fn bench_scratch(c: &mut Criterion) {
    let det = detector();
    let mut group = c.benchmark_group("scratch");
    for markers in [1usize, 16, 64] {
        let dots = with_clutter(marker_grid(markers), 200);
        group.bench_with_input(BenchmarkId::from_parameter(markers), &dots, |b, dots| {
            b.iter(|| {
                let mut dots = dots.clone();
                black_box(det.update(&mut dots, &[], 256))
            })
        });
    }
    group.finish();
}

fn bench_tracking(c: &mut Criterion) {
    let det = detector();
    let mut group = c.benchmark_group("tracking");
    for markers in [16usize, 64] {
        let still = marker_grid(markers);
        let prev: Vec<Frame> = det.update(&mut still.clone(), &[], 256);

        let mut moved = still.clone();
        apply_motion(&mut moved, &Homography::translation(Vector2::new(4.0, -3.0)));

        group.bench_with_input(
            BenchmarkId::new("stationary", markers),
            &still,
            |b, dots| {
                b.iter(|| {
                    let mut dots = dots.clone();
                    black_box(det.update(&mut dots, &prev, 256))
                })
            },
        );
        group.bench_with_input(BenchmarkId::new("moving", markers), &moved, |b, dots| {
            b.iter(|| {
                let mut dots = dots.clone();
                black_box(det.update(&mut dots, &prev, 256))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scratch, bench_tracking);
criterion_main!(benches);
