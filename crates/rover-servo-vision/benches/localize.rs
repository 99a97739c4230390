use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rover_servo_core::{prepare_frame, BlurParams, RgbImage};
use rover_servo_vision::NavigationEstimator;

fn synthetic_frame(width: usize, height: usize) -> RgbImage {
    let mut data = [190u8, 190, 190].repeat(width * height);
    let discs: [(i32, i32, i32, [u8; 3]); 4] = [
        (320, 260, 6, [130, 20, 60]),
        (290, 300, 6, [20, 140, 40]),
        (350, 300, 6, [20, 40, 120]),
        (320, 120, 23, [30, 30, 30]),
    ];
    for (cx, cy, r, rgb) in discs {
        for y in (cy - r)..=(cy + r) {
            for x in (cx - r)..=(cx + r) {
                if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
                    let i = (y as usize * width + x as usize) * 3;
                    data[i..i + 3].copy_from_slice(&rgb);
                }
            }
        }
    }
    RgbImage {
        width,
        height,
        data,
    }
}

fn bench_localize(c: &mut Criterion) {
    let frame = synthetic_frame(640, 480);
    let estimator = NavigationEstimator::default();

    c.bench_function("prepare_frame_640x480", |b| {
        b.iter(|| prepare_frame(black_box(&frame.view()), &BlurParams::default()))
    });

    let hsv = prepare_frame(&frame.view(), &BlurParams::default());
    c.bench_function("estimate_prepared_640x480", |b| {
        b.iter(|| estimator.estimate_prepared(black_box(&hsv)))
    });

    c.bench_function("estimate_full_640x480", |b| {
        b.iter(|| estimator.estimate(black_box(&frame.view())))
    });
}

criterion_group!(benches, bench_localize);
criterion_main!(benches);
