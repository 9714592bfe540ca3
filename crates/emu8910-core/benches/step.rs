//! Benchmarks for the PSG sample path
//!
//! Run with: cargo bench --bench step -p emu8910

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use emu8910::{ChipConfig, Psg49, Register, RegisterFile};
use std::hint::black_box;

fn tone_chip() -> Psg49 {
    let mut chip = Psg49::new(ChipConfig::default()).expect("default config");
    let regs = chip.registers_mut();
    regs.write(Register::AFine, 0xC8); // Tone A period 200
    regs.write(Register::Mixer, 0x3E); // Tone A only
    regs.write(Register::AVolume, 0x0F);
    chip
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    let mut chip = tone_chip();

    for samples in [882, 4410, 44100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(samples), samples, |b, &samples| {
            b.iter(|| {
                for _ in 0..samples {
                    black_box(chip.step());
                }
            });
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut chip = tone_chip();
    let mut block = vec![0.0f32; 2 * 882];

    c.bench_function("render_frame", |b| {
        b.iter(|| {
            chip.render(black_box(&mut block));
        });
    });
}

fn bench_step_mixer(c: &mut Criterion) {
    let mut chip = tone_chip();
    chip.map();

    c.bench_function("step_mixer", |b| {
        b.iter(|| black_box(chip.step_mixer()));
    });
}

fn bench_frame_routine(c: &mut Criterion) {
    let mut chip = tone_chip();

    // All three channels plus noise and a repeating envelope
    let row: [u8; 14] = [
        0x10, 0x01, // Tone A
        0x20, 0x02, // Tone B
        0x30, 0x03, // Tone C
        0x08, // Noise
        0x30, // Tone on all, noise on A
        0x0F, 0x10, 0x0C, // Volumes, B on envelope
        0x00, 0x10, // Envelope period
        0x0E, // Triangle
    ];
    chip.set_frame_routine(move |regs: &mut RegisterFile| regs.load_row(&row));

    c.bench_function("one_second_with_frames", |b| {
        b.iter(|| {
            for _ in 0..44_100 {
                black_box(chip.step());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_step,
    bench_render,
    bench_step_mixer,
    bench_frame_routine
);
criterion_main!(benches);
