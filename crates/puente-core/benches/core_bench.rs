//! Criterion benchmarks for puente-core conditioning and protocol primitives
//!
//! Run with: cargo bench -p puente-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use puente_core::{
    AnalogLine, AnalogSource, ChipSelect, Config, DacFrame, DacRoute, DacWriter, Debouncer,
    IntervalDebouncer, Level, Puente, ResponsiveSmoother, SelectLine, SelectLines, Smoother,
    SpiBus, SpiSettings, SubDac, TriggerLine, analog_to_dac, analog_to_midi, midi_to_dac,
};

const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

/// Slow sine sweep across the 10-bit domain with small deterministic jitter.
fn generate_sweep(size: usize) -> Vec<u16> {
    (0..size)
        .map(|i| {
            let t = i as f32 / 512.0;
            let base = ((2.0 * std::f32::consts::PI * t).sin() * 0.5 + 0.5) * 1020.0;
            let jitter = (i * 7919 % 7) as f32;
            (base + jitter) as u16
        })
        .collect()
}

/// Line pinned at one level.
struct SteadyLine(Level);

impl TriggerLine for SteadyLine {
    fn level(&mut self) -> Level {
        self.0
    }
}

/// Replays a sweep across all eight analog lines.
struct SweepSource {
    values: Vec<u16>,
    cursor: usize,
}

impl AnalogSource for SweepSource {
    fn read_raw(&mut self, _line: AnalogLine) -> u16 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

struct NullBus;

impl SpiBus for NullBus {
    fn claim(&mut self, _settings: SpiSettings) {}
    fn transmit(&mut self, byte: u8) {
        black_box(byte);
    }
    fn release(&mut self) {}
}

struct NullLine;

impl SelectLine for NullLine {
    fn set_low(&mut self) {}
    fn set_high(&mut self) {}
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scaling");

    for &block_size in BLOCK_SIZES {
        let input = generate_sweep(block_size);

        group.bench_with_input(
            BenchmarkId::new("analog_to_midi", block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    for &raw in &input {
                        black_box(analog_to_midi(black_box(raw)));
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("analog_to_dac", block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    for &raw in &input {
                        black_box(analog_to_dac(black_box(raw)));
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("midi_to_dac", block_size),
            &block_size,
            |b, &size| {
                b.iter(|| {
                    for i in 0..size {
                        black_box(midi_to_dac(black_box((i % 128) as u8)));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("DacFrame");

    let routes = [
        ("cs1_a", DacRoute::new(ChipSelect::Cs1, SubDac::A)),
        ("cs2_b", DacRoute::new(ChipSelect::Cs2, SubDac::B)),
    ];

    for (name, route) in &routes {
        group.bench_function(BenchmarkId::new("encode", *name), |b| {
            b.iter(|| {
                for value in 0u16..64 {
                    black_box(DacFrame::new(black_box(*route), black_box(value * 64)).to_bytes());
                }
            });
        });
    }

    group.finish();
}

fn bench_smoother(c: &mut Criterion) {
    let mut group = c.benchmark_group("ResponsiveSmoother");

    for &block_size in BLOCK_SIZES {
        let input = generate_sweep(block_size);

        group.bench_with_input(
            BenchmarkId::new("tracking", block_size),
            &block_size,
            |b, _| {
                let mut smoother = ResponsiveSmoother::new(0.015, 10.0, true);
                b.iter(|| {
                    for &raw in &input {
                        smoother.update(black_box(raw));
                        black_box(smoother.value());
                    }
                });
            },
        );

        // Settled on a steady value: the movement branch is skipped
        group.bench_with_input(
            BenchmarkId::new("sleeping", block_size),
            &block_size,
            |b, &size| {
                let mut smoother = ResponsiveSmoother::new(0.015, 10.0, true);
                for _ in 0..32 {
                    smoother.update(500);
                }
                b.iter(|| {
                    for _ in 0..size {
                        smoother.update(black_box(501));
                        black_box(smoother.value());
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_debouncer(c: &mut Criterion) {
    let mut group = c.benchmark_group("IntervalDebouncer");

    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, &size| {
                let mut debouncer = IntervalDebouncer::new(SteadyLine(Level::High), 5);
                let mut now = 0u32;
                b.iter(|| {
                    for _ in 0..size {
                        now = now.wrapping_add(1);
                        debouncer.refresh(black_box(now));
                        black_box(debouncer.level());
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("DacWriter");

    group.bench_function("write_sequence", |b| {
        let writer = DacWriter::new(SpiSettings::default());
        let route = DacRoute::new(ChipSelect::Cs2, SubDac::B);
        let mut bus = NullBus;
        let mut lines = SelectLines::new(NullLine, NullLine);
        b.iter(|| {
            writer
                .write(black_box(route), black_box(2048), &mut bus, &mut lines)
                .unwrap();
        });
    });

    group.finish();
}

fn bench_polling_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("Puente");

    group.bench_function("read_all_inputs", |b| {
        let lines = [
            SteadyLine(Level::High),
            SteadyLine(Level::High),
            SteadyLine(Level::High),
            SteadyLine(Level::High),
        ];
        let mut puente = Puente::with_defaults(Config::default(), lines).unwrap();
        let mut source = SweepSource {
            values: generate_sweep(1024),
            cursor: 0,
        };
        let mut now = 0u32;
        b.iter(|| {
            now = now.wrapping_add(1);
            puente.read_all_inputs(black_box(now), &mut source);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_scaling,
    bench_frame,
    bench_smoother,
    bench_debouncer,
    bench_write,
    bench_polling_cycle,
);

criterion_main!(benches);
