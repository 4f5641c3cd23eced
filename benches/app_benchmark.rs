use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use simulation::{App, Bounds, Controls, Ground, GroundSettings, Mission, MissionSettings, Settings};

fn seeded(seed: u64) -> Settings {
    Settings {
        mission: MissionSettings::default().with_seed(seed),
        ..Settings::default()
    }
}

fn small() -> Bounds {
    Bounds::new(800., 600.)
}

fn large() -> Bounds {
    Bounds::new(4000., 3000.)
}

fn generate(bounds: Bounds) {
    let mut rng = StdRng::seed_from_u64(1);
    black_box(Ground::generate(bounds, GroundSettings::default(), &mut rng));
}

fn tick_thousand(bounds: Bounds) {
    let mut mission = Mission::new(bounds, seeded(1));
    let controls = Controls::default().with_down(true);
    for _ in 0..1000 {
        black_box(mission.tick(&controls));
    }
}

fn fly_attempt(bounds: Bounds) {
    let mut app = App::try_new(bounds, seeded(1)).unwrap();
    black_box(app.run_attempt().unwrap());
}

pub fn run_benchmark(c: &mut Criterion) {
    macro_rules! bench {
        ($func:ident, $arg:ident) => {{
            let name = concat!(stringify!($func), "_", stringify!($arg));
            c.bench_function(name, |b| b.iter(|| $func(black_box($arg()))));
        }};
    }

    bench!(generate, small);
    bench!(generate, large);
    bench!(tick_thousand, small);
    bench!(tick_thousand, large);
    bench!(fly_attempt, small);
    bench!(fly_attempt, large);
}

criterion_group!(benches, run_benchmark);
criterion_main!(benches);
