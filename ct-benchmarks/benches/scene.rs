use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use ct_driver_trait::Driver;
use ct_frame::{FrameClock, SceneFrame};
use ct_particles::{
    dataset::{build_foliage, build_ornaments, build_ribbon, build_snow},
    ChaosToggle, GroupKind, ParticleGroup, Scene, SceneConfig,
};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;
use strum::IntoEnumIterator;

struct SimpleDriver;

impl Driver for SimpleDriver {
    fn init() -> Self {
        Self
    }

    fn display_frame(&mut self, frame: &SceneFrame<'_>) {
        // Do nothing, but don't optimise this away
        black_box(frame);
    }
}

fn datasets(c: &mut Criterion) {
    let config = SceneConfig::default();

    c.bench_function("build_foliage", |b| {
        let mut rng = StdRng::seed_from_u64(12345);
        b.iter(|| black_box(build_foliage(&config.foliage, &mut rng)));
    });
    c.bench_function("build_ornaments", |b| {
        let mut rng = StdRng::seed_from_u64(12345);
        b.iter(|| black_box(build_ornaments(&config.ornaments, &mut rng)));
    });
    c.bench_function("build_ribbon", |b| {
        let mut rng = StdRng::seed_from_u64(12345);
        b.iter(|| black_box(build_ribbon(&config.ribbon, &mut rng)));
    });
    c.bench_function("build_snow", |b| {
        let mut rng = StdRng::seed_from_u64(12345);
        b.iter(|| black_box(build_snow(&config.snow, &mut rng)));
    });
}

fn frames(c: &mut Criterion) {
    for chaos in [false, true] {
        c.bench_function(&format!("scene frame (chaos = {chaos})"), |b| {
            let mut scene = Scene::from_config(SceneConfig::default());
            scene.set_chaos(chaos);
            let mut driver = SimpleDriver::init();

            b.iter(|| {
                scene.advance(1. / 60.);
                driver.display_frame(&scene.frame());
                scene.clear_update_flags();
            });
        });
    }

    c.bench_function("scene rebuild", |b| {
        let mut rng = StdRng::seed_from_u64(12345);
        b.iter_batched_ref(
            || Scene::from_config(SceneConfig::default()),
            |scene| scene.rebuild(&mut rng),
            BatchSize::LargeInput,
        );
    });

    for kind in GroupKind::iter() {
        c.bench_function(&format!("update {}", kind.name()), |b| {
            let mut scene = Scene::from_config(SceneConfig::default());
            let toggle = ChaosToggle::new(true);
            let mut elapsed = 0.;

            b.iter(|| {
                elapsed += 1. / 60.;
                if let Some(group) = scene.group_mut(kind) {
                    group.update(FrameClock::new(elapsed, 1. / 60.), &toggle);
                }
            });
        });
    }
}

criterion_group! { benches, datasets, frames }
criterion_main! { benches }
