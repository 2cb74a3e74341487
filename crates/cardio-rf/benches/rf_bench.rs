//! Criterion benchmarks for cardio-rf on heart-sized synthetic data.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use cardio_rf::{ClassificationReport, ConfusionMatrix, RandomForestConfig, TrainTestSplit};

/// Binary labels with four informative standardized columns out of `n_features`.
fn make_cohort(
    n_samples: usize,
    n_features: usize,
    seed: u64,
) -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let row: Vec<f64> = (0..n_features).map(|_| rng.r#gen::<f64>() * 2.0 - 1.0).collect();
        let signal = row.iter().take(4).sum::<f64>() + (rng.r#gen::<f64>() - 0.5);
        labels.push(usize::from(signal > 0.0));
        features.push(row);
    }
    let names = (0..n_features).map(|f| format!("x{f}")).collect();
    (features, labels, names)
}

fn bench_fit(c: &mut Criterion) {
    let (features, labels, names) = make_cohort(303, 13, 42);
    let cfg = RandomForestConfig::default();

    c.bench_function("rf_fit_303x13_100trees", |b| {
        b.iter(|| cfg.fit(&features, &labels, &names).unwrap());
    });
}

fn bench_predict_batch(c: &mut Criterion) {
    let (features, labels, names) = make_cohort(303, 13, 42);
    let forest = RandomForestConfig::default()
        .fit(&features, &labels, &names)
        .unwrap()
        .into_forest();

    c.bench_function("rf_predict_batch_303x13_100trees", |b| {
        b.iter(|| forest.predict_batch(&features).unwrap());
    });
}

fn bench_holdout_report(c: &mut Criterion) {
    let (features, labels, names) = make_cohort(1000, 20, 7);
    let classes = vec!["0".to_string(), "1".to_string()];
    let cfg = RandomForestConfig::new(25).unwrap();

    c.bench_function("rf_holdout_report_1000x20_25trees", |b| {
        b.iter(|| {
            let holdout = TrainTestSplit::default().split(&features, &labels).unwrap();
            let forest = cfg
                .fit(&holdout.train_features, &holdout.train_labels, &names)
                .unwrap()
                .into_forest();
            let predicted = forest.predict_batch(&holdout.test_features).unwrap();
            let matrix = ConfusionMatrix::from_labels(&holdout.test_labels, &predicted, 2).unwrap();
            ClassificationReport::new(&matrix, &classes).unwrap()
        });
    });
}

criterion_group!(benches, bench_fit, bench_predict_batch, bench_holdout_report);
criterion_main!(benches);
