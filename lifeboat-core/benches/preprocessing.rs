use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lifeboat_core::preprocessing::{ColumnTransformer, FeatureGroups};
use polars::prelude::*;
use rand::prelude::*;

const PORTS: [&str; 3] = ["C", "Q", "S"];

fn create_test_dataframe(n_rows: usize) -> DataFrame {
    let mut rng = rand::thread_rng();

    let age: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(0.0..80.0)).collect();
    let fare: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(0.0..512.0)).collect();
    let pclass: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(1..=3)).collect();
    let port: Vec<&str> = (0..n_rows).map(|_| PORTS[rng.gen_range(0..3)]).collect();

    df!(
        "Age" => &age,
        "Fare" => &fare,
        "Pclass" => &pclass,
        "Embarked" => &port,
    )
    .unwrap()
}

fn groups() -> FeatureGroups {
    FeatureGroups {
        numeric: vec!["Age".to_string(), "Fare".to_string()],
        ordinal: vec!["Pclass".to_string()],
        categorical: vec!["Embarked".to_string()],
    }
}

fn bench_column_transformer(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_transformer");

    for n_rows in [1000, 10000, 100000].iter() {
        let df = create_test_dataframe(*n_rows);

        group.bench_with_input(BenchmarkId::new("fit_transform", n_rows), &df, |b, df| {
            b.iter(|| {
                let mut transformer = ColumnTransformer::new(groups());
                transformer.fit_transform(black_box(df)).unwrap()
            })
        });

        let mut fitted = ColumnTransformer::new(groups());
        fitted.fit(&df).unwrap();
        group.bench_with_input(BenchmarkId::new("transform", n_rows), &df, |b, df| {
            b.iter(|| fitted.transform(black_box(df)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_column_transformer);
criterion_main!(benches);
