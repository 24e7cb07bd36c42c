use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use storeql::{Database, Row, Substitutions, Value};

fn setup_populated_db(n: usize) -> Database {
    let mut db = Database::new();
    db.define_table("users", &["id auto_inc", "name", "age", "active default false"])
        .unwrap();

    let rows = (0..n).map(|i| {
        Row::from([
            ("name".to_string(), Value::from(format!("user{i}"))),
            ("age".to_string(), Value::Int((i % 100) as i64)),
            ("active".to_string(), Value::Bool(i % 2 == 0)),
        ])
    });
    db.insert("users", rows).unwrap();
    db
}

fn bench_insert_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("Insert_SQL_Pipeline");
    group.bench_function("insert_single_row_sql", |b| {
        let mut db = Database::new();
        b.iter(|| {
            db.query(black_box("INSERT INTO tests (id, name) VALUES (42, 'answer')"))
                .unwrap();
        });
    });
    group.bench_function("insert_single_row_positional", |b| {
        let mut db = Database::new();
        let subs = Substitutions::positional([Value::Int(42), Value::from("answer")]);
        b.iter(|| {
            db.query_with(black_box("INSERT INTO tests (id, name) VALUES (?, ?)"), &subs)
                .unwrap();
        });
    });
    group.finish();
}

fn bench_select_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Select_Where_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let mut db = setup_populated_db(n);
            b.iter(|| {
                let res = db
                    .query("SELECT * FROM users WHERE age = 42 OR (active = true AND age < 3)")
                    .unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

fn bench_select_order_by(c: &mut Criterion) {
    let mut group = c.benchmark_group("Select_Order_By");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let mut db = setup_populated_db(n);
            b.iter(|| {
                let res = db
                    .query("SELECT * FROM users ORDER BY age, name DESC LIMIT 10")
                    .unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

fn bench_update_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Update_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_batched(
                || setup_populated_db(n),
                |mut db| {
                    db.query("UPDATE users SET age = 99 WHERE active = TRUE")
                        .unwrap();
                    black_box(db);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_delete_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Delete_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_batched(
                || setup_populated_db(n),
                |mut db| {
                    db.query("DELETE FROM users WHERE age > 90").unwrap();
                    black_box(db);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_sql,
    bench_select_scaling,
    bench_select_order_by,
    bench_update_performance,
    bench_delete_performance
);
criterion_main!(benches);
