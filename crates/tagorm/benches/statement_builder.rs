use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tagorm::{
    AggregateFn, Clauses, Conjunction, Limit, Predicate, StatementBuilder, Value,
    render_debug_sql,
};

/// `n` AND-joined equality filters plus order and limit:
/// select * from t where (col0=?) and (col1=?) ... order by col0 desc limit 10
fn build_clauses(n: usize) -> Clauses {
    let mut clauses = Clauses::new();
    for i in 0..n {
        clauses
            .add_filter(Conjunction::And, &Predicate::eq(format!("col{i}"), i as i64))
            .unwrap();
    }
    clauses.add_order(&["col0", "desc"]).unwrap();
    clauses.set_limit(Limit::Count(10));
    clauses
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/select");

    for n in [1, 5, 10, 50, 100] {
        let clauses = build_clauses(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &clauses, |b, clauses| {
            b.iter(|| black_box(StatementBuilder::new("t", "*", clauses).select().unwrap()));
        });
    }

    group.finish();
}

fn bench_build_and_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/build_and_select");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let clauses = build_clauses(n);
                black_box(StatementBuilder::new("t", "*", &clauses).select().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let mut clauses = Clauses::new();
                clauses
                    .add_filter(
                        Conjunction::And,
                        &Predicate::in_list("id", values.iter().copied()),
                    )
                    .unwrap();
                black_box(
                    StatementBuilder::new("t", "*", &clauses)
                        .aggregate(AggregateFn::Count, "*")
                        .unwrap(),
                );
            });
        });
    }

    group.finish();
}

fn bench_debug_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/debug_sql");

    for n in [1, 10, 100] {
        let sql = vec!["?"; n].join(",");
        let params: Vec<Value> = (0..n).map(|i| Value::Text(format!("v{i}"))).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(render_debug_sql(&sql, &params)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_select,
    bench_build_and_select,
    bench_in_list,
    bench_debug_sql
);
criterion_main!(benches);
