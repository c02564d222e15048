use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sqlfront_parser::{Parser, tokenize};
use sqlfront_types::{Cx, ParseLimits};

const STATEMENT: &str = "SELECT a.id, b.name AS n, count(*) FROM accounts AS a \
     LEFT JOIN balances b ON a.id = b.account_id \
     WHERE a.created_at > :since AND b.amount BETWEEN 0x10 AND 1.5e3 \
     GROUP BY a.id HAVING count(*) > 1 ORDER BY n DESC LIMIT 50; -- trailing\n";

fn script(statements: usize) -> String {
    STATEMENT.repeat(statements)
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_throughput");
    for statements in [1usize, 16, 256] {
        let sql = script(statements);
        group.throughput(Throughput::Bytes(sql.len() as u64));
        group.bench_with_input(BenchmarkId::new("tokenize", statements), &sql, |b, sql| {
            b.iter(|| {
                let count = tokenize(sql.as_bytes()).count();
                criterion::black_box(count);
            });
        });
    }
    group.finish();
}

fn bench_parse_all(c: &mut Criterion) {
    let parser = Parser::new(ParseLimits::default());
    let cx = Cx::new();
    let mut group = c.benchmark_group("parse_throughput");
    for statements in [1usize, 16] {
        let sql = script(statements);
        group.throughput(Throughput::Bytes(sql.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_all", statements), &sql, |b, sql| {
            b.iter(|| {
                let parsed = parser.parse_all(&cx, sql).map(|s| s.len()).unwrap_or(0);
                criterion::black_box(parsed);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_parse_all);
criterion_main!(benches);
