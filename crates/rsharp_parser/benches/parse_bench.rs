use bumpalo::Bump;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const SOURCE: &str = r#"
using System;
using System.Collections.Generic;

namespace Benchmarks
{
    public class Repository<T> where T : class, new()
    {
        private readonly Dictionary<string, T> items = new Dictionary<string, T>();
        private int version;

        public event EventHandler Changed;

        public int Count
        {
            get { return items.Count; }
        }

        public T this[string key]
        {
            get { return items[key]; }
            set { items[key] = value; version++; }
        }

        public bool TryStore(string key, T item)
        {
            if (key == null || item == null)
            {
                throw new ArgumentNullException("key");
            }
            lock (items)
            {
                items[key] = item;
                version = version + 1;
            }
            return true;
        }

        public IEnumerator<T> Walk()
        {
            foreach (KeyValuePair<string, T> pair in items)
            {
                yield return pair.Value;
            }
            yield break;
        }

        public static int Mix(int seed)
        {
            int acc = seed;
            for (int i = 0; i < 64; i++)
            {
                acc = (acc << 3) ^ (acc >> 5) + i * 31;
                acc = acc > 0 ? acc : -acc;
            }
            return acc;
        }
    }
}
"#;

fn parse_benchmark(c: &mut Criterion) {
    c.bench_function("parse_unit", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let (unit, diagnostics) = rsharp_parser::parse(&arena, black_box(SOURCE));
            black_box((unit.members.len(), diagnostics.len()))
        })
    });

    c.bench_function("parse_skeleton", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let options = rsharp_parser::ParserOptions {
                parse_method_bodies: false,
            };
            let (unit, diagnostics) =
                rsharp_parser::parse_with_options(&arena, black_box(SOURCE), options);
            black_box((unit.members.len(), diagnostics.len()))
        })
    });

    c.bench_function("parse_expression", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let (expr, diagnostics) = rsharp_parser::parse_expression(
                &arena,
                black_box("(int)(a + b) * f(x, y)[i] + c << 2 >> 1"),
            );
            black_box((expr.span(), diagnostics.len()))
        })
    });
}

criterion_group!(benches, parse_benchmark);
criterion_main!(benches);
