use criterion::{criterion_group, criterion_main, Criterion};
use runepeg::{class, Expr, Grammar};
use std::hint::black_box;

fn word_list_grammar() -> Grammar {
    // Words <- (word ','?)* !.
    let mut g = Grammar::new();
    g.make_rule(&Expr::name("Word", Expr::plus(Expr::is(class::ALNUM))));
    g.pack_terms([
        Expr::star(Expr::seq([
            Expr::reference("Word"),
            Expr::opt(Expr::lit(",")),
        ])),
        Expr::end(),
    ]);
    g
}

fn bench_lowering(c: &mut Criterion) {
    c.bench_function("lower_fenced_grammar", |b| {
        b.iter(|| {
            let mut g = Grammar::new();
            g.make_rule(&Expr::name("Post", Expr::mmx(3, Some(8), Expr::lit("`"))));
            g.pack_terms([Expr::seq([
                Expr::save("Post"),
                Expr::to(Expr::val("Post")),
                Expr::val("Post"),
            ])]);
            black_box(g)
        });
    });

    c.bench_function("lower_memoized_resubmission", |b| {
        let term = Expr::seq([
            Expr::one([Expr::lit("foo"), Expr::lit("bar")]),
            Expr::star(Expr::rng('a', 'z')),
            Expr::end(),
        ]);
        let mut g = Grammar::new();
        g.make_rule(&term);
        b.iter(|| black_box(g.make_rule(&term)));
    });
}

fn bench_scanning(c: &mut Criterion) {
    let g = word_list_grammar();
    let input = "alpha,beta,gamma,delta,".repeat(64);

    c.bench_function("scan_word_list", |b| {
        b.iter(|| black_box(g.scan(input.as_str())));
    });

    let fenced = {
        let mut g = Grammar::new();
        g.make_rule(&Expr::name("Post", Expr::mmx(3, Some(8), Expr::lit("`"))));
        g.pack_terms([Expr::seq([
            Expr::save("Post"),
            Expr::to(Expr::val("Post")),
            Expr::val("Post"),
        ])]);
        g
    };
    let fence = format!("````{}````", ".".repeat(512));

    c.bench_function("scan_fenced_block", |b| {
        b.iter(|| black_box(fenced.scan(fence.as_str())));
    });
}

criterion_group!(benches, bench_lowering, bench_scanning);
criterion_main!(benches);
