//! Context-sensitive parsing with save/value: a fenced block whose
//! closing delimiter must repeat the opening one exactly.
//!
//! Run with: cargo run --example fenced_block

use runepeg::{Expr, Grammar};

fn main() {
    let mut g = Grammar::new();

    // Post  <- '`'{3,8}
    // Fence <- Save(Post) To(Val(Post)) Val(Post) !.
    g.make_rule(&Expr::name("Post", Expr::mmx(3, Some(8), Expr::lit("`"))));
    g.pack_terms([Expr::seq([
        Expr::save("Post"),
        Expr::to(Expr::val("Post")),
        Expr::val("Post"),
        Expr::end(),
    ])]);

    println!("grammar: {g}");

    for input in [
        "```fenced text```",
        "`````wider fence`````",
        "```mismatched````",
        "``too short``",
    ] {
        let result = g.scan(input);
        let verdict = if result.is_success() { "ok " } else { "err" };
        println!("{verdict} {input:24} {result}");
    }
}
