//! A small recursive grammar built from named rules and references,
//! with the result tree rendered as JSON and queried by name.
//!
//! Run with: cargo run --example tagged_list

use runepeg::{class, Expr, Grammar};

fn main() {
    // Item <- word / '(' List ')'
    // List <- Item (',' Item)*
    let mut g = Grammar::new();
    g.make_rule(&Expr::name("Word", Expr::plus(Expr::is(class::ALNUM))));
    g.make_rule(&Expr::name(
        "Item",
        Expr::one([
            Expr::reference("Word"),
            Expr::seq([Expr::lit("("), Expr::reference("List"), Expr::lit(")")]),
        ]),
    ));
    g.make_rule(&Expr::name(
        "List",
        Expr::seq([
            Expr::reference("Item"),
            Expr::star(Expr::seq([Expr::lit(","), Expr::reference("Item")])),
        ]),
    ));
    g.pack_terms([Expr::reference("List"), Expr::end()]);

    let input = "a,(b,c),d42";
    let result = g.scan(input);
    println!("input:  {input}");
    println!("result: {result}");

    let buffer = result.buffer.clone().expect("root carries the buffer");
    for word in result.named("Word") {
        println!("word [{},{}) = {:?}", word.begin, word.end, word.text(&buffer));
    }
}
