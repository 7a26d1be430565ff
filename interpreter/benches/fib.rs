use criterion::{criterion_group, criterion_main, Criterion};
use monkey_core::Lexer;
use monkey_interpreter::env::Environment;
use monkey_interpreter::interpreter::Interpreter;
use monkey_interpreter::parser::Parser;
use std::cell::RefCell;
use std::io;
use std::rc::Rc;

fn benchmark(c: &mut Criterion) {
    let src = include_str!("../tests/programs/fib.monkey");
    let mut parser = Parser::new(Lexer::new(src));
    let program = parser.parse_program();
    assert!(parser.errors().is_empty());

    let interpreter = Interpreter::new(Rc::new(RefCell::new(io::sink())));

    c.bench_function("fib 15", |b| {
        b.iter(|| {
            let env = Rc::new(RefCell::new(Environment::new()));
            interpreter.eval(&program, &env)
        })
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
