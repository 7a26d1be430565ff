use std::env;
use std::io::{self, BufRead, Write};

use clap::Parser as ArgParser;

use monkey_interpreter::error::ParseError;
use monkey_interpreter::interpreter::Interpreter;
use monkey_interpreter::{new_environment, parse, tokenize, TokenType};

const PROMPT: &str = ">> ";

/// Interactive Monkey session. By default each line is evaluated against an
/// environment that lives for the whole session; the flags switch the output
/// to one of the earlier pipeline stages instead.
#[derive(ArgParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print the token stream of each line instead of evaluating it.
    #[arg(short, long)]
    tokens: bool,

    /// Print the parsed program of each line instead of evaluating it.
    #[arg(short, long)]
    ast: bool,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let user = env::var("USER").unwrap_or_else(|_| String::from("there"));
    println!("Hello {}! This is the Monkey programming language!", user);
    println!("Feel free to type in commands");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let interpreter = Interpreter::default();
    let env = new_environment();

    print!("{}", PROMPT);
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;

        if args.tokens {
            for token in tokenize(&line) {
                if token.ty == TokenType::Eof {
                    break;
                }
                println!("{:?}", token);
            }
        } else {
            match parse(&line) {
                Ok(program) if args.ast => println!("{}", program),
                Ok(program) => println!("{}", interpreter.eval(&program, &env).inspect()),
                Err(errors) => print_parse_errors(&errors),
            }
        }

        print!("{}", PROMPT);
        stdout.flush()?;
    }

    Ok(())
}

fn print_parse_errors(errors: &[ParseError]) {
    for err in errors {
        println!("\t{}", err);
    }
}
