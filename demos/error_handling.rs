//! Demonstrate strict parsing, which stops at the first diagnostic.

fn main() {
    // Unterminated string literal
    match brs_parser::parse_str("x = \"unclosed\nprint x\n") {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(brs_parser::Error::Lex(e)) => {
            println!("Lex error: {e}");
            println!("  Location: line {}, column {}", e.span.start.line, e.span.start.column);
        }
        Err(brs_parser::Error::Parse(e)) => {
            println!("Parse error: {e}");
        }
    }

    println!();

    // Reserved word used as a variable
    match brs_parser::parse_str("else = true\n") {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(brs_parser::Error::Lex(e)) => {
            println!("Lex error: {e}");
        }
        Err(brs_parser::Error::Parse(e)) => {
            println!("Parse error: {e}");
            println!("  Location: line {}, column {}", e.span.start.line, e.span.start.column);
        }
    }
}
