//! Parse a program with mistakes and report every diagnostic.

use brs_parser::Statement;

fn main() {
    let input = "\
sub main()
    person = {name: \"bob\", rem: 2}
    settings = {volume: 3
    print person.name
end sub

function twice(x as integer) as integer
    return x * 2
end function
";

    let output = brs_parser::parse_source(input);

    println!("Statements: {}", output.statements.len());
    for statement in &output.statements {
        if let Statement::Function(func) = statement {
            println!(
                "  {:?} '{}' with {} body statements",
                func.func.kind,
                func.name.name,
                func.func.body.statements.len()
            );
        }
    }

    println!("\nDiagnostics: {}", output.diagnostics.len());
    for diagnostic in &output.diagnostics {
        let span = diagnostic.span;
        println!(
            "  {}: {} ({}:{} to {}:{})",
            diagnostic.severity,
            diagnostic.message,
            span.start.line,
            span.start.column,
            span.end.line,
            span.end.column
        );
    }
}
