//! Expression productions, lowest precedence first.

use super::statement::{FUNCTION_END, SUB_END};
use super::{Bail, PResult, ParseErrorKind, Parser, describe};
use crate::ast::{
    AaElement, AaLiteralExpression, AaMember, ArrayLiteralExpression, BinaryExpression,
    BinaryOperator, CallExpression, Comment, DottedGetExpression, Expression, FunctionExpression,
    FunctionKind, GroupingExpression, Identifier, IndexedGetExpression, LiteralExpression,
    Parameter, UnaryExpression, UnaryOperator, ValueType,
};
use crate::keywords;
use crate::token::{Literal, Span, Token, TokenKind};

type Level = fn(&mut Parser) -> PResult<Expression>;

const OR: &[(TokenKind, BinaryOperator)] = &[(TokenKind::Or, BinaryOperator::Or)];
const AND: &[(TokenKind, BinaryOperator)] = &[(TokenKind::And, BinaryOperator::And)];
const RELATIONAL: &[(TokenKind, BinaryOperator)] = &[
    (TokenKind::Equal, BinaryOperator::Equal),
    (TokenKind::LessGreater, BinaryOperator::NotEqual),
    (TokenKind::Less, BinaryOperator::Less),
    (TokenKind::LessEqual, BinaryOperator::LessEqual),
    (TokenKind::Greater, BinaryOperator::Greater),
    (TokenKind::GreaterEqual, BinaryOperator::GreaterEqual),
];
const SHIFT: &[(TokenKind, BinaryOperator)] = &[
    (TokenKind::LeftShift, BinaryOperator::LeftShift),
    (TokenKind::RightShift, BinaryOperator::RightShift),
];
const ADDITIVE: &[(TokenKind, BinaryOperator)] = &[
    (TokenKind::Plus, BinaryOperator::Add),
    (TokenKind::Minus, BinaryOperator::Subtract),
];
const MULTIPLICATIVE: &[(TokenKind, BinaryOperator)] = &[
    (TokenKind::Star, BinaryOperator::Multiply),
    (TokenKind::Slash, BinaryOperator::Divide),
    (TokenKind::Backslash, BinaryOperator::IntegerDivide),
    (TokenKind::Mod, BinaryOperator::Modulo),
];
const EXPONENT: &[(TokenKind, BinaryOperator)] = &[(TokenKind::Caret, BinaryOperator::Power)];

impl Parser {
    pub(super) fn expression(&mut self) -> PResult<Expression> {
        let kind = self.kind();
        if matches!(kind, TokenKind::Function | TokenKind::Sub)
            && self.cursor.peek_at(1).kind == TokenKind::LeftParen
        {
            let keyword = self.cursor.advance();
            let kind = if keyword.kind == TokenKind::Sub {
                FunctionKind::Sub
            } else {
                FunctionKind::Function
            };
            return Ok(Expression::Function(self.function_rest(&keyword, kind)));
        }
        self.logical_or()
    }

    /// Left-associative binary level: `next (op next)*`.
    fn binary(
        &mut self,
        operators: &[(TokenKind, BinaryOperator)],
        next: Level,
    ) -> PResult<Expression> {
        let mut left = next(self)?;
        while let Some(&(_, operator)) = operators.iter().find(|(kind, _)| self.check(*kind)) {
            self.cursor.advance();
            let right = next(self)?;
            let span = Span::between(left.span(), right.span());
            left = Expression::Binary(BinaryExpression {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                span,
            });
        }
        Ok(left)
    }

    fn logical_or(&mut self) -> PResult<Expression> {
        self.binary(OR, Self::logical_and)
    }

    fn logical_and(&mut self) -> PResult<Expression> {
        self.binary(AND, Self::logical_not)
    }

    fn logical_not(&mut self) -> PResult<Expression> {
        if let Some(keyword) = self.matches(TokenKind::Not) {
            let operand = self.logical_not()?;
            return Ok(Self::unary(&keyword, UnaryOperator::Not, operand));
        }
        self.relational()
    }

    fn relational(&mut self) -> PResult<Expression> {
        self.binary(RELATIONAL, Self::shift)
    }

    fn shift(&mut self) -> PResult<Expression> {
        self.binary(SHIFT, Self::additive)
    }

    fn additive(&mut self) -> PResult<Expression> {
        self.binary(ADDITIVE, Self::multiplicative)
    }

    fn multiplicative(&mut self) -> PResult<Expression> {
        self.binary(MULTIPLICATIVE, Self::exponent)
    }

    fn exponent(&mut self) -> PResult<Expression> {
        self.binary(EXPONENT, Self::prefix)
    }

    fn prefix(&mut self) -> PResult<Expression> {
        let operator = match self.kind() {
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::Plus => UnaryOperator::Plus,
            _ => return self.postfix(),
        };
        let token = self.cursor.advance();
        let operand = self.prefix()?;
        Ok(Self::unary(&token, operator, operand))
    }

    fn unary(token: &Token, operator: UnaryOperator, operand: Expression) -> Expression {
        let span = Span::between(token.span, operand.span());
        Expression::Unary(UnaryExpression {
            operator,
            operand: Box::new(operand),
            span,
        })
    }

    /// Primary followed by any number of calls, member and index accesses.
    pub(super) fn postfix(&mut self) -> PResult<Expression> {
        let mut expression = self.primary()?;
        loop {
            expression = match self.kind() {
                TokenKind::LeftParen => self.call(expression)?,
                TokenKind::Dot => {
                    self.cursor.advance();
                    let name = self.property_name()?;
                    let span = Span::between(expression.span(), name.span);
                    Expression::DottedGet(DottedGetExpression {
                        object: Box::new(expression),
                        name,
                        span,
                    })
                }
                TokenKind::At => {
                    self.cursor.advance();
                    let name = self.property_name()?;
                    let span = Span::between(expression.span(), name.span);
                    Expression::AttributeGet(DottedGetExpression {
                        object: Box::new(expression),
                        name,
                        span,
                    })
                }
                TokenKind::LeftSquare => {
                    self.cursor.advance();
                    let index = self.expression()?;
                    let close = self.expect(TokenKind::RightSquare, "']'")?;
                    let span = Span::between(expression.span(), close.span);
                    Expression::IndexedGet(IndexedGetExpression {
                        object: Box::new(expression),
                        index: Box::new(index),
                        span,
                    })
                }
                _ => return Ok(expression),
            };
        }
    }

    fn call(&mut self, callee: Expression) -> PResult<Expression> {
        self.cursor.advance();
        let mut arguments = Vec::new();
        self.skip_newlines_and_comments();
        if !self.check(TokenKind::RightParen) {
            loop {
                arguments.push(self.expression()?);
                // Only look past line ends when the list visibly goes on.
                let line_end = self.cursor.check_point();
                self.skip_newlines_and_comments();
                if self.matches(TokenKind::Comma).is_none() {
                    if !self.check(TokenKind::RightParen) {
                        self.cursor.restore(line_end);
                    }
                    break;
                }
                self.skip_newlines_and_comments();
            }
        }
        let close = self.expect(TokenKind::RightParen, "')'")?;
        let span = Span::between(callee.span(), close.span);
        Ok(Expression::Call(CallExpression {
            callee: Box::new(callee),
            arguments,
            span,
        }))
    }

    /// Name after `.` or `@`. Any keyword-shaped token qualifies.
    fn property_name(&mut self) -> PResult<Identifier> {
        let token = self.cursor.peek().clone();
        if keywords::is_allowed_property_name(token.kind) {
            self.cursor.advance();
            return Ok(Identifier::from_token(&token));
        }
        self.fail(
            ParseErrorKind::ExpectedToken {
                expected: "property name",
                found: describe(&token),
            },
            token.span,
        )
    }

    fn primary(&mut self) -> PResult<Expression> {
        let token = self.cursor.peek().clone();
        match token.kind {
            TokenKind::True
            | TokenKind::False
            | TokenKind::Invalid
            | TokenKind::StringLiteral
            | TokenKind::IntegerLiteral
            | TokenKind::LongIntegerLiteral
            | TokenKind::FloatLiteral
            | TokenKind::DoubleLiteral => {
                let Some(value) = token.literal_value() else {
                    return self.unexpected(&token);
                };
                self.cursor.advance();
                Ok(Expression::Literal(LiteralExpression {
                    value,
                    span: token.span,
                }))
            }
            TokenKind::Identifier if token.is_reserved => self.fail(
                ParseErrorKind::ReservedIdentifier { name: token.text },
                token.span,
            ),
            TokenKind::Identifier => {
                self.cursor.advance();
                Ok(Expression::Variable(Identifier::from_token(&token)))
            }
            kind if keywords::is_allowed_local_identifier(kind)
                || keywords::is_builtin_function(kind) =>
            {
                self.cursor.advance();
                Ok(Expression::Variable(Identifier::from_token(&token)))
            }
            TokenKind::LeftParen => {
                self.cursor.advance();
                let inner = self.expression()?;
                let close = self.expect(TokenKind::RightParen, "')'")?;
                Ok(Expression::Grouping(GroupingExpression {
                    expression: Box::new(inner),
                    span: Span::between(token.span, close.span),
                }))
            }
            TokenKind::LeftSquare => self.array_literal(),
            TokenKind::LeftBrace => self.aa_literal(),
            _ => self.unexpected(&token),
        }
    }

    fn unexpected<T>(&mut self, token: &Token) -> PResult<T> {
        self.fail(
            ParseErrorKind::UnexpectedToken {
                found: describe(token),
            },
            token.span,
        )
    }

    fn array_literal(&mut self) -> PResult<Expression> {
        let open = self.cursor.advance();
        let mut elements = Vec::new();
        loop {
            self.skip_newlines_and_comments();
            if self.check(TokenKind::RightSquare) || self.cursor.is_at_end() {
                break;
            }
            elements.push(self.expression()?);
            let separated = self.skip_newlines_and_comments();
            if self.matches(TokenKind::Comma).is_none()
                && !separated
                && !self.check(TokenKind::RightSquare)
            {
                let token = self.cursor.peek().clone();
                return self.fail(
                    ParseErrorKind::ExpectedToken {
                        expected: "',' or ']'",
                        found: describe(&token),
                    },
                    token.span,
                );
            }
        }
        let close = self.expect(TokenKind::RightSquare, "']'")?;
        Ok(Expression::ArrayLiteral(ArrayLiteralExpression {
            elements,
            span: Span::between(open.span, close.span),
        }))
    }

    /// `{ key: value, ... }`. A malformed member is reported and skipped
    /// so the rest of the literal still parses. A literal left open is
    /// cut off before the first line that cannot be a member.
    fn aa_literal(&mut self) -> PResult<Expression> {
        let open = self.cursor.advance();
        let mut elements = Vec::new();
        loop {
            let mut line_end = None;
            while matches!(
                self.kind(),
                TokenKind::Newline | TokenKind::Comma | TokenKind::Colon | TokenKind::Comment
            ) {
                if self.check(TokenKind::Newline) && line_end.is_none() {
                    line_end = Some((self.cursor.check_point(), elements.len()));
                }
                let token = self.cursor.advance();
                if token.kind == TokenKind::Comment {
                    elements.push(AaElement::Comment(Comment {
                        text: token.text,
                        span: token.span,
                    }));
                }
            }
            if self.check(TokenKind::RightBrace) {
                break;
            }
            if self.cursor.is_at_end()
                || (!self.at_aa_member() && (line_end.is_some() || self.at_block_end()))
            {
                // Leave the line break for the enclosing statement.
                if let Some((mark, kept)) = line_end {
                    self.cursor.restore(mark);
                    elements.truncate(kept);
                }
                self.report(
                    ParseErrorKind::UnclosedDelimiter {
                        open: "{",
                        close: "}",
                    },
                    open.span,
                );
                let span = Span::between(open.span, self.cursor.previous().span);
                return Ok(Expression::AaLiteral(AaLiteralExpression { elements, span }));
            }

            match self.aa_member() {
                Ok(member) => elements.push(AaElement::Member(member)),
                Err(Bail) => {
                    self.skip_aa_member();
                    continue;
                }
            }
            if !matches!(
                self.kind(),
                TokenKind::Newline
                    | TokenKind::Comma
                    | TokenKind::Colon
                    | TokenKind::Comment
                    | TokenKind::RightBrace
                    | TokenKind::Eof
            ) {
                let token = self.cursor.peek().clone();
                self.report(
                    ParseErrorKind::ExpectedToken {
                        expected: "',' or '}'",
                        found: describe(&token),
                    },
                    token.span,
                );
                self.skip_aa_member();
            }
        }
        let close = self.cursor.advance();
        Ok(Expression::AaLiteral(AaLiteralExpression {
            elements,
            span: Span::between(open.span, close.span),
        }))
    }

    /// Whether the next tokens read as `key:`.
    fn at_aa_member(&self) -> bool {
        let kind = self.kind();
        (kind == TokenKind::StringLiteral || keywords::is_allowed_property_name(kind))
            && self.cursor.peek_at(1).kind == TokenKind::Colon
    }

    fn aa_member(&mut self) -> PResult<AaMember> {
        let key_token = self.cursor.peek().clone();
        let key = match key_token.kind {
            TokenKind::StringLiteral => match key_token.literal_value() {
                Some(Literal::String(value)) => value,
                _ => key_token.text.clone(),
            },
            kind if keywords::is_allowed_property_name(kind) => key_token.text.clone(),
            _ => {
                return self.fail(
                    ParseErrorKind::ExpectedToken {
                        expected: "object key",
                        found: describe(&key_token),
                    },
                    key_token.span,
                );
            }
        };
        self.cursor.advance();
        self.expect(TokenKind::Colon, "':'")?;
        let value = self.expression()?;
        let span = Span::between(key_token.span, value.span());
        Ok(AaMember {
            key_token,
            key,
            value,
            span,
        })
    }

    /// Skip the rest of a malformed member, up to a separator or the
    /// closing brace at the literal's own nesting level.
    fn skip_aa_member(&mut self) {
        let mut depth = 0_usize;
        loop {
            match self.kind() {
                TokenKind::Eof => break,
                TokenKind::Newline
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Comment
                | TokenKind::RightBrace
                    if depth == 0 =>
                {
                    break;
                }
                TokenKind::LeftParen | TokenKind::LeftSquare | TokenKind::LeftBrace => {
                    depth += 1;
                }
                TokenKind::RightParen | TokenKind::RightSquare | TokenKind::RightBrace => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.cursor.advance();
        }
    }

    /// Parameter list, return type and body after `function`/`sub`.
    /// The name, if any, has already been consumed.
    ///
    /// A malformed signature is reported and the rest of its line skipped;
    /// the body is still parsed so its closing keyword is not orphaned.
    pub(super) fn function_rest(
        &mut self,
        keyword: &Token,
        kind: FunctionKind,
    ) -> FunctionExpression {
        let (parameters, return_type) = match self.signature(kind) {
            Ok(signature) => signature,
            Err(Bail) => {
                while !matches!(
                    self.kind(),
                    TokenKind::Newline | TokenKind::Comment | TokenKind::Eof
                ) {
                    self.cursor.advance();
                }
                (Vec::new(), default_return_type(kind))
            }
        };

        let (closer, terminators, opener_text, expected) = match kind {
            FunctionKind::Function => (
                TokenKind::EndFunction,
                FUNCTION_END,
                "function",
                "end function",
            ),
            FunctionKind::Sub => (TokenKind::EndSub, SUB_END, "sub", "end sub"),
        };
        self.function_depth += 1;
        let body = self.block(terminators);
        self.function_depth -= 1;
        let end = self.close_block(closer, keyword, opener_text, expected);

        FunctionExpression {
            kind,
            parameters,
            return_type,
            body,
            span: Span::between(keyword.span, end),
        }
    }

    fn signature(&mut self, kind: FunctionKind) -> PResult<(Vec<Parameter>, ValueType)> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let mut parameters = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                parameters.push(self.parameter()?);
                if self.matches(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "')'")?;

        let return_type = if self.matches(TokenKind::As).is_some() {
            self.value_type()?
        } else {
            default_return_type(kind)
        };
        self.expect_line_end()?;
        Ok((parameters, return_type))
    }

    fn parameter(&mut self) -> PResult<Parameter> {
        let name = self.local_identifier()?;
        let default_value = if self.matches(TokenKind::Equal).is_some() {
            Some(self.expression()?)
        } else {
            None
        };
        let value_type = if self.matches(TokenKind::As).is_some() {
            self.value_type()?
        } else {
            ValueType::Dynamic
        };
        let span = Span::between(name.span, self.cursor.previous().span);
        Ok(Parameter {
            name,
            default_value,
            value_type,
            span,
        })
    }

    fn value_type(&mut self) -> PResult<ValueType> {
        let token = self.cursor.peek().clone();
        let value_type = match token.kind {
            TokenKind::Boolean => ValueType::Boolean,
            TokenKind::Integer => ValueType::Integer,
            TokenKind::LongInteger => ValueType::LongInteger,
            TokenKind::Float => ValueType::Float,
            TokenKind::Double => ValueType::Double,
            TokenKind::String => ValueType::String,
            TokenKind::Object => ValueType::Object,
            TokenKind::Interface => ValueType::Interface,
            TokenKind::Function => ValueType::Function,
            TokenKind::Dynamic => ValueType::Dynamic,
            TokenKind::Void => ValueType::Void,
            _ => {
                return self.fail(
                    ParseErrorKind::InvalidType {
                        found: describe(&token),
                    },
                    token.span,
                );
            }
        };
        self.cursor.advance();
        Ok(value_type)
    }
}

const fn default_return_type(kind: FunctionKind) -> ValueType {
    match kind {
        FunctionKind::Function => ValueType::Dynamic,
        FunctionKind::Sub => ValueType::Void,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{AaElement, BinaryOperator, Expression, Statement, UnaryOperator, ValueType};
    use crate::lexer::scan;
    use crate::parser::parse;
    use crate::token::Literal;

    fn value_of(input: &str) -> Expression {
        let output = parse(&scan(&format!("x = {input}")).tokens);
        assert!(
            output.diagnostics.is_empty(),
            "unexpected diagnostics: {:?}",
            output.diagnostics
        );
        match output.statements.into_iter().next() {
            Some(Statement::Assignment(assign)) => assign.value,
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let Expression::Binary(sum) = value_of("1 + 2 * 3") else {
            panic!("expected binary");
        };
        assert_eq!(sum.operator, BinaryOperator::Add);
        assert!(matches!(
            *sum.right,
            Expression::Binary(ref product) if product.operator == BinaryOperator::Multiply
        ));
    }

    #[test]
    fn not_binds_looser_than_comparison() {
        let Expression::Unary(not) = value_of("not a = b") else {
            panic!("expected unary");
        };
        assert_eq!(not.operator, UnaryOperator::Not);
        assert!(matches!(*not.operand, Expression::Binary(_)));
    }

    #[test]
    fn exponent_is_left_associative() {
        let Expression::Binary(power) = value_of("2 ^ 3 ^ 2") else {
            panic!("expected binary");
        };
        assert!(matches!(*power.left, Expression::Binary(_)));
        assert!(matches!(*power.right, Expression::Literal(_)));
    }

    #[test]
    fn postfix_chain() {
        let Expression::Call(call) = value_of("m.items[0].name@attr()") else {
            panic!("expected call");
        };
        assert!(matches!(*call.callee, Expression::AttributeGet(_)));
    }

    #[test]
    fn builtin_function_call() {
        let Expression::Call(call) = value_of("CreateObject(\"roArray\", 10, true)") else {
            panic!("expected call");
        };
        assert_eq!(call.arguments.len(), 3);
    }

    #[test]
    fn multi_line_array_literal() {
        let Expression::ArrayLiteral(array) = value_of("[\n  1,\n  2\n  3\n]") else {
            panic!("expected array");
        };
        assert_eq!(array.elements.len(), 3);
        assert_eq!(array.span.end.line, 5);
    }

    #[test]
    fn aa_literal_with_quoted_and_keyword_keys() {
        let Expression::AaLiteral(aa) = value_of("{\"my key\": 1, end: 2, name: \"x\"}") else {
            panic!("expected object literal");
        };
        let members: Vec<_> = aa.members().collect();
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].key, "my key");
        assert_eq!(members[0].key_token.text, "\"my key\"");
        assert_eq!(members[1].key, "end");
    }

    #[test]
    fn aa_literal_keeps_comment_elements() {
        let Expression::AaLiteral(aa) = value_of("{\n  ' first\n  a: 1\n}") else {
            panic!("expected object literal");
        };
        assert!(matches!(&aa.elements[0], AaElement::Comment(c) if c.text == "' first"));
        assert_eq!(aa.members().count(), 1);
    }

    #[test]
    fn malformed_aa_member_is_skipped() {
        let output = parse(&scan("x = {\n  a: ,\n  b: 2\n}\ny = 1").tokens);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.statements.len(), 2);
    }

    #[test]
    fn closing_keyword_is_a_key_inside_its_block() {
        let output = parse(&scan("for i = 1 to 2\n  x = {a: 1, next: 2}\nnext\n").tokens);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let Some(Statement::For(for_loop)) = output.statements.first() else {
            panic!("expected for loop");
        };
        let Statement::Assignment(assign) = &for_loop.body.statements[0] else {
            panic!("expected assignment");
        };
        let Expression::AaLiteral(aa) = &assign.value else {
            panic!("expected object literal");
        };
        assert_eq!(aa.members().count(), 2);
    }

    #[test]
    fn unclosed_aa_literal_at_end_of_input() {
        let output = parse(&scan("x = {a: 1, ' note").tokens);
        assert_eq!(output.diagnostics.len(), 1);
        let Some(Statement::Assignment(assign)) = output.statements.first() else {
            panic!("expected assignment");
        };
        let Expression::AaLiteral(aa) = &assign.value else {
            panic!("expected object literal");
        };
        assert_eq!(aa.elements.len(), 2);
        assert!(matches!(&aa.elements[1], AaElement::Comment(c) if c.text == "' note"));
    }

    #[test]
    fn anonymous_function_with_typed_parameters() {
        let Expression::Function(func) =
            value_of("function(a as integer, b = 2) as string\n  return \"\"\nend function")
        else {
            panic!("expected function");
        };
        assert_eq!(func.parameters.len(), 2);
        assert_eq!(func.parameters[0].value_type, ValueType::Integer);
        assert!(func.parameters[1].default_value.is_some());
        assert_eq!(func.return_type, ValueType::String);
    }

    #[test]
    fn negative_literal() {
        let Expression::Unary(negate) = value_of("-5") else {
            panic!("expected unary");
        };
        assert_eq!(negate.operator, UnaryOperator::Negate);
        assert!(matches!(
            *negate.operand,
            Expression::Literal(ref lit) if lit.value == Literal::Integer(5)
        ));
    }
}
