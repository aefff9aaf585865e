//! Statement productions.

use super::{LocalName, PResult, ParseErrorKind, Parser, describe};
use crate::ast::{
    AssignOperator, AssignmentStatement, Block, DimStatement, DottedSetStatement, ElseIf,
    ExitStatement, Expression, ExpressionStatement, ForEachStatement, ForStatement,
    FunctionKind, FunctionStatement, GotoStatement, Identifier, IfStatement, IncrementOperator,
    IncrementStatement, IndexedSetStatement, LabelStatement, LoopKind, PrintItem,
    PrintStatement, ReturnStatement, Statement, WhileStatement,
};
use crate::token::{Span, Token, TokenKind};

const IF_BRANCH_END: &[TokenKind] = &[TokenKind::ElseIf, TokenKind::Else, TokenKind::EndIf];
const ELSE_BRANCH_END: &[TokenKind] = &[TokenKind::EndIf];
const WHILE_END: &[TokenKind] = &[TokenKind::EndWhile];
const FOR_END: &[TokenKind] = &[TokenKind::Next, TokenKind::EndFor];
pub(super) const FUNCTION_END: &[TokenKind] = &[TokenKind::EndFunction];
pub(super) const SUB_END: &[TokenKind] = &[TokenKind::EndSub];

impl Parser {
    pub(super) fn statement(&mut self) -> PResult<Statement> {
        let token = self.cursor.peek().clone();
        let next = self.cursor.peek_at(1).kind;

        if next.is_assignment_operator() || matches!(next, TokenKind::PlusPlus | TokenKind::MinusMinus)
        {
            match Self::local_name(&token) {
                LocalName::Allowed => return self.local_assignment(),
                LocalName::Reserved => {
                    return self.fail(
                        ParseErrorKind::ReservedIdentifier { name: token.text },
                        token.span,
                    );
                }
                LocalName::NotAName => {}
            }
        }

        match token.kind {
            TokenKind::Identifier if next == TokenKind::Colon => self.label(),
            TokenKind::Print | TokenKind::Question => self.print_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::ForEach => {
                let keyword = self.cursor.advance();
                self.for_each_rest(&keyword)
            }
            TokenKind::ExitWhile => {
                self.cursor.advance();
                Ok(Self::exit(LoopKind::While, token.span))
            }
            TokenKind::ExitFor => {
                self.cursor.advance();
                Ok(Self::exit(LoopKind::For, token.span))
            }
            TokenKind::Exit => self.split_exit(),
            TokenKind::Function | TokenKind::Sub if next != TokenKind::LeftParen => {
                self.function_declaration()
            }
            TokenKind::Return => self.return_statement(),
            TokenKind::Goto => self.goto_statement(),
            TokenKind::Dim => self.dim_statement(),
            TokenKind::End => {
                self.cursor.advance();
                Ok(Statement::End(token.span))
            }
            TokenKind::Stop => {
                self.cursor.advance();
                Ok(Statement::Stop(token.span))
            }
            kind if crate::keywords::is_always_reserved(kind)
                && !matches!(kind, TokenKind::Function | TokenKind::Sub | TokenKind::Not) =>
            {
                self.fail(
                    ParseErrorKind::UnexpectedToken {
                        found: describe(&token),
                    },
                    token.span,
                )
            }
            _ => self.expression_statement(),
        }
    }

    /// `name = value`, `name += value`, `name++`
    fn local_assignment(&mut self) -> PResult<Statement> {
        let name_token = self.cursor.advance();
        let name = Identifier::from_token(&name_token);
        let operator_token = self.cursor.advance();

        if let Some(operator) = increment_operator(operator_token.kind) {
            return Ok(Statement::Increment(IncrementStatement {
                target: Expression::Variable(name),
                operator,
                span: Span::between(name_token.span, operator_token.span),
            }));
        }

        let operator = assign_operator(operator_token.kind);
        let value = self.expression()?;
        let span = Span::between(name_token.span, value.span());
        Ok(Statement::Assignment(AssignmentStatement {
            name,
            operator,
            value,
            span,
        }))
    }

    /// Expression in statement position: a call, or the target of a
    /// dotted/indexed assignment or increment.
    fn expression_statement(&mut self) -> PResult<Statement> {
        let target = self.postfix()?;

        if self.kind().is_assignment_operator() {
            let operator = assign_operator(self.cursor.advance().kind);
            let value = self.expression()?;
            let span = Span::between(target.span(), value.span());
            return match target {
                Expression::DottedGet(get) => Ok(Statement::DottedSet(DottedSetStatement {
                    object: *get.object,
                    name: get.name,
                    operator,
                    value,
                    span,
                })),
                Expression::IndexedGet(get) => Ok(Statement::IndexedSet(IndexedSetStatement {
                    object: *get.object,
                    index: *get.index,
                    operator,
                    value,
                    span,
                })),
                Expression::Variable(name) => Ok(Statement::Assignment(AssignmentStatement {
                    name,
                    operator,
                    value,
                    span,
                })),
                other => self.fail(ParseErrorKind::InvalidAssignmentTarget, other.span()),
            };
        }

        if let Some(operator) = increment_operator(self.kind()) {
            let operator_token = self.cursor.advance();
            return match target {
                Expression::DottedGet(_) | Expression::IndexedGet(_) | Expression::Variable(_) => {
                    let span = Span::between(target.span(), operator_token.span);
                    Ok(Statement::Increment(IncrementStatement {
                        target,
                        operator,
                        span,
                    }))
                }
                other => self.fail(ParseErrorKind::InvalidAssignmentTarget, other.span()),
            };
        }

        match target {
            Expression::Call(_) => {
                let span = target.span();
                Ok(Statement::Expression(ExpressionStatement {
                    expression: target,
                    span,
                }))
            }
            other => self.fail(ParseErrorKind::ExpectedStatement, other.span()),
        }
    }

    /// `name:`. The caller has already seen the colon.
    fn label(&mut self) -> PResult<Statement> {
        let name_token = self.cursor.advance();
        let colon = self.cursor.advance();
        Ok(Statement::Label(LabelStatement {
            name: Identifier::from_token(&name_token),
            span: Span::between(name_token.span, colon.span),
        }))
    }

    fn print_statement(&mut self) -> PResult<Statement> {
        let keyword = self.cursor.advance();
        let mut items = Vec::new();
        let mut last = keyword.span;

        loop {
            match self.kind() {
                TokenKind::Newline
                | TokenKind::Colon
                | TokenKind::Eof
                | TokenKind::Comment
                | TokenKind::Else
                | TokenKind::ElseIf => break,
                _ if self.at_block_end() => break,
                TokenKind::Semicolon => {
                    last = self.cursor.advance().span;
                    items.push(PrintItem::Semicolon(last));
                }
                TokenKind::Comma => {
                    last = self.cursor.advance().span;
                    items.push(PrintItem::Comma(last));
                }
                _ => {
                    let expression = self.expression()?;
                    last = expression.span();
                    items.push(PrintItem::Expression(expression));
                }
            }
        }

        Ok(Statement::Print(PrintStatement {
            items,
            span: Span::between(keyword.span, last),
        }))
    }

    fn if_statement(&mut self) -> PResult<Statement> {
        let keyword = self.cursor.advance();
        let condition = self.expression()?;
        self.matches(TokenKind::Then);

        if matches!(
            self.kind(),
            TokenKind::Newline | TokenKind::Comment | TokenKind::Eof
        ) {
            self.block_if(&keyword, condition)
        } else {
            self.inline_if(&keyword, condition)
        }
    }

    fn block_if(&mut self, keyword: &Token, condition: Expression) -> PResult<Statement> {
        let then_branch = self.block(IF_BRANCH_END);
        let mut else_ifs = Vec::new();
        let mut else_branch = None;

        loop {
            if let Some(start) = self.else_if_keyword() {
                let condition = self.expression()?;
                self.matches(TokenKind::Then);
                self.expect_line_end()?;
                let then_branch = self.block(IF_BRANCH_END);
                let end = self.cursor.previous().span;
                else_ifs.push(ElseIf {
                    condition,
                    then_branch,
                    span: Span::between(start, end),
                });
            } else if self.matches(TokenKind::Else).is_some() {
                else_branch = Some(self.block(ELSE_BRANCH_END));
                break;
            } else {
                break;
            }
        }

        let end = self.close_block(TokenKind::EndIf, keyword, "if", "end if");
        Ok(Statement::If(IfStatement {
            condition,
            then_branch,
            else_ifs,
            else_branch,
            is_inline: false,
            span: Span::between(keyword.span, end),
        }))
    }

    fn inline_if(&mut self, keyword: &Token, condition: Expression) -> PResult<Statement> {
        let then_branch = self.inline_block()?;
        let mut else_ifs = Vec::new();
        let mut else_branch = None;

        loop {
            if let Some(start) = self.else_if_keyword() {
                let condition = self.expression()?;
                self.matches(TokenKind::Then);
                let then_branch = self.inline_block()?;
                let end = self.cursor.previous().span;
                else_ifs.push(ElseIf {
                    condition,
                    then_branch,
                    span: Span::between(start, end),
                });
            } else if self.matches(TokenKind::Else).is_some() {
                else_branch = Some(self.inline_block()?);
                break;
            } else {
                break;
            }
        }

        let end = self.cursor.previous().span;
        Ok(Statement::If(IfStatement {
            condition,
            then_branch,
            else_ifs,
            else_branch,
            is_inline: true,
            span: Span::between(keyword.span, end),
        }))
    }

    /// Consume `else if` (merged or as two tokens), returning its start.
    fn else_if_keyword(&mut self) -> Option<Span> {
        if self.check(TokenKind::ElseIf) {
            return Some(self.cursor.advance().span);
        }
        if self.check(TokenKind::Else) && self.cursor.peek_at(1).kind == TokenKind::If {
            let start = self.cursor.advance().span;
            self.cursor.advance();
            return Some(start);
        }
        None
    }

    /// `:`-separated statements up to the end of the line or an `else`.
    fn inline_block(&mut self) -> PResult<Block> {
        let start = self.cursor.peek().span;
        let mut statements: Vec<Statement> = Vec::new();
        loop {
            match self.kind() {
                TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::Comment
                | TokenKind::Else
                | TokenKind::ElseIf => break,
                TokenKind::Colon => {
                    self.cursor.advance();
                    continue;
                }
                _ => {}
            }
            statements.push(self.statement()?);
            match self.kind() {
                TokenKind::Colon
                | TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::Comment
                | TokenKind::Else
                | TokenKind::ElseIf => {}
                _ => {
                    let token = self.cursor.peek().clone();
                    return self.fail(
                        ParseErrorKind::ExpectedStatementEnd {
                            found: describe(&token),
                        },
                        token.span,
                    );
                }
            }
        }

        let span = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => Span::between(first.span(), last.span()),
            _ => Span::empty(start.start),
        };
        Ok(Block { statements, span })
    }

    fn while_statement(&mut self) -> PResult<Statement> {
        let keyword = self.cursor.advance();
        let condition = self.expression()?;
        self.expect_line_end()?;
        let body = self.block(WHILE_END);
        let end = self.close_block(TokenKind::EndWhile, &keyword, "while", "end while");
        Ok(Statement::While(WhileStatement {
            condition,
            body,
            span: Span::between(keyword.span, end),
        }))
    }

    fn for_statement(&mut self) -> PResult<Statement> {
        let keyword = self.cursor.advance();

        let each = self.cursor.peek();
        if each.kind == TokenKind::Identifier && each.text.eq_ignore_ascii_case("each") {
            self.cursor.advance();
            return self.for_each_rest(&keyword);
        }

        let counter = self.local_identifier()?;
        self.expect(TokenKind::Equal, "'='")?;
        let start = self.expression()?;
        self.expect(TokenKind::To, "'to'")?;
        let end = self.expression()?;
        let step = if self.matches(TokenKind::Step).is_some() {
            Some(self.expression()?)
        } else {
            None
        };
        self.expect_line_end()?;

        let body = self.block(FOR_END);
        let close = self.close_loop(&keyword);
        Ok(Statement::For(ForStatement {
            counter,
            start,
            end,
            step,
            body,
            span: Span::between(keyword.span, close),
        }))
    }

    fn for_each_rest(&mut self, keyword: &Token) -> PResult<Statement> {
        let item = self.local_identifier()?;
        self.expect(TokenKind::In, "'in'")?;
        let target = self.expression()?;
        self.expect_line_end()?;

        let body = self.block(FOR_END);
        let close = self.close_loop(keyword);
        Ok(Statement::ForEach(ForEachStatement {
            item,
            target,
            body,
            span: Span::between(keyword.span, close),
        }))
    }

    /// `next [counter]` or `end for`.
    fn close_loop(&mut self, keyword: &Token) -> Span {
        if let Some(next) = self.matches(TokenKind::Next) {
            if self.check(TokenKind::Identifier) {
                return self.cursor.advance().span;
            }
            return next.span;
        }
        self.close_block(TokenKind::EndFor, keyword, "for", "end for")
    }

    const fn exit(loop_kind: LoopKind, span: Span) -> Statement {
        Statement::Exit(ExitStatement { loop_kind, span })
    }

    /// `exit` followed by a separate `while` or `for` token.
    fn split_exit(&mut self) -> PResult<Statement> {
        let keyword = self.cursor.advance();
        let loop_kind = match self.kind() {
            TokenKind::While => LoopKind::While,
            TokenKind::For => LoopKind::For,
            _ => {
                let token = self.cursor.peek().clone();
                return self.fail(
                    ParseErrorKind::ExpectedToken {
                        expected: "'while' or 'for' after 'exit'",
                        found: describe(&token),
                    },
                    token.span,
                );
            }
        };
        let end = self.cursor.advance().span;
        Ok(Self::exit(loop_kind, Span::between(keyword.span, end)))
    }

    fn function_declaration(&mut self) -> PResult<Statement> {
        let keyword = self.cursor.advance();
        let kind = if keyword.kind == TokenKind::Sub {
            FunctionKind::Sub
        } else {
            FunctionKind::Function
        };
        let name = self.local_identifier()?;
        if self.function_depth > 0 {
            self.report(
                ParseErrorKind::NestedFunction {
                    name: name.name.clone(),
                },
                name.span,
            );
        }
        let func = self.function_rest(&keyword, kind);
        let span = func.span;
        Ok(Statement::Function(FunctionStatement { name, func, span }))
    }

    fn return_statement(&mut self) -> PResult<Statement> {
        let keyword = self.cursor.advance();
        let value = if self.at_statement_end() {
            None
        } else {
            Some(self.expression()?)
        };
        let end = value.as_ref().map_or(keyword.span, Expression::span);
        Ok(Statement::Return(ReturnStatement {
            value,
            span: Span::between(keyword.span, end),
        }))
    }

    fn goto_statement(&mut self) -> PResult<Statement> {
        let keyword = self.cursor.advance();
        let label = self.local_identifier()?;
        let span = Span::between(keyword.span, label.span);
        Ok(Statement::Goto(GotoStatement { label, span }))
    }

    fn dim_statement(&mut self) -> PResult<Statement> {
        let keyword = self.cursor.advance();
        let name = self.local_identifier()?;
        self.expect(TokenKind::LeftSquare, "'['")?;
        let mut dimensions = vec![self.expression()?];
        while self.matches(TokenKind::Comma).is_some() {
            dimensions.push(self.expression()?);
        }
        let close = self.expect(TokenKind::RightSquare, "']'")?;
        Ok(Statement::Dim(DimStatement {
            name,
            dimensions,
            span: Span::between(keyword.span, close.span),
        }))
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Newline
                | TokenKind::Colon
                | TokenKind::Eof
                | TokenKind::Comment
                | TokenKind::Else
                | TokenKind::ElseIf
        ) || self.at_block_end()
    }
}

const fn assign_operator(kind: TokenKind) -> AssignOperator {
    match kind {
        TokenKind::PlusEqual => AssignOperator::Add,
        TokenKind::MinusEqual => AssignOperator::Subtract,
        TokenKind::StarEqual => AssignOperator::Multiply,
        TokenKind::SlashEqual => AssignOperator::Divide,
        TokenKind::BackslashEqual => AssignOperator::IntegerDivide,
        TokenKind::LeftShiftEqual => AssignOperator::LeftShift,
        TokenKind::RightShiftEqual => AssignOperator::RightShift,
        _ => AssignOperator::Assign,
    }
}

const fn increment_operator(kind: TokenKind) -> Option<IncrementOperator> {
    match kind {
        TokenKind::PlusPlus => Some(IncrementOperator::Increment),
        TokenKind::MinusMinus => Some(IncrementOperator::Decrement),
        _ => None,
    }
}
