//! Entry point into the generated formula grammar

use lalrpop_util::ParseError;

use super::FormulaError;
use super::ast::Expr;
use super::grammar;
use super::lexer::Lexer;
use super::tokens::Token;

pub(crate) fn parse(input: &str) -> Result<Expr, FormulaError> {
    grammar::FormulaParser::new()
        .parse(Lexer::new(input))
        .map(|node| node.expr)
        .map_err(from_lalrpop)
}

fn from_lalrpop(error: ParseError<usize, Token<'_>, FormulaError>) -> FormulaError {
    match error {
        ParseError::InvalidToken { location } => FormulaError::InvalidToken { offset: location },
        ParseError::UnrecognizedEof { .. } => FormulaError::UnexpectedEnd,
        ParseError::UnrecognizedToken { token: (start, _, _), .. } | ParseError::ExtraToken { token: (start, _, _) } => {
            FormulaError::UnexpectedToken { offset: start }
        }
        ParseError::User { error } => error,
    }
}
