//! Feeds logos tokens to the generated parser as spanned triples

use logos::{Logos, SpannedIter};

use super::FormulaError;
use super::tokens::Token;

pub(crate) type Spanned<Tok, Loc, Error> = Result<(Loc, Tok, Loc), Error>;

pub(crate) struct Lexer<'input> {
    token_stream: SpannedIter<'input, Token<'input>>,
}

impl<'input> Lexer<'input> {
    pub(crate) fn new(input: &'input str) -> Self {
        Self {
            token_stream: Token::lexer(input).spanned(),
        }
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Spanned<Token<'input>, usize, FormulaError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (token, span) = self.token_stream.next()?;

        Some(match token {
            Ok(token) => Ok((span.start, token, span.end)),
            Err(()) => Err(FormulaError::InvalidToken { offset: span.start }),
        })
    }
}
