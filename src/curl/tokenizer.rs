//! Shell-like splitting of a command line into arguments.
//!
//! Single quotes keep everything literal. Inside double quotes a backslash
//! only escapes `"`, `\`, `$`, `` ` `` and newline; any other backslash is
//! kept. Outside quotes a backslash escapes the next character and
//! backslash-newline (`\n` or `\r\n`) joins lines. An unterminated quote
//! runs to the end of the input.

use tracing::debug;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, opt, preceded, repeat, terminated};
use winnow::error::StrContext;
use winnow::token::{any, take_till};
use winnow::{ModalResult, Parser};

#[derive(Debug, PartialEq, Clone)]
enum Piece<'a> {
    Literal(&'a str),
    Quoted(String),
    Char(char),
    /// A backslash that escaped nothing, kept along with the next character.
    Backslashed(char),
    Continuation,
}

impl Piece<'_> {
    fn push_to(&self, acc: &mut String) {
        match self {
            Piece::Literal(s) => acc.push_str(s),
            Piece::Quoted(s) => acc.push_str(s),
            Piece::Char(c) => acc.push(*c),
            Piece::Backslashed(c) => {
                acc.push('\\');
                acc.push(*c);
            }
            Piece::Continuation => {}
        }
    }

    /// Grow a word. A word made only of line continuations stays `None`,
    /// while an empty quoted string yields `Some("")`.
    fn append(self, word: Option<String>) -> Option<String> {
        if matches!(self, Piece::Continuation) {
            return word;
        }
        let mut word = word.unwrap_or_default();
        self.push_to(&mut word);
        Some(word)
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn parse_single_quoted<'a>(s: &mut &'a str) -> ModalResult<&'a str> {
    delimited('\'', take_till(0.., '\''), opt('\''))
        .context(StrContext::Label("single quoted data"))
        .parse_next(s)
}

fn parse_double_quoted_fragment<'a>(s: &mut &'a str) -> ModalResult<Piece<'a>> {
    alt((
        take_till(1.., ['"', '\\']).map(Piece::Literal),
        preceded(
            '\\',
            alt((
                "\r\n".value(Piece::Continuation),
                opt(any).map(|c: Option<char>| match c {
                    Some(c @ ('"' | '\\' | '$' | '`')) => Piece::Char(c),
                    Some('\n') => Piece::Continuation,
                    Some(c) => Piece::Backslashed(c),
                    None => Piece::Char('\\'),
                }),
            )),
        ),
    ))
    .parse_next(s)
}

fn parse_double_quoted(s: &mut &str) -> ModalResult<String> {
    delimited(
        '"',
        repeat(0.., parse_double_quoted_fragment).fold(String::new, |mut acc: String, piece: Piece<'_>| {
            piece.push_to(&mut acc);
            acc
        }),
        opt('"'),
    )
    .context(StrContext::Label("double quoted data"))
    .parse_next(s)
}

fn parse_escaped<'a>(s: &mut &'a str) -> ModalResult<Piece<'a>> {
    preceded(
        '\\',
        alt((
            "\r\n".value(Piece::Continuation),
            opt(any).map(|c: Option<char>| match c {
                Some('\n') => Piece::Continuation,
                Some(c) => Piece::Char(c),
                None => Piece::Char('\\'),
            }),
        )),
    )
    .parse_next(s)
}

fn parse_bare<'a>(s: &mut &'a str) -> ModalResult<&'a str> {
    take_till(1.., |c: char| is_separator(c) || matches!(c, '\'' | '"' | '\\')).parse_next(s)
}

fn parse_piece<'a>(s: &mut &'a str) -> ModalResult<Piece<'a>> {
    alt((
        parse_single_quoted.map(|q: &str| Piece::Quoted(q.to_string())),
        parse_double_quoted.map(Piece::Quoted),
        parse_escaped,
        parse_bare.map(Piece::Literal),
    ))
    .parse_next(s)
}

fn parse_word(s: &mut &str) -> ModalResult<Option<String>> {
    repeat(1.., parse_piece)
        .fold(|| None, |word: Option<String>, piece: Piece<'_>| piece.append(word))
        .parse_next(s)
}

fn parse_words(s: &mut &str) -> ModalResult<Vec<String>> {
    preceded(multispace0, repeat(0.., terminated(parse_word, multispace0)))
        .map(|words: Vec<Option<String>>| words.into_iter().flatten().collect())
        .parse_next(s)
}

/// Split `input` into arguments. Empty input yields no arguments.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut s = input;
    match parse_words(&mut s) {
        Ok(tokens) => {
            if !s.is_empty() {
                debug!(rest = %s, "tokenizer stopped before the end of input");
            }
            tokens
        }
        Err(e) => {
            debug!(error = ?e, "tokenizer failed");
            Vec::new()
        }
    }
}
