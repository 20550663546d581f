use crate::ast::Operator;
use pest::error::LineColLocation;
use pest::Parser;
use pest_derive::Parser;
use std::fmt::{self, Display, Formatter};

#[derive(Parser)]
#[grammar = "cell.pest"]
struct CellParser;

/// Separator between the command and its arguments inside one cell.
pub const DELIMITER: char = '|';

#[derive(Debug, Clone, PartialEq)]
pub enum Lexeme {
    Number(f64),
    /// Upper-cased identifier or reserved word.
    Word(String),
    Operator(Operator),
}

impl Display for Lexeme {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Lexeme::Number(num) => write!(f, "{}", num),
            Lexeme::Word(word) => write!(f, "{}", word),
            Lexeme::Operator(op) => write!(f, "{}", op.symbol()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    MalformedNumber(String),
    UnexpectedCharacter(char),
}

fn operator(text: &str) -> Option<Operator> {
    let op = match text {
        "+" => Operator::Plus,
        "-" => Operator::Minus,
        "*" => Operator::Times,
        "/" => Operator::Div,
        "<" => Operator::Less,
        "<=" => Operator::LessEq,
        ">" => Operator::Greater,
        ">=" => Operator::GreaterEq,
        "=" | "==" => Operator::Eq,
        "!=" => Operator::NotEq,
        _ => return None,
    };

    Some(op)
}

fn lex_part(text: &str, lexemes: &mut Vec<Lexeme>) -> Result<(), LexError> {
    let pairs = CellParser::parse(Rule::part, text).map_err(|err| {
        let col = match err.line_col {
            LineColLocation::Pos((_, col)) => col,
            LineColLocation::Span((_, col), _) => col,
        };
        let unexpected = text.chars().nth(col.saturating_sub(1)).unwrap_or(DELIMITER);
        LexError::UnexpectedCharacter(unexpected)
    })?;

    for pair in pairs.flatten() {
        match pair.as_rule() {
            Rule::number => {
                let num = pair.as_str().parse().map_err(|_| LexError::MalformedNumber(pair.as_str().to_owned()))?;
                lexemes.push(Lexeme::Number(num));
            },
            Rule::malformed_number => return Err(LexError::MalformedNumber(pair.as_str().to_owned())),
            Rule::word => lexemes.push(Lexeme::Word(pair.as_str().to_uppercase())),
            Rule::operator => {
                let op = operator(pair.as_str()).ok_or(LexError::UnexpectedCharacter(DELIMITER))?;
                lexemes.push(Lexeme::Operator(op));
            },
            _ => {},
        }
    }

    Ok(())
}

/// Splits a cell on [`DELIMITER`] and lexes every part, appending to `lexemes`.
pub fn lex_cell(cell: &str, lexemes: &mut Vec<Lexeme>) -> Result<(), LexError> {
    cell.split(DELIMITER)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .try_for_each(|part| lex_part(part, lexemes))
}
