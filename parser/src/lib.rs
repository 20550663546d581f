pub mod ast;
pub mod expression;
pub mod grid;
pub mod keywords;
pub mod tokens;

use crate::ast::*;
use crate::expression::{parse_expression, ExpressionError};
use crate::keywords::{Keyword, Keywords};
use crate::tokens::{lex_cell, LexError, Lexeme};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::trace;

pub use crate::grid::Grid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("invalid arguments for {command}: {reason}")]
    InvalidArguments { command: &'static str, reason: String },
    #[error("ELSE without a matching IF")]
    ElseWithoutIf,
    #[error("malformed expression: {0}")]
    MalformedExpression(#[from] ExpressionError),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {location}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
}

impl ParseError {
    fn new(kind: ParseErrorKind, location: Location) -> ParseError {
        ParseError { kind, location }
    }
}

type ParseResult<T> = Result<T, ParseError>;

fn invalid_arguments(command: &'static str, reason: &str, location: Location) -> ParseError {
    ParseError::new(ParseErrorKind::InvalidArguments { command, reason: reason.to_owned() }, location)
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("unable to read grid: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub fn parse_grid(grid: &Grid) -> ParseResult<Program> {
    Parser::new().parse(grid)
}

/// Parses a grid stored in the text format, see [`Grid::from_text`].
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Program, FileError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_grid(&Grid::from_text(&text))?)
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    keywords: Keywords,
}

enum BlockHead {
    Loop(Value),
    While(Value),
    If(Value),
}

enum Node {
    Leaf(CommandKind),
    Block(BlockHead),
}

/// An open block: everything indented deeper than `indent` lands in its body.
struct Frame {
    indent: usize,
    location: Location,
    head: BlockHead,
    positive: Commands,
    negative: Option<Commands>,
}

impl Frame {
    fn body_mut(&mut self) -> &mut Commands {
        match &mut self.negative {
            Some(negative) => negative,
            None => &mut self.positive,
        }
    }

    fn accepts_else(&self) -> bool {
        matches!(self.head, BlockHead::If(_)) && self.negative.is_none()
    }

    fn close(self) -> Command {
        let kind = match self.head {
            BlockHead::Loop(count) => CommandKind::Loop { count, body: self.positive },
            BlockHead::While(condition) => CommandKind::While { condition, body: self.positive },
            BlockHead::If(condition) => CommandKind::If {
                condition,
                positive: self.positive,
                negative: self.negative,
            },
        };

        Command::new(kind, self.location)
    }
}

/// Frame stack; the implicit root frame (indent -1) is `roots`.
#[derive(Default)]
struct BlockBuilder {
    roots: Commands,
    frames: Vec<Frame>,
}

impl BlockBuilder {
    fn current_body(&mut self) -> &mut Commands {
        match self.frames.last_mut() {
            Some(frame) => frame.body_mut(),
            None => &mut self.roots,
        }
    }

    fn close_top(&mut self) {
        if let Some(frame) = self.frames.pop() {
            trace!(row = frame.location.row, col = frame.location.col, "closing block");
            let command = frame.close();
            self.current_body().push(command);
        }
    }

    fn close_while<F: Fn(usize) -> bool>(&mut self, predicate: F) {
        while self.frames.last().map_or(false, |frame| predicate(frame.indent)) {
            self.close_top();
        }
    }

    fn push(&mut self, node: Node, location: Location) {
        self.close_while(|indent| indent >= location.col);

        match node {
            Node::Leaf(kind) => self.current_body().push(Command::new(kind, location)),
            Node::Block(head) => {
                trace!(row = location.row, col = location.col, "opening block");
                self.frames.push(Frame {
                    indent: location.col,
                    location,
                    head,
                    positive: vec![],
                    negative: None,
                });
            },
        }
    }

    fn open_else(&mut self, location: Location) -> ParseResult<()> {
        self.close_while(|indent| indent > location.col);

        match self.frames.last_mut() {
            Some(frame) if frame.indent == location.col && frame.accepts_else() => {
                trace!(row = location.row, col = location.col, "switching to ELSE branch");
                frame.negative = Some(vec![]);
                Ok(())
            },
            _ => Err(ParseError::new(ParseErrorKind::ElseWithoutIf, location)),
        }
    }

    fn finish(mut self) -> Commands {
        while !self.frames.is_empty() {
            self.close_top();
        }

        self.roots
    }
}

impl Parser {
    pub fn new() -> Parser {
        Parser::default()
    }

    pub fn with_keywords(keywords: Keywords) -> Parser {
        Parser { keywords }
    }

    pub fn parse(&self, grid: &Grid) -> ParseResult<Program> {
        let mut builder = BlockBuilder::default();

        for (row_idx, row) in grid.rows().iter().enumerate() {
            let indent = match row.iter().position(|cell| !cell.trim().is_empty()) {
                Some(indent) => indent,
                None => continue,
            };
            let location = Location::new(row_idx, indent);
            let lexemes = lex_row(row, location)?;

            let (name, args) = match lexemes.split_first() {
                Some((Lexeme::Word(name), args)) => (name, args),
                Some((other, _)) => return Err(ParseError::new(ParseErrorKind::UnknownCommand(other.to_string()), location)),
                None => continue,
            };
            let keyword = self.keywords.command(name)
                .ok_or_else(|| ParseError::new(ParseErrorKind::UnknownCommand(name.clone()), location))?;

            if keyword == Keyword::Else {
                if !args.is_empty() {
                    return Err(invalid_arguments("ELSE", "ELSE takes no arguments", location));
                }
                builder.open_else(location)?;
                continue;
            }

            let node = self.parse_command(keyword, args, location)?;
            builder.push(node, location);
        }

        Ok(Program { commands: builder.finish() })
    }

    fn expression(&self, lexemes: &[Lexeme], location: Location) -> ParseResult<Value> {
        parse_expression(lexemes, &self.keywords).map_err(|err| ParseError::new(err.into(), location))
    }

    fn required_expression(&self, command: &'static str, what: &str, lexemes: &[Lexeme], location: Location) -> ParseResult<Value> {
        if lexemes.is_empty() {
            return Err(invalid_arguments(command, &format!("{} requires {}", command, what), location));
        }

        self.expression(lexemes, location)
    }

    fn direction(&self, lexeme: &Lexeme) -> Option<Direction> {
        match lexeme {
            Lexeme::Word(word) => match self.keywords.value_word(word) {
                Some(keywords::ValueWord::Direction(direction)) => Some(direction),
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_turn(&self, args: &[Lexeme], location: Location) -> ParseResult<CommandKind> {
        let (direction, rest) = match args.split_first() {
            Some((first, rest)) => match self.direction(first) {
                Some(direction) => (Some(direction), rest),
                None => (None, args),
            },
            None => (None, args),
        };

        let degrees = match (direction, rest.is_empty()) {
            (_, true) => None,
            (None, false) | (Some(Direction::Left), false) | (Some(Direction::Right), false) => {
                Some(self.expression(rest, location)?)
            },
            (Some(_), false) => {
                return Err(invalid_arguments("TURN", "an angle may only follow LEFT or RIGHT", location));
            },
        };

        Ok(CommandKind::Turn { direction, degrees })
    }

    fn parse_set(&self, args: &[Lexeme], location: Location) -> ParseResult<CommandKind> {
        let (target, value) = match args.split_first() {
            Some((Lexeme::Word(name), value)) if !self.keywords.is_reserved(name) => (name, value),
            Some((other, _)) => {
                let reason = format!("`{}` cannot be used as a variable name", other);
                return Err(invalid_arguments("SET", &reason, location));
            },
            None => return Err(invalid_arguments("SET", "SET requires a variable name and a value", location)),
        };

        let value = self.required_expression("SET", "a value", value, location)?;

        Ok(CommandKind::Set { name: target.clone(), value })
    }

    fn parse_command(&self, keyword: Keyword, args: &[Lexeme], location: Location) -> ParseResult<Node> {
        let no_args = |command: &'static str, kind: CommandKind| {
            if args.is_empty() {
                Ok(Node::Leaf(kind))
            } else {
                Err(invalid_arguments(command, &format!("{} takes no arguments", command), location))
            }
        };

        let node = match keyword {
            Keyword::Move => {
                let distance = if args.is_empty() {
                    None
                } else {
                    Some(self.expression(args, location)?)
                };
                Node::Leaf(CommandKind::Move { distance })
            },
            Keyword::Turn => Node::Leaf(self.parse_turn(args, location)?),
            Keyword::Loop => match args.split_first() {
                Some((Lexeme::Word(word), condition)) if self.keywords.command(word) == Some(Keyword::While) => {
                    let condition = self.required_expression("LOOP", "a condition after WHILE", condition, location)?;
                    Node::Block(BlockHead::While(condition))
                },
                _ => Node::Block(BlockHead::Loop(self.required_expression("LOOP", "a count", args, location)?)),
            },
            Keyword::While => Node::Block(BlockHead::While(self.required_expression("WHILE", "a condition", args, location)?)),
            Keyword::If => Node::Block(BlockHead::If(self.required_expression("IF", "a condition", args, location)?)),
            Keyword::Set => Node::Leaf(self.parse_set(args, location)?),
            Keyword::Wait => Node::Leaf(CommandKind::Wait {
                seconds: self.required_expression("WAIT", "a duration in seconds", args, location)?,
            }),
            Keyword::PenDown => no_args("PEN_DOWN", CommandKind::PenDown)?,
            Keyword::PenUp => no_args("PEN_UP", CommandKind::PenUp)?,
            Keyword::AlertOn => no_args("ALERT_ON", CommandKind::AlertOn)?,
            Keyword::AlertOff => no_args("ALERT_OFF", CommandKind::AlertOff)?,
            Keyword::Else => return Err(ParseError::new(ParseErrorKind::ElseWithoutIf, location)),
        };

        Ok(node)
    }
}

/// Lexemes of every non-empty cell from the row's first command onwards.
fn lex_row(row: &[String], location: Location) -> ParseResult<Vec<Lexeme>> {
    let mut lexemes = vec![];

    for (col, cell) in row.iter().enumerate().skip(location.col) {
        lex_cell(cell, &mut lexemes).map_err(|err| {
            let cell_location = Location::new(location.row, col);
            match err {
                LexError::MalformedNumber(text) => {
                    let reason = format!("malformed number `{}`", text);
                    ParseError::new(ParseErrorKind::InvalidArguments { command: "cell", reason }, cell_location)
                },
                LexError::UnexpectedCharacter(c) => {
                    let reason = format!("unexpected character `{}`", c);
                    ParseError::new(ParseErrorKind::InvalidArguments { command: "cell", reason }, cell_location)
                },
            }
        })?;
    }

    Ok(lexemes)
}
