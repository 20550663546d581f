use crate::ast::{Operator, Value};
use crate::keywords::{Keywords, ValueWord};
use crate::tokens::Lexeme;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("expected a value")]
    MissingOperand,
    #[error("operator `{0}` is not followed by a value")]
    DanglingOperator(String),
    #[error("operator `{0}` where a value was expected")]
    UnexpectedOperator(String),
    #[error("expected an operator before `{0}`")]
    MissingOperator(String),
    #[error("command `{0}` cannot be used as a value")]
    CommandAsValue(String),
}

type ExprResult<'a> = Result<(Value, &'a [Lexeme]), ExpressionError>;

/// Folds lexemes into a single value, strictly left to right.
///
/// Grammar: `[NOT] operand (operator operand)*`. There is no precedence:
/// `1 + 2 * 3` is `(1 + 2) * 3`. A `NOT` in operand position negates the
/// whole remainder of the chain.
pub fn parse_expression(lexemes: &[Lexeme], keywords: &Keywords) -> Result<Value, ExpressionError> {
    let (value, rest) = parse_chain(lexemes, keywords)?;
    debug_assert!(rest.is_empty());
    Ok(value)
}

fn parse_chain<'a>(lexemes: &'a [Lexeme], keywords: &Keywords) -> ExprResult<'a> {
    let (mut acc, mut rest) = parse_operand(lexemes, keywords)?;

    while let Some((first, tail)) = rest.split_first() {
        let op = match as_operator(first, keywords) {
            Some(op) => op,
            None => return Err(ExpressionError::MissingOperator(first.to_string())),
        };

        if tail.is_empty() {
            return Err(ExpressionError::DanglingOperator(op.symbol().to_owned()));
        }

        let (right, remaining) = parse_operand(tail, keywords)?;
        acc = Value::binary(op, acc, right);
        rest = remaining;
    }

    Ok((acc, rest))
}

fn as_operator(lexeme: &Lexeme, keywords: &Keywords) -> Option<Operator> {
    match lexeme {
        Lexeme::Operator(op) => Some(*op),
        Lexeme::Word(word) => match keywords.value_word(word) {
            Some(ValueWord::Operator(op)) => Some(op),
            _ => None,
        },
        Lexeme::Number(_) => None,
    }
}

fn parse_operand<'a>(lexemes: &'a [Lexeme], keywords: &Keywords) -> ExprResult<'a> {
    let (first, rest) = lexemes.split_first().ok_or(ExpressionError::MissingOperand)?;

    match first {
        Lexeme::Number(num) => Ok((Value::Number(*num), rest)),
        Lexeme::Operator(Operator::Minus) => match rest.split_first() {
            Some((Lexeme::Number(num), rest)) => Ok((Value::Number(-num), rest)),
            Some(_) => Err(ExpressionError::UnexpectedOperator(String::from("-"))),
            None => Err(ExpressionError::DanglingOperator(String::from("-"))),
        },
        Lexeme::Operator(op) => Err(ExpressionError::UnexpectedOperator(op.symbol().to_owned())),
        Lexeme::Word(word) => match keywords.value_word(word) {
            Some(ValueWord::Boolean(b)) => Ok((Value::Boolean(b), rest)),
            Some(ValueWord::Sensor(sensor)) => Ok((Value::Sensor(sensor), rest)),
            Some(ValueWord::Direction(direction)) => Ok((Value::Direction(direction), rest)),
            Some(ValueWord::Operator(op)) => Err(ExpressionError::UnexpectedOperator(op.symbol().to_owned())),
            Some(ValueWord::Not) => {
                if rest.is_empty() {
                    return Err(ExpressionError::DanglingOperator(String::from("NOT")));
                }
                let (negated, remaining) = parse_chain(rest, keywords)?;
                Ok((Value::not(negated), remaining))
            },
            None if keywords.command(word).is_some() => Err(ExpressionError::CommandAsValue(word.clone())),
            None => Ok((Value::Variable(word.clone()), rest)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Direction, Sensor};
    use crate::tokens::lex_cell;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<Value, ExpressionError> {
        let mut lexemes = vec![];
        lex_cell(text, &mut lexemes).expect("lexing failed");
        parse_expression(&lexemes, &Keywords::new())
    }

    #[test]
    fn single_operands() {
        assert_eq!(parse("42"), Ok(Value::Number(42.0)));
        assert_eq!(parse("-4"), Ok(Value::Number(-4.0)));
        assert_eq!(parse("true"), Ok(Value::Boolean(true)));
        assert_eq!(parse("obstacle"), Ok(Value::Sensor(Sensor::Obstacle)));
        assert_eq!(parse("left"), Ok(Value::Direction(Direction::Left)));
        assert_eq!(parse("speed"), Ok(Value::Variable(String::from("SPEED"))));
    }

    #[test]
    fn left_associative_without_precedence() {
        let expected = Value::binary(
            Operator::Times,
            Value::binary(Operator::Plus, Value::Number(1.0), Value::Number(2.0)),
            Value::Number(3.0),
        );
        assert_eq!(parse("1|+|2|*|3"), Ok(expected));
    }

    #[test]
    fn logical_chain() {
        let expected = Value::binary(
            Operator::And,
            Value::binary(Operator::Greater, Value::variable("x"), Value::Number(5.0)),
            Value::Sensor(Sensor::BlackDetected),
        );
        assert_eq!(parse("X|>|5|AND|BLACK_DETECTED"), Ok(expected));
    }

    #[test]
    fn leading_not_covers_remainder() {
        let expected = Value::not(Value::binary(
            Operator::Or,
            Value::Sensor(Sensor::Obstacle),
            Value::Variable(String::from("DONE")),
        ));
        assert_eq!(parse("NOT|OBSTACLE|OR|DONE"), Ok(expected));
    }

    #[test]
    fn not_after_operator() {
        let expected = Value::binary(
            Operator::And,
            Value::Boolean(true),
            Value::not(Value::Sensor(Sensor::Obstacle)),
        );
        assert_eq!(parse("TRUE|AND|NOT|OBSTACLE"), Ok(expected));
    }

    #[test]
    fn subtracting_negative_literal() {
        let expected = Value::binary(Operator::Minus, Value::variable("x"), Value::Number(-3.0));
        assert_eq!(parse("X|-|-3"), Ok(expected));
    }

    #[test]
    fn dangling_operator() {
        assert_eq!(parse("X|+"), Err(ExpressionError::DanglingOperator(String::from("+"))));
        assert_eq!(parse("NOT"), Err(ExpressionError::DanglingOperator(String::from("NOT"))));
    }

    #[test]
    fn adjacent_operands() {
        assert_eq!(parse("X|5"), Err(ExpressionError::MissingOperator(String::from("5"))));
    }

    #[test]
    fn leading_operator() {
        assert_eq!(parse("*|5"), Err(ExpressionError::UnexpectedOperator(String::from("*"))));
        assert_eq!(parse("AND|X"), Err(ExpressionError::UnexpectedOperator(String::from("AND"))));
    }

    #[test]
    fn command_is_not_a_value() {
        assert_eq!(parse("X|+|MOVE"), Err(ExpressionError::CommandAsValue(String::from("MOVE"))));
    }
}
