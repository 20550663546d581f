use crate::ast::{Direction, Operator, Sensor};
use lazy_static::lazy_static;
use std::collections::HashMap;
use thiserror::Error;

/// Words that may start a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Move,
    Turn,
    Loop,
    While,
    If,
    Else,
    Set,
    PenDown,
    PenUp,
    Wait,
    AlertOn,
    AlertOff,
}

/// Reserved words that may appear inside an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueWord {
    Boolean(bool),
    Sensor(Sensor),
    Direction(Direction),
    Operator(Operator),
    Not,
}

lazy_static! {
    static ref COMMANDS: HashMap<&'static str, Keyword> = {
        use Keyword::*;
        let mut map = HashMap::new();
        for (name, keyword) in &[
            ("MOVE", Move),
            ("MOV", Move),
            ("TURN", Turn),
            ("LOOP", Loop),
            ("REPEAT", Loop),
            ("FOR", Loop),
            ("WHILE", While),
            ("IF", If),
            ("ELSE", Else),
            ("SET", Set),
            ("ASSIGN", Set),
            ("LET", Set),
            ("PEN_DOWN", PenDown),
            ("PENDOWN", PenDown),
            ("PEN_ON", PenDown),
            ("DOWN", PenDown),
            ("PEN_UP", PenUp),
            ("PENUP", PenUp),
            ("PEN_OFF", PenUp),
            ("UP", PenUp),
            ("WAIT", Wait),
            ("PAUSE", Wait),
            ("SLEEP", Wait),
            ("DELAY", Wait),
            ("ALERT_ON", AlertOn),
            ("ALERT_OFF", AlertOff),
        ] {
            map.insert(*name, *keyword);
        }
        map
    };

    static ref VALUE_WORDS: HashMap<&'static str, ValueWord> = {
        let mut map = HashMap::new();
        for (name, word) in &[
            ("TRUE", ValueWord::Boolean(true)),
            ("FOREVER", ValueWord::Boolean(true)),
            ("FALSE", ValueWord::Boolean(false)),
            ("DISTANCE", ValueWord::Sensor(Sensor::Distance)),
            ("OBSTACLE", ValueWord::Sensor(Sensor::Obstacle)),
            ("BLACK_DETECTED", ValueWord::Sensor(Sensor::BlackDetected)),
            ("BLACK_ON", ValueWord::Sensor(Sensor::BlackDetected)),
            ("BLACK_LOST", ValueWord::Sensor(Sensor::BlackLost)),
            ("BLACK_OFF", ValueWord::Sensor(Sensor::BlackLost)),
            ("FORWARD", ValueWord::Direction(Direction::Forward)),
            ("RIGHT", ValueWord::Direction(Direction::Right)),
            ("BACKWARD", ValueWord::Direction(Direction::Backward)),
            ("LEFT", ValueWord::Direction(Direction::Left)),
            ("AND", ValueWord::Operator(Operator::And)),
            ("OR", ValueWord::Operator(Operator::Or)),
            ("NOT", ValueWord::Not),
        ] {
            map.insert(*name, *word);
        }
        map
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("alias `{alias}` points at unknown keyword `{target}`")]
pub struct UnknownAliasTarget {
    pub alias: String,
    pub target: String,
}

/// Keyword lookup: the built-in table plus user supplied aliases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keywords {
    aliases: HashMap<String, String>,
}

impl Keywords {
    pub fn new() -> Keywords {
        Keywords::default()
    }

    /// Adds `alias` as another spelling of the built-in word `target`.
    pub fn with_alias(mut self, alias: &str, target: &str) -> Result<Keywords, UnknownAliasTarget> {
        let target = target.trim().to_uppercase();
        if !COMMANDS.contains_key(target.as_str()) && !VALUE_WORDS.contains_key(target.as_str()) {
            return Err(UnknownAliasTarget {
                alias: alias.to_owned(),
                target,
            });
        }

        self.aliases.insert(alias.trim().to_uppercase(), target);
        Ok(self)
    }

    fn canonical<'a>(&'a self, word: &'a str) -> &'a str {
        self.aliases.get(word).map(String::as_str).unwrap_or(word)
    }

    /// `word` must already be upper-cased.
    pub fn command(&self, word: &str) -> Option<Keyword> {
        COMMANDS.get(self.canonical(word)).copied()
    }

    /// `word` must already be upper-cased.
    pub fn value_word(&self, word: &str) -> Option<ValueWord> {
        VALUE_WORDS.get(self.canonical(word)).copied()
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.command(word).is_some() || self.value_word(word).is_some()
    }
}
