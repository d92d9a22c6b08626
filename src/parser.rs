//! This module provides the parser for transition tables, utilizing the `pest` crate.
//! The grammar in `table.pest` splits each line into header or transition structure; the
//! functions here count, convert and validate that structure into a [`TransitionTable`].

use crate::{
    error::{HeaderError, SemanticError, SourceLine, SyntaxError, TableError},
    table::TransitionTable,
    types::{
        Action, Direction, State, Symbol, Transition, TransitionKey, COMMENT_MARKER, MAX_STATES,
        MAX_TAPES,
    },
};
use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Derives a `PestParser` for the line grammar defined in `table.pest`.
#[derive(PestParser)]
#[grammar = "table.pest"]
pub struct TableParser;

const HEADER_KEYS: [&str; 3] = ["tapes", "states", "alphabet"];

/// Parses table-definition text into a validated [`TransitionTable`].
///
/// This is the main entry point for reading machine definitions. Parsing is
/// all-or-nothing: the first header, syntax or semantic problem aborts with an error that
/// carries the offending line.
///
/// # Arguments
///
/// * `input` - The full text of a table definition.
///
/// # Returns
///
/// * `Ok(TransitionTable)` if every line is valid.
/// * `Err(TableError::Header)` for a missing, unknown, duplicate or malformed header.
/// * `Err(TableError::TransitionSyntax)` for a transition line with the wrong shape.
/// * `Err(TableError::TransitionSemantic)` for a well-formed line that contradicts the
///   header or repeats an earlier `(state, read-tuple)` key.
pub fn parse(input: &str) -> Result<TransitionTable, TableError> {
    match parse_table(input) {
        Ok(table) => {
            let alphabet: String = table.alphabet().iter().collect();
            tracing::debug!(
                tapes = table.tapes(),
                states = table.states(),
                alphabet = %alphabet,
                transitions = table.len(),
                "Parsed transition table"
            );
            Ok(table)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected transition table");
            Err(e)
        }
    }
}

impl FromStr for TransitionTable {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// A non-empty line with its comment removed, remembering where it came from.
struct Line<'a> {
    number: usize,
    raw: &'a str,
    content: &'a str,
}

impl Line<'_> {
    fn source(&self) -> SourceLine {
        SourceLine::new(self.number, self.raw)
    }
}

struct Header {
    tapes: usize,
    states: usize,
    alphabet: BTreeSet<Symbol>,
}

fn parse_table(input: &str) -> Result<TransitionTable, TableError> {
    let lines = significant_lines(input);
    let (Header { tapes, states, alphabet }, body) = parse_header(&lines)?;

    let mut table = TransitionTable::new(tapes, states, alphabet);
    for line in body {
        if let Some((key, _)) = header_pair(line.content) {
            if is_header_key(key) {
                return Err(header_error(HeaderError::Misplaced(key.into()), Some(line)));
            }
        }

        let (key, transition) = parse_transition(line, tapes, states)?;
        table
            .insert(key, transition)
            .map_err(|kind| semantic_error(kind, line))?;
    }

    Ok(table)
}

/// Strips comments and drops lines left empty.
fn significant_lines(input: &str) -> Vec<Line<'_>> {
    input
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let content = raw
                .split_once(COMMENT_MARKER)
                .map_or(raw, |(before, _)| before)
                .trim();

            (!content.is_empty()).then_some(Line {
                number: i + 1,
                raw: raw.trim_end(),
                content,
            })
        })
        .collect()
}

/// Parses the leading `key: value` block and returns it with the remaining lines.
///
/// The block ends at the first line that is not header-shaped.
fn parse_header<'l, 'a>(
    lines: &'l [Line<'a>],
) -> Result<(Header, &'l [Line<'a>]), TableError> {
    let mut tapes = None;
    let mut states = None;
    let mut alphabet = None;
    let mut body_start = lines.len();

    for (i, line) in lines.iter().enumerate() {
        let Some((key, value)) = header_pair(line.content) else {
            body_start = i;
            break;
        };

        match key.to_ascii_lowercase().as_str() {
            "tapes" => assign(&mut tapes, key, line, || {
                parse_positive(key, value, MAX_TAPES)
            })?,
            "states" => assign(&mut states, key, line, || {
                parse_positive(key, value, MAX_STATES)
            })?,
            "alphabet" => assign(&mut alphabet, key, line, || parse_alphabet(value))?,
            _ => {
                return Err(header_error(
                    HeaderError::UnknownKey(key.into()),
                    Some(line),
                ))
            }
        }
    }

    let header = Header {
        tapes: check_required(tapes, "tapes")?,
        states: check_required(states, "states")?,
        alphabet: check_required(alphabet, "alphabet")?,
    };

    Ok((header, &lines[body_start..]))
}

/// Splits a header-shaped line into its key and trimmed value.
fn header_pair(content: &str) -> Option<(&str, &str)> {
    let line = TableParser::parse(Rule::header_line, content).ok()?.next()?;
    let header = line.into_inner().find(|p| p.as_rule() == Rule::header)?;

    let mut pairs = header.into_inner();
    let key = pairs.next()?.as_str();
    let value = pairs.next().map_or("", |p| p.as_str().trim());

    Some((key, value))
}

fn is_header_key(key: &str) -> bool {
    HEADER_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Stores a header value, refusing a second declaration of the same key.
fn assign<T>(
    slot: &mut Option<T>,
    key: &str,
    line: &Line,
    parse: impl FnOnce() -> Result<T, HeaderError>,
) -> Result<(), TableError> {
    if slot.is_some() {
        return Err(header_error(
            HeaderError::DuplicateKey(key.into()),
            Some(line),
        ));
    }

    *slot = Some(parse().map_err(|kind| header_error(kind, Some(line)))?);

    Ok(())
}

fn check_required<T>(value: Option<T>, key: &'static str) -> Result<T, TableError> {
    value.ok_or_else(|| header_error(HeaderError::MissingKey(key), None))
}

/// Parses a header count in `[1, max]`.
fn parse_positive(key: &str, value: &str, max: usize) -> Result<usize, HeaderError> {
    if value.is_empty() {
        return Err(HeaderError::MissingValue(key.into()));
    }

    let n = value
        .parse::<i64>()
        .map_err(|_| HeaderError::InvalidInteger {
            key: key.into(),
            value: value.into(),
        })?;

    let count = usize::try_from(n)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| HeaderError::NotPositive {
            key: key.into(),
            value: n,
        })?;

    if count > max {
        return Err(HeaderError::TooLarge {
            key: key.into(),
            value: n,
            max,
        });
    }

    Ok(count)
}

/// Every non-whitespace character of `value` becomes one symbol; repeats collapse.
fn parse_alphabet(value: &str) -> Result<BTreeSet<Symbol>, HeaderError> {
    let alphabet: BTreeSet<Symbol> = value.chars().filter(|c| !c.is_whitespace()).collect();

    if alphabet.is_empty() {
        return Err(HeaderError::EmptyAlphabet);
    }

    Ok(alphabet)
}

/// Parses `<state> : <reads...> : <next> <actions...>` into a key and its transition.
///
/// Only shape and number formats are checked here; alphabet, range and uniqueness checks
/// happen when the rule is inserted into the table.
fn parse_transition(
    line: &Line,
    tapes: usize,
    states: usize,
) -> Result<(TransitionKey, Transition), TableError> {
    let max = states - 1;
    let fields = transition_fields(line)?;
    let [state_field, read_field, target_field]: [Vec<&str>; 3] =
        fields.try_into().map_err(|fields: Vec<Vec<&str>>| {
            syntax_error(SyntaxError::SeparatorCount(fields.len().saturating_sub(1)), line)
        })?;

    let state = parse_integer(&state_field, "current state").map_err(|e| syntax_error(e, line))?;

    if read_field.len() != tapes {
        return Err(syntax_error(
            SyntaxError::ReadCount {
                expected: tapes,
                found: read_field.len(),
            },
            line,
        ));
    }
    let read = read_field
        .iter()
        .map(|token| parse_read_symbol(token))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| syntax_error(e, line))?;

    if target_field.len() != tapes + 1 {
        return Err(syntax_error(
            SyntaxError::TokenCount {
                expected: tapes + 1,
                found: target_field.len(),
            },
            line,
        ));
    }
    let next = parse_integer(&target_field[..1], "next state").map_err(|e| syntax_error(e, line))?;
    let actions = target_field[1..]
        .iter()
        .map(|token| parse_action(token))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| syntax_error(e, line))?;

    let state = usize::try_from(state).map_err(|_| {
        semantic_error(
            SemanticError::StateOutOfRange { state, max },
            line,
        )
    })?;
    let next_state = State::from_code(next).ok_or_else(|| {
        semantic_error(
            SemanticError::TargetOutOfRange { state: next, max },
            line,
        )
    })?;

    Ok((
        TransitionKey { state, read },
        Transition {
            next_state,
            actions,
        },
    ))
}

/// Splits a transition line into `:`-separated fields of whitespace-separated tokens.
fn transition_fields<'a>(line: &Line<'a>) -> Result<Vec<Vec<&'a str>>, TableError> {
    let transition = TableParser::parse(Rule::transition_line, line.content)
        .map_err(|e| syntax_error(SyntaxError::Grammar(e.to_string()), line))?
        .next()
        .and_then(|p| p.into_inner().find(|p| p.as_rule() == Rule::transition))
        .ok_or_else(|| syntax_error(SyntaxError::Grammar("empty transition".into()), line))?;

    Ok(transition
        .into_inner()
        .filter(|p| p.as_rule() == Rule::field)
        .map(|field| field.into_inner().map(|token| token.as_str()).collect())
        .collect())
}

/// Parses a field that must hold exactly one integer token.
fn parse_integer(tokens: &[&str], field: &'static str) -> Result<i64, SyntaxError> {
    let malformed = || SyntaxError::MalformedInteger {
        field,
        text: tokens.join(" "),
    };

    match tokens {
        [token] => token.parse::<i64>().map_err(|_| malformed()),
        _ => Err(malformed()),
    }
}

fn parse_read_symbol(token: &str) -> Result<Symbol, SyntaxError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(SyntaxError::MultiCharSymbol(token.into())),
    }
}

/// Parses `L | R | S | <symbol><L|R|S>`.
fn parse_action(token: &str) -> Result<Action, SyntaxError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(direction), None, None) => Ok(Action::new(None, parse_direction(direction)?)),
        (Some(symbol), Some(direction), None) => {
            Ok(Action::new(Some(symbol), parse_direction(direction)?))
        }
        _ => Err(SyntaxError::InvalidAction(token.into())),
    }
}

fn parse_direction(c: char) -> Result<Direction, SyntaxError> {
    Direction::from_char(c).ok_or(SyntaxError::InvalidDirection(c))
}

fn header_error(kind: HeaderError, line: Option<&Line>) -> TableError {
    TableError::Header {
        kind,
        line: line.map(Line::source),
    }
}

fn syntax_error(kind: SyntaxError, line: &Line) -> TableError {
    TableError::TransitionSyntax {
        kind,
        line: line.source(),
    }
}

fn semantic_error(kind: SemanticError, line: &Line) -> TableError {
    TableError::TransitionSemantic {
        kind,
        line: line.source(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SymbolRole;

    const UNARY: &str = r#"
# Accepts one or more 1s.
tapes: 1
states: 1
alphabet: 1

0 : 1 : 0 1R   # keep scanning
0 : _ : -1 S
"#;

    fn header_kind(result: Result<TransitionTable, TableError>) -> HeaderError {
        match result {
            Err(TableError::Header { kind, .. }) => kind,
            other => panic!("Expected a header error, got {:?}", other),
        }
    }

    fn syntax_kind(result: Result<TransitionTable, TableError>) -> SyntaxError {
        match result {
            Err(TableError::TransitionSyntax { kind, .. }) => kind,
            other => panic!("Expected a syntax error, got {:?}", other),
        }
    }

    fn semantic_kind(result: Result<TransitionTable, TableError>) -> SemanticError {
        match result {
            Err(TableError::TransitionSemantic { kind, .. }) => kind,
            other => panic!("Expected a semantic error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_table() {
        let table = parse(UNARY).unwrap();

        assert_eq!(table.tapes(), 1);
        assert_eq!(table.states(), 1);
        assert_eq!(table.alphabet().iter().collect::<String>(), "1");
        assert_eq!(table.len(), 2);

        let scan = table.lookup(0, &['1']).unwrap();
        assert_eq!(scan.next_state, State::Ordinary(0));
        assert_eq!(scan.actions, vec![Action::new(Some('1'), Direction::Right)]);

        let accept = table.lookup(0, &['_']).unwrap();
        assert_eq!(accept.next_state, State::Accept);
        assert_eq!(accept.actions, vec![Action::new(None, Direction::Stay)]);
    }

    #[test]
    fn test_parse_multi_tape_table() {
        let input = "tapes: 2\nstates: 2\nalphabet: ab\n0 : a _ : 1 aR bL\n1 : _ b : -2 S _S\n";
        let table = parse(input).unwrap();

        assert_eq!(table.tapes(), 2);
        let t = table.lookup(0, &['a', '_']).unwrap();
        assert_eq!(t.next_state, State::Ordinary(1));
        assert_eq!(
            t.actions,
            vec![
                Action::new(Some('a'), Direction::Right),
                Action::new(Some('b'), Direction::Left),
            ]
        );
        assert_eq!(table.lookup(1, &['_', 'b']).unwrap().next_state, State::Reject);
    }

    #[test]
    fn test_parse_from_str() {
        let table: TransitionTable = UNARY.parse().unwrap();
        assert_eq!(table, parse(UNARY).unwrap());
    }

    #[test]
    fn test_header_keys_are_case_insensitive() {
        let table = parse("TAPES: 1\nStates: 2\nAlphabet: 0 1 1\n0 : 0 : 1 S\n").unwrap();

        assert_eq!(table.states(), 2);
        assert_eq!(table.alphabet().iter().collect::<String>(), "01");
    }

    #[test]
    fn test_header_only_table_is_valid() {
        let table = parse("tapes: 1\nstates: 1\nalphabet: 0\n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_unknown_header_key() {
        let result = parse("tapes: 1\ncolor: red\nstates: 1\nalphabet: 0\n");
        let error = result.clone().unwrap_err();

        assert_eq!(header_kind(result), HeaderError::UnknownKey("color".into()));
        assert_eq!(error.line(), Some(&SourceLine::new(2, "color: red")));
    }

    #[test]
    fn test_parse_missing_header_keys() {
        assert_eq!(
            header_kind(parse("states: 1\nalphabet: 0\n0 : 0 : -1 S\n")),
            HeaderError::MissingKey("tapes")
        );
        assert_eq!(
            header_kind(parse("tapes: 1\nalphabet: 0\n")),
            HeaderError::MissingKey("states")
        );
        assert_eq!(
            header_kind(parse("tapes: 1\nstates: 1\n")),
            HeaderError::MissingKey("alphabet")
        );
        assert_eq!(header_kind(parse("")), HeaderError::MissingKey("tapes"));
    }

    #[test]
    fn test_parse_duplicate_header_key() {
        assert_eq!(
            header_kind(parse("tapes: 1\ntapes: 2\nstates: 1\nalphabet: 0\n")),
            HeaderError::DuplicateKey("tapes".into())
        );
    }

    #[test]
    fn test_parse_invalid_header_values() {
        assert_eq!(
            header_kind(parse("tapes: two\nstates: 1\nalphabet: 0\n")),
            HeaderError::InvalidInteger {
                key: "tapes".into(),
                value: "two".into(),
            }
        );
        assert_eq!(
            header_kind(parse("tapes: 1\nstates: 0\nalphabet: 0\n")),
            HeaderError::NotPositive {
                key: "states".into(),
                value: 0,
            }
        );
        assert_eq!(
            header_kind(parse("tapes: -3\nstates: 1\nalphabet: 0\n")),
            HeaderError::NotPositive {
                key: "tapes".into(),
                value: -3,
            }
        );
        assert_eq!(
            header_kind(parse("tapes:\nstates: 1\nalphabet: 0\n")),
            HeaderError::MissingValue("tapes".into())
        );
        assert_eq!(
            header_kind(parse("tapes: 1\nstates: 1\nalphabet:   # nothing\n")),
            HeaderError::EmptyAlphabet
        );
    }

    #[test]
    fn test_huge_header_counts_are_rejected() {
        assert_eq!(
            header_kind(parse(
                "tapes: 1\nstates: 1000000000000000000\nalphabet: 0\n0 : 0 : -1 S\n"
            )),
            HeaderError::TooLarge {
                key: "states".into(),
                value: 1_000_000_000_000_000_000,
                max: MAX_STATES,
            }
        );
        assert_eq!(
            header_kind(parse(
                "tapes: 1000000000000000000\nstates: 1\nalphabet: 0\n"
            )),
            HeaderError::TooLarge {
                key: "tapes".into(),
                value: 1_000_000_000_000_000_000,
                max: MAX_TAPES,
            }
        );
    }

    #[test]
    fn test_largest_state_count_is_accepted() {
        let input = format!("tapes: 1\nstates: {MAX_STATES}\nalphabet: 0\n0 : 0 : -1 S\n");
        let table = parse(&input).unwrap();

        assert_eq!(table.states(), MAX_STATES);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_header_after_transitions_is_rejected() {
        let input = "tapes: 1\nstates: 1\nalphabet: 0\n0 : 0 : -1 S\nstates: 2\n";
        let result = parse(input);
        let error = result.clone().unwrap_err();

        assert_eq!(header_kind(result), HeaderError::Misplaced("states".into()));
        assert_eq!(error.line().map(|l| l.number), Some(5));
    }

    #[test]
    fn test_wrong_action_count_is_a_syntax_error() {
        let input = "tapes: 1\nstates: 2\nalphabet: 01\n0 : 0 : 1 1R\n1 : 1 : -1 S S\n";
        let result = parse(input);
        let error = result.clone().unwrap_err();

        assert_eq!(
            syntax_kind(result),
            SyntaxError::TokenCount {
                expected: 2,
                found: 3,
            }
        );
        assert_eq!(error.line(), Some(&SourceLine::new(5, "1 : 1 : -1 S S")));
        assert!(error.to_string().contains("1 : 1 : -1 S S"));
    }

    #[test]
    fn test_separator_count() {
        let header = "tapes: 1\nstates: 1\nalphabet: 0\n";

        assert_eq!(
            syntax_kind(parse(&format!("{header}0 : 0 -1 S\n"))),
            SyntaxError::SeparatorCount(1)
        );
        assert_eq!(
            syntax_kind(parse(&format!("{header}0 : 0 : -1 : S\n"))),
            SyntaxError::SeparatorCount(3)
        );
        assert_eq!(
            syntax_kind(parse(&format!("{header}0 0 -1 S\n"))),
            SyntaxError::SeparatorCount(0)
        );
    }

    #[test]
    fn test_read_count() {
        let input = "tapes: 2\nstates: 1\nalphabet: 0\n0 : 0 : -1 S S\n";
        assert_eq!(
            syntax_kind(parse(input)),
            SyntaxError::ReadCount {
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_malformed_integers() {
        let header = "tapes: 1\nstates: 1\nalphabet: 01\n0 : 1 : -1 S\n";

        // Inside the header block this line would be an unknown key instead.
        assert_eq!(
            syntax_kind(parse(&format!("{header}x : 0 : -1 S\n"))),
            SyntaxError::MalformedInteger {
                field: "current state",
                text: "x".into(),
            }
        );
        assert_eq!(
            syntax_kind(parse(&format!("{header}0 : 0 : acc S\n"))),
            SyntaxError::MalformedInteger {
                field: "next state",
                text: "acc".into(),
            }
        );
        assert_eq!(
            syntax_kind(parse(&format!("{header}0 1 : 0 : -1 S\n"))),
            SyntaxError::MalformedInteger {
                field: "current state",
                text: "0 1".into(),
            }
        );
    }

    #[test]
    fn test_invalid_action_tokens() {
        let header = "tapes: 1\nstates: 1\nalphabet: 01\n";

        assert_eq!(
            syntax_kind(parse(&format!("{header}0 : 0 : -1 X\n"))),
            SyntaxError::InvalidDirection('X')
        );
        assert_eq!(
            syntax_kind(parse(&format!("{header}0 : 0 : -1 1<\n"))),
            SyntaxError::InvalidDirection('<')
        );
        assert_eq!(
            syntax_kind(parse(&format!("{header}0 : 0 : -1 01R\n"))),
            SyntaxError::InvalidAction("01R".into())
        );
        assert_eq!(
            syntax_kind(parse(&format!("{header}0 : 01 : -1 R\n"))),
            SyntaxError::MultiCharSymbol("01".into())
        );
    }

    #[test]
    fn test_state_ranges() {
        let header = "tapes: 1\nstates: 2\nalphabet: 0\n";

        assert_eq!(
            semantic_kind(parse(&format!("{header}2 : 0 : -1 S\n"))),
            SemanticError::StateOutOfRange { state: 2, max: 1 }
        );
        assert_eq!(
            semantic_kind(parse(&format!("{header}-1 : 0 : 0 S\n"))),
            SemanticError::StateOutOfRange { state: -1, max: 1 }
        );
        assert_eq!(
            semantic_kind(parse(&format!("{header}0 : 0 : 2 S\n"))),
            SemanticError::TargetOutOfRange { state: 2, max: 1 }
        );
        assert_eq!(
            semantic_kind(parse(&format!("{header}0 : 0 : -3 S\n"))),
            SemanticError::TargetOutOfRange { state: -3, max: 1 }
        );
    }

    #[test]
    fn test_symbols_must_be_in_alphabet() {
        let header = "tapes: 1\nstates: 1\nalphabet: 01\n";

        assert!(matches!(
            semantic_kind(parse(&format!("{header}0 : 2 : -1 S\n"))),
            SemanticError::SymbolNotInAlphabet {
                role: SymbolRole::Read,
                symbol: '2',
                ..
            }
        ));
        assert!(matches!(
            semantic_kind(parse(&format!("{header}0 : 0 : -1 aR\n"))),
            SemanticError::SymbolNotInAlphabet {
                role: SymbolRole::Write,
                symbol: 'a',
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_transition() {
        let input = "tapes: 2\nstates: 1\nalphabet: 01\n0 : 0 1 : -1 S S\n0 : 0 1 : -2 S S\n";
        let result = parse(input);
        let error = result.clone().unwrap_err();

        assert_eq!(
            semantic_kind(result),
            SemanticError::DuplicateTransition {
                state: 0,
                read: vec!['0', '1'],
            }
        );
        assert!(error.to_string().contains("state 0"));
        assert!(error.to_string().contains("['0', '1']"));
    }

    #[test]
    fn test_line_numbers_count_comments_and_blanks() {
        let input = "# header\ntapes: 1\n\nstates: 1\nalphabet: 0\n\n# rules\n0 : 0 : 9 S # bad\n";
        let error = parse(input).unwrap_err();

        assert_eq!(
            error.line(),
            Some(&SourceLine::new(8, "0 : 0 : 9 S # bad"))
        );
    }

    #[test]
    fn test_parsing_is_deterministic() {
        assert_eq!(parse(UNARY).unwrap(), parse(UNARY).unwrap());
    }
}
