//! Parsing of console command lines.

use flightbook_core::ReservationId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { username: String, password: String, balance: i32 },
    Login { username: String, password: String },
    Logout,
    Search {
        origin: String,
        destination: String,
        direct_only: bool,
        day_of_month: i32,
        limit: Option<usize>,
    },
    Book { index: i64 },
    Pay { rid: ReservationId },
    Reservations,
    Cancel { rid: ReservationId },
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unterminated quote")]
    UnterminatedQuote,
}

const CREATE_USAGE: &str = "create <username> <password> <initial amount>";
const LOGIN_USAGE: &str = "login <username> <password>";
const SEARCH_USAGE: &str =
    "search <origin city> <destination city> <direct> <day> [<num itineraries>]";
const BOOK_USAGE: &str = "book <itinerary id>";
const PAY_USAGE: &str = "pay <reservation id>";
const CANCEL_USAGE: &str = "cancel <reservation id>";

/// Splits on whitespace; double quotes group a city name such as
/// `"Seattle WA"` into one token.
fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(ParseError::UnterminatedQuote);
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn number<T: std::str::FromStr>(token: &str, usage: &'static str) -> Result<T, ParseError> {
    token.parse().map_err(|_| ParseError::Usage(usage))
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let tokens = tokenize(line)?;
    let Some((name, args)) = tokens.split_first() else {
        return Err(ParseError::Empty);
    };

    match (name.as_str(), args) {
        ("create", [username, password, amount]) => Ok(Command::Create {
            username: username.clone(),
            password: password.clone(),
            balance: number(amount, CREATE_USAGE)?,
        }),
        ("create", _) => Err(ParseError::Usage(CREATE_USAGE)),

        ("login", [username, password]) => Ok(Command::Login {
            username: username.clone(),
            password: password.clone(),
        }),
        ("login", _) => Err(ParseError::Usage(LOGIN_USAGE)),

        ("logout", []) => Ok(Command::Logout),

        ("search", [origin, destination, direct, day, rest @ ..]) if rest.len() <= 1 => {
            let direct: i32 = number(direct, SEARCH_USAGE)?;
            let limit = match rest.first() {
                Some(n) => Some(number(n, SEARCH_USAGE)?),
                None => None,
            };
            Ok(Command::Search {
                origin: origin.clone(),
                destination: destination.clone(),
                direct_only: direct == 1,
                day_of_month: number(day, SEARCH_USAGE)?,
                limit,
            })
        }
        ("search", _) => Err(ParseError::Usage(SEARCH_USAGE)),

        ("book", [index]) => Ok(Command::Book { index: number(index, BOOK_USAGE)? }),
        ("book", _) => Err(ParseError::Usage(BOOK_USAGE)),

        ("pay", [rid]) => Ok(Command::Pay { rid: number(rid, PAY_USAGE)? }),
        ("pay", _) => Err(ParseError::Usage(PAY_USAGE)),

        ("reservations", []) => Ok(Command::Reservations),

        ("cancel", [rid]) => Ok(Command::Cancel { rid: number(rid, CANCEL_USAGE)? }),
        ("cancel", _) => Err(ParseError::Usage(CANCEL_USAGE)),

        ("quit", _) => Ok(Command::Quit),

        (other, _) => Err(ParseError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_with_quoted_cities() {
        let cmd = parse(r#"search "Seattle WA" "Boston MA" 1 14 5"#).unwrap();
        assert_eq!(
            cmd,
            Command::Search {
                origin: "Seattle WA".to_string(),
                destination: "Boston MA".to_string(),
                direct_only: true,
                day_of_month: 14,
                limit: Some(5),
            }
        );
    }

    #[test]
    fn test_search_limit_is_optional() {
        match parse("search Seattle Boston 0 3").unwrap() {
            Command::Search { direct_only, limit, .. } => {
                assert!(!direct_only);
                assert_eq!(limit, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(
            parse("create alice pw 100").unwrap(),
            Command::Create { username: "alice".to_string(), password: "pw".to_string(), balance: 100 }
        );
        assert_eq!(parse("  book   -1 ").unwrap(), Command::Book { index: -1 });
        assert_eq!(parse("pay 7").unwrap(), Command::Pay { rid: 7 });
        assert_eq!(parse("reservations").unwrap(), Command::Reservations);
        assert_eq!(parse("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("fly home"), Err(ParseError::Unknown("fly".to_string())));
        assert_eq!(parse("book two"), Err(ParseError::Usage(BOOK_USAGE)));
        assert_eq!(parse("login alice"), Err(ParseError::Usage(LOGIN_USAGE)));
        assert_eq!(parse(r#"search "Seattle WA Boston 1 1"#), Err(ParseError::UnterminatedQuote));
    }

    #[test]
    fn test_empty_quotes_make_an_empty_token() {
        assert_eq!(
            parse(r#"login "" pw"#).unwrap(),
            Command::Login { username: String::new(), password: "pw".to_string() }
        );
    }
}
