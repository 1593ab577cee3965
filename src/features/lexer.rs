//! Tokenizing one feature template line into a stream of [`Token`]s, the first step of turning
//! `S0:word ++ N0:word` into a feature tree.

use regex::Regex;

use crate::error::ParserError;
use crate::state::LocationName;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Location { location: LocationName, namespace: String },
    CartesianProduct,
    LParen,
    RParen,
}

/// Splits `line` on whitespace and parentheses, classifying each piece, the way
/// `feature_set_parser.cc::tokenize_line` walks the line character by character.
pub fn tokenize_line(line: &str) -> Result<Vec<Token>, ParserError> {
    let location_re = Regex::new(r"^([A-Za-z0-9_]+):(.+)$").unwrap();
    let mut tokens = Vec::new();

    for raw in split_respecting_parens(line) {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match raw {
            "(" => tokens.push(Token::LParen),
            ")" => tokens.push(Token::RParen),
            "++" => tokens.push(Token::CartesianProduct),
            _ => {
                let caps = location_re.captures(raw).ok_or_else(|| ParserError::TemplateParse {
                    message: format!("expected Location:Namespace, got '{raw}'"),
                })?;
                let loc_name = &caps[1];
                let location = LocationName::from_name(loc_name).ok_or_else(|| ParserError::TemplateParse {
                    message: format!("unknown location name '{loc_name}'"),
                })?;
                tokens.push(Token::Location {
                    location,
                    namespace: caps[2].to_string(),
                });
            }
        }
    }

    Ok(tokens)
}

/// Splits on whitespace while also treating `(` and `)` as their own tokens, regardless of
/// surrounding whitespace.
fn split_respecting_parens(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in line.chars() {
        match c {
            '(' | ')' => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                out.push(c.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_simple_cartesian_product() {
        let tokens = tokenize_line("S0:word ++ N0:word").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1], Token::CartesianProduct);
    }

    #[test]
    fn tokenizes_parenthesized_expression() {
        let tokens = tokenize_line("(S0:word ++ N0:word) ++ N1:pos").unwrap();
        assert_eq!(tokens[0], Token::LParen);
        assert_eq!(tokens[4], Token::RParen);
    }

    #[test]
    fn rejects_unknown_location() {
        let err = tokenize_line("X9:word").unwrap_err();
        assert_matches::assert_matches!(err, ParserError::TemplateParse { .. });
    }
}
