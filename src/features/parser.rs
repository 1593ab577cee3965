//! Shunting-yard conversion of a tokenized feature line into a [`FeatureNode`] tree, and the
//! top-level reader that folds every line of a template file into one `UnionList`.

use crate::dictionary::Dictionary;
use crate::error::ParserError;
use crate::features::lexer::{tokenize_line, Token};
use crate::features::tree::FeatureNode;

const CARTESIAN_PRECEDENCE: u8 = 2;

/// Converts infix tokens to postfix order (shunting-yard), then folds the postfix stream into a
/// tree. `++` is the only operator in the grammar, so folding only ever needs a single operand
/// stack and never has to disambiguate arity.
pub fn parse_line(tokens: &[Token], dict: &mut Dictionary) -> Result<FeatureNode, ParserError> {
    let postfix = infix_to_postfix(tokens)?;
    fold_postfix(&postfix, dict)
}

fn infix_to_postfix(tokens: &[Token]) -> Result<Vec<Token>, ParserError> {
    let mut output = Vec::new();
    let mut ops: Vec<Token> = Vec::new();

    for tok in tokens {
        match tok {
            Token::Location { .. } => output.push(tok.clone()),
            Token::CartesianProduct => {
                while let Some(top) = ops.last() {
                    if matches!(top, Token::CartesianProduct) && precedence(top) >= CARTESIAN_PRECEDENCE {
                        output.push(ops.pop().unwrap());
                    } else {
                        break;
                    }
                }
                ops.push(tok.clone());
            }
            Token::LParen => ops.push(tok.clone()),
            Token::RParen => {
                loop {
                    match ops.pop() {
                        Some(Token::LParen) => break,
                        Some(other) => output.push(other),
                        None => {
                            return Err(ParserError::TemplateParse {
                                message: "unbalanced parenthesis".to_string(),
                            })
                        }
                    }
                }
            }
        }
    }

    while let Some(top) = ops.pop() {
        if matches!(top, Token::LParen | Token::RParen) {
            return Err(ParserError::TemplateParse {
                message: "unbalanced parenthesis".to_string(),
            });
        }
        output.push(top);
    }

    Ok(output)
}

fn precedence(tok: &Token) -> u8 {
    match tok {
        Token::CartesianProduct => CARTESIAN_PRECEDENCE,
        _ => 0,
    }
}

fn fold_postfix(postfix: &[Token], dict: &mut Dictionary) -> Result<FeatureNode, ParserError> {
    let mut stack: Vec<FeatureNode> = Vec::new();

    for tok in postfix {
        match tok {
            Token::Location { location, namespace } => {
                let (ns_name, token_specific_ns) = split_token_specific(namespace);
                let namespace_id = dict.map_namespace(ns_name);
                stack.push(FeatureNode::Location {
                    location: *location,
                    namespace_id,
                    token_specific_ns,
                });
            }
            Token::CartesianProduct => {
                let rhs = stack.pop().ok_or_else(|| ParserError::TemplateParse {
                    message: "'++' missing right operand".to_string(),
                })?;
                let lhs = stack.pop().ok_or_else(|| ParserError::TemplateParse {
                    message: "'++' missing left operand".to_string(),
                })?;
                stack.push(FeatureNode::CartesianProduct {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                });
            }
            Token::LParen | Token::RParen => {
                return Err(ParserError::TemplateParse {
                    message: "unexpected parenthesis in postfix stream".to_string(),
                })
            }
        }
    }

    let result = stack.pop().ok_or_else(|| ParserError::TemplateParse {
        message: "empty feature expression".to_string(),
    })?;
    if !stack.is_empty() {
        return Err(ParserError::TemplateParse {
            message: "leftover operands after folding expression".to_string(),
        });
    }
    Ok(result)
}

/// Splits `X-k` into `(X, k)` for edge-dependent namespaces, the same convention the corpus
/// reader uses for namespace declarations.
fn split_token_specific(namespace: &str) -> (&str, i32) {
    match namespace.split_once('-') {
        Some((name, idx)) => (name, idx.parse().unwrap_or(-1)),
        None => (namespace, -1),
    }
}

/// Reads a complete feature template file: strips `#` comments and blank lines, parses each
/// remaining line into a tree, and unions them under one root, in file order.
pub fn read_feature_file(contents: &str, dict: &mut Dictionary) -> Result<FeatureNode, ParserError> {
    let mut members = Vec::new();

    for raw_line in contents.lines() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let tokens = tokenize_line(line)?;
        let node = parse_line(&tokens, dict)?;
        members.push(node);
    }

    if members.is_empty() {
        return Err(ParserError::TemplateParse {
            message: "feature template contains no expressions".to_string(),
        });
    }

    Ok(FeatureNode::UnionList { members })
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_cartesian_product() {
        let mut dict = Dictionary::new();
        let tokens = tokenize_line("S0:word ++ N0:word").unwrap();
        let tree = parse_line(&tokens, &mut dict).unwrap();
        assert!(matches!(tree, FeatureNode::CartesianProduct { .. }));
    }

    #[test]
    fn unbalanced_parenthesis_is_an_error() {
        let tokens = tokenize_line("(S0:word ++ N0:word").unwrap();
        let mut dict = Dictionary::new();
        let err = parse_line(&tokens, &mut dict).unwrap_err();
        assert_matches::assert_matches!(err, ParserError::TemplateParse { .. });
    }

    #[test]
    fn reads_multi_line_template_into_union() {
        let mut dict = Dictionary::new();
        let contents = "# comment\nS0:word\n\nN0:word ++ N1:word\n";
        let tree = read_feature_file(contents, &mut dict).unwrap();
        match tree {
            FeatureNode::UnionList { members } => assert_eq!(members.len(), 2),
            _ => panic!("expected a union"),
        }
    }

    #[test]
    fn edge_dependent_namespace_tag_is_parsed() {
        assert_eq!(split_token_specific("X-3"), ("X", 3));
        assert_eq!(split_token_specific("X"), ("X", -1));
    }
}
