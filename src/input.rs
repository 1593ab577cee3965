//! Reads the VW-style corpus format into [`Sentence`]s, interning every label, attribute, and
//! namespace name through a shared [`Dictionary`].
//!
//! One token line looks like:
//! `HEAD-LABEL 'ID  |NS  feature[:value]  feature[:value]  |NS2  ...`
//! A constraint line begins with `#` and specifies `arc H-D ...` or `span A-B ...` pairs. Blank
//! lines separate sentences; a synthetic ROOT token is appended to each finished sentence and any
//! head of `-1` is rewritten to point at it.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::dictionary::Dictionary;
use crate::error::{ParserError, Result};
use crate::sentence::{ArcConstraint, NamespaceFront, Sentence, SpanConstraint, Token};

struct Reader<'a> {
    dict: &'a mut Dictionary,
    filename: PathBuf,
    line_no: usize,
    header_re: Regex,
}

impl<'a> Reader<'a> {
    fn new(dict: &'a mut Dictionary, filename: &Path) -> Self {
        Reader {
            dict,
            filename: filename.to_path_buf(),
            line_no: 0,
            // "HEAD-LABEL 'ID", e.g. "3-nsubj 'the-dog"
            header_re: Regex::new(r"^(-?\d+)-(.*)\s'(.*)$").unwrap(),
        }
    }

    fn err(&self, message: impl Into<String>) -> ParserError {
        ParserError::InputParse {
            file: self.filename.clone(),
            line: self.line_no,
            message: message.into(),
        }
    }

    fn parse_instance(&mut self, line: &str) -> Result<Token> {
        let bar_pos = line.find('|').ok_or_else(|| self.err("expected a '|' introducing features"))?;
        let (header, body) = line.split_at(bar_pos);
        let token = self.parse_header(header.trim_end())?;
        self.parse_body(body, token)
    }

    fn parse_header(&mut self, header: &str) -> Result<Token> {
        let caps = self
            .header_re
            .captures(header)
            .ok_or_else(|| self.err(format!("ill-formed header '{header}'")))?;
        let head: i32 = caps[1].parse().map_err(|_| self.err("head is not an integer"))?;
        let label = self.dict.map_label(&caps[2]);
        let id = caps[3].to_string();
        Ok(Token {
            id,
            index: 0,
            head,
            label,
            namespaces: Vec::new(),
        })
    }

    fn parse_body(&mut self, body: &str, mut token: Token) -> Result<Token> {
        let padded = format!("{body} ");
        let mut ns_active = false;

        for word in padded.split(' ') {
            if word.is_empty() {
                continue;
            }
            if let Some(stripped) = word.strip_prefix('|') {
                self.parse_namespace_decl(stripped, &mut token);
                ns_active = true;
            } else {
                if !ns_active {
                    return Err(self.err("feature declared before any namespace"));
                }
                self.parse_feature_decl(word, &mut token)?;
            }
        }
        Ok(token)
    }

    fn parse_namespace_decl(&mut self, name: &str, token: &mut Token) {
        let (ns_name, token_specific_ns) = match name.split_once('-') {
            Some((n, idx)) if !n.is_empty() => (n, idx.parse().unwrap_or(-1)),
            _ if name.is_empty() => ("*", -1),
            _ => (name, -1),
        };
        let namespace_id = self.dict.map_namespace(ns_name);
        token.namespaces.push(NamespaceFront::new(namespace_id, token_specific_ns));
    }

    fn parse_feature_decl(&mut self, word: &str, token: &mut Token) -> Result<()> {
        let (name, value) = match word.rfind(':') {
            Some(colon) => {
                let (n, v) = word.split_at(colon);
                let v = &v[1..];
                match v.parse::<f32>() {
                    Ok(parsed) => (n, parsed),
                    Err(_) => {
                        log::warn!("conversion failed, falling back to default value (1.0): {v}");
                        (n, 1.0)
                    }
                }
            }
            None => (word, 1.0),
        };
        let attribute_id = self.dict.map_attribute(name);
        let current_ns = token
            .namespaces
            .last_mut()
            .ok_or_else(|| self.err("feature declared before any namespace"))?;
        current_ns.attributes.push(crate::sentence::Attribute::new(attribute_id, value));
        Ok(())
    }

    fn parse_constraint(&mut self, line: &str, sent: &mut Sentence) -> Result<()> {
        let mut parts = line.split_whitespace();
        let kind = parts.next().ok_or_else(|| self.err("empty constraint line"))?;
        match kind {
            "arc" => {
                for pair in parts {
                    let (h, d) = pair
                        .split_once('-')
                        .ok_or_else(|| self.err("invalid arc constraint format"))?;
                    let head: i32 = h.parse().map_err(|_| self.err("invalid arc constraint head"))?;
                    let dep: i32 = d.parse().map_err(|_| self.err("invalid arc constraint dependent"))?;
                    sent.arc_constraints.push(ArcConstraint { head, dep, label: -1 });
                }
            }
            "span" => {
                for pair in parts {
                    let (a, b) = pair
                        .split_once('-')
                        .ok_or_else(|| self.err("invalid span constraint format"))?;
                    let start: usize = a.parse().map_err(|_| self.err("invalid span constraint start"))?;
                    let end: usize = b.parse().map_err(|_| self.err("invalid span constraint end"))?;
                    sent.span_constraints.push(SpanConstraint {
                        start,
                        end,
                        permit_root_deps: false,
                    });
                }
            }
            _ => return Err(self.err("constraint line must start with 'arc' or 'span'")),
        }
        Ok(())
    }

    fn finish_sentence(&mut self, mut sent: Sentence) -> Result<Sentence> {
        let root_label = self.dict.map_label("root");
        let root_index = sent.tokens.len();
        sent.tokens.push(Token {
            id: "root".to_string(),
            index: root_index,
            head: -1,
            label: root_label,
            namespaces: Vec::new(),
        });

        for (i, tok) in sent.tokens.iter_mut().enumerate() {
            tok.index = i;
        }
        for tok in sent.tokens.iter_mut() {
            if tok.head == -1 && tok.index != root_index {
                tok.head = root_index as i32;
            }
        }
        sent.tokens[root_index].head = -1;

        if sent.tokens.len() < 2 {
            return Err(self.err("a sentence must contain at least one token besides the root"));
        }
        Ok(sent)
    }
}

/// Reads every sentence from `path`, interning strings into `dict`.
pub fn read_corpus(path: &Path, dict: &mut Dictionary) -> Result<Vec<Sentence>> {
    let text = std::fs::read_to_string(path).map_err(|e| ParserError::InputParse {
        file: path.to_path_buf(),
        line: 0,
        message: format!("could not read file: {e}"),
    })?;

    let mut reader = Reader::new(dict, path);
    let mut corpus = Vec::new();
    let mut current = Sentence::default();

    for line in text.lines() {
        reader.line_no += 1;
        if line.is_empty() {
            if !current.tokens.is_empty() {
                corpus.push(reader.finish_sentence(std::mem::take(&mut current))?);
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix('#') {
            reader.parse_constraint(rest.trim_start(), &mut current)?;
        } else {
            let token = reader.parse_instance(line)?;
            current.tokens.push(token);
        }
    }
    if !current.tokens.is_empty() {
        corpus.push(reader.finish_sentence(current)?);
    }

    Ok(corpus)
}
