//! Writes predicted parses in the tab-separated gold/predicted format:
//! `ID \t GOLD_HEAD-GOLD_LABEL \t PRED_HEAD-PRED_LABEL`, one line per token excluding the
//! synthetic ROOT, sentences separated by a blank line.

use std::io::Write;

use crate::sentence::Sentence;

/// Writes one sentence's gold-vs-predicted lines to `out`. `is_first` suppresses the
/// sentence-separating blank line before the very first sentence in a run.
pub fn write_prediction<W: Write>(
    out: &mut W,
    sent: &Sentence,
    pred_heads: &[i32],
    pred_labels: &[i32],
    label_names: &[String],
    is_first: bool,
) -> std::io::Result<()> {
    if !is_first {
        writeln!(out)?;
    }
    for i in 0..sent.root_index() {
        let tok = &sent.tokens[i];
        let gold_label = label_name(label_names, tok.label);
        let pred_label = label_name(label_names, pred_labels[i]);
        writeln!(
            out,
            "{}\t{}-{}\t{}-{}",
            tok.id, tok.head, gold_label, pred_heads[i], pred_label
        )?;
    }
    Ok(())
}

fn label_name(names: &[String], id: i32) -> String {
    if id >= 0 && (id as usize) < names.len() {
        names[id as usize].clone()
    } else {
        "_".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::Token;

    #[test]
    fn writes_one_line_per_non_root_token() {
        let sent = Sentence {
            tokens: vec![
                Token {
                    id: "dog".to_string(),
                    index: 0,
                    head: 1,
                    label: 0,
                    namespaces: vec![],
                },
                Token {
                    id: "root".to_string(),
                    index: 1,
                    head: -1,
                    label: 1,
                    namespaces: vec![],
                },
            ],
            arc_constraints: vec![],
            span_constraints: vec![],
        };
        let names = vec!["det".to_string(), "root".to_string()];
        let mut buf = Vec::new();
        write_prediction(&mut buf, &sent, &[1], &[0], &names, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "dog\t1-det\t1-det\n");
    }
}
