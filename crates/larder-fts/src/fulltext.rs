//! Full-text query grammar.
//!
//! Input is split on whitespace. Each piece is one clause:
//!
//! - `garlic`: required term
//! - `-garlic`: excluded term (dashes toggle, so `--garlic` is required)
//! - `"lemon zest"`: phrase; an unterminated quote runs to the end of input
//! - `-"lemon zest"`: excluded phrase
//! - `*`: match every document
//!
//! Clauses combine with AND. Text goes through the index analyzer, so query
//! terms are stemmed and stopwords vanish; a clause that analyzes to nothing
//! is dropped, and an input with no clause left matches nothing.

use tantivy::tokenizer::{TextAnalyzer, TokenStream};

/// Parsed full-text expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulltextQuery {
    /// Every document.
    MatchAll,
    /// No document.
    MatchNone,
    /// One analyzed term.
    Term(String),
    /// Two or more analyzed terms with their offsets from the first one.
    ///
    /// Offsets keep the gaps left by removed stopwords.
    Phrase(Vec<(usize, String)>),
    /// Documents not matching the inner query.
    Not(Box<FulltextQuery>),
    /// Documents matching every inner query.
    And(Vec<FulltextQuery>),
}

impl FulltextQuery {
    /// Whether this is the bare match-all query.
    pub fn is_match_all(&self) -> bool {
        matches!(self, FulltextQuery::MatchAll)
    }

    /// Negate a query.
    pub fn negate(self) -> Self {
        FulltextQuery::Not(Box::new(self))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Word { negated: bool, text: &'a str },
    Phrase { negated: bool, text: &'a str },
}

/// Parses user input into a [`FulltextQuery`] using the index analyzer.
#[derive(Clone)]
pub struct FulltextParser {
    analyzer: TextAnalyzer,
}

impl FulltextParser {
    /// Create a parser that analyzes terms with `analyzer`.
    pub fn new(analyzer: TextAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Parse an input string.
    pub fn parse(&self, input: &str) -> FulltextQuery {
        let mut clauses = Vec::new();

        for piece in split(input) {
            let (negated, clause) = match piece {
                Piece::Word { negated, text: "*" } => (negated, Some(FulltextQuery::MatchAll)),
                Piece::Word { negated, text } => (negated, self.word(text)),
                Piece::Phrase { negated, text } => (negated, self.phrase(text)),
            };
            match (negated, clause) {
                (_, None) => {}
                (true, Some(clause)) => clauses.push(clause.negate()),
                (false, Some(FulltextQuery::And(terms))) => clauses.extend(terms),
                (false, Some(clause)) => clauses.push(clause),
            }
        }

        simplify(clauses)
    }

    fn word(&self, text: &str) -> Option<FulltextQuery> {
        let mut terms: Vec<String> = self.analyze(text).into_iter().map(|(_, t)| t).collect();
        match terms.len() {
            0 => None,
            1 => terms.pop().map(FulltextQuery::Term),
            _ => Some(FulltextQuery::And(
                terms.into_iter().map(FulltextQuery::Term).collect(),
            )),
        }
    }

    fn phrase(&self, text: &str) -> Option<FulltextQuery> {
        let mut terms = self.analyze(text);
        match terms.len() {
            0 => None,
            1 => terms.pop().map(|(_, t)| FulltextQuery::Term(t)),
            _ => {
                let first = terms[0].0;
                Some(FulltextQuery::Phrase(
                    terms
                        .into_iter()
                        .map(|(position, t)| (position - first, t))
                        .collect(),
                ))
            }
        }
    }

    /// Analyzed terms with their token positions.
    fn analyze(&self, text: &str) -> Vec<(usize, String)> {
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);
        let mut terms = Vec::new();
        stream.process(&mut |token| terms.push((token.position, token.text.clone())));
        terms
    }
}

impl std::fmt::Debug for FulltextParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FulltextParser")
            .field("analyzer", &"<tantivy::TextAnalyzer>")
            .finish()
    }
}

fn split(input: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let dashes = rest.len() - rest.trim_start_matches('-').len();
        let negated = dashes % 2 == 1;
        rest = &rest[dashes..];

        if let Some(quoted) = rest.strip_prefix('"') {
            let (text, remainder) = match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            };
            pieces.push(Piece::Phrase { negated, text });
            rest = remainder;
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let text = &rest[..end];
            if !text.is_empty() {
                pieces.push(Piece::Word { negated, text });
            }
            rest = &rest[end..];
        }
    }

    pieces
}

fn simplify(mut clauses: Vec<FulltextQuery>) -> FulltextQuery {
    if clauses.is_empty() {
        return FulltextQuery::MatchNone;
    }
    if clauses.iter().any(|c| !c.is_match_all()) {
        clauses.retain(|c| !c.is_match_all());
    } else {
        return FulltextQuery::MatchAll;
    }
    if clauses.len() == 1 {
        clauses.pop().unwrap_or(FulltextQuery::MatchNone)
    } else {
        FulltextQuery::And(clauses)
    }
}

// ============================================================================
// Tests
// ============================================================================
