//! Query compilation.
//!
//! `QueryCompiler` turns a [`SearchQuery`] into a [`CompiledQuery`]: a flat
//! conjunction of clauses that can be compared, logged and finally lowered
//! into a Tantivy query.
//!
//! | Input | Clause |
//! |-------|--------|
//! | `fulltext` | parsed [`FulltextQuery`], after the policy approves it |
//! | `ranges` | inclusive range on the `<field>` u64 field |
//! | `diet_threshold` | `diet_<name> >= threshold` |
//! | `match_keyword` | exact keyword term |
//! | `drill_down` | `/dimension/label` facet term, or the bucket's range for a range dimension |
//!
//! No clause at all means every document matches.

use std::ops::Bound;
use std::sync::Arc;

use larder_core::{Error, NumericField, Result, SearchQuery};
use tantivy::Term;
use tantivy::query::{
    AllQuery, BooleanQuery, EmptyQuery, Occur, PhraseQuery, Query, RangeQuery, TermQuery,
};
use tantivy::schema::{Facet, IndexRecordOption};

use crate::fulltext::{FulltextParser, FulltextQuery};
use crate::policy::SearchPolicy;
use crate::schema::RecipeSchema;

/// One conjunct of a compiled query.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Parsed full-text expression.
    Fulltext(FulltextQuery),
    /// Inclusive numeric range.
    Range {
        /// Attribute being filtered.
        field: NumericField,
        /// Lower bound, inclusive.
        start: u64,
        /// Upper bound, inclusive.
        end: u64,
    },
    /// Diet score at least `threshold`.
    DietAtLeast {
        /// Diet name.
        diet: String,
        /// Minimum score.
        threshold: f32,
    },
    /// Exact keyword.
    Keyword(String),
    /// Category label.
    DrillDown {
        /// Dimension name.
        dimension: String,
        /// Label within the dimension.
        label: String,
    },
}

/// A conjunction of clauses; empty means match everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledQuery {
    clauses: Vec<Clause>,
}

impl CompiledQuery {
    /// The clauses, in compilation order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether the query places no restriction on documents.
    pub fn is_unrestricted(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Compiles search requests against one schema and policy.
#[derive(Clone)]
pub struct QueryCompiler {
    schema: RecipeSchema,
    parser: FulltextParser,
    policy: Arc<dyn SearchPolicy>,
}

impl QueryCompiler {
    /// Create a compiler.
    pub fn new(schema: RecipeSchema, parser: FulltextParser, policy: Arc<dyn SearchPolicy>) -> Self {
        Self {
            schema,
            parser,
            policy,
        }
    }

    /// The policy consulted during compilation.
    pub fn policy(&self) -> &Arc<dyn SearchPolicy> {
        &self.policy
    }

    /// Compile a query.
    ///
    /// Fails when the policy rejects the full-text expression or a diet
    /// threshold names a diet the schema does not declare.
    pub fn compile(&self, query: &SearchQuery) -> Result<CompiledQuery> {
        let mut clauses = Vec::new();

        if let Some(text) = query.fulltext() {
            let parsed = self.parser.parse(text);
            self.policy.inspect_parsed_fulltext_query(&parsed)?;
            clauses.push(Clause::Fulltext(parsed));
        }

        for (field, range) in query.ranges() {
            clauses.push(Clause::Range {
                field: *field,
                start: u64::from(range.start()),
                end: u64::from(range.end()),
            });
        }

        for (diet, threshold) in query.diet_threshold() {
            if !self.schema.has_diet(diet) {
                return Err(Error::validation(
                    "dietThreshold",
                    format!("unknown diet `{diet}`"),
                ));
            }
            clauses.push(Clause::DietAtLeast {
                diet: diet.clone(),
                threshold: *threshold,
            });
        }

        for keyword in query.match_keyword() {
            clauses.push(Clause::Keyword(keyword.clone()));
        }

        for drill_down in query.drill_down() {
            clauses.push(match drill_down.range_bucket() {
                Some(bucket) => Clause::Range {
                    field: bucket.field,
                    start: bucket.start,
                    end: bucket.end,
                },
                None => Clause::DrillDown {
                    dimension: drill_down.dimension().to_string(),
                    label: drill_down.label().to_string(),
                },
            });
        }

        let compiled = CompiledQuery { clauses };
        log::debug!("Compiled query: {compiled:?}");
        Ok(compiled)
    }

    /// Lower a compiled query into a Tantivy query.
    pub fn to_query(&self, compiled: &CompiledQuery) -> Result<Box<dyn Query>> {
        let mut queries = compiled
            .clauses
            .iter()
            .map(|clause| self.clause_query(clause))
            .collect::<Result<Vec<_>>>()?;

        Ok(match queries.len() {
            0 => Box::new(AllQuery),
            1 => queries.pop().unwrap_or_else(|| Box::new(AllQuery)),
            _ => must_all(queries),
        })
    }

    fn clause_query(&self, clause: &Clause) -> Result<Box<dyn Query>> {
        let s = &self.schema;
        Ok(match clause {
            Clause::Fulltext(parsed) => self.fulltext_query(parsed),
            Clause::Range { field, start, end } => {
                let filter = s.numeric(*field).filter;
                Box::new(RangeQuery::new(
                    Bound::Included(Term::from_field_u64(filter, *start)),
                    Bound::Included(Term::from_field_u64(filter, *end)),
                ))
            }
            Clause::DietAtLeast { diet, threshold } => {
                let field = s
                    .diet_field(diet)
                    .ok_or_else(|| Error::validation("dietThreshold", format!("unknown diet `{diet}`")))?;
                Box::new(RangeQuery::new(
                    Bound::Included(Term::from_field_f64(field, f64::from(*threshold))),
                    Bound::Unbounded,
                ))
            }
            Clause::Keyword(keyword) => Box::new(TermQuery::new(
                Term::from_field_text(s.keyword, keyword),
                IndexRecordOption::Basic,
            )),
            Clause::DrillDown { dimension, label } => {
                let facet = Facet::from_path([dimension.as_str(), label.as_str()]);
                Box::new(TermQuery::new(
                    Term::from_facet(s.category, &facet),
                    IndexRecordOption::Basic,
                ))
            }
        })
    }

    fn fulltext_query(&self, parsed: &FulltextQuery) -> Box<dyn Query> {
        let field = self.schema.fulltext;
        match parsed {
            FulltextQuery::MatchAll => Box::new(AllQuery),
            FulltextQuery::MatchNone => Box::new(EmptyQuery),
            FulltextQuery::Term(text) => Box::new(TermQuery::new(
                Term::from_field_text(field, text),
                IndexRecordOption::WithFreqs,
            )),
            FulltextQuery::Phrase(terms) => Box::new(PhraseQuery::new_with_offset(
                terms
                    .iter()
                    .map(|(offset, text)| (*offset, Term::from_field_text(field, text)))
                    .collect(),
            )),
            FulltextQuery::Not(inner) => Box::new(BooleanQuery::new(vec![
                (Occur::MustNot, self.fulltext_query(inner)),
                (Occur::Must, Box::new(AllQuery) as Box<dyn Query>),
            ])),
            FulltextQuery::And(inner) => {
                must_all(inner.iter().map(|q| self.fulltext_query(q)).collect())
            }
        }
    }
}

fn must_all(queries: Vec<Box<dyn Query>>) -> Box<dyn Query> {
    Box::new(BooleanQuery::new(
        queries.into_iter().map(|q| (Occur::Must, q)).collect(),
    ))
}

impl std::fmt::Debug for QueryCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCompiler")
            .field("schema", &self.schema)
            .field("policy", &"<dyn SearchPolicy>")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
