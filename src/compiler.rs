//! Dataset-wide compilation of module records.
//!
//! [`compile`] validates every module code, parses each record's
//! prerequisite and preclusion text, builds the presentation tree and finally
//! inverts all prerequisite trees into each module's locked-module list.

use std::{collections::BTreeSet, fmt};

use petgraph::{graphmap::DiGraphMap, Direction};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;
use tracing::instrument;

use crate::{
    diagnostics::{DiagnosticSink, Field},
    domain::{
        module_code::{contains_module_code, contains_operator},
        Config, ModuleCode, ModuleRecord, PresentationNode, RequisiteNode, RestrictedKeywords,
    },
    requisite::{parse_requisite, Recovered},
};

/// Errors that abort a compilation run.
///
/// These concern the identity of modules themselves, so no partial result is
/// produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// A module code does not match the module code pattern.
    #[error("Module {code}'s module code does not match the module code pattern")]
    InvalidModuleCode {
        /// The offending code.
        code: String,
    },
    /// A module code contains an operator word or character.
    #[error("Module {code}'s module code contains operators")]
    ContainsOperator {
        /// The offending code.
        code: String,
    },
}

/// Compiles a dataset of module records.
///
/// Every record comes back, in input order, with its parsed requisites (where
/// the text could be parsed), its presentation tree and its locked modules.
/// Recoverable parse problems go to `sink`.
///
/// # Errors
///
/// Fails before any parsing if a module code is malformed or contains an
/// operator.
#[instrument(level = "debug", skip_all, fields(records = records.len()))]
pub fn compile(
    mut records: Vec<ModuleRecord>,
    config: &Config,
    mut sink: impl DiagnosticSink,
) -> Result<Vec<ModuleRecord>, CompileError> {
    let codes = validate(&records)?;

    let parsed: Vec<ParsedFields> = if config.parallel {
        records
            .par_iter()
            .zip(codes.par_iter())
            .map(|(record, code)| ParsedFields::parse(code, record, &config.restricted_keywords))
            .collect()
    } else {
        records
            .iter()
            .zip(&codes)
            .map(|(record, code)| ParsedFields::parse(code, record, &config.restricted_keywords))
            .collect()
    };

    for ((record, code), fields) in records.iter_mut().zip(&codes).zip(parsed) {
        record.parsed_prerequisite = fields.prerequisite.and_then(|result| {
            report(&mut sink, code, Field::Prerequisite, result)
        });
        record.parsed_preclusion = fields
            .preclusion
            .and_then(|result| report(&mut sink, code, Field::Preclusion, result));
        record.presentation_tree = Some(PresentationNode::for_module(
            code,
            record.parsed_prerequisite.as_ref(),
        ));
    }

    let locked = locked_modules(&records, &codes);
    for (record, locked) in records.iter_mut().zip(locked) {
        record.locked_modules = locked;
    }

    tracing::info!("{}", Summary::of(&records));
    Ok(records)
}

/// Checks every distinct module code in the dataset.
///
/// Returns the validated code of each record, in record order.
fn validate(records: &[ModuleRecord]) -> Result<Vec<ModuleCode>, CompileError> {
    let distinct: BTreeSet<&str> = records.iter().map(|r| r.module_code.as_str()).collect();
    for code in distinct {
        if !contains_module_code(code) {
            return Err(CompileError::InvalidModuleCode {
                code: code.to_string(),
            });
        }
        if contains_operator(code) {
            return Err(CompileError::ContainsOperator {
                code: code.to_string(),
            });
        }
    }

    records
        .iter()
        .map(|record| {
            ModuleCode::new(record.module_code.clone()).map_err(|_| {
                CompileError::InvalidModuleCode {
                    code: record.module_code.clone(),
                }
            })
        })
        .collect()
}

/// Parse results for one record, before diagnostics are reported.
struct ParsedFields {
    prerequisite: Option<Recovered<Option<RequisiteNode>>>,
    preclusion: Option<Recovered<Option<RequisiteNode>>>,
}

impl ParsedFields {
    fn parse(code: &ModuleCode, record: &ModuleRecord, keywords: &RestrictedKeywords) -> Self {
        Self {
            prerequisite: parse_field(code, Field::Prerequisite, record.prerequisite.as_deref(), keywords),
            preclusion: parse_field(code, Field::Preclusion, record.preclusion.as_deref(), keywords),
        }
    }
}

/// Parses one field, or returns `None` if the text is absent or cannot be
/// expressed as module logic.
fn parse_field(
    code: &ModuleCode,
    field: Field,
    text: Option<&str>,
    keywords: &RestrictedKeywords,
) -> Option<Recovered<Option<RequisiteNode>>> {
    let text = text?;
    if let Some(keyword) = keywords.find_in(text) {
        tracing::trace!(module_code = %code, %field, keyword, "restricted keyword, not parsing");
        return None;
    }
    if !contains_module_code(text) {
        tracing::trace!(module_code = %code, %field, "no module codes, not parsing");
        return None;
    }

    tracing::debug!(module_code = %code, %field, text, "parsing");
    Some(parse_requisite(code, text))
}

fn report(
    sink: &mut impl DiagnosticSink,
    code: &ModuleCode,
    field: Field,
    result: Recovered<Option<RequisiteNode>>,
) -> Option<RequisiteNode> {
    let (value, diagnostics) = result.into_parts();
    for diagnostic in diagnostics {
        sink.report(code, field, diagnostic);
    }
    value
}

/// For every record, the modules whose prerequisite mentions it.
///
/// Edges run from a prerequisite to the module that requires it. Mentions of
/// modules outside the dataset are ignored. Records sharing a code share the
/// same list.
fn locked_modules(records: &[ModuleRecord], codes: &[ModuleCode]) -> Vec<Vec<ModuleCode>> {
    let known: BTreeSet<&ModuleCode> = codes.iter().collect();
    let mut graph: DiGraphMap<&ModuleCode, ()> = DiGraphMap::with_capacity(known.len(), known.len());
    for &code in &known {
        graph.add_node(code);
    }

    for (record, code) in records.iter().zip(codes) {
        let Some(prerequisite) = &record.parsed_prerequisite else {
            continue;
        };
        for mentioned in prerequisite.modules() {
            if let Some(target) = known.get(mentioned) {
                graph.add_edge(*target, code, ());
            }
        }
    }

    codes
        .iter()
        .map(|code| {
            let mut locked: Vec<ModuleCode> = graph
                .neighbors_directed(code, Direction::Outgoing)
                .cloned()
                .collect();
            locked.sort();
            locked
        })
        .collect()
}

/// Counts describing a compiled dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Number of records.
    pub records: usize,
    /// Records with a parsed prerequisite.
    pub prerequisites: usize,
    /// Records with a parsed preclusion.
    pub preclusions: usize,
    /// Total entries across all locked-module lists.
    pub locked_links: usize,
}

impl Summary {
    /// Counts the derived fields of compiled records.
    #[must_use]
    pub fn of(records: &[ModuleRecord]) -> Self {
        records.iter().fold(Self::default(), |summary, record| Self {
            records: summary.records + 1,
            prerequisites: summary.prerequisites + usize::from(record.parsed_prerequisite.is_some()),
            preclusions: summary.preclusions + usize::from(record.parsed_preclusion.is_some()),
            locked_links: summary.locked_links + record.locked_modules.len(),
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compiled {} modules: {} prerequisites, {} preclusions, {} locked links",
            self.records, self.prerequisites, self.preclusions, self.locked_links
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;

    fn code(s: &str) -> ModuleCode {
        ModuleCode::try_from(s).unwrap()
    }

    fn leaf(s: &str) -> RequisiteNode {
        RequisiteNode::Leaf(code(s))
    }

    fn compile_default(records: Vec<ModuleRecord>) -> Vec<ModuleRecord> {
        compile(records, &Config::default(), Vec::<Diagnostic>::new()).unwrap()
    }

    fn find<'a>(records: &'a [ModuleRecord], module: &str) -> &'a ModuleRecord {
        records.iter().find(|r| r.module_code == module).unwrap()
    }

    #[test]
    fn parses_both_fields() {
        let records = compile_default(vec![
            ModuleRecord::new("CS2040")
                .with_prerequisite("CS1010 or CS1101S")
                .with_preclusion("CS2020, CS2010"),
        ]);

        let record = &records[0];
        assert_eq!(
            record.parsed_prerequisite,
            Some(RequisiteNode::Or(vec![leaf("CS1010"), leaf("CS1101S")]))
        );
        assert_eq!(
            record.parsed_preclusion,
            Some(RequisiteNode::Or(vec![leaf("CS2020"), leaf("CS2010")]))
        );
        assert_eq!(record.prerequisite.as_deref(), Some("CS1010 or CS1101S"));
    }

    #[test]
    fn restricted_keywords_leave_text_unparsed() {
        let records = compile_default(vec![
            ModuleRecord::new("CS3203").with_prerequisite("CS2103 with a grade of at least B"),
        ]);
        assert!(records[0].parsed_prerequisite.is_none());
        assert_eq!(
            records[0].prerequisite.as_deref(),
            Some("CS2103 with a grade of at least B")
        );
    }

    #[test]
    fn text_without_modules_is_left_unparsed() {
        let records =
            compile_default(vec![ModuleRecord::new("CS4248").with_prerequisite("Permission of instructor")]);
        assert!(records[0].parsed_prerequisite.is_none());
    }

    #[test]
    fn self_reference_only_is_left_unparsed() {
        let records = compile_default(vec![ModuleRecord::new("CS1010S").with_preclusion("CS1010")]);
        assert!(records[0].parsed_preclusion.is_none());
    }

    #[test]
    fn every_record_gets_a_presentation_tree() {
        let records = compile_default(vec![
            ModuleRecord::new("CS1010"),
            ModuleRecord::new("CS2040").with_prerequisite("CS1010"),
        ]);

        assert_eq!(
            records[0].presentation_tree,
            Some(PresentationNode::leaf("CS1010"))
        );
        assert_eq!(
            records[1].presentation_tree,
            Some(PresentationNode {
                name: "CS2040".into(),
                children: vec![PresentationNode::leaf("CS1010")],
            })
        );
    }

    #[test]
    fn prerequisites_lock_modules() {
        let records = compile_default(vec![
            ModuleRecord::new("CS1010"),
            ModuleRecord::new("CS1231"),
            ModuleRecord::new("CS2040").with_prerequisite("CS1010 and (CS1231 or MA1100)"),
            ModuleRecord::new("CS2030").with_prerequisite("CS1010"),
        ]);

        assert_eq!(find(&records, "CS1010").locked_modules, [code("CS2030"), code("CS2040")]);
        assert_eq!(find(&records, "CS1231").locked_modules, [code("CS2040")]);
        assert!(find(&records, "CS2040").locked_modules.is_empty());
    }

    #[test]
    fn two_letter_suffixes_are_whole_codes() {
        let records = compile_default(vec![
            ModuleRecord::new("CS1010FC"),
            ModuleRecord::new("CS2040").with_prerequisite("CS1010FC"),
        ]);

        assert_eq!(records[1].parsed_prerequisite, Some(leaf("CS1010FC")));
        assert_eq!(find(&records, "CS1010FC").locked_modules, [code("CS2040")]);
    }

    #[test]
    fn modules_outside_dataset_lock_nothing() {
        let records = compile_default(vec![ModuleRecord::new("CS2040").with_prerequisite("CS1010")]);
        assert!(records[0].locked_modules.is_empty());
        assert_eq!(records[0].parsed_prerequisite, Some(leaf("CS1010")));
    }

    #[test]
    fn preclusions_do_not_lock_modules() {
        let records = compile_default(vec![
            ModuleRecord::new("CS1010"),
            ModuleRecord::new("CS1101S").with_preclusion("CS1010"),
        ]);
        assert!(find(&records, "CS1010").locked_modules.is_empty());
    }

    #[test]
    fn malformed_module_code_aborts() {
        let err = compile(
            vec![ModuleRecord::new("CS1010"), ModuleRecord::new("Intro to CS")],
            &Config::default(),
            Vec::<Diagnostic>::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidModuleCode {
                code: "Intro to CS".into()
            }
        );
    }

    #[test]
    fn module_code_with_operator_aborts() {
        let err = compile(
            vec![ModuleRecord::new("CS1010/CS1101S")],
            &Config::default(),
            Vec::<Diagnostic>::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::ContainsOperator {
                code: "CS1010/CS1101S".into()
            }
        );
    }

    #[test]
    fn code_with_extra_characters_aborts() {
        let err = compile(vec![ModuleRecord::new("xCS1010")], &Config::default(), Vec::<Diagnostic>::new())
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidModuleCode { code } if code == "xCS1010"));
    }

    #[test]
    fn diagnostics_reach_the_sink() {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let records = compile(
            vec![ModuleRecord::new("CS3230").with_prerequisite("(CS2040 or CS2040S and CS1231")],
            &Config::default(),
            &mut diagnostics,
        )
        .unwrap();

        assert!(records[0].parsed_prerequisite.is_some());
        assert!(matches!(
            diagnostics.first(),
            Some(Diagnostic::UnbalancedParentheses { .. })
        ));
    }

    #[test]
    fn parallel_matches_sequential() {
        let dataset = vec![
            ModuleRecord::new("CS1010"),
            ModuleRecord::new("CS1231").with_preclusion("MA1100"),
            ModuleRecord::new("CS2040").with_prerequisite("CS1010 and CS1231"),
            ModuleRecord::new("CS3230").with_prerequisite("CS2040 and (CS1231 or MA1100)"),
        ];
        let parallel = Config {
            parallel: true,
            ..Config::default()
        };

        let sequential = compile(dataset.clone(), &Config::default(), Vec::<Diagnostic>::new()).unwrap();
        let concurrent = compile(dataset, &parallel, Vec::<Diagnostic>::new()).unwrap();
        assert_eq!(sequential, concurrent);
    }

    #[test]
    fn summary_counts_derived_fields() {
        let records = compile_default(vec![
            ModuleRecord::new("CS1010"),
            ModuleRecord::new("CS2040")
                .with_prerequisite("CS1010")
                .with_preclusion("CS2020"),
        ]);
        assert_eq!(
            Summary::of(&records),
            Summary {
                records: 2,
                prerequisites: 1,
                preclusions: 1,
                locked_links: 1,
            }
        );
    }
}
