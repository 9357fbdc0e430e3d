//! TOML assessment document source.
//!
//! Loads assessment documents from TOML files and directories, resolves them
//! into the typed [`AssessmentDefinition`] tree, and validates them.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::condition::{Comparator, TestNode};
use crate::error::DeliveryError;
use crate::model::{
    AssessmentControl, AssessmentDefinition, FeedbackContent, FeedbackRule, ItemDefinition,
    OutcomesProcessing, SectionDefinition,
};
use crate::scoring::ScoreModel;

/// A parsed, unresolved assessment document.
///
/// `assessment.sections` lists what is delivered, in order. Entries may be
/// inline sections or `sectionref`s naming a section defined anywhere in the
/// document, including the top-level `sections` pool. Items work the same
/// way with `itemref` and the top-level `items` pool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssessmentDocument {
    pub assessment: RawAssessment,
    #[serde(default)]
    pub sections: Vec<RawSection>,
    #[serde(default)]
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub assessfeedback: Vec<RawFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAssessment {
    pub ident: String,
    #[serde(default)]
    pub title: String,
    /// ISO-8601 duration, e.g. `PT10M`.
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub survey: bool,
    #[serde(default)]
    pub objectives: Option<String>,
    #[serde(default, rename = "assessmentcontrol", alias = "control")]
    pub control: Option<RawControl>,
    #[serde(default)]
    pub outcomes_processing: Option<RawOutcomes>,
    #[serde(default)]
    pub sections: Vec<RawSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawControl {
    #[serde(default, alias = "feedbackswitch")]
    pub feedback: Option<RawSwitch>,
    #[serde(default, alias = "hintswitch")]
    pub hints: Option<RawSwitch>,
    #[serde(default, alias = "solutionswitch")]
    pub solutions: Option<RawSwitch>,
}

/// A yes/no switch, written either as a TOML boolean or as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawSwitch {
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOutcomes {
    #[serde(default)]
    pub scoremodel: Option<String>,
    #[serde(default)]
    pub cutvalue: Option<f64>,
    #[serde(default)]
    pub feedback: Vec<RawFeedbackRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFeedbackRule {
    /// Identifier of the `assessfeedback` to show.
    pub ident: String,
    pub test: RawTest,
}

/// A condition node as written in the document, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTest {
    pub kind: String,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub children: Vec<RawTest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSection {
    #[serde(default)]
    pub ident: Option<String>,
    #[serde(default)]
    pub sectionref: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub objectives: Option<String>,
    #[serde(default)]
    pub outcomes_processing: Option<RawOutcomes>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub ident: Option<String>,
    #[serde(default)]
    pub itemref: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFeedback {
    pub ident: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

/// Parse a single TOML file into an `AssessmentDocument`.
pub fn parse_document(path: &Path) -> Result<AssessmentDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read assessment file: {}", path.display()))?;

    parse_document_str(&content, path)
}

/// Parse a TOML string into an `AssessmentDocument` (useful for testing).
pub fn parse_document_str(content: &str, source_path: &Path) -> Result<AssessmentDocument> {
    toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))
}

/// Parse and resolve a TOML file in one step.
pub fn parse_definition(path: &Path) -> Result<AssessmentDefinition> {
    let doc = parse_document(path)?;
    doc.resolve()
        .with_context(|| format!("failed to resolve assessment: {}", path.display()))
}

/// Recursively load all `.toml` assessment files from a directory.
pub fn load_document_directory(dir: &Path) -> Result<Vec<AssessmentDocument>> {
    let mut docs = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            docs.extend(load_document_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_document(&path) {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(docs)
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 duration (`PnYnMnWnDTnHnMnS`) into milliseconds.
///
/// Years count as 365 days and months as 30 days. Any component may carry a
/// decimal fraction. Returns `None` for anything that is not a duration.
pub fn parse_iso_duration(s: &str) -> Option<u64> {
    const SEC: f64 = 1_000.0;
    const MIN: f64 = 60.0 * SEC;
    const HOUR: f64 = 60.0 * MIN;
    const DAY: f64 = 24.0 * HOUR;

    let rest = s.trim().strip_prefix(['P', 'p'])?;
    let mut total = 0.0f64;
    let mut in_time = false;
    let mut number = String::new();
    let mut components = 0usize;
    let mut time_components = 0usize;

    for ch in rest.chars() {
        match ch.to_ascii_uppercase() {
            '0'..='9' => number.push(ch),
            '.' | ',' => number.push('.'),
            'T' => {
                if in_time || !number.is_empty() {
                    return None;
                }
                in_time = true;
            }
            unit => {
                let factor = match (in_time, unit) {
                    (false, 'Y') => 365.0 * DAY,
                    (false, 'M') => 30.0 * DAY,
                    (false, 'W') => 7.0 * DAY,
                    (false, 'D') => DAY,
                    (true, 'H') => HOUR,
                    (true, 'M') => MIN,
                    (true, 'S') => SEC,
                    _ => return None,
                };
                let value: f64 = number.parse().ok()?;
                number.clear();
                total += value * factor;
                components += 1;
                if in_time {
                    time_components += 1;
                }
            }
        }
    }

    if !number.is_empty() || components == 0 || (in_time && time_components == 0) {
        return None;
    }
    // Attempt clocks are i64 milliseconds; anything longer is capped there.
    if total >= i64::MAX as f64 {
        return Some(i64::MAX as u64);
    }
    Some(total.round() as u64)
}

/// Duration limit for a `duration` field.
///
/// Missing, zero, and unparsable durations all mean "no limit".
pub fn duration_limit(raw: Option<&str>) -> Option<u64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match parse_iso_duration(raw) {
        Some(0) => None,
        Some(ms) => Some(ms),
        None => {
            tracing::warn!("unparsable duration '{raw}', delivering without a time limit");
            None
        }
    }
}

/// Read a yes/no switch. Absent or malformed switches are on.
pub fn parse_switch(raw: Option<&RawSwitch>) -> bool {
    match raw {
        None => true,
        Some(RawSwitch::Bool(b)) => *b,
        Some(RawSwitch::Text(text)) => match text.trim().to_lowercase().as_str() {
            "yes" => true,
            "no" => false,
            other => {
                tracing::warn!("malformed switch value '{other}', treating as yes");
                true
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl RawTest {
    /// Map the tagged node onto the closed [`TestNode`] set.
    pub fn to_node(&self) -> Result<TestNode, DeliveryError> {
        match self.kind.trim() {
            "variable_test" => {
                let op = self.op.as_deref().ok_or_else(|| self.malformed("missing op"))?;
                let value = self.value.ok_or_else(|| self.malformed("missing value"))?;
                Ok(TestNode::variable(op.parse::<Comparator>()?, value))
            }
            "and_test" => Ok(TestNode::And(self.child_nodes()?)),
            "or_test" => Ok(TestNode::Or(self.child_nodes()?)),
            "not_test" => match self.children.as_slice() {
                [child] => Ok(TestNode::Not(Box::new(child.to_node()?))),
                _ => Err(self.malformed("expected exactly one child")),
            },
            other => Err(DeliveryError::UnsupportedTestKind(other.to_string())),
        }
    }

    fn child_nodes(&self) -> Result<Vec<TestNode>, DeliveryError> {
        self.children.iter().map(RawTest::to_node).collect()
    }

    fn malformed(&self, reason: &str) -> DeliveryError {
        DeliveryError::MalformedTest {
            kind: self.kind.clone(),
            reason: reason.to_string(),
        }
    }
}

impl AssessmentDocument {
    /// Resolve the document into an owned, typed tree.
    ///
    /// Every section and item reference is replaced by the definition it
    /// names; an unknown reference, scoring model, or condition fails the
    /// whole resolution. Resolution does not modify the document and yields
    /// the same tree every time.
    pub fn resolve(&self) -> Result<AssessmentDefinition, DeliveryError> {
        let section_pool = self.section_pool();
        let item_pool: HashMap<&str, &RawItem> = self
            .items
            .iter()
            .filter(|i| i.itemref.is_none())
            .filter_map(|i| i.ident.as_deref().map(|id| (id, i)))
            .collect();

        let mut sections = Vec::with_capacity(self.assessment.sections.len());
        for (pos, entry) in self.assessment.sections.iter().enumerate() {
            let concrete = match &entry.sectionref {
                Some(target) => *section_pool
                    .get(target.as_str())
                    .ok_or_else(|| DeliveryError::UnresolvedSectionRef(target.clone()))?,
                None => entry,
            };
            let ident = concrete
                .ident
                .clone()
                .unwrap_or_else(|| format!("{}-s{}", self.assessment.ident, pos + 1));
            sections.push(resolve_section(ident, concrete, &item_pool)?);
        }

        if sections.is_empty() {
            return Err(DeliveryError::NoSections(self.assessment.ident.clone()));
        }

        let outcomes = match &self.assessment.outcomes_processing {
            Some(raw) => self.resolve_outcomes(raw)?,
            None => OutcomesProcessing::default(),
        };

        let control = match &self.assessment.control {
            Some(c) => AssessmentControl {
                feedback: parse_switch(c.feedback.as_ref()),
                hints: parse_switch(c.hints.as_ref()),
                solutions: parse_switch(c.solutions.as_ref()),
            },
            None => AssessmentControl::default(),
        };

        let definition = AssessmentDefinition {
            ident: self.assessment.ident.clone(),
            title: self.assessment.title.clone(),
            duration_limit_ms: duration_limit(self.assessment.duration.as_deref()),
            control,
            objectives: self.assessment.objectives.clone(),
            outcomes,
            survey: self.assessment.survey,
            sections,
        };

        tracing::debug!(
            assessment = %definition.ident,
            sections = definition.sections.len(),
            items = definition.item_count(),
            "resolved assessment"
        );

        Ok(definition)
    }

    /// Concrete sections addressable by `sectionref`. The top-level pool takes
    /// precedence over inline sections with the same ident.
    fn section_pool(&self) -> HashMap<&str, &RawSection> {
        let mut pool = HashMap::new();
        let concrete = self
            .sections
            .iter()
            .chain(self.assessment.sections.iter())
            .filter(|s| s.sectionref.is_none());
        for section in concrete {
            if let Some(ident) = section.ident.as_deref() {
                pool.entry(ident).or_insert(section);
            }
        }
        pool
    }

    fn resolve_outcomes(&self, raw: &RawOutcomes) -> Result<OutcomesProcessing, DeliveryError> {
        let score_model = ScoreModel::from_definition(raw.scoremodel.as_deref())?;

        let feedback_rules = raw
            .feedback
            .iter()
            .map(|rule| -> Result<FeedbackRule, DeliveryError> {
                let content = self
                    .assessfeedback
                    .iter()
                    .find(|f| f.ident == rule.ident)
                    .map(|f| FeedbackContent {
                        ident: f.ident.clone(),
                        title: f.title.clone(),
                        text: f.text.clone(),
                    });
                if content.is_none() {
                    tracing::warn!("feedback rule references unknown feedback '{}'", rule.ident);
                }
                Ok(FeedbackRule {
                    feedback_ident: rule.ident.clone(),
                    condition: rule.test.to_node()?,
                    content,
                })
            })
            .collect::<Result<Vec<_>, DeliveryError>>()?;

        Ok(OutcomesProcessing {
            score_model,
            cut_value: raw.cutvalue,
            feedback_rules,
        })
    }
}

fn resolve_section(
    ident: String,
    raw: &RawSection,
    item_pool: &HashMap<&str, &RawItem>,
) -> Result<SectionDefinition, DeliveryError> {
    let (score_model, cut_value) = match &raw.outcomes_processing {
        Some(op) => (ScoreModel::from_definition(op.scoremodel.as_deref())?, op.cutvalue),
        None => (ScoreModel::default(), None),
    };

    let items = raw
        .items
        .iter()
        .enumerate()
        .map(|(pos, entry)| -> Result<ItemDefinition, DeliveryError> {
            let concrete = match &entry.itemref {
                Some(target) => *item_pool
                    .get(target.as_str())
                    .ok_or_else(|| DeliveryError::UnresolvedItemRef(target.clone()))?,
                None => entry,
            };
            Ok(ItemDefinition {
                ident: concrete
                    .ident
                    .clone()
                    .unwrap_or_else(|| format!("{ident}-i{}", pos + 1)),
                title: concrete.title.clone(),
                max_score: concrete.max_score,
            })
        })
        .collect::<Result<Vec<_>, DeliveryError>>()?;

    Ok(SectionDefinition {
        ident,
        title: raw.title.clone(),
        objectives: raw.objectives.clone(),
        score_model,
        cut_value,
        items,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A warning from document validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The section or item ident (if applicable).
    pub location: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn at(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            message: message.into(),
        }
    }

    fn global(message: impl Into<String>) -> Self {
        Self {
            location: None,
            message: message.into(),
        }
    }
}

/// Validate a document for issues that do not prevent delivery.
pub fn validate_document(doc: &AssessmentDocument) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let assessment = &doc.assessment;

    if let Some(raw) = assessment.duration.as_deref() {
        if !raw.trim().is_empty() && parse_iso_duration(raw).is_none() {
            warnings.push(ValidationWarning::global(format!(
                "unparsable duration '{raw}', attempt will be unlimited"
            )));
        }
    }

    // Duplicate section idents across the document
    let mut seen_sections = HashSet::new();
    for section in doc.sections.iter().chain(assessment.sections.iter()) {
        if let Some(ident) = section.ident.as_deref() {
            if section.sectionref.is_none() && !seen_sections.insert(ident) {
                warnings.push(ValidationWarning::at(
                    ident,
                    format!("duplicate section ident: {ident}"),
                ));
            }
        }
    }

    if let Some(op) = &assessment.outcomes_processing {
        if is_number_correct(op) && op.cutvalue.is_none() {
            warnings.push(ValidationWarning::global(
                "NumberCorrect scoring without cutvalue: no section can count as correct",
            ));
        }
        for rule in &op.feedback {
            if !doc.assessfeedback.iter().any(|f| f.ident == rule.ident) {
                warnings.push(ValidationWarning::global(format!(
                    "feedback rule references unknown feedback '{}'",
                    rule.ident
                )));
            }
        }
        if !op.feedback.is_empty() && assessment.survey {
            warnings.push(ValidationWarning::global(
                "survey assessments are not scored, feedback rules will never fire",
            ));
        }
    }

    let mut seen_items = HashSet::new();
    let all_sections = doc.sections.iter().chain(assessment.sections.iter());
    for section in all_sections.filter(|s| s.sectionref.is_none()) {
        let location = section.ident.clone().unwrap_or_else(|| section.title.clone());
        if let Some(op) = &section.outcomes_processing {
            if is_number_correct(op) && op.cutvalue.is_none() {
                warnings.push(ValidationWarning::at(
                    &location,
                    "NumberCorrect scoring without cutvalue: section score is always 0",
                ));
            }
        }
        for item in &section.items {
            check_item(item, &mut seen_items, &mut warnings);
        }
    }
    for item in &doc.items {
        check_item(item, &mut seen_items, &mut warnings);
    }

    warnings
}

/// Concrete items only; `itemref` entries point at an item checked elsewhere.
fn check_item<'a>(
    item: &'a RawItem,
    seen: &mut HashSet<&'a str>,
    warnings: &mut Vec<ValidationWarning>,
) {
    if item.itemref.is_some() {
        return;
    }
    let Some(ident) = item.ident.as_deref() else {
        return;
    };
    if !seen.insert(ident) {
        warnings.push(ValidationWarning::at(
            ident,
            format!("duplicate item ident: {ident}"),
        ));
        return;
    }
    if item.max_score.is_none() {
        warnings.push(ValidationWarning::at(
            ident,
            "item has no max_score, maximum score will be unknown",
        ));
    }
}

fn is_number_correct(op: &RawOutcomes) -> bool {
    op.scoremodel.as_deref().map(str::trim) == Some("NumberCorrect")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[assessment]
ident = "quiz-1"
title = "Geography Quiz"
duration = "PT10M"
objectives = "Capitals of Europe"

[assessment.assessmentcontrol]
feedback = "Yes"
hints = "no"

[assessment.outcomes_processing]
scoremodel = "SumOfScores"
cutvalue = 5.0

[[assessment.outcomes_processing.feedback]]
ident = "fb-pass"
test = { kind = "variable_test", op = "gte", value = 5.0 }

[[assessment.outcomes_processing.feedback]]
ident = "fb-fail"
test = { kind = "not_test", children = [{ kind = "variable_test", op = "gte", value = 5.0 }] }

[[assessment.sections]]
ident = "s-west"
title = "Western Europe"

[[assessment.sections.items]]
ident = "q-france"
title = "France"
max_score = 2.0

[[assessment.sections.items]]
itemref = "q-spain"

[[assessment.sections]]
sectionref = "s-east"

[[sections]]
ident = "s-east"
title = "Eastern Europe"

[[sections.items]]
ident = "q-poland"
max_score = 3.0

[[items]]
ident = "q-spain"
title = "Spain"
max_score = 1.0

[[assessfeedback]]
ident = "fb-pass"
title = "Passed"
text = "Well done."

[[assessfeedback]]
ident = "fb-fail"
title = "Not yet"
text = "Review the material."
"#;

    fn doc(content: &str) -> AssessmentDocument {
        parse_document_str(content, &PathBuf::from("test.toml")).unwrap()
    }

    #[test]
    fn parse_and_resolve_valid_toml() {
        let def = doc(VALID_TOML).resolve().unwrap();
        assert_eq!(def.ident, "quiz-1");
        assert_eq!(def.duration_limit_ms, Some(600_000));
        assert!(def.control.feedback);
        assert!(!def.control.hints);
        assert!(def.control.solutions);
        assert_eq!(def.outcomes.cut_value, Some(5.0));
        assert_eq!(def.outcomes.feedback_rules.len(), 2);
        assert_eq!(
            def.outcomes.feedback_rules[0].content.as_ref().map(|c| c.title.as_str()),
            Some("Passed")
        );

        let idents: Vec<_> = def.sections.iter().map(|s| s.ident.as_str()).collect();
        assert_eq!(idents, ["s-west", "s-east"]);
        assert_eq!(def.sections[0].items[1].ident, "q-spain");
        assert_eq!(def.sections[0].items[1].max_score, Some(1.0));
        assert_eq!(def.item_count(), 3);
    }

    #[test]
    fn resolving_twice_yields_same_tree() {
        let d = doc(VALID_TOML);
        let first = d.resolve().unwrap();
        let second = d.resolve().unwrap();
        assert_eq!(first, second);
        let order = |def: &AssessmentDefinition| {
            def.sections.iter().map(|s| s.ident.clone()).collect::<Vec<_>>()
        };
        assert_eq!(order(&first), order(&second));
    }

    #[test]
    fn unresolved_section_ref_is_fatal() {
        let d = doc(
            r#"
[assessment]
ident = "a"

[[assessment.sections]]
sectionref = "missing"
"#,
        );
        assert_eq!(
            d.resolve().unwrap_err(),
            DeliveryError::UnresolvedSectionRef("missing".into())
        );
    }

    #[test]
    fn unresolved_item_ref_is_fatal() {
        let d = doc(
            r#"
[assessment]
ident = "a"

[[assessment.sections]]
ident = "s"
items = [{ itemref = "ghost" }]
"#,
        );
        assert_eq!(
            d.resolve().unwrap_err(),
            DeliveryError::UnresolvedItemRef("ghost".into())
        );
    }

    #[test]
    fn unknown_score_model_is_fatal() {
        let d = doc(
            r#"
[assessment]
ident = "a"

[assessment.outcomes_processing]
scoremodel = "BestOfN"

[[assessment.sections]]
ident = "s"
"#,
        );
        assert_eq!(
            d.resolve().unwrap_err(),
            DeliveryError::UnsupportedScoreModel("BestOfN".into())
        );
    }

    #[test]
    fn unknown_test_kind_is_fatal() {
        let d = doc(
            r#"
[assessment]
ident = "a"

[assessment.outcomes_processing]
feedback = [{ ident = "f", test = { kind = "xor_test" } }]

[[assessment.sections]]
ident = "s"
"#,
        );
        assert_eq!(
            d.resolve().unwrap_err(),
            DeliveryError::UnsupportedTestKind("xor_test".into())
        );
    }

    #[test]
    fn empty_assessment_is_rejected() {
        let d = doc("[assessment]\nident = \"empty\"\n");
        assert_eq!(
            d.resolve().unwrap_err(),
            DeliveryError::NoSections("empty".into())
        );
    }

    #[test]
    fn nested_test_tree() {
        let raw = RawTest {
            kind: "and_test".into(),
            op: None,
            value: None,
            children: vec![
                RawTest {
                    kind: "variable_test".into(),
                    op: Some("gt".into()),
                    value: Some(1.0),
                    children: vec![],
                },
                RawTest {
                    kind: "or_test".into(),
                    op: None,
                    value: None,
                    children: vec![],
                },
            ],
        };
        let node = raw.to_node().unwrap();
        assert_eq!(
            node,
            TestNode::And(vec![
                TestNode::variable(Comparator::Gt, 1.0),
                TestNode::Or(vec![]),
            ])
        );
    }

    #[test]
    fn not_test_requires_one_child() {
        let raw = RawTest {
            kind: "not_test".into(),
            op: None,
            value: None,
            children: vec![],
        };
        assert!(matches!(
            raw.to_node(),
            Err(DeliveryError::MalformedTest { .. })
        ));
    }

    #[test]
    fn iso_durations() {
        assert_eq!(parse_iso_duration("PT10M"), Some(600_000));
        assert_eq!(parse_iso_duration("PT1H30M"), Some(5_400_000));
        assert_eq!(parse_iso_duration("P1DT1S"), Some(86_401_000));
        assert_eq!(parse_iso_duration("PT0.5S"), Some(500));
        assert_eq!(parse_iso_duration("pt2m"), Some(120_000));
        assert_eq!(parse_iso_duration("P1W"), Some(604_800_000));
        assert_eq!(parse_iso_duration("PT"), None);
        assert_eq!(parse_iso_duration("P"), None);
        assert_eq!(parse_iso_duration("10 minutes"), None);
        assert_eq!(parse_iso_duration("PT5"), None);
        assert_eq!(parse_iso_duration("P5H"), None);
    }

    #[test]
    fn huge_duration_is_capped_to_clock_range() {
        assert_eq!(parse_iso_duration("P300000000Y"), Some(i64::MAX as u64));
        assert_eq!(duration_limit(Some("P300000000Y")), Some(i64::MAX as u64));
    }

    #[test]
    fn unusable_durations_mean_unlimited() {
        assert_eq!(duration_limit(None), None);
        assert_eq!(duration_limit(Some("")), None);
        assert_eq!(duration_limit(Some("PT0S")), None);
        assert_eq!(duration_limit(Some("soon")), None);
        assert_eq!(duration_limit(Some("PT1S")), Some(1_000));
    }

    #[test]
    fn switches_default_to_yes() {
        assert!(parse_switch(None));
        assert!(parse_switch(Some(&RawSwitch::Text("YES".into()))));
        assert!(!parse_switch(Some(&RawSwitch::Text("No".into()))));
        assert!(parse_switch(Some(&RawSwitch::Text("perhaps".into()))));
        assert!(!parse_switch(Some(&RawSwitch::Bool(false))));
    }

    #[test]
    fn validate_reports_soft_issues() {
        let d = doc(
            r#"
[assessment]
ident = "a"
duration = "ten minutes"

[assessment.outcomes_processing]
scoremodel = "NumberCorrect"
feedback = [{ ident = "nowhere", test = { kind = "variable_test", op = "gt", value = 0.0 } }]

[[assessment.sections]]
ident = "s"
items = [{ ident = "i1" }]

[[sections]]
ident = "s"
"#,
        );
        let warnings = validate_document(&d);
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));
        assert!(has("unparsable duration"));
        assert!(has("without cutvalue"));
        assert!(has("unknown feedback"));
        assert!(has("duplicate section"));
        assert!(has("no max_score"));
    }

    #[test]
    fn validate_reports_duplicate_items() {
        let content = r#"
[assessment]
ident = "dups"

[[assessment.sections]]
ident = "s1"
items = [{ ident = "q1", max_score = 1.0 }, { ident = "q1", max_score = 1.0 }]

[[assessment.sections]]
ident = "s2"
items = [{ itemref = "q2" }, { itemref = "q2" }]

[[items]]
ident = "q2"
max_score = 1.0

[[items]]
ident = "q2"
max_score = 1.0
"#;
        let warnings = validate_document(&doc(content));
        let dups: Vec<_> = warnings
            .iter()
            .filter(|w| w.message.starts_with("duplicate item ident"))
            .collect();
        assert_eq!(dups.len(), 2, "warnings: {warnings:?}");
        assert_eq!(dups[0].message, "duplicate item ident: q1");
        assert_eq!(dups[1].location.as_deref(), Some("q2"));
    }

    #[test]
    fn validate_checks_pooled_items() {
        let content = r#"
[assessment]
ident = "pool"

[[assessment.sections]]
ident = "s1"
items = [{ itemref = "q-pool" }]

[[items]]
ident = "q-pool"
"#;
        let warnings = validate_document(&doc(content));
        assert!(warnings.iter().any(|w| {
            w.location.as_deref() == Some("q-pool") && w.message.contains("no max_score")
        }));
    }

    #[test]
    fn validate_clean_document() {
        let warnings = validate_document(&doc(VALID_TOML));
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_document_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quiz.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [toml").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = load_document_directory(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].assessment.ident, "quiz-1");
    }
}
