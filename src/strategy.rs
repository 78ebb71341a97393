//! Per-field input strategies and the role mapping that selects them.
//!
//! Roles come from what the page says about a field (its `type`, its label).
//! Position is only consulted for fields that expose neither.

use chrono::NaiveDate;

use crate::config::FormConfig;
use crate::error::{Error, Result};
use crate::surface::{FieldProbe, FormSurface};

/// Literal formats accepted for a date question, tried in order.
/// Slashed dates are read month-first.
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Text,
    Date,
    Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStrategy {
    /// Click, then send the literal as keystrokes.
    Keystroke,
    /// Write a canonical `YYYY-MM-DD` into `value` and fire `input` + `change`.
    DirectAssignWithNotify,
    /// Click, then type month, day and year digits into a native date widget.
    StructuredWidget,
}

/// Parse a date literal in any accepted format.
pub fn parse_date(literal: &str) -> Result<NaiveDate> {
    let trimmed = literal.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| Error::InvalidDate(literal.to_string()))
}

/// `06/23/2004` → `2004-06-23`.
pub fn canonical_date(literal: &str) -> Result<String> {
    Ok(parse_date(literal)?.format("%Y-%m-%d").to_string())
}

/// Whole-word match, so "Dobson" is not a date of birth.
fn label_names_date(label: &str, keywords: &[String]) -> bool {
    let label = label.to_lowercase();
    label
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| keywords.iter().any(|keyword| keyword.eq_ignore_ascii_case(word)))
}

/// Role of one indexed field.
pub fn resolve_role(ordinal: usize, probe: &FieldProbe, config: &FormConfig) -> FieldRole {
    if probe.input_type.as_deref() == Some("date") {
        return FieldRole::Date;
    }
    match probe.label.as_deref() {
        Some(label) if label_names_date(label, &config.date_keywords) => FieldRole::Date,
        Some(_) => FieldRole::Text,
        None if config.date_ordinal == Some(ordinal) => FieldRole::Date,
        None => FieldRole::Text,
    }
}

/// Roles for a whole discovered sequence. More than one date field is
/// rejected instead of guessing which one the record's date belongs to.
pub fn resolve_roles<'a>(
    probes: impl IntoIterator<Item = &'a FieldProbe>,
    config: &FormConfig,
) -> Result<Vec<FieldRole>> {
    let roles: Vec<FieldRole> = probes
        .into_iter()
        .enumerate()
        .map(|(ordinal, probe)| resolve_role(ordinal, probe, config))
        .collect();

    let dates: Vec<usize> = roles
        .iter()
        .enumerate()
        .filter(|(_, role)| **role == FieldRole::Date)
        .map(|(ordinal, _)| ordinal)
        .collect();
    if dates.len() > 1 {
        return Err(Error::AmbiguousRole(dates));
    }
    Ok(roles)
}

pub fn strategy_for(role: FieldRole, config: &FormConfig) -> InputStrategy {
    match role {
        FieldRole::Text | FieldRole::Address => InputStrategy::Keystroke,
        FieldRole::Date => config.date_strategy,
    }
}

/// Apply `strategy` to `field`. Returns the text that ended up in the field.
pub async fn apply<S: FormSurface>(
    surface: &S,
    field: &S::Field,
    strategy: InputStrategy,
    literal: &str,
) -> Result<String> {
    match strategy {
        InputStrategy::Keystroke => {
            surface.click(field).await?;
            surface.type_text(field, literal).await?;
            Ok(literal.to_string())
        }
        InputStrategy::DirectAssignWithNotify => {
            let value = canonical_date(literal)?;
            surface.click(field).await?;
            surface.assign_with_notify(field, &value).await?;
            Ok(value)
        }
        InputStrategy::StructuredWidget => {
            let date = parse_date(literal)?;
            surface.click(field).await?;
            surface
                .type_text(field, &date.format("%m%d%Y").to_string())
                .await?;
            Ok(date.format("%Y-%m-%d").to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(label: &str) -> FieldProbe {
        FieldProbe {
            label: Some(label.to_string()),
            input_type: Some("text".to_string()),
        }
    }

    #[test]
    fn us_date_is_canonicalized() {
        assert_eq!(canonical_date("06/23/2004").unwrap(), "2004-06-23");
    }

    #[test]
    fn canonical_input_passes_through() {
        assert_eq!(canonical_date(" 2004-06-23 ").unwrap(), "2004-06-23");
        assert_eq!(canonical_date("23.06.2004").unwrap(), "2004-06-23");
        assert_eq!(canonical_date("2004/06/23").unwrap(), "2004-06-23");
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert!(matches!(canonical_date("13/40/2004"), Err(Error::InvalidDate(_))));
        assert!(matches!(canonical_date("Male"), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn unlabelled_fields_fall_back_to_ordinal() {
        let config = FormConfig::default();
        let blank = FieldProbe::default();
        assert_eq!(resolve_role(4, &blank, &config), FieldRole::Date);
        assert_eq!(resolve_role(3, &blank, &config), FieldRole::Text);
    }

    #[test]
    fn label_beats_position() {
        let config = FormConfig::default();
        assert_eq!(resolve_role(4, &labelled("Full name"), &config), FieldRole::Text);
        assert_eq!(resolve_role(1, &labelled("Date of Birth"), &config), FieldRole::Date);
        assert_eq!(resolve_role(2, &labelled("Last update"), &config), FieldRole::Text);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let config = FormConfig::default();
        assert_eq!(resolve_role(0, &labelled("Dobson"), &config), FieldRole::Text);
        assert_eq!(resolve_role(0, &labelled("Birthplace"), &config), FieldRole::Text);
        assert_eq!(resolve_role(0, &labelled("Updated"), &config), FieldRole::Text);
        assert_eq!(resolve_role(0, &labelled("DOB"), &config), FieldRole::Date);
        assert_eq!(resolve_role(0, &labelled("Your birthday"), &config), FieldRole::Date);
    }

    #[test]
    fn native_date_input_is_a_date() {
        let config = FormConfig::default();
        let probe = FieldProbe {
            label: None,
            input_type: Some("date".to_string()),
        };
        assert_eq!(resolve_role(0, &probe, &config), FieldRole::Date);
    }

    #[test]
    fn two_date_fields_are_ambiguous() {
        let config = FormConfig::default();
        let probes = vec![
            labelled("Date of Birth"),
            labelled("Name"),
            labelled("Start date"),
        ];
        match resolve_roles(&probes, &config) {
            Err(Error::AmbiguousRole(ordinals)) => assert_eq!(ordinals, vec![0, 2]),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn date_role_uses_configured_strategy() {
        let config = FormConfig::default().date_strategy(InputStrategy::StructuredWidget);
        assert_eq!(strategy_for(FieldRole::Date, &config), InputStrategy::StructuredWidget);
        assert_eq!(strategy_for(FieldRole::Text, &config), InputStrategy::Keystroke);
        assert_eq!(strategy_for(FieldRole::Address, &config), InputStrategy::Keystroke);
    }
}
