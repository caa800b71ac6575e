//! Action validation: free-form user input in, typed [`Command`] or a map of
//! field-level errors out. Errors accumulate across fields (never fail-fast)
//! so a caller can display every problem in one pass.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{CellId, Command, SheetName};

/// Widgets a validation error can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Action,
    SheetName,
    CellId,
    Formula,
}

impl Field {
    pub fn friendly_name(&self) -> &'static str {
        match self {
            Field::Action => "Action",
            Field::SheetName => "Spreadsheet Name",
            Field::CellId => "Cell ID",
            Field::Formula => "cell formula",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.friendly_name())
    }
}

/// Immutable accumulation of field -> message; validation succeeds iff empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.values().cloned().collect()
    }

    fn with(mut self, field: Field, message: impl Into<String>) -> Self {
        self.0.insert(field, message.into());
        self
    }
}

/// Raw widget values as submitted, already trimmed by the caller. An absent
/// or all-whitespace widget is treated as unspecified.
#[derive(Debug, Clone, Default)]
pub struct RawFields<'a> {
    pub cell_id: Option<&'a str>,
    pub formula: Option<&'a str>,
}

impl<'a> RawFields<'a> {
    fn value(&self, field: Field) -> Option<&'a str> {
        let raw = match field {
            Field::CellId => self.cell_id,
            Field::Formula => self.formula,
            _ => None,
        };
        raw.map(str::trim).filter(|v| !v.is_empty())
    }
}

const ACTIONS: [&str; 4] = ["clear", "deleteCell", "updateCell", "copyCell"];

/// Map a raw action plus its widget values to a typed [`Command`], or report
/// every field problem at once. An unrecognized action always fails with an
/// action error, independent of the other fields.
pub fn validate_action(action: &str, fields: &RawFields) -> Result<Command, FieldErrors> {
    match action.trim() {
        "" => Err(FieldErrors::default().with(Field::Action, "Action must be specified.")),
        "clear" => {
            let errors = check_fields("Clear", &[], &[Field::CellId, Field::Formula], fields);
            if errors.is_empty() {
                Ok(Command::ClearAll)
            } else {
                Err(errors)
            }
        }
        "deleteCell" => {
            let errors = check_fields("Delete Cell", &[Field::CellId], &[Field::Formula], fields);
            if errors.is_empty() {
                let cell_id = parse_cell(fields.value(Field::CellId));
                Ok(Command::DeleteCell { cell_id })
            } else {
                Err(errors)
            }
        }
        "updateCell" => {
            let errors = check_fields("Update Cell", &[Field::CellId, Field::Formula], &[], fields);
            if errors.is_empty() {
                Ok(Command::UpdateCell {
                    cell_id: parse_cell(fields.value(Field::CellId)),
                    formula: fields.value(Field::Formula).unwrap_or_default().to_string(),
                })
            } else {
                Err(errors)
            }
        }
        "copyCell" => {
            let mut errors = check_fields("Copy Cell", &[Field::CellId, Field::Formula], &[], fields);
            // Copy's formula widget names the source cell, so it must itself
            // be a syntactically valid cell id.
            if errors.get(Field::Formula).is_none() {
                let src = fields.value(Field::Formula).unwrap_or_default();
                if !CellId::is_valid(src) {
                    errors = errors.with(
                        Field::Formula,
                        "Copy requires formula to specify a cell ID",
                    );
                }
            }
            if errors.is_empty() {
                let src = fields.value(Field::Formula).unwrap_or_default();
                Ok(Command::CopyCell {
                    dest: parse_cell(fields.value(Field::CellId)),
                    src: CellId::parse(src).expect("checked above"),
                })
            } else {
                Err(errors)
            }
        }
        other => Err(FieldErrors::default().with(Field::Action, format!("Invalid action \"{other}\""))),
    }
}

/// Validate a spreadsheet name widget; the message is suitable for direct
/// display next to the widget.
pub fn validate_sheet_name(raw: &str) -> Result<SheetName, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!(
            "The {} field must be specified",
            Field::SheetName.friendly_name()
        ));
    }
    SheetName::parse(trimmed).map_err(|_| {
        format!(
            "Bad spreadsheet name \"{trimmed}\": must contain only alphanumeric \
             characters, underscore, hyphen or space."
        )
    })
}

fn check_fields(
    act: &str,
    required: &[Field],
    forbidden: &[Field],
    fields: &RawFields,
) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for &field in forbidden {
        if fields.value(field).is_some() {
            errors = errors.with(
                field,
                format!("{} must not be specified for {act} action", field.friendly_name()),
            );
        }
    }
    for &field in required {
        errors = check_required(field, fields, errors);
    }
    errors
}

fn check_required(field: Field, fields: &RawFields, errors: FieldErrors) -> FieldErrors {
    let Some(value) = fields.value(field) else {
        return errors.with(
            field,
            format!("The {} field must be specified", field.friendly_name()),
        );
    };
    if field == Field::CellId && !CellId::is_valid(value) {
        return errors.with(
            field,
            format!("Bad cell id \"{value}\": must consist of a letter followed by one or two digits."),
        );
    }
    errors
}

fn parse_cell(value: Option<&str>) -> CellId {
    CellId::parse(value.unwrap_or_default()).expect("validated before construction")
}

/// Wire names of the recognized actions, in display order.
pub fn action_names() -> impl Iterator<Item = &'static str> {
    ACTIONS.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields<'a>(cell_id: Option<&'a str>, formula: Option<&'a str>) -> RawFields<'a> {
        RawFields { cell_id, formula }
    }

    #[test]
    fn clear_with_no_fields_succeeds() {
        let cmd = validate_action("clear", &fields(None, None)).unwrap();
        assert_eq!(cmd, Command::ClearAll);
    }

    #[test]
    fn clear_with_cell_id_reports_forbidden_field() {
        let errors = validate_action("clear", &fields(Some("a1"), None)).unwrap_err();
        assert!(errors.get(Field::CellId).unwrap().contains("must not be specified"));
        assert!(errors.get(Field::Formula).is_none());
    }

    #[test]
    fn update_missing_formula_reports_required_field() {
        let errors = validate_action("updateCell", &fields(Some("a1"), None)).unwrap_err();
        assert_eq!(
            errors.get(Field::Formula),
            Some("The cell formula field must be specified")
        );
    }

    #[test]
    fn update_with_both_fields_builds_command() {
        let cmd = validate_action("updateCell", &fields(Some("A1"), Some("=b1*2"))).unwrap();
        assert_eq!(
            cmd,
            Command::UpdateCell {
                cell_id: CellId::parse("a1").unwrap(),
                formula: "=b1*2".to_string(),
            }
        );
    }

    #[test]
    fn copy_rejects_non_cell_id_formula() {
        let errors = validate_action("copyCell", &fields(Some("a1"), Some("xyz"))).unwrap_err();
        assert_eq!(
            errors.get(Field::Formula),
            Some("Copy requires formula to specify a cell ID")
        );
    }

    #[test]
    fn copy_with_cell_source_builds_command() {
        let cmd = validate_action("copyCell", &fields(Some("b2"), Some("A1"))).unwrap();
        assert_eq!(
            cmd,
            Command::CopyCell {
                dest: CellId::parse("b2").unwrap(),
                src: CellId::parse("a1").unwrap(),
            }
        );
    }

    #[test]
    fn delete_forbids_formula_and_requires_cell_id() {
        let errors = validate_action("deleteCell", &fields(None, Some("=a1"))).unwrap_err();
        assert!(errors.get(Field::Formula).unwrap().contains("must not be specified"));
        assert_eq!(
            errors.get(Field::CellId),
            Some("The Cell ID field must be specified")
        );
    }

    #[test]
    fn errors_accumulate_rather_than_fail_fast() {
        let errors = validate_action("clear", &fields(Some("a1"), Some("=1"))).unwrap_err();
        assert_eq!(errors.iter().count(), 2);
    }

    #[test]
    fn bad_cell_id_format_is_reported() {
        let errors = validate_action("deleteCell", &fields(Some("a123"), None)).unwrap_err();
        assert!(errors.get(Field::CellId).unwrap().contains("Bad cell id"));
    }

    #[test]
    fn unknown_action_fails_independent_of_fields() {
        let errors = validate_action("dropTable", &fields(Some("a1"), Some("1"))).unwrap_err();
        assert!(errors.get(Field::Action).unwrap().contains("dropTable"));
        assert_eq!(errors.iter().count(), 1);
    }

    #[test]
    fn empty_action_must_be_specified() {
        let errors = validate_action("", &fields(None, None)).unwrap_err();
        assert_eq!(errors.get(Field::Action), Some("Action must be specified."));
    }

    #[test]
    fn whitespace_only_fields_count_as_absent() {
        let errors = validate_action("updateCell", &fields(Some("  "), Some("1"))).unwrap_err();
        assert_eq!(
            errors.get(Field::CellId),
            Some("The Cell ID field must be specified")
        );
    }

    #[test]
    fn sheet_name_validation_messages() {
        assert!(validate_sheet_name("  ").unwrap_err().contains("must be specified"));
        assert!(validate_sheet_name("a/b").unwrap_err().contains("Bad spreadsheet name"));
        assert_eq!(validate_sheet_name(" sheet1 ").unwrap().as_str(), "sheet1");
    }
}
