//! Update-page controller: Validate -> {Apply | ReportErrors} -> Render.
//!
//! Values are trimmed before validation and dispatch, but the page echoes
//! the untrimmed submission (and which radio action was selected) whenever
//! validation fails, so no user input is silently lost.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::{self, Engine};
use crate::error::{codes, StoreError, StoreResult};
use crate::validate::{self, Field, RawFields};

use super::view::{view_model, ViewModel};

/// Raw form submission, exactly as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateForm {
    #[serde(default, rename = "ssAct")]
    pub ss_act: Option<String>,
    #[serde(default, rename = "cellId")]
    pub cell_id: Option<String>,
    #[serde(default)]
    pub formula: Option<String>,
}

/// Widget state echoed back into the re-rendered form.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FormEcho {
    #[serde(rename = "cellId")]
    pub cell_id: String,
    pub formula: String,
    /// Action name -> whether its radio button is checked.
    pub actions: BTreeMap<&'static str, bool>,
}

/// Everything the update template needs for one render.
#[derive(Debug, Serialize)]
pub struct UpdatePage {
    pub form: FormEcho,
    /// Widget name -> message (`ssAct`, `cellId`, `formula`).
    pub errors: BTreeMap<&'static str, String>,
    #[serde(flatten)]
    pub view: ViewModel,
}

/// Render the page without processing a submission.
pub fn render_only(engine: &dyn Engine) -> UpdatePage {
    UpdatePage {
        form: FormEcho::default(),
        errors: BTreeMap::new(),
        view: view_model(engine),
    }
}

/// Process one submission. Whatever path is taken, the view model is
/// regenerated from current sheet state before rendering. Errors other than
/// formula-level domain errors propagate to the caller's error page.
pub async fn process(engine: &dyn Engine, form: &UpdateForm) -> StoreResult<UpdatePage> {
    let action = form.ss_act.as_deref().unwrap_or_default().trim();
    let fields = RawFields {
        cell_id: form.cell_id.as_deref(),
        formula: form.formula.as_deref(),
    };

    let mut page_errors = BTreeMap::new();
    let mut echo = FormEcho::default();

    match validate::validate_action(action, &fields) {
        Err(field_errors) => {
            for (field, message) in field_errors.iter() {
                page_errors.insert(widget_name(field), message.to_string());
            }
            echo = echo_form(form);
        }
        Ok(command) => {
            if let Err(err) = engine::apply(engine, &command).await {
                if is_formula_error(&err) {
                    page_errors.insert(widget_name(Field::Formula), err.to_string());
                } else {
                    return Err(err);
                }
            }
        }
    }

    Ok(UpdatePage {
        form: echo,
        errors: page_errors,
        view: view_model(engine),
    })
}

/// Formula-level domain errors become field errors; everything else is the
/// generic handler's problem.
fn is_formula_error(err: &StoreError) -> bool {
    matches!(err.code(), codes::SYNTAX | codes::CIRCULAR_REF)
}

fn widget_name(field: Field) -> &'static str {
    match field {
        Field::Action => "ssAct",
        Field::SheetName => "ssName",
        Field::CellId => "cellId",
        Field::Formula => "formula",
    }
}

fn echo_form(form: &UpdateForm) -> FormEcho {
    let selected = form.ss_act.as_deref().unwrap_or_default();
    FormEcho {
        cell_id: form.cell_id.clone().unwrap_or_default(),
        formula: form.formula.clone().unwrap_or_default(),
        actions: validate::action_names()
            .map(|name| (name, name == selected))
            .collect(),
    }
}
