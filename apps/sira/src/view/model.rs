//! What the user sees: a pure projection of the controller.

use std::path::PathBuf;

use crate::errors::ErrorNotice;
use crate::models::form::FormField;
use crate::models::language::Language;
use crate::render::sanitize_generated;
use crate::view::controller::{ViewController, ViewState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub field: FormField,
    pub label: &'static str,
    pub value: String,
    pub missing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub state: ViewState,
    pub user_email: Option<String>,
    pub fields: Vec<FieldView>,
    pub submit: Control,
    pub export: Control,
    pub notice: Option<ErrorNotice>,
    /// Sanitized generated CV, ready for display.
    pub result_markdown: Option<String>,
    pub last_export: Option<PathBuf>,
}

struct Labels {
    generate: &'static str,
    regenerate: &'static str,
    generating: &'static str,
    export: &'static str,
}

fn labels(language: Language) -> Labels {
    match language {
        Language::Arabic => Labels {
            generate: "إنشاء السيرة الذاتية",
            regenerate: "إعادة إنشاء السيرة الذاتية",
            generating: "جارٍ إنشاء السيرة الذاتية...",
            export: "تنزيل كمستند Word",
        },
        Language::English => Labels {
            generate: "Generate CV",
            regenerate: "Regenerate CV",
            generating: "Generating CV...",
            export: "Download as Word document",
        },
    }
}

/// Label shown while a generation is running.
pub fn generating_label(language: Language) -> &'static str {
    labels(language).generating
}

impl ViewController {
    pub fn view(&self) -> View {
        let labels = labels(self.language());
        let state = self.state();
        let authenticated = state != ViewState::Unauthenticated;

        let submit_label = match state {
            ViewState::Generating => labels.generating,
            _ if self.result().is_some() => labels.regenerate,
            _ => labels.generate,
        };

        View {
            state,
            user_email: self.user().map(|u| u.email.clone()),
            fields: FormField::ALL
                .into_iter()
                .map(|field| {
                    let value = self.form().get(field);
                    FieldView {
                        field,
                        label: field.label(self.language()),
                        value: value.to_string(),
                        missing: value.trim().is_empty(),
                    }
                })
                .collect(),
            submit: Control {
                label: submit_label,
                enabled: matches!(state, ViewState::Idle | ViewState::Ready)
                    && self.form().is_complete(),
            },
            export: Control {
                label: labels.export,
                enabled: authenticated && self.result().is_some(),
            },
            notice: self.notice().cloned(),
            result_markdown: self.result().map(|r| sanitize_generated(r.as_str())),
            last_export: self.last_export().cloned(),
        }
    }
}
