//! Form state: the fixed set of CV fields and the record the user fills in.
//!
//! `FormRecord` is updated functionally: `set_field` returns a new record and
//! leaves the original untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Email,
    Phone,
    Address,
    Education,
    Experience,
    Skills,
    Summary,
}

impl FormField {
    /// All fields in form order.
    pub const ALL: [FormField; 8] = [
        FormField::Name,
        FormField::Email,
        FormField::Phone,
        FormField::Address,
        FormField::Education,
        FormField::Experience,
        FormField::Skills,
        FormField::Summary,
    ];

    /// The input name used on the form.
    pub fn name(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::Address => "address",
            FormField::Education => "education",
            FormField::Experience => "experience",
            FormField::Skills => "skills",
            FormField::Summary => "summary",
        }
    }

    pub fn label(self, language: Language) -> &'static str {
        match (language, self) {
            (Language::Arabic, FormField::Name) => "الاسم",
            (Language::Arabic, FormField::Email) => "البريد الإلكتروني",
            (Language::Arabic, FormField::Phone) => "الهاتف",
            (Language::Arabic, FormField::Address) => "العنوان",
            (Language::Arabic, FormField::Education) => "التعليم",
            (Language::Arabic, FormField::Experience) => "الخبرة",
            (Language::Arabic, FormField::Skills) => "المهارات",
            (Language::Arabic, FormField::Summary) => "الملخص",
            (Language::English, FormField::Name) => "Name",
            (Language::English, FormField::Email) => "Email",
            (Language::English, FormField::Phone) => "Phone",
            (Language::English, FormField::Address) => "Address",
            (Language::English, FormField::Education) => "Education",
            (Language::English, FormField::Experience) => "Experience",
            (Language::English, FormField::Skills) => "Skills",
            (Language::English, FormField::Summary) => "Summary",
        }
    }

    /// Free-text fields the UI offers as multi-line entries.
    pub fn is_multiline(self) -> bool {
        matches!(
            self,
            FormField::Education | FormField::Experience | FormField::Skills | FormField::Summary
        )
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The user's entered CV details. Created empty at session start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub education: String,
    pub experience: String,
    pub skills: String,
    pub summary: String,
}

impl FormRecord {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::Address => &self.address,
            FormField::Education => &self.education,
            FormField::Experience => &self.experience,
            FormField::Skills => &self.skills,
            FormField::Summary => &self.summary,
        }
    }

    /// Returns a copy of this record with `field` replaced by `value`.
    #[must_use]
    pub fn set_field(&self, field: FormField, value: impl Into<String>) -> FormRecord {
        let mut next = self.clone();
        let slot = match field {
            FormField::Name => &mut next.name,
            FormField::Email => &mut next.email,
            FormField::Phone => &mut next.phone,
            FormField::Address => &mut next.address,
            FormField::Education => &mut next.education,
            FormField::Experience => &mut next.experience,
            FormField::Skills => &mut next.skills,
            FormField::Summary => &mut next.summary,
        };
        *slot = value.into();
        next
    }

    /// Fields that are empty after trimming, in form order.
    pub fn missing_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        FormField::ALL
            .iter()
            .all(|f| !self.get(*f).trim().is_empty())
    }
}
