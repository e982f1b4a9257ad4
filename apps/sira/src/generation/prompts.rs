// Prompt text for CV generation, one set per supported language.
// The field lines between the header and the instructions are rendered by
// `prompt_builder` from the form labels.

use crate::models::language::Language;

pub const ARABIC_HEADER: &str =
    "أنشئ سيرة ذاتية احترافية باللغة العربية باستخدام المعلومات التالية:";

pub const ARABIC_INSTRUCTIONS: &str = "\
يجب أن تكون السيرة الذاتية منسقة جيدًا واحترافية ومناسبة لشخص كفيف يستخدم قارئ الشاشة.
قدم السيرة الذاتية بتنسيق ماركداون.";

pub const ENGLISH_HEADER: &str =
    "Create a professional CV in English using the following information:";

pub const ENGLISH_INSTRUCTIONS: &str = "\
The CV must be well structured, professional, and suitable for a blind reader using a screen reader: \
use a clear heading hierarchy, short sections, and no tables or decorative characters.
Deliver the CV in Markdown format.";

pub fn header(language: Language) -> &'static str {
    match language {
        Language::Arabic => ARABIC_HEADER,
        Language::English => ENGLISH_HEADER,
    }
}

pub fn instructions(language: Language) -> &'static str {
    match language {
        Language::Arabic => ARABIC_INSTRUCTIONS,
        Language::English => ENGLISH_INSTRUCTIONS,
    }
}
