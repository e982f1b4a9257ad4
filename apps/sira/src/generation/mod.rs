// CV generation request side: prompt text and the builder that fills it from
// the form. The outbound call lives in llm_client.

pub mod prompt_builder;
pub mod prompts;
