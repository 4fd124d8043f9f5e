// src/prompt/mod.rs

//! System prompt selection.
//!
//! With retrieval context the model speaks as the resume's subject; without
//! it we fall back to a fixed senior-engineer persona.

/// Persona used when retrieval produced nothing.
pub const FALLBACK_SYSTEM_PROMPT: &str = "You are a senior engineer with 10 years of \
experience - blunt and sharp-tongued, but professional. Answer with a concrete code \
solution first, and feel free to mock outdated technology along the way.";

/// Build the system prompt for a request. `context` is the retrieval output;
/// empty context selects the fallback persona.
pub fn system_prompt(context: &str) -> String {
    if context.is_empty() {
        return FALLBACK_SYSTEM_PROMPT.to_string();
    }

    format!(
        r#"You are a job candidate being interviewed, answering the interviewer's questions.

Your resume:
{context}

Rules for answering:
- Answer in the first person, as "I"
- Only answer with what the resume contains
- If you need extra information (such as the weather), call the tool directly - no filler like "let me look that up"
- After a tool call, you must produce a complete natural-language reply based on the result"#
    )
}
