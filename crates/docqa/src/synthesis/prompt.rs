//! Prompt assembly for answer synthesis

use crate::types::{Citation, DocumentGroup, RetrievalResult};

/// Builds the system and user instructions for one synthesis call
pub struct PromptBuilder;

impl PromptBuilder {
    /// Format chunk evidence, each unit labeled with its citation key
    pub fn build_context(results: &[RetrievalResult], citations: &[Citation]) -> String {
        let mut context = String::new();

        for result in results {
            let key = citations
                .iter()
                .find(|c| {
                    c.relative_path == result.relative_path && c.line_span == result.line_span
                })
                .map(|c| c.key.as_str())
                .unwrap_or("?");

            let span = match result.line_span {
                Some(span) => format!(":{}-{}", span.start, span.end),
                None => String::new(),
            };

            context.push_str(&format!(
                "[{}] {}{}\n\n{}\n\n---\n\n",
                key, result.relative_path, span, result.content
            ));
        }

        context
    }

    /// Format document evidence, one section per document
    pub fn build_document_context(documents: &[DocumentGroup], citations: &[Citation]) -> String {
        let mut context = String::new();

        for document in documents {
            let key = citations
                .iter()
                .find(|c| c.relative_path == document.relative_path)
                .map(|c| c.key.as_str())
                .unwrap_or("?");

            context.push_str(&format!("[{}] {}\n\n", key, document.relative_path));
            for chunk in &document.chunks {
                context.push_str(&chunk.content);
                context.push_str("\n\n");
            }
            context.push_str("---\n\n");
        }

        context
    }

    /// Build the system instruction for one synthesis call
    ///
    /// Refinement mode relaxes the completeness bar so a second pass
    /// prefers partial evidence over signaling for yet another round.
    pub fn system_prompt(product_context: &str, is_refinement: bool) -> String {
        let mut prompt = format!(
            "You are a documentation assistant answering questions from the \
             provided documentation excerpts.\n\n\
             ## Product Context\n\n\
             {}\n\n\
             ## Core Principles\n\n\
             - Base every statement on the provided excerpts\n\
             - Cite sources inline using the citation keys, like [A] or [B][C]\n\
             - If information is not in the excerpts, say the documentation \
             does not cover it; never invent API names, commands, or \
             configuration values\n\
             - Start with a direct answer, then specifics: commands, file \
             paths, step-by-step instructions\n\
             - Use GitHub-flavored Markdown with code blocks for commands and \
             configuration\n\n\
             ## Self-Assessment\n\n\
             After writing the answer, assess its completeness honestly:\n\
             - confidence=high with needs_more=false when the excerpts fully \
             answer the question with concrete details\n\
             - confidence=partial with needs_more=true when relevant \
             information was found but key details are missing; name exactly \
             what is missing in missing_topics (short topic phrases)\n\
             - confidence=insufficient with needs_more=true when the \
             requested information is not present at all; name what would be \
             needed in missing_topics",
            product_context
        );

        if is_refinement {
            prompt.push_str(
                "\n\n## Refinement Mode\n\n\
                 This is a second retrieval attempt. If you have any useful \
                 information, even partial, present it and set \
                 needs_more=false; only keep needs_more=true when the \
                 excerpts contain nothing relevant at all.",
            );
        }

        prompt
    }

    /// Build the user instruction carrying the question, key map, and evidence
    pub fn user_prompt(question: &str, key_map: &str, context: &str) -> String {
        format!(
            "Question: {}\n\n\
             Citation Key Map:\n{}\n\n\
             Context:\n{}\
             Generate a concise markdown answer with inline citations. Then \
             self-assess: can you fully answer this question with the \
             provided context? Set confidence, needs_more, and \
             missing_topics accordingly.",
            question, key_map, context
        )
    }
}
