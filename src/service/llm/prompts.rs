//! Prompts for ticket classification

use crate::model::KnowledgeBase;

/// Maximum number of knowledge-base entries rendered into the prompt
pub const MAX_CONTEXT_ENTRIES: usize = 20;

/// System prompt fixing the output JSON schema and field semantics
pub const SYSTEM_PROMPT: &str = "You are an expert IT ticket classifier. \
Use the knowledge base entries to pick the closest issue ID. \
Always respond with strict JSON containing these keys: \
summary (string), category (string), severity (Critical|High|Medium|Low), \
kb_issue_id (string, one of the provided KB IDs or 'NEW_ISSUE'), \
kb_issue_title (string), next_step (string with the best recommended action).";

/// Render knowledge-base entries as disambiguation context, one line per
/// entry, bounded by [`MAX_CONTEXT_ENTRIES`]
pub fn kb_context(kb: &KnowledgeBase) -> String {
    if kb.is_empty() {
        return "No knowledge base entries available.".to_string();
    }

    kb.entries()
        .iter()
        .take(MAX_CONTEXT_ENTRIES)
        .map(|entry| {
            let symptoms = if entry.symptoms.is_empty() {
                "(no symptoms listed)".to_string()
            } else {
                entry.symptoms.join(", ")
            };
            format!(
                "{}: {} | Category={} | Symptoms={} | Recommended Action={}",
                entry.id, entry.title, entry.category, symptoms, entry.recommended_action
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the user prompt from knowledge-base context and the ticket text
pub fn build_user_prompt(ticket: &str, kb: &KnowledgeBase) -> String {
    format!(
        "Knowledge Base Entries:\n{}\n\nTicket to Analyze:\n{}\n\n\
         Return ONLY JSON. Choose kb_issue_id from the KB list when possible; \
         otherwise respond with 'NEW_ISSUE'.",
        kb_context(kb),
        ticket
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KnowledgeBaseEntry;

    fn entry(id: &str) -> KnowledgeBaseEntry {
        KnowledgeBaseEntry {
            id: id.to_string(),
            title: format!("Issue {}", id),
            category: "General".to_string(),
            symptoms: vec!["broken".to_string()],
            recommended_action: "Escalate".to_string(),
        }
    }

    #[test]
    fn test_kb_context_empty_kb() {
        let kb = KnowledgeBase::default();
        assert_eq!(kb_context(&kb), "No knowledge base entries available.");
    }

    #[test]
    fn test_kb_context_renders_entry_fields() {
        let kb = KnowledgeBase::from_entries(vec![entry("ISSUE-001")]);
        let context = kb_context(&kb);
        assert!(context.contains("ISSUE-001: Issue ISSUE-001"));
        assert!(context.contains("Category=General"));
        assert!(context.contains("Symptoms=broken"));
        assert!(context.contains("Recommended Action=Escalate"));
    }

    #[test]
    fn test_kb_context_is_bounded() {
        let entries: Vec<_> = (0..40).map(|i| entry(&format!("ISSUE-{:03}", i))).collect();
        let kb = KnowledgeBase::from_entries(entries);
        let context = kb_context(&kb);
        assert_eq!(context.lines().count(), MAX_CONTEXT_ENTRIES);
    }

    #[test]
    fn test_user_prompt_contains_ticket_text() {
        let kb = KnowledgeBase::default();
        let prompt = build_user_prompt("Payment failed during checkout", &kb);
        assert!(prompt.contains("Ticket to Analyze:\nPayment failed during checkout"));
        assert!(prompt.contains("Return ONLY JSON"));
    }
}
