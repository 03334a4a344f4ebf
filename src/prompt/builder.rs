use crate::rules::{RuleSet, Tier};

/// Everything the gateway needs for one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub system: String,
    pub user: String,
    pub token_budget: u32,
}

/// Build the instruction payload for one attempt.
///
/// Pure construction from already-validated inputs; there is no error path.
/// Attempt 0 keeps conversation framing; later attempts deliberately drop it
/// and tighten the instruction, biasing the model toward compliance over
/// context-fidelity.
pub fn build_prompt(
    tier: Tier,
    rules: &RuleSet,
    attempt: u32,
    conversation: Option<&str>,
    input: &str,
) -> PromptPayload {
    let tier_rules = rules.tier(tier);
    let count = tier_rules.post_count;

    let mut system = tier_rules
        .base_prompt_template
        .replace("${count}", &count.to_string());

    if !tier_rules.examples.is_empty() {
        system.push_str("\n\n");
        system.push_str(&render_examples(&tier_rules.examples));
    }

    if conversation.is_some() {
        system.push_str("\n\n");
        system.push_str(&rules.conversation.context_instruction);
    }

    let token_budget = if conversation.is_some() {
        rules.conversation.token_budget
    } else {
        tier_rules.token_budget
    };

    let user = if attempt == 0 {
        match conversation {
            Some(context) => format!(
                "{context}\nUser: {input}\n\nNow generate tweets based on this conversation context and my latest message."
            ),
            None => input.to_string(),
        }
    } else {
        format!(
            "{input}\n\nPrevious attempt failed. Please generate exactly {count} posts, each under {max_chars} characters. Be more concise.",
            max_chars = tier_rules.max_chars
        )
    };

    PromptPayload {
        system,
        user,
        token_budget,
    }
}

fn render_examples(examples: &[String]) -> String {
    let quoted: Vec<String> = examples.iter().map(|e| format!("\"{e}\"")).collect();
    format!("Example formats: {}", quoted.join(" or "))
}
