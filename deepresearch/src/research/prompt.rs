//! Prompt text for the LLM-backed planner and synthesizer.

/// System prompt for the planner LLM.
pub const PLANNER_SYSTEM: &str = r#"You are a research planner. Split the user's question into 2-4 executable research steps.
Return JSON only, in this exact shape:
{"steps": [{"task": "<what to research>", "deliverable": "<what the step must produce>"}]}"#;

/// System prompt for the synthesizer LLM.
pub const SYNTHESIZER_SYSTEM: &str = "You integrate the results of a multi-step research run. \
Write a clear, well-structured summary that answers the original question, cites the key evidence \
found in the execution records, and lists references where available.";

/// User turn for the planner: the conversation so far, one `role: content` block per message.
pub fn planner_user_prompt(conversation: &str) -> String {
    format!(
        "Plan the research for the following conversation.\n\nConversation:\n{}",
        conversation
    )
}

/// User turn for the synthesizer.
pub fn synthesizer_user_prompt(question: &str, plan: &str, task_results: &str) -> String {
    format!(
        "Original question: {}\nPlan steps: {}\nExecution records: {}\nWrite the final answer.",
        question, plan, task_results
    )
}
