//! Bridge to the hosted text-completion model.
//!
//! Every variant degrades to a fixed reply when the model call fails; errors
//! are logged and never retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;

pub const ASK_FALLBACK: &str = "Sorry, I couldn't process that right now.";
pub const CHAT_FALLBACK: &str =
    "Sorry, I had a little trouble understanding that. Could you try rephrasing?";
pub const CHAT_EMPTY_REPLY: &str =
    "I'm having a little trouble thinking right now. Could you try that again in a moment?";
pub const MOTIVATION_FALLBACK: &str = "Every dose counts. You're doing great!";
pub const CHAT_INTRO: &str = "Hi! I'm Phil. Let's set up your weekly medication schedule. \
Tell me about the medications you take: their names, dosages, what time you take them, \
and on which days. For example, you can say: 'Lisinopril 10mg every morning at 8 AM' or \
'Metformin 500mg twice a day with meals on weekdays.'";

const GENERAL_TOPIC: &str = "General Health";

#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Claude Messages API client.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.completion_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key: config.claude_api_key.clone(),
            model: config.claude_model.clone(),
        })
    }
}

#[async_trait]
impl TextCompletion for ClaudeClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        if self.api_key.is_empty() {
            anyhow::bail!("CLAUDE_API_KEY is not configured");
        }

        let response = self
            .http
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": self.model,
                "max_tokens": 1024,
                "messages": [{
                    "role": "user",
                    "content": prompt
                }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Claude API error {}: {}", status, body);
        }

        let body: serde_json::Value = response.json().await?;
        let text = body["content"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Claude API response had no text content"))?;
        Ok(text.trim().to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantReply {
    pub text: String,
    pub source: ReplySource,
}

impl AssistantReply {
    fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ReplySource::Fallback,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotivationMessage {
    pub message: String,
    pub emoji: String,
    pub source: ReplySource,
}

/// Emoji used when the model leaves it out.
pub fn default_emoji(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if lower.contains("great") || lower.contains("awesome") {
        "🎉"
    } else if lower.contains("good") || lower.contains("job") {
        "👍"
    } else if lower.contains("welcome") || lower.contains("hey") {
        "👋"
    } else {
        "😊"
    }
}

#[derive(Debug, Deserialize)]
struct RawMotivation {
    message: String,
    #[serde(default)]
    emoji: String,
}

/// Pulls `{"message", "emoji"}` out of a model reply. Replies that are not
/// JSON are used verbatim as the message.
fn parse_motivation(text: &str) -> Option<(String, String)> {
    let trimmed = text.trim();
    let json_slice = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };
    let (message, emoji) = match serde_json::from_str::<RawMotivation>(json_slice) {
        Ok(raw) => (raw.message.trim().to_string(), raw.emoji.trim().to_string()),
        Err(_) => (trimmed.to_string(), String::new()),
    };
    if message.is_empty() {
        return None;
    }
    let emoji = if emoji.is_empty() {
        default_emoji(&message).to_string()
    } else {
        emoji
    };
    Some((message, emoji))
}

/// Material for a doctor-visit summary.
#[derive(Debug, Clone, Default)]
pub struct SummaryInput {
    pub medication_list: Vec<String>,
    pub dosage_details: Vec<String>,
    pub schedule: Vec<String>,
    pub mood_diary: Vec<String>,
    pub additional_context: Option<String>,
}

fn bullet_list(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items
            .iter()
            .map(|i| format!("- {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Deterministic summary used when the model is unavailable.
pub fn fallback_summary(input: &SummaryInput) -> String {
    let mut sections = vec![
        format!(
            "Medications:\n{}",
            bullet_list(&input.dosage_details, "- No medications recorded.")
        ),
        format!(
            "Schedule:\n{}",
            bullet_list(&input.schedule, "- No active reminders.")
        ),
        format!(
            "Mood diary:\n{}",
            bullet_list(&input.mood_diary, "- No mood diary entries available.")
        ),
    ];
    if let Some(context) = input.additional_context.as_deref().filter(|c| !c.trim().is_empty()) {
        sections.push(format!("Additional context:\n{}", context.trim()));
    }
    sections.join("\n\n")
}

#[derive(Clone)]
pub struct Assistant {
    completion: Arc<dyn TextCompletion>,
}

impl Assistant {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    /// General question answering about a medication or health topic.
    pub async fn ask(&self, question: &str, medication_name: Option<&str>) -> AssistantReply {
        let topic = medication_name
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERAL_TOPIC);
        let prompt = format!(
            "You are Phil, a friendly and encouraging assistant in the PillPal app. \
Answer questions about medication and its importance clearly, concisely and encouragingly.\n\n\
Medication Name: {}\nQuestion: {}",
            topic, question
        );
        match self.completion.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => AssistantReply {
                text,
                source: ReplySource::Model,
            },
            Ok(_) => {
                tracing::warn!("Assistant returned an empty answer");
                AssistantReply::fallback(ASK_FALLBACK)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Assistant question failed, using fallback");
                AssistantReply::fallback(ASK_FALLBACK)
            }
        }
    }

    /// One turn of the schedule-setup conversation.
    pub async fn schedule_chat(&self, user_input: &str) -> AssistantReply {
        let prompt = format!(
            "You are Phil, a friendly assistant in the PillPal app helping the user set up \
their weekly medication schedule. Acknowledge what they told you, confirm you noted it, \
and only ask for more detail if the input is very vague. Keep it short and conversational.\n\n\
User's input about their schedule:\n{}",
            user_input
        );
        match self.completion.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => AssistantReply {
                text,
                source: ReplySource::Model,
            },
            Ok(_) => AssistantReply::fallback(CHAT_EMPTY_REPLY),
            Err(e) => {
                tracing::warn!(error = %e, "Schedule chat failed, using fallback");
                AssistantReply::fallback(CHAT_FALLBACK)
            }
        }
    }

    /// Short encouraging message for an app event.
    pub async fn motivate(&self, event_type: &str, context: Option<&str>) -> MotivationMessage {
        let mut prompt = format!(
            "You are Phil, a friendly and encouraging assistant in the PillPal app. \
Write a short (1-2 sentence) positive message for the event below. Respond with JSON only: \
{{\"message\": \"...\", \"emoji\": \"<one emoji>\"}}\n\nEvent Type: {}",
            event_type
        );
        if let Some(context) = context.filter(|c| !c.is_empty()) {
            prompt.push_str(&format!("\nEvent Context: {}", context));
        }

        let parsed = match self.completion.complete(&prompt).await {
            Ok(text) => parse_motivation(&text),
            Err(e) => {
                tracing::warn!(error = %e, event_type, "Motivational message failed, using fallback");
                None
            }
        };
        match parsed {
            Some((message, emoji)) => MotivationMessage {
                message,
                emoji,
                source: ReplySource::Model,
            },
            None => MotivationMessage {
                message: MOTIVATION_FALLBACK.to_string(),
                emoji: "😊".to_string(),
                source: ReplySource::Fallback,
            },
        }
    }

    /// Medication log summary for sharing with a doctor.
    pub async fn summarize(&self, input: &SummaryInput) -> AssistantReply {
        let prompt = format!(
            "You summarize medication logs for patients to share with their doctors. Write a \
concise, accurate summary covering the medication list, dosages, schedule, a brief overview \
of the mood diary and any additional context.\n\n\
Medication List: {}\nDosage Details: {}\nSchedule: {}\nMood Diary: {}\nAdditional Context: {}",
            input.medication_list.join(", "),
            input.dosage_details.join("; "),
            input.schedule.join("; "),
            if input.mood_diary.is_empty() {
                "No mood diary entries available.".to_string()
            } else {
                input.mood_diary.join("; ")
            },
            input
                .additional_context
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or("No additional context provided."),
        );
        match self.completion.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => AssistantReply {
                text,
                source: ReplySource::Model,
            },
            Ok(_) => AssistantReply::fallback(fallback_summary(input)),
            Err(e) => {
                tracing::warn!(error = %e, "Summary generation failed, using deterministic fallback");
                AssistantReply::fallback(fallback_summary(input))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Replies with canned text and records every prompt.
    pub struct CannedCompletion {
        reply: Option<String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl CannedCompletion {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextCompletion for CannedCompletion {
        async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => anyhow::bail!("model unavailable"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::CannedCompletion;
    use super::*;

    fn assistant(completion: CannedCompletion) -> (Assistant, Arc<CannedCompletion>) {
        let completion = Arc::new(completion);
        (Assistant::new(completion.clone()), completion)
    }

    #[tokio::test]
    async fn test_ask_passes_through_answer() {
        let (assistant, completion) = assistant(CannedCompletion::replying("Take it with water."));
        let reply = assistant.ask("How should I take Metformin?", None).await;
        assert_eq!(reply.text, "Take it with water.");
        assert_eq!(reply.source, ReplySource::Model);
        let prompts = completion.prompts.lock().unwrap();
        assert!(prompts[0].contains("Medication Name: General Health"));
        assert!(prompts[0].contains("How should I take Metformin?"));
    }

    #[tokio::test]
    async fn test_ask_failure_uses_fallback() {
        let (assistant, _) = assistant(CannedCompletion::failing());
        let reply = assistant.ask("Anything?", Some("Lisinopril")).await;
        assert_eq!(reply.text, ASK_FALLBACK);
        assert_eq!(reply.source, ReplySource::Fallback);
    }

    #[tokio::test]
    async fn test_schedule_chat_fallbacks() {
        let (failing, _) = assistant(CannedCompletion::failing());
        assert_eq!(failing.schedule_chat("Vitamin D").await.text, CHAT_FALLBACK);

        let (empty, _) = assistant(CannedCompletion::replying("   "));
        assert_eq!(empty.schedule_chat("Vitamin D").await.text, CHAT_EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_motivate_parses_json_reply() {
        let (assistant, completion) = assistant(CannedCompletion::replying(
            "```json\n{\"message\": \"You took your Lisinopril!\", \"emoji\": \"✅\"}\n```",
        ));
        let msg = assistant.motivate("MEDICATION_TAKEN", Some("Lisinopril")).await;
        assert_eq!(msg.message, "You took your Lisinopril!");
        assert_eq!(msg.emoji, "✅");
        assert_eq!(msg.source, ReplySource::Model);
        assert!(completion.prompts.lock().unwrap()[0].contains("Event Context: Lisinopril"));
    }

    #[tokio::test]
    async fn test_motivate_fills_missing_emoji() {
        let (assistant, _) = assistant(CannedCompletion::replying("{\"message\": \"Great work today\"}"));
        let msg = assistant.motivate("STATUS_SAVED", None).await;
        assert_eq!(msg.emoji, "🎉");
    }

    #[tokio::test]
    async fn test_motivate_plain_text_reply() {
        let (assistant, _) = assistant(CannedCompletion::replying("Welcome back!"));
        let msg = assistant.motivate("PAGE_LOAD", None).await;
        assert_eq!(msg.message, "Welcome back!");
        assert_eq!(msg.emoji, "👋");
    }

    #[tokio::test]
    async fn test_motivate_failure_uses_fallback() {
        let (assistant, _) = assistant(CannedCompletion::failing());
        let msg = assistant.motivate("MEDICATION_TAKEN", None).await;
        assert_eq!(msg.message, MOTIVATION_FALLBACK);
        assert_eq!(msg.source, ReplySource::Fallback);
    }

    #[test]
    fn test_default_emoji_rules() {
        assert_eq!(default_emoji("Awesome streak"), "🎉");
        assert_eq!(default_emoji("Good job"), "👍");
        assert_eq!(default_emoji("Hey there"), "👋");
        assert_eq!(default_emoji("Keep going"), "😊");
    }

    #[tokio::test]
    async fn test_summary_failure_builds_local_summary() {
        let (assistant, _) = assistant(CannedCompletion::failing());
        let input = SummaryInput {
            medication_list: vec!["Lisinopril".into()],
            dosage_details: vec!["Lisinopril (10mg)".into()],
            schedule: vec!["Lisinopril at 08:00 (Daily)".into()],
            mood_diary: vec![],
            additional_context: Some("Dizzy in the mornings".into()),
        };
        let reply = assistant.summarize(&input).await;
        assert_eq!(reply.source, ReplySource::Fallback);
        assert!(reply.text.contains("- Lisinopril (10mg)"));
        assert!(reply.text.contains("No mood diary entries available."));
        assert!(reply.text.contains("Dizzy in the mornings"));
    }

    #[tokio::test]
    async fn test_unconfigured_claude_client_fails_fast() {
        let config = Config {
            claude_api_key: String::new(),
            ..Config::default()
        };
        let client = ClaudeClient::from_config(&config).unwrap();
        assert!(client.complete("hello").await.is_err());
    }
}
