//! One user's conversation with the hotel assistant.
//!
//! A `ChatSession` is an explicit context object: it owns the transcript and
//! the model-facing history, and borrows nothing global. Several sessions can
//! share one model client and one dataset snapshot.

use std::sync::Arc;

use ai_client::{ChatModel, Message, ToolLoop, ToolSet, DEFAULT_MAX_TOOL_ROUNDS};
use tracing::{info, warn};

use crate::dataset::Dataset;
use crate::error::HotelResult;
use crate::prompt::SYSTEM_PROMPT;
use crate::tool::QueryHotelsTool;

pub const ERROR_NOTICE: &str = "Sorry, I couldn't answer that just now. Please try again.";

/// What the user sees, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    User(String),
    Assistant(String),
    /// A turn that failed; replaces the assistant reply.
    Error(String),
}

impl TranscriptEntry {
    pub fn text(&self) -> &str {
        match self {
            TranscriptEntry::User(t) | TranscriptEntry::Assistant(t) | TranscriptEntry::Error(t) => t,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TranscriptEntry::Error(_))
    }
}

pub struct ChatSessionBuilder {
    model: Arc<dyn ChatModel>,
    tools: ToolSet,
    system_prompt: String,
    max_tool_rounds: usize,
}

impl ChatSessionBuilder {
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn build(self) -> ChatSession {
        ChatSession {
            model: self.model,
            tools: self.tools,
            tool_loop: ToolLoop::new(self.max_tool_rounds),
            system_prompt: self.system_prompt,
            history: Vec::new(),
            transcript: Vec::new(),
        }
    }
}

pub struct ChatSession {
    model: Arc<dyn ChatModel>,
    tools: ToolSet,
    tool_loop: ToolLoop,
    system_prompt: String,
    /// Completed user/assistant exchanges sent back to the model each turn.
    history: Vec<Message>,
    transcript: Vec<TranscriptEntry>,
}

impl ChatSession {
    /// Session with the `query_hotels` tool bound to `dataset`.
    pub fn builder(model: Arc<dyn ChatModel>, dataset: Arc<Dataset>) -> ChatSessionBuilder {
        ChatSessionBuilder {
            model,
            tools: ToolSet::new().with_tool(QueryHotelsTool::new(dataset)),
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.transcript.clear();
    }

    /// Run one turn and always produce something to show the user.
    ///
    /// Failures are logged and surfaced as [`TranscriptEntry::Error`]; the
    /// model-facing history is left exactly as it was before the turn.
    pub async fn send(&mut self, input: &str) -> TranscriptEntry {
        let input = input.trim();
        let reply = match self.try_send(input).await {
            Ok(text) => TranscriptEntry::Assistant(text),
            Err(e) => {
                warn!(error = %e, "Chat turn failed");
                TranscriptEntry::Error(ERROR_NOTICE.to_string())
            }
        };

        self.transcript.push(TranscriptEntry::User(input.to_string()));
        self.transcript.push(reply.clone());
        reply
    }

    /// Run one turn, committing it to history only on success. Does not
    /// touch the transcript.
    pub async fn try_send(&mut self, input: &str) -> HotelResult<String> {
        let user = Message::user(input.trim());

        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message::system(&self.system_prompt));
        messages.extend(self.history.iter().cloned());
        messages.push(user.clone());

        let outcome = self
            .tool_loop
            .run(self.model.as_ref(), &self.tools, &messages)
            .await?;

        info!(
            model = self.model.model_name(),
            tool_rounds = outcome.tool_rounds,
            "Chat turn answered"
        );

        self.history.push(user);
        self.history.push(Message::assistant(&outcome.reply));
        Ok(outcome.reply)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use ai_client::{AiError, AiResult, MessageRole, ToolCall, ToolDefinition};
    use async_trait::async_trait;

    use super::*;
    use crate::types::HotelRecord;

    /// Replays canned replies; `None` simulates a provider failure.
    struct ScriptedModel {
        replies: Mutex<VecDeque<Option<Message>>>,
        requests: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Option<Message>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<Vec<Message>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            messages: &[Message],
            _tools: &[ToolDefinition],
        ) -> AiResult<Message> {
            self.requests.lock().unwrap().push(messages.to_vec());
            match self.replies.lock().unwrap().pop_front().flatten() {
                Some(reply) => Ok(reply),
                None => Err(AiError::Network("connection reset".into())),
            }
        }
    }

    fn dataset() -> Arc<Dataset> {
        Arc::new(Dataset::from_records(vec![HotelRecord {
            name: "A".into(),
            city: "Paris".into(),
            country: "France".into(),
            star_rating: 5,
            cleanliness_score: 9.0,
            comfort_score: 8.0,
            facilities_score: 7.0,
        }]))
    }

    fn query_call(args: &str) -> Message {
        Message::assistant_tool_calls(
            "",
            vec![ToolCall {
                id: "call_1".into(),
                name: "query_hotels".into(),
                arguments: args.into(),
            }],
        )
    }

    #[tokio::test]
    async fn test_turn_with_tool_call() {
        let model = ScriptedModel::new(vec![
            Some(query_call(r#"{"city":"paris"}"#)),
            Some(Message::assistant("Hotel A in Paris.")),
        ]);
        let mut session = ChatSession::builder(model.clone(), dataset()).build();

        let reply = session.send("Hotels in Paris?").await;
        assert_eq!(reply, TranscriptEntry::Assistant("Hotel A in Paris.".into()));

        let requests = model.requests();
        assert_eq!(requests[0][0].role, MessageRole::System);
        let tool_result = requests[1].last().unwrap();
        assert_eq!(tool_result.role, MessageRole::Tool);
        assert!(tool_result.content.starts_with("hotel_name"));

        assert_eq!(session.history().len(), 2);
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_history_is_replayed_on_next_turn() {
        let model = ScriptedModel::new(vec![
            Some(Message::assistant("first")),
            Some(Message::assistant("second")),
        ]);
        let mut session = ChatSession::builder(model.clone(), dataset())
            .system_prompt("sys")
            .build();

        session.send("one").await;
        session.send("two").await;

        let second = &model.requests()[1];
        let contents: Vec<&str> = second.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["sys", "one", "first", "two"]);
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_history_untouched() {
        let model = ScriptedModel::new(vec![
            Some(Message::assistant("ok")),
            Some(query_call("{}")),
            None,
        ]);
        let mut session = ChatSession::builder(model, dataset()).build();

        session.send("first").await;
        let before = session.history().to_vec();

        let reply = session.send("second").await;
        assert!(reply.is_error());
        assert_eq!(reply.text(), ERROR_NOTICE);
        assert_eq!(session.history(), before.as_slice());

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[2], TranscriptEntry::User("second".into()));
        assert!(transcript[3].is_error());
    }

    #[tokio::test]
    async fn test_clear_starts_a_fresh_conversation() {
        let model = ScriptedModel::new(vec![
            Some(Message::assistant("first")),
            Some(Message::assistant("second")),
        ]);
        let mut session = ChatSession::builder(model.clone(), dataset())
            .system_prompt("sys")
            .build();

        session.send("one").await;
        session.clear();
        assert!(session.history().is_empty());
        assert!(session.transcript().is_empty());

        session.send("two").await;
        let requests = model.requests();
        let contents: Vec<&str> = requests[1]
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["sys", "two"]);
    }

    #[tokio::test]
    async fn test_runaway_tool_calls_fail_the_turn() {
        let model = ScriptedModel::new((0..5).map(|_| Some(query_call("{}"))).collect());
        let mut session = ChatSession::builder(model.clone(), dataset())
            .max_tool_rounds(2)
            .build();

        let err = session.try_send("loop forever").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::HotelError::Ai(AiError::MaxTurns(2))
        ));
        assert_eq!(model.requests().len(), 3);
        assert!(session.history().is_empty());
    }
}
