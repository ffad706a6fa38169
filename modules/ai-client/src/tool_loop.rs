//! Bounded tool-calling loop.
//!
//! The loop alternates between two states: waiting for a model turn and
//! waiting for the results of the tool calls that turn requested. Every pass
//! through `AwaitingToolResults` counts as one tool round, and the loop fails
//! with [`AiError::MaxTurns`] once the model asks for more rounds than
//! allowed, so a model that keeps calling tools cannot spin forever.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AiError, AiResult};
use crate::tool::ToolSet;
use crate::traits::{ChatModel, Message, ToolCall};
use crate::util::log_preview;

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

#[derive(Debug)]
enum LoopState {
    AwaitingModel,
    AwaitingToolResults(Vec<ToolCall>),
}

/// Result of one completed loop run.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// Final assistant text.
    pub reply: String,
    pub tool_rounds: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ToolLoop {
    max_tool_rounds: usize,
}

impl Default for ToolLoop {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOOL_ROUNDS)
    }
}

impl ToolLoop {
    pub fn new(max_tool_rounds: usize) -> Self {
        Self { max_tool_rounds }
    }

    /// Drive the model until it answers without tool calls.
    ///
    /// `history` is not modified; the caller decides whether to commit
    /// [`LoopOutcome::messages`] once the run succeeds.
    pub async fn run(
        &self,
        model: &dyn ChatModel,
        tools: &ToolSet,
        history: &[Message],
    ) -> AiResult<LoopOutcome> {
        let definitions = tools.definitions().await;
        let mut messages = history.to_vec();
        let mut rounds = 0;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    debug!(model = model.model_name(), round = rounds, "Requesting model turn");
                    let reply = model.complete(&messages, &definitions).await?;

                    if reply.has_tool_calls() {
                        let calls = reply.tool_calls.clone();
                        messages.push(reply);
                        LoopState::AwaitingToolResults(calls)
                    } else {
                        return Ok(LoopOutcome {
                            reply: reply.content,
                            tool_rounds: rounds,
                        });
                    }
                }
                LoopState::AwaitingToolResults(calls) => {
                    rounds += 1;
                    if rounds > self.max_tool_rounds {
                        warn!(max = self.max_tool_rounds, "Tool round limit reached");
                        return Err(AiError::MaxTurns(self.max_tool_rounds));
                    }

                    for call in &calls {
                        let result = execute_call(tools, call).await;
                        messages.push(Message::tool(&call.id, result));
                    }

                    LoopState::AwaitingModel
                }
            };
        }
    }
}

/// Run one tool call. Failures become `Error: ...` text for the model rather
/// than aborting the loop.
async fn execute_call(tools: &ToolSet, call: &ToolCall) -> String {
    let Some(tool) = tools.get(&call.name) else {
        warn!(tool = %call.name, "Model requested unknown tool");
        return format!("Error: unknown tool '{}'", call.name);
    };

    let args: Value = if call.arguments.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        match serde_json::from_str(&call.arguments) {
            Ok(v) => v,
            Err(e) => return format!("Error: arguments are not valid JSON: {}", e),
        }
    };

    debug!(tool = %call.name, args = %args, "Executing tool call");

    match tool.call_text(args).await {
        Ok(text) => {
            debug!(tool = %call.name, preview = %log_preview(&text, 120), "Tool call finished");
            text
        }
        Err(e) => {
            debug!(tool = %call.name, error = %e, "Tool call failed");
            format!("Error: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde::Deserialize;

    use super::*;
    use crate::tool::{Tool, ToolDefinition};
    use crate::traits::MessageRole;

    struct ScriptedModel {
        replies: Mutex<VecDeque<Message>>,
        calls: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Message>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<Vec<Message>> {
            self.calls.lock().unwrap().clone()
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
            self.calls.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(AiError::EmptyResponse)
        }
    }

    #[derive(Deserialize)]
    struct ShoutArgs {
        text: String,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("never")]
    struct Never;

    struct ShoutTool;

    #[async_trait]
    impl Tool for ShoutTool {
        const NAME: &'static str = "shout";
        type Error = Never;
        type Args = ShoutArgs;
        type Output = String;

        async fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: Self::NAME.into(),
                description: "Upper-case text".into(),
                parameters: serde_json::json!({"type": "object"}),
            }
        }

        async fn call(&self, args: Self::Args) -> Result<String, Never> {
            Ok(args.text.to_uppercase())
        }
    }

    fn call(id: &str, name: &str, args: &str) -> Message {
        Message::assistant_tool_calls(
            "",
            vec![ToolCall {
                id: id.into(),
                name: name.into(),
                arguments: args.into(),
            }],
        )
    }

    #[tokio::test]
    async fn test_plain_answer_needs_no_tools() {
        let model = ScriptedModel::new(vec![Message::assistant("hi")]);
        let tools = ToolSet::new().with_tool(ShoutTool);

        let outcome = ToolLoop::default()
            .run(&model, &tools, &[Message::user("hello")])
            .await
            .unwrap();

        assert_eq!(outcome.reply, "hi");
        assert_eq!(outcome.tool_rounds, 0);
        assert_eq!(model.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_tool_result_is_fed_back_verbatim() {
        let model = ScriptedModel::new(vec![
            call("c1", "shout", r#"{"text":"paris"}"#),
            Message::assistant("done"),
        ]);
        let tools = ToolSet::new().with_tool(ShoutTool);

        let outcome = ToolLoop::default()
            .run(&model, &tools, &[Message::user("q")])
            .await
            .unwrap();

        assert_eq!(outcome.reply, "done");
        assert_eq!(outcome.tool_rounds, 1);

        let seen = model.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].len(), 3);
        assert!(seen[1][1].has_tool_calls());
        let last = seen[1].last().unwrap();
        assert_eq!(last.role, MessageRole::Tool);
        assert_eq!(*last, Message::tool("c1", "PARIS"));
    }

    #[tokio::test]
    async fn test_unknown_tool_and_bad_json_become_error_results() {
        let model = ScriptedModel::new(vec![
            call("c1", "missing", "{}"),
            call("c2", "shout", "{not json"),
            Message::assistant("recovered"),
        ]);
        let tools = ToolSet::new().with_tool(ShoutTool);

        let outcome = ToolLoop::new(5)
            .run(&model, &tools, &[Message::user("q")])
            .await
            .unwrap();

        assert_eq!(outcome.reply, "recovered");
        assert_eq!(outcome.tool_rounds, 2);

        let seen = model.seen();
        let unknown = seen[1].last().unwrap();
        assert_eq!(unknown.tool_call_id.as_deref(), Some("c1"));
        assert!(unknown.content.starts_with("Error: unknown tool"));
        let bad_json = seen[2].last().unwrap();
        assert_eq!(bad_json.tool_call_id.as_deref(), Some("c2"));
        assert!(bad_json.content.starts_with("Error: arguments are not valid JSON"));
    }

    #[tokio::test]
    async fn test_round_limit_stops_runaway_model() {
        let replies = (0..10)
            .map(|i| call(&format!("c{i}"), "shout", r#"{"text":"x"}"#))
            .collect();
        let model = ScriptedModel::new(replies);
        let tools = ToolSet::new().with_tool(ShoutTool);

        let err = ToolLoop::new(2)
            .run(&model, &tools, &[Message::user("q")])
            .await
            .unwrap_err();

        assert!(matches!(err, AiError::MaxTurns(2)));
        assert_eq!(model.seen().len(), 3);
    }

    #[tokio::test]
    async fn test_history_is_not_mutated() {
        let model = ScriptedModel::new(vec![Message::assistant("ok")]);
        let history = vec![Message::system("sys"), Message::user("q")];

        let outcome = ToolLoop::default()
            .run(&model, &ToolSet::new(), &history)
            .await
            .unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(model.seen()[0], history);
        assert_eq!(outcome.reply, "ok");
    }
}
