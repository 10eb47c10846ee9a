//! Turn orchestration
//!
//! build prompt → call gateway → decode → update history. The controller
//! holds no conversation state; each call takes the caller's history and
//! returns the next one.
//!
//! The history is cut to `max_turns` before the prompt is built and again
//! after the new turn is appended, so neither the prompt context nor the
//! returned history ever holds more than `max_turns` turns.

use super::history::{EmptyHistoryError, History};
use super::params::{ParamsError, SamplingParams};
use super::prompt::build_prompt;
use crate::codec;
use crate::gateway::{GatewayError, GenerationGateway, GenerationRequest};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error(transparent)]
    Backend(#[from] GatewayError),
    #[error(transparent)]
    InvalidParams(#[from] ParamsError),
}

/// What the UI needs after an action: the new input-box contents and the
/// history to render and hand back on the next call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatOutcome {
    pub input: String,
    pub history: History,
}

impl ChatOutcome {
    fn completed(history: History) -> Self {
        Self {
            input: String::new(),
            history,
        }
    }
}

pub struct ConversationController {
    gateway: Arc<dyn GenerationGateway>,
    /// Text placed before every prompt
    preamble: String,
}

impl ConversationController {
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self {
            gateway,
            preamble: String::new(),
        }
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    pub fn gateway(&self) -> &Arc<dyn GenerationGateway> {
        &self.gateway
    }

    /// Answer `input` in the context of `history`.
    pub async fn send(
        &self,
        input: &str,
        history: History,
        params: &SamplingParams,
        api_key: Option<&str>,
    ) -> Result<ChatOutcome, ConversationError> {
        params.validate()?;
        let history = history.truncate(params.max_turns);
        self.complete_turn(input.to_string(), history, params, api_key)
            .await
    }

    /// Recompute the most recent answer. `input` is not sent; it is only
    /// handed back untouched when there is nothing to regenerate.
    pub async fn regenerate(
        &self,
        input: &str,
        history: History,
        params: &SamplingParams,
        api_key: Option<&str>,
    ) -> Result<ChatOutcome, ConversationError> {
        params.validate()?;
        let (last_user, history) = match history.drop_last() {
            Ok(split) => split,
            Err(EmptyHistoryError) => {
                tracing::debug!("Regenerate requested with empty history, nothing to do");
                return Ok(ChatOutcome {
                    input: input.to_string(),
                    history: History::new(),
                });
            }
        };
        let history = history.truncate(params.max_turns);
        self.complete_turn(last_user, history, params, api_key)
            .await
    }

    /// Reset the conversation.
    pub fn clear(&self) -> ChatOutcome {
        ChatOutcome::completed(History::clear())
    }

    async fn complete_turn(
        &self,
        input: String,
        history: History,
        params: &SamplingParams,
        api_key: Option<&str>,
    ) -> Result<ChatOutcome, ConversationError> {
        let prompt = format!("{}{}", self.preamble, build_prompt(&history, &input));
        let request = GenerationRequest {
            prompt: if self.gateway.escapes_prompt() {
                codec::encode(&prompt)
            } else {
                prompt
            },
            params: params.clone(),
            api_key: api_key.map(str::to_string),
        };

        let raw = self.gateway.generate(&request).await?;
        let output = codec::decode(&raw);

        tracing::info!(
            backend = %self.gateway.backend_id(),
            prompt = %request.prompt,
            output = %output,
            context_turns = history.len(),
            "Turn completed"
        );

        let history = history.append(input, output).truncate(params.max_turns);
        Ok(ChatOutcome::completed(history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::MockGateway;
    use crate::gateway::GatewayErrorKind;

    fn controller(mock: &Arc<MockGateway>) -> ConversationController {
        ConversationController::new(mock.clone())
    }

    fn history_of(n: usize) -> History {
        (0..n).fold(History::new(), |h, i| {
            h.append(format!("q{i}"), format!("a{i}"))
        })
    }

    fn params(max_turns: usize) -> SamplingParams {
        SamplingParams {
            max_turns,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_send_appends_decoded_output() {
        let mock = Arc::new(MockGateway::new("mock"));
        mock.queue_response("第一行\\n第二行%20end");

        let outcome = controller(&mock)
            .send("你好", History::new(), &params(5), None)
            .await
            .unwrap();

        assert_eq!(outcome.input, "");
        assert_eq!(outcome.history.len(), 1);
        let turn = outcome.history.last().unwrap();
        assert_eq!(turn.user, "你好");
        assert_eq!(turn.bot, "第一行\n第二行  end");

        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "用户：你好\n小元：");
    }

    #[tokio::test]
    async fn test_send_escapes_prompt_for_escaping_backend() {
        let mock = Arc::new(MockGateway::new("local").escaping(true));
        mock.queue_response("ok");

        controller(&mock)
            .send("a\tb", History::new().append("x", "y"), &params(5), None)
            .await
            .unwrap();

        assert_eq!(
            mock.recorded_requests()[0].prompt,
            "用户：x\\n小元：y\\n用户：a\\tb\\n小元："
        );
    }

    #[tokio::test]
    async fn test_send_truncates_before_prompting() {
        let mock = Arc::new(MockGateway::new("mock"));
        mock.queue_response("a6");

        let outcome = controller(&mock)
            .send("q6", history_of(6), &params(5), None)
            .await
            .unwrap();

        let prompt = &mock.recorded_requests()[0].prompt;
        assert!(!prompt.contains("q0"));
        assert!(prompt.starts_with("用户：q1\n"));

        // The stored window never exceeds max_turns
        assert_eq!(outcome.history.len(), 5);
        assert_eq!(outcome.history.turns()[0].user, "q2");
        assert_eq!(outcome.history.last().unwrap().user, "q6");
    }

    #[tokio::test]
    async fn test_preamble_prepended() {
        let mock = Arc::new(MockGateway::new("mock"));
        mock.queue_response("ok");

        controller(&mock)
            .with_preamble("你是小元。\n")
            .send("hi", History::new(), &params(5), None)
            .await
            .unwrap();

        assert_eq!(mock.recorded_requests()[0].prompt, "你是小元。\n用户：hi\n小元：");
    }

    #[tokio::test]
    async fn test_api_key_and_params_forwarded() {
        let mock = Arc::new(MockGateway::new("remote"));
        mock.queue_response("ok");
        let params = SamplingParams {
            top_p: 0.3,
            temperature: 0.2,
            max_turns: 4,
            sample: true,
        };

        controller(&mock)
            .send("hi", History::new(), &params, Some("key"))
            .await
            .unwrap();

        let request = &mock.recorded_requests()[0];
        assert_eq!(request.api_key.as_deref(), Some("key"));
        assert_eq!(request.params, params);
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let mock = Arc::new(MockGateway::new("mock"));
        mock.queue_error(GatewayError::server_error("boom"));

        let err = controller(&mock)
            .send("hi", history_of(1), &params(5), None)
            .await
            .unwrap_err();

        match err {
            ConversationError::Backend(e) => assert_eq!(e.kind, GatewayErrorKind::ServerError),
            other => panic!("Expected backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_without_call() {
        let mock = Arc::new(MockGateway::new("mock"));
        let err = controller(&mock)
            .send("hi", History::new(), &params(0), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ConversationError::InvalidParams(ParamsError::MaxTurns)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_regenerate_empty_history_is_noop() {
        let mock = Arc::new(MockGateway::new("mock"));

        let outcome = controller(&mock)
            .regenerate("typed text", History::new(), &params(5), None)
            .await
            .unwrap();

        assert!(outcome.history.is_empty());
        assert_eq!(outcome.input, "typed text");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_regenerate_replaces_last_answer() {
        let mock = Arc::new(MockGateway::new("mock"));
        mock.queue_response("new answer");

        let history = History::new().append("q0", "a0").append("q1", "old answer");
        let outcome = controller(&mock)
            .regenerate("ignored", history, &params(5), None)
            .await
            .unwrap();

        assert_eq!(outcome.input, "");
        assert_eq!(outcome.history.len(), 2);
        let last = outcome.history.last().unwrap();
        assert_eq!(last.user, "q1");
        assert_eq!(last.bot, "new answer");

        let prompt = &mock.recorded_requests()[0].prompt;
        assert_eq!(prompt, "用户：q0\n小元：a0\n用户：q1\n小元：");
        assert!(!prompt.contains("ignored"));
    }

    #[tokio::test]
    async fn test_send_then_regenerate_respects_window() {
        let mock = Arc::new(MockGateway::new("mock"));
        mock.queue_response("first");
        mock.queue_response("second");
        let controller = controller(&mock);

        let sent = controller
            .send("q6", history_of(6), &params(5), None)
            .await
            .unwrap();
        let regenerated = controller
            .regenerate("throwaway", sent.history, &params(5), None)
            .await
            .unwrap();

        assert!(regenerated.history.len() <= 5);
        let last = regenerated.history.last().unwrap();
        assert_eq!(last.user, "q6");
        assert_eq!(last.bot, "second");

        let prompt = &mock.recorded_requests()[1].prompt;
        assert!(prompt.ends_with("用户：q6\n小元："));
        assert!(!prompt.contains("throwaway"));
    }

    #[tokio::test]
    async fn test_clear_returns_empty_history() {
        let mock = Arc::new(MockGateway::new("mock"));
        let outcome = controller(&mock).clear();
        assert_eq!(outcome, ChatOutcome::completed(History::new()));
        assert_eq!(mock.call_count(), 0);
    }
}
