use super::test_helpers::*;
use super::*;
use crate::llm::{CompletionRequest, LlmError};

#[tokio::test]
async fn test_state_has_no_integrations() {
    let state = test_app_state();
    assert!(state.llm.is_none());
    assert!(state.mailer.is_none());
    assert!(!state.config.cookie_secure);
}

#[tokio::test]
async fn clones_share_config() {
    let state = test_app_state();
    let clone = state.clone();
    assert!(Arc::ptr_eq(&state.config, &clone.config));
}

#[tokio::test]
async fn mock_llm_replies_in_order_then_defaults() {
    let mock = MockLlm::replying("first");
    mock.push(Err(LlmError::EmptyCompletion));
    let request = CompletionRequest { system: "sys", user: "hi", max_tokens: 10, temperature: 0.5 };

    assert_eq!(mock.complete(&request).await.unwrap().text, "first");
    assert!(matches!(mock.complete(&request).await, Err(LlmError::EmptyCompletion)));
    assert_eq!(mock.complete(&request).await.unwrap().text, "done");

    let seen = mock.requests();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].system, "sys");
    assert_eq!(seen[2].user, "hi");
}

#[tokio::test]
async fn test_state_with_llm_is_configured() {
    let state = test_app_state_with_llm(Arc::new(MockLlm::default()));
    assert!(state.llm.is_some());
}
