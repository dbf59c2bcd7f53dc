use super::*;

#[test]
fn parse_text_blocks_are_joined() {
    let json = serde_json::json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-haiku-latest",
        "content": [
            { "type": "text", "text": "***Rating: 55/100***\n" },
            { "type": "text", "text": "Moderate." }
        ],
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 300, "output_tokens": 40 }
    })
    .to_string();
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text, "***Rating: 55/100***\nModerate.");
    assert_eq!(resp.model, "claude-3-5-haiku-latest");
    assert_eq!(resp.input_tokens, 300);
    assert_eq!(resp.output_tokens, 40);
}

#[test]
fn parse_skips_unknown_blocks() {
    let json = serde_json::json!({
        "model": "claude-3-5-haiku-latest",
        "content": [
            { "type": "thinking", "thinking": "hmm" },
            { "type": "text", "text": "done" }
        ],
        "usage": { "input_tokens": 1, "output_tokens": 1 }
    })
    .to_string();
    assert_eq!(parse_response(&json).unwrap().text, "done");
}

#[test]
fn parse_without_text_is_empty_completion() {
    let json = serde_json::json!({
        "model": "claude-3-5-haiku-latest",
        "content": [],
        "usage": { "input_tokens": 1, "output_tokens": 0 }
    })
    .to_string();
    assert!(matches!(parse_response(&json), Err(LlmError::EmptyCompletion)));
}

#[test]
fn parse_empty_text_block_is_accepted() {
    let json = serde_json::json!({
        "model": "claude-3-5-haiku-latest",
        "content": [{ "type": "text", "text": "" }],
        "usage": { "input_tokens": 1, "output_tokens": 0 }
    })
    .to_string();
    assert_eq!(parse_response(&json).unwrap().text, "");
}

#[test]
fn parse_missing_usage_fails() {
    let json = serde_json::json!({
        "model": "claude-3-5-haiku-latest",
        "content": [{ "type": "text", "text": "hi" }]
    })
    .to_string();
    assert!(matches!(parse_response(&json), Err(LlmError::ApiParse(_))));
}
