use super::*;

#[test]
fn parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "***Rating: 72/100***\nGood meal." },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 410, "completion_tokens": 120 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.text, "***Rating: 72/100***\nGood meal.");
    assert_eq!(resp.model, "gpt-4o-mini");
    assert_eq!(resp.input_tokens, 410);
    assert_eq!(resp.output_tokens, 120);
}

#[test]
fn parse_without_usage() {
    let json = serde_json::json!({
        "model": "gpt-4o-mini",
        "choices": [{ "message": { "role": "assistant", "content": "ok" } }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.input_tokens, 0);
    assert_eq!(resp.output_tokens, 0);
}

#[test]
fn parse_missing_choices() {
    let json = serde_json::json!({ "model": "gpt-4o-mini", "choices": [] }).to_string();
    assert!(matches!(parse_chat_completions_response(&json), Err(LlmError::ApiParse(_))));
}

#[test]
fn parse_null_content_is_empty_completion() {
    let json = serde_json::json!({
        "model": "gpt-4o-mini",
        "choices": [{ "message": { "role": "assistant", "content": null } }]
    })
    .to_string();
    assert!(matches!(parse_chat_completions_response(&json), Err(LlmError::EmptyCompletion)));
}

#[test]
fn parse_empty_string_content_is_accepted() {
    let json = serde_json::json!({
        "model": "gpt-4o-mini",
        "choices": [{ "message": { "role": "assistant", "content": "" } }]
    })
    .to_string();
    assert_eq!(parse_chat_completions_response(&json).unwrap().text, "");
}

#[test]
fn parse_missing_content_is_empty_completion() {
    let json = serde_json::json!({
        "model": "gpt-4o-mini",
        "choices": [{ "message": { "role": "assistant" } }]
    })
    .to_string();
    assert!(matches!(parse_chat_completions_response(&json), Err(LlmError::EmptyCompletion)));
}

#[test]
fn parse_garbage() {
    assert!(matches!(parse_chat_completions_response("not json"), Err(LlmError::ApiParse(_))));
}

#[test]
fn request_carries_system_user_and_sampling() {
    let req = CompletionRequest { system: "be brief", user: "Analyze this meal: eggs", max_tokens: 300, temperature: 0.7 };
    let body = serde_json::to_value(build_request("gpt-4o-mini", &req)).unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["max_tokens"], 300);
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "be brief");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "Analyze this meal: eggs");
}

#[test]
fn request_omits_blank_system() {
    let req = CompletionRequest { system: " ", user: "hi", max_tokens: 10, temperature: 0.0 };
    let body = serde_json::to_value(build_request("m", &req)).unwrap();
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["role"], "user");
}
