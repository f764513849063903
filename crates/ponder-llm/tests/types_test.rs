use ponder_llm::{ChatOptions, ChatRequest, Message, Role};

#[test]
fn test_message_wire_format() {
    let json = serde_json::to_value(Message::human("Hi")).unwrap();
    assert_eq!(json, serde_json::json!({"role": "user", "content": "Hi"}));

    let json = serde_json::to_value(Message::ai("Hello!")).unwrap();
    assert_eq!(json["role"], "assistant");
}

#[test]
fn test_message_deserialization() {
    let msg: Message = serde_json::from_str(r#"{"role":"system","content":"be brief"}"#).unwrap();
    assert_eq!(msg, Message::system("be brief"));
    assert_eq!(msg.role(), Role::System);
    assert_eq!(msg.content(), "be brief");
}

#[test]
fn test_chat_request_creation() {
    let request = ChatRequest::new("deepseek-r1:1.5b", vec![Message::human("Hi")]);

    assert_eq!(request.model, "deepseek-r1:1.5b");
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.options, ChatOptions::default());
}

#[test]
fn test_chat_request_with_options() {
    let options = ChatOptions::new().temperature(0.7).max_tokens(100);
    let request = ChatRequest::new("m", vec![]).with_options(options);

    assert_eq!(request.options.temperature, Some(0.7));
    assert_eq!(request.options.max_tokens, Some(100));
    assert_eq!(request.options.keep_alive, None);
}

#[test]
fn test_role_as_str() {
    assert_eq!(Role::User.as_str(), "user");
    assert_eq!(Role::default(), Role::Assistant);
}
