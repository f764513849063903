use futures::StreamExt;
use ponder_llm::{parse_chat_line, parse_ndjson_stream, ChatChunk, Role};

fn body(parts: &[&str]) -> impl futures::Stream<Item = Result<Vec<u8>, std::io::Error>> {
    let owned: Vec<Result<Vec<u8>, std::io::Error>> =
        parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
    futures::stream::iter(owned)
}

#[test]
fn test_parse_chat_line_message() {
    let line = r#"{"model":"deepseek-r1:1.5b","created_at":"2025-01-01T00:00:00Z","message":{"role":"assistant","content":"<think>"},"done":false}"#;
    let chunk = parse_chat_line(line).unwrap();

    assert_eq!(chunk.role, Role::Assistant);
    assert_eq!(chunk.content, "<think>");
    assert!(!chunk.done);
}

#[test]
fn test_parse_chat_line_done() {
    let line = r#"{"model":"m","message":{"role":"assistant","content":""},"done":true,"done_reason":"stop"}"#;
    let chunk = parse_chat_line(line).unwrap();

    assert!(chunk.done);
    assert!(chunk.content.is_empty());
}

#[test]
fn test_parse_chat_line_backend_error() {
    let err = parse_chat_line(r#"{"error":"model not found"}"#).unwrap_err();
    assert!(err.to_string().contains("model not found"));
}

#[test]
fn test_parse_chat_line_unknown_role() {
    let chunk = parse_chat_line(r#"{"message":{"role":"critic","content":"x"},"done":false}"#).unwrap();
    assert_eq!(chunk.role, Role::Unknown);
}

#[tokio::test]
async fn test_ndjson_lines_split_across_chunks() {
    let stream = parse_ndjson_stream(body(&[
        "{\"message\":{\"role\":\"assistant\",\"content\":\"Hel\"},\"done\":false}\n{\"message\":",
        "{\"role\":\"assistant\",\"content\":\"lo\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
    ]));

    let chunks: Vec<ChatChunk> = stream.map(|c| c.unwrap()).collect().await;

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].content, "Hel");
    assert_eq!(chunks[1].content, "lo");
    assert!(chunks[2].done);
}

#[tokio::test]
async fn test_ndjson_stops_after_done() {
    let stream = parse_ndjson_stream(body(&[
        "{\"message\":{\"role\":\"assistant\",\"content\":\"a\"},\"done\":true}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"ignored\"},\"done\":false}\n",
    ]));

    let chunks: Vec<_> = stream.collect().await;
    assert_eq!(chunks.len(), 1);
}

#[tokio::test]
async fn test_ndjson_trailing_line_without_newline() {
    let stream = parse_ndjson_stream(body(&[
        "{\"message\":{\"role\":\"assistant\",\"content\":\"last\"},\"done\":false}",
    ]));

    let chunks: Vec<_> = stream.collect().await;
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].as_ref().unwrap().content, "last");
}

#[tokio::test]
async fn test_ndjson_transport_error_ends_stream() {
    let parts: Vec<Result<Vec<u8>, std::io::Error>> = vec![
        Ok(b"{\"message\":{\"role\":\"assistant\",\"content\":\"a\"},\"done\":false}\n".to_vec()),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        Ok(b"{\"message\":{\"role\":\"assistant\",\"content\":\"b\"},\"done\":false}\n".to_vec()),
    ];
    let stream = parse_ndjson_stream(futures::stream::iter(parts));

    let items: Vec<_> = stream.collect().await;
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(items[1].as_ref().unwrap_err().to_string().contains("reset"));
}

#[tokio::test]
async fn test_ndjson_malformed_line_is_error() {
    let stream = parse_ndjson_stream(body(&["not json\n"]));
    let items: Vec<_> = stream.collect().await;

    assert_eq!(items.len(), 1);
    assert!(items[0].is_err());
}
