//! Transport-agnostic MCP request handling.
//!
//! Both the stdio loop and the SSE transport feed JSON-RPC requests through
//! [`McpService::handle`]; the envelope produced by the dispatcher crosses
//! every transport byte-identical as text content, so clients can branch on
//! the failure `kind` no matter how they connected.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::jsonrpc::{INVALID_PARAMS, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND};
use stratus_tools::Dispatcher;
use stratus_types::ResultEnvelope;

/// MCP protocol version this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub struct McpService {
    dispatcher: Arc<Dispatcher>,
}

#[derive(Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl McpService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Handle one JSON-RPC request. Notifications return `None`.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "notification");
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {"tools": {}},
                    "serverInfo": {
                        "name": "stratus",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                json!({"tools": self.dispatcher.registry().mcp_definitions()}),
            ),
            "tools/call" => self.handle_tool_call(id, request.params).await,
            other => {
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
            }
        };
        Some(response)
    }

    async fn handle_tool_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(p)) => p,
            Ok(None) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, "tools/call requires params");
            }
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}"));
            }
        };

        let envelope = self
            .dispatcher
            .dispatch(&params.name, &params.arguments, self.dispatcher.caller_scope())
            .await;
        JsonRpcResponse::success(id, call_result(&envelope))
    }
}

/// Render an envelope as an MCP tool result: the serialized envelope as text
/// content, `isError` mirroring the variant.
fn call_result(envelope: &ResultEnvelope) -> Value {
    let text = serde_json::to_string(envelope)
        .unwrap_or_else(|_| r#"{"error":{"kind":"backend","message":"unserializable result"}}"#.into());
    json!({
        "content": [{"type": "text", "text": text}],
        "isError": envelope.is_failure(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stratus_portal::{Args, BoxFuture, PortalBackend, SessionManager};
    use stratus_tools::ToolRegistry;
    use stratus_types::{
        AuthError, BackendError, Credentials, Operation, Scope, Secret, SessionHandle,
    };

    struct StubPortal {
        executes: AtomicUsize,
    }

    impl PortalBackend for StubPortal {
        fn login<'a>(
            &'a self,
            credentials: &'a Credentials,
        ) -> BoxFuture<'a, Result<SessionHandle, AuthError>> {
            Box::pin(async move { Ok(SessionHandle::new("t", credentials.scope)) })
        }

        fn execute<'a>(
            &'a self,
            _handle: &'a SessionHandle,
            operation: Operation,
            _args: &'a Args,
        ) -> BoxFuture<'a, Result<Value, BackendError>> {
            Box::pin(async move {
                self.executes.fetch_add(1, Ordering::SeqCst);
                match operation {
                    Operation::CurrentSession => Ok(json!("Authenticated as svc")),
                    _ => Ok(json!({"ok": true})),
                }
            })
        }

        fn logout<'a>(
            &'a self,
            _handle: &'a SessionHandle,
        ) -> BoxFuture<'a, Result<(), BackendError>> {
            Box::pin(async move { Ok(()) })
        }
    }

    fn service() -> McpService {
        let stub = Arc::new(StubPortal {
            executes: AtomicUsize::new(0),
        });
        let credentials = Credentials {
            host: "portal.test".into(),
            port: 443,
            user: "svc".into(),
            password: Secret::new("pw"),
            scope: Scope::User,
            tls: true,
        };
        let sessions = Arc::new(SessionManager::new(stub, credentials));
        McpService::new(Arc::new(Dispatcher::new(
            ToolRegistry::with_builtins(),
            sessions,
        )))
    }

    fn request(raw: &str) -> JsonRpcRequest {
        serde_json::from_str(raw).unwrap()
    }

    #[tokio::test]
    async fn initialize_reports_protocol_and_server_info() {
        let resp = service()
            .handle(request(
                r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            ))
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "stratus");
    }

    #[tokio::test]
    async fn initialized_notification_gets_no_response() {
        let resp = service()
            .handle(request(
                r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            ))
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn null_id_request_still_gets_a_response() {
        let resp = service()
            .handle(request(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#))
            .await
            .expect("a null id is a request, not a notification");
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.result, Some(json!({})));
    }

    #[tokio::test]
    async fn tools_list_enumerates_the_catalog() {
        let resp = service()
            .handle(request(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#))
            .await
            .unwrap();
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert!(tools.iter().any(|t| t["name"] == "who_am_i"));
        assert!(tools.iter().any(|t| t["name"] == "list_dir"));
    }

    #[tokio::test]
    async fn tools_call_wraps_the_envelope_as_text_content() {
        let resp = service()
            .handle(request(
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"who_am_i","arguments":{}}}"#,
            ))
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], false);
        let text = result["content"][0]["text"].as_str().unwrap();
        let envelope: ResultEnvelope = serde_json::from_str(text).unwrap();
        assert_eq!(
            envelope,
            ResultEnvelope::success(json!("Authenticated as svc"))
        );
    }

    #[tokio::test]
    async fn tools_call_failure_sets_is_error_and_keeps_kind() {
        let resp = service()
            .handle(request(
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"list_dir","arguments":{}}}"#,
            ))
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        let wire: Value = serde_json::from_str(text).unwrap();
        assert_eq!(wire["error"]["kind"], "invalid_argument");
    }

    #[tokio::test]
    async fn unknown_method_is_a_jsonrpc_error() {
        let resp = service()
            .handle(request(r#"{"jsonrpc":"2.0","id":5,"method":"bogus/method"}"#))
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn tools_call_without_params_is_invalid() {
        let resp = service()
            .handle(request(r#"{"jsonrpc":"2.0","id":6,"method":"tools/call"}"#))
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }
}
