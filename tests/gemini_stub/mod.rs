use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::Value;

pub const STUB_MODEL: &str = "gemini-stub";
pub const STUB_API_KEY: &str = "test-key";

#[derive(Debug, Clone, Copy)]
pub enum ImproveBehavior {
    Rewrite,
    Malformed,
}

pub struct GeminiStub {
    pub base_url: String,
    requests: Arc<AtomicUsize>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl GeminiStub {
    pub fn spawn(improve_behavior: ImproveBehavior) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start gemini stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/v1beta");
        let expected_path = format!("/v1beta/models/{STUB_MODEL}:generateContent");

        let requests = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&requests);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };
                seen.fetch_add(1, Ordering::SeqCst);

                if request.method() != &tiny_http::Method::Post || request.url() != expected_path {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }

                let authorized = request.headers().iter().any(|h| {
                    h.field.equiv("x-goog-api-key") && h.value.as_str() == STUB_API_KEY
                });
                if !authorized {
                    let _ = request.respond(
                        tiny_http::Response::from_string(
                            r#"{"error":{"code":403,"message":"API key not valid"}}"#,
                        )
                        .with_status_code(403),
                    );
                    continue;
                }

                let mut body = String::new();
                if request.as_reader().read_to_string(&mut body).is_err() {
                    let _ = request.respond(
                        tiny_http::Response::from_string("invalid request body")
                            .with_status_code(400),
                    );
                    continue;
                }
                let parsed: Value = match serde_json::from_str(&body) {
                    Ok(value) => value,
                    Err(_) => {
                        let _ = request.respond(
                            tiny_http::Response::from_string("invalid json").with_status_code(400),
                        );
                        continue;
                    }
                };

                let Some(prompt) = parsed
                    .pointer("/contents/0/parts/0/text")
                    .and_then(|v| v.as_str())
                else {
                    let _ = request.respond(
                        tiny_http::Response::from_string("missing prompt").with_status_code(400),
                    );
                    continue;
                };
                if parsed
                    .pointer("/generationConfig/responseMimeType")
                    .and_then(|v| v.as_str())
                    != Some("application/json")
                {
                    let _ = request.respond(
                        tiny_http::Response::from_string("responseMimeType must be json")
                            .with_status_code(400),
                    );
                    continue;
                }

                let output_text = if prompt.contains("improve a specific section") {
                    match improve_behavior {
                        ImproveBehavior::Rewrite => improved_section(prompt).to_string(),
                        ImproveBehavior::Malformed => "Sure! Here is a better version.".to_owned(),
                    }
                } else {
                    generation_response().to_string()
                };

                // Split the payload across two parts; clients must concatenate them.
                let mid = output_text.len() / 2;
                let mid = (mid..output_text.len())
                    .find(|&i| output_text.is_char_boundary(i))
                    .unwrap_or(output_text.len());
                let (head, tail) = output_text.split_at(mid);
                let response_body = serde_json::json!({
                    "candidates": [
                        {
                            "content": {
                                "role": "model",
                                "parts": [ { "text": head }, { "text": tail } ]
                            },
                            "finishReason": "STOP"
                        }
                    ]
                });

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                let response = tiny_http::Response::from_string(response_body.to_string())
                    .with_status_code(200)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for GeminiStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn section(name: &str, content: &str, criterion: &str) -> Value {
    serde_json::json!({
        "name": name,
        "content": content,
        "checklist": [
            { "criterion": criterion, "met": true, "description": format!("{criterion} satisfied") }
        ],
        "summary": format!("Summary of {name}"),
        "error": ""
    })
}

fn generation_response() -> Value {
    let sections = vec![
        section("Preheader", "Save hours every week", "is_short"),
        section("Subject Line", "Meet Acme Planner", "is_clear"),
        section(
            "Header Image or Clean Hero Section",
            "Plan smarter with Acme",
            "is_visual",
        ),
        section("Opening Line", "Hi there,", "is_personal"),
        section(
            "Body Copy",
            "Acme Planner keeps your week on track.\nNo more missed deadlines.",
            "is_concise",
        ),
        section(
            "Social Proof / Micro-Story / Case Snippet",
            "Teams at Globex ship 30% faster <with> Acme.",
            "is_credible",
        ),
        section("Call-to-Action (CTA)", "Start your free trial", "is_action_oriented"),
        section("Secondary CTA", "Read the case study", "is_optional"),
        section("Signature Block", "Jane Doe\nHead of Growth", "is_human"),
        section(
            "Footer (Compliance + Unsubscribe + Legal Info)",
            "Acme Inc. | Unsubscribe",
            "has_legal_info",
        ),
    ];
    let full_email_text = sections
        .iter()
        .filter_map(|s| s.get("content").and_then(|c| c.as_str()))
        .collect::<Vec<_>>()
        .join("\n\n");

    serde_json::json!({
        "pre_generation_checklist": ["Define the audience", "Pick one goal"],
        "email_data": {
            "sections": sections,
            "final_review": {
                "mobile_preview": true,
                "links_checked": true,
                "grammar_verified": true,
                "spam_score_ok": true,
                "send_time_suggested": "Tuesday 10:00",
                "error": ""
            },
            "full_email_text": full_email_text
        }
    })
}

fn improved_section(prompt: &str) -> Value {
    let name = prompt
        .split("- Name: \"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap_or("Unknown");
    section(name, "IMPROVED OPENING", "is_personal")
}
