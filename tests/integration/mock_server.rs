//! Mock HTTP server setup for integration tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use eleven_rs::{Callbacks, ClientConfig, ElevenClient};
use mockito::{Mock, Server, ServerGuard};

pub const TEST_API_KEY: &str = "test-key";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Config pointed at the mock server, with zero backoff so retries are instant.
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(TEST_API_KEY)
            .with_base_url(&self.base_url)
            .with_retry_delay(Duration::ZERO)
    }

    pub fn client(&self) -> ElevenClient {
        self.client_with(|c| c)
    }

    pub fn client_with(&self, f: impl FnOnce(ClientConfig) -> ClientConfig) -> ElevenClient {
        ElevenClient::new(f(self.config())).expect("client builds")
    }

    /// Create a mock returning a JSON body
    pub async fn mock_json(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Create a mock for an error response hit exactly `hits` times
    pub async fn mock_error(&mut self, method: &str, path: &str, status: usize, hits: usize) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":{"status":"error","message":"mock failure"}}"#)
            .expect(hits)
            .create_async()
            .await
    }

    /// Create a mock returning raw audio bytes
    pub async fn mock_audio(&mut self, path: &str, body: &[u8]) -> Mock {
        self.server
            .mock("POST", path)
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(body)
            .create_async()
            .await
    }
}

/// Records event names in the order callbacks fire.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events().iter().filter(|e| e.as_str() == name).count()
    }

    /// Callbacks recording every transport and domain event.
    pub fn callbacks(&self) -> Callbacks {
        let (req, resp, err, retry, rate, audio, added, deleted) = (
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
        );
        Callbacks::new()
            .on_request(move |_| {
                req.push("request");
                Ok(())
            })
            .on_response(move |_| {
                resp.push("response");
                Ok(())
            })
            .on_error(move |_| {
                err.push("error");
                Ok(())
            })
            .on_retry(move |_| {
                retry.push("retry");
                Ok(())
            })
            .on_rate_limit(move |_| {
                rate.push("rate_limit");
                Ok(())
            })
            .on_audio_generated(move |_| {
                audio.push("audio_generated");
                Ok(())
            })
            .on_voice_added(move |_| {
                added.push("voice_added");
                Ok(())
            })
            .on_voice_deleted(move |_| {
                deleted.push("voice_deleted");
                Ok(())
            })
    }
}
