//! Outgoing response handle.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Clonable handle onto the response of the current turn.
///
/// The response is written once: the first `send`, `json` or `end` finishes
/// it and later writes are ignored.
#[derive(Clone, Default)]
pub struct Response {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    finished: bool,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, status: StatusCode) -> &Self {
        self.state.lock().status = status;
        self
    }

    pub fn set_header(&self, name: HeaderName, value: HeaderValue) -> &Self {
        self.state.lock().headers.insert(name, value);
        self
    }

    /// Finish the response with a body. Defaults `Content-Type` to plain text.
    pub fn send(&self, body: impl Into<Bytes>) {
        self.finish(
            body.into(),
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
    }

    /// Finish the response with a JSON body.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.finish(body.into(), HeaderValue::from_static("application/json"));
        Ok(())
    }

    /// Finish the response without a body.
    pub fn end(&self) {
        let mut state = self.state.lock();
        if state.finished {
            tracing::warn!("response already finished; ignoring end");
            return;
        }
        state.finished = true;
    }

    fn finish(&self, body: Bytes, content_type: HeaderValue) {
        let mut state = self.state.lock();
        if state.finished {
            tracing::warn!("response already finished; ignoring write");
            return;
        }
        state.headers.entry(CONTENT_TYPE).or_insert(content_type);
        state.body = body;
        state.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.state.lock().finished
    }

    pub fn status_code(&self) -> StatusCode {
        self.state.lock().status
    }

    pub fn header(&self, name: &str) -> Option<HeaderValue> {
        self.state.lock().headers.get(name).cloned()
    }

    pub fn body(&self) -> Bytes {
        self.state.lock().body.clone()
    }

    /// Snapshot the current state as an `http::Response`.
    pub fn to_http(&self) -> http::Response<Full<Bytes>> {
        let state = self.state.lock();
        let mut response = http::Response::new(Full::new(state.body.clone()));
        *response.status_mut() = state.status;
        *response.headers_mut() = state.headers.clone();
        response
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Response")
            .field("status", &state.status)
            .field("finished", &state.finished)
            .field("body_len", &state.body.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_sets_plain_text() {
        let res = Response::new();
        res.status(StatusCode::CREATED).send("hello");

        assert!(res.is_finished());
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(
            res.header("content-type").unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(res.body(), Bytes::from("hello"));
    }

    #[test]
    fn test_first_write_wins() {
        let res = Response::new();
        res.json(&serde_json::json!({"ok": true})).unwrap();
        res.send("ignored");

        assert_eq!(res.header("content-type").unwrap(), "application/json");
        assert_eq!(res.body(), Bytes::from(r#"{"ok":true}"#));
    }

    #[test]
    fn test_to_http_keeps_custom_headers() {
        let res = Response::new();
        res.set_header(
            HeaderName::from_static("x-request-kind"),
            HeaderValue::from_static("test"),
        )
        .set_header(CONTENT_TYPE, HeaderValue::from_static("text/html"))
        .send("<p>hi</p>");

        let http = res.to_http();
        assert_eq!(http.status(), StatusCode::OK);
        assert_eq!(http.headers()["x-request-kind"], "test");
        assert_eq!(http.headers()["content-type"], "text/html");
    }
}
