//! Blocking `Transport` backed by a ureq agent.

use todo_social_core::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

/// Executes requests with ureq. Status codes are never turned into errors
/// here; the core decides what a 4xx or 5xx means.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            path,
            headers,
            body,
        } = req;

        let result = match method {
            HttpMethod::Get => headers
                .iter()
                .fold(self.agent.get(&path), |b, (k, v)| b.header(k.as_str(), v.as_str()))
                .call(),
            HttpMethod::Delete => headers
                .iter()
                .fold(self.agent.delete(&path), |b, (k, v)| b.header(k.as_str(), v.as_str()))
                .call(),
            HttpMethod::Post => {
                let builder = headers
                    .iter()
                    .fold(self.agent.post(&path), |b, (k, v)| b.header(k.as_str(), v.as_str()));
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
