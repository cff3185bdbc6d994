//! 1&1 Cloud Server REST client
//!
//! Covers the endpoints the instance plugin needs: the appliance, datacenter
//! and fixed-size catalogs plus server create/read/list/delete.

use crate::error::{OneAndOneError, Result};
use instance_plugin::{Appliance, Datacenter, FixedSize, Server, ServerRequest};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Public 1&1 Cloud Server API endpoint
pub const BASE_URL: &str = "https://cloudpanel-api.1and1.com/v1";

const TOKEN_HEADER: &str = "X-TOKEN";

/// 1&1 Cloud Server API client
#[derive(Clone)]
pub struct OneAndOneClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OneAndOneClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .header(TOKEN_HEADER, &self.api_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// `GET /server_appliances?q=<filter>`
    pub async fn list_server_appliances(&self, filter: &str) -> Result<Vec<Appliance>> {
        let mut request = self.request(Method::GET, "server_appliances");
        if !filter.is_empty() {
            request = request.query(&[("q", filter)]);
        }
        self.send(request).await
    }

    /// `GET /datacenters`
    pub async fn list_datacenters(&self) -> Result<Vec<Datacenter>> {
        self.send(self.request(Method::GET, "datacenters")).await
    }

    /// `GET /servers/fixed_instance_sizes`
    pub async fn list_fixed_instance_sizes(&self) -> Result<Vec<FixedSize>> {
        self.send(self.request(Method::GET, "servers/fixed_instance_sizes"))
            .await
    }

    /// `POST /servers`
    pub async fn create_server(&self, request: &ServerRequest) -> Result<Server> {
        self.send(self.request(Method::POST, "servers").json(request))
            .await
    }

    /// `GET /servers/{id}`
    pub async fn get_server(&self, id: &str) -> Result<Server> {
        self.send(self.request(Method::GET, &format!("servers/{id}")))
            .await
    }

    /// `GET /servers?q=<filter>`
    pub async fn list_servers(&self, filter: &str) -> Result<Vec<Server>> {
        let mut request = self.request(Method::GET, "servers");
        if !filter.is_empty() {
            request = request.query(&[("q", filter)]);
        }
        self.send(request).await
    }

    /// `DELETE /servers/{id}?keep_ips=<bool>`
    pub async fn delete_server(&self, id: &str, keep_ips: bool) -> Result<Server> {
        let request = self
            .request(Method::DELETE, &format!("servers/{id}"))
            .query(&[("keep_ips", keep_ips)]);
        self.send(request).await
    }
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

fn api_error(status: StatusCode, body: &str) -> OneAndOneError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body.to_string()
            }
        });

    OneAndOneError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = OneAndOneClient::new("key", "http://localhost:8080/v1/");
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
        assert_eq!(
            client.url("/servers/fixed_instance_sizes"),
            "http://localhost:8080/v1/servers/fixed_instance_sizes"
        );
        assert_eq!(client.url("datacenters"), "http://localhost:8080/v1/datacenters");
    }

    #[test]
    fn test_api_error_uses_body_message() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"type": "BAD_REQUEST", "message": "Invalid appliance id", "errorCode": 400}"#,
        );
        match err {
            OneAndOneError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid appliance id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_reason() {
        let err = api_error(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "1&1 API returned 404: Not Found");

        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "1&1 API returned 502: upstream down");
    }

    #[test]
    fn test_server_listing_decodes() {
        let servers: Vec<Server> = serde_json::from_str(
            r#"[{
                "id": "A0B0C0D0E0F0",
                "name": "instance-0123456789",
                "status": { "state": "POWERED_ON", "percent": 0 },
                "ips": [{ "id": "59491508DF4B", "ip": "11.22.33.44" }],
                "datacenter": { "id": "1", "country_code": "DE" }
            }]"#,
        )
        .unwrap();

        assert_eq!(servers[0].name, "instance-0123456789");
        assert_eq!(servers[0].primary_ip(), Some("11.22.33.44"));
    }
}
