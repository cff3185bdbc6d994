//! 1&1 Cloud Server provider implementation

use crate::client::{BASE_URL, OneAndOneClient};
use async_trait::async_trait;
use instance_plugin::{
    Appliance, Datacenter, FixedSize, ProviderResult, Server, ServerApi, ServerRequest,
};

/// 1&1 Cloud Server provider
pub struct OneAndOneProvider {
    client: OneAndOneClient,
}

impl OneAndOneProvider {
    /// Provider talking to the public API endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: OneAndOneClient::new(api_key, base_url),
        }
    }

    pub fn client(&self) -> &OneAndOneClient {
        &self.client
    }
}

#[async_trait]
impl ServerApi for OneAndOneProvider {
    async fn list_appliances(&self, filter: &str) -> ProviderResult<Vec<Appliance>> {
        Ok(self.client.list_server_appliances(filter).await?)
    }

    async fn list_datacenters(&self) -> ProviderResult<Vec<Datacenter>> {
        Ok(self.client.list_datacenters().await?)
    }

    async fn list_fixed_sizes(&self) -> ProviderResult<Vec<FixedSize>> {
        Ok(self.client.list_fixed_instance_sizes().await?)
    }

    async fn create_server(&self, request: &ServerRequest) -> ProviderResult<(String, Server)> {
        tracing::info!("Creating server: {}", request.name);
        let server = self.client.create_server(request).await?;
        Ok((server.id.clone(), server))
    }

    async fn get_server(&self, id: &str) -> ProviderResult<Server> {
        Ok(self.client.get_server(id).await?)
    }

    async fn list_servers(&self, filter: &str) -> ProviderResult<Vec<Server>> {
        Ok(self.client.list_servers(filter).await?)
    }

    async fn delete_server(&self, id: &str, keep_ips: bool) -> ProviderResult<Server> {
        tracing::info!("Deleting server: {}", id);
        Ok(self.client.delete_server(id, keep_ips).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instance_plugin::ProviderError;

    #[test]
    fn test_default_endpoint() {
        let provider = OneAndOneProvider::new("key");
        assert_eq!(provider.client().base_url(), BASE_URL);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 1 on loopback refuses connections
        let provider = OneAndOneProvider::with_base_url("dummykey", "http://127.0.0.1:1/v1");

        let result = provider.list_datacenters().await;
        let err = tokio_test::assert_err!(result);
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
