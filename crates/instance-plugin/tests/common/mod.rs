use async_trait::async_trait;
use instance_plugin::{
    Appliance, Datacenter, FixedSize, ProviderError, ProviderResult, Server, ServerApi, ServerIp,
    ServerRequest, ServerStatus,
};
use std::sync::Mutex;

/// In-process stand-in for the provider's server API
#[derive(Default)]
pub struct FakeApi {
    pub appliances: Vec<Appliance>,
    pub datacenters: Vec<Datacenter>,
    pub sizes: Vec<FixedSize>,
    pub ip: Option<String>,
    pub state: String,
    pub fail_create: bool,
    pub fail_delete: bool,
    pub fail_list: bool,
    pub servers: Mutex<Vec<Server>>,
    pub created: Mutex<Vec<ServerRequest>>,
    pub deleted: Mutex<Vec<(String, bool)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            appliances: vec![
                Appliance {
                    id: "B5F778B85C041347BCDCFC3172AB3F3C".into(),
                    name: "CoreOS_Stable_64std".into(),
                },
                Appliance {
                    id: "C5A349786169F140BCBC335675014C08".into(),
                    name: "ubuntu1404-64std".into(),
                },
            ],
            datacenters: vec![
                Datacenter {
                    id: "1".into(),
                    country_code: "DE".into(),
                },
                Datacenter {
                    id: "2".into(),
                    country_code: "US".into(),
                },
            ],
            sizes: vec![
                FixedSize {
                    id: "S1".into(),
                    name: "S".into(),
                },
                FixedSize {
                    id: "M1".into(),
                    name: "M".into(),
                },
            ],
            ip: Some("11.22.33.44".into()),
            state: "POWERED_ON".into(),
            ..Default::default()
        }
    }

    /// Register a server the provider already knows about
    pub fn with_server(self, id: &str, name: &str) -> Self {
        self.servers.lock().unwrap().push(Server {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        });
        self
    }

    pub fn server_count(&self) -> usize {
        self.servers.lock().unwrap().len()
    }
}

#[async_trait]
impl ServerApi for FakeApi {
    async fn list_appliances(&self, filter: &str) -> ProviderResult<Vec<Appliance>> {
        Ok(self
            .appliances
            .iter()
            .filter(|a| {
                a.name.to_lowercase().contains(filter) || a.id.to_lowercase().contains(filter)
            })
            .cloned()
            .collect())
    }

    async fn list_datacenters(&self) -> ProviderResult<Vec<Datacenter>> {
        Ok(self.datacenters.clone())
    }

    async fn list_fixed_sizes(&self) -> ProviderResult<Vec<FixedSize>> {
        Ok(self.sizes.clone())
    }

    async fn create_server(&self, request: &ServerRequest) -> ProviderResult<(String, Server)> {
        if self.fail_create {
            return Err(ProviderError::Status {
                status: 500,
                message: "internal error".into(),
            });
        }

        let mut servers = self.servers.lock().unwrap();
        let server = Server {
            id: format!("SRV{:04}", servers.len() + 1),
            name: request.name.clone(),
            status: Some(ServerStatus {
                state: self.state.clone(),
                percent: None,
            }),
            ips: self.ip.clone().map(|ip| {
                vec![ServerIp {
                    id: "IP1".into(),
                    ip,
                }]
            }),
        };
        servers.push(server.clone());
        self.created.lock().unwrap().push(request.clone());

        Ok((format!("REQ-{}", server.id), server))
    }

    async fn get_server(&self, id: &str) -> ProviderResult<Server> {
        self.servers
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ProviderError::Status {
                status: 404,
                message: format!("server {id} not found"),
            })
    }

    async fn list_servers(&self, filter: &str) -> ProviderResult<Vec<Server>> {
        if self.fail_list {
            return Err(ProviderError::Transport("connection reset".into()));
        }

        Ok(self
            .servers
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.name.contains(filter))
            .cloned()
            .collect())
    }

    async fn delete_server(&self, id: &str, keep_ips: bool) -> ProviderResult<Server> {
        if self.fail_delete {
            return Err(ProviderError::Status {
                status: 409,
                message: "server is locked".into(),
            });
        }

        self.deleted.lock().unwrap().push((id.to_string(), keep_ips));
        let mut servers = self.servers.lock().unwrap();
        let pos = servers
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| ProviderError::Status {
                status: 404,
                message: format!("server {id} not found"),
            })?;
        Ok(servers.remove(pos))
    }
}
