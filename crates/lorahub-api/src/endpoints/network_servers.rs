// Network-server endpoints
//
// Read-only: the network servers registered with the app server are
// administered out of band, we only need their ids to anchor service
// and device profiles.

use crate::client::AppServerClient;
use crate::error::Error;
use crate::types::{ListParams, ListResponse, NetworkServer};

impl AppServerClient {
    /// List the network servers the app server knows about.
    pub async fn list_network_servers(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<NetworkServer>, Error> {
        self.get("network-servers", &params.to_query()).await
    }

    /// The first registered network server, if any.
    ///
    /// Deployments bridged by this crate run a single network server,
    /// so "the first one" is the conventional choice when creating
    /// profiles.
    pub async fn default_network_server(&self) -> Result<Option<NetworkServer>, Error> {
        let params = ListParams::default().limit(1);
        let resp = self.list_network_servers(&params).await?;
        Ok(resp.result.into_iter().next())
    }
}
