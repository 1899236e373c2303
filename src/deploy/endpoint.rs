//! Service URL resolution
//!
//! The storefront is exposed through a NodePort service, so the reachable
//! URL is the minikube node address plus the service's first node port.

use super::{CommandRunner, CommandSpec, DeployError};
use crate::config::ToolsConfig;
use std::fmt;
use tracing::info;

/// Externally reachable address of the storefront
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: u16,
}

impl ServiceEndpoint {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Build an endpoint from raw `minikube ip` and node port query output
pub fn parse_endpoint(ip_output: &str, port_output: &str) -> Result<ServiceEndpoint, DeployError> {
    let host = ip_output.trim();
    if host.is_empty() {
        return Err(DeployError::Resolve(
            "cluster address query returned nothing".to_string(),
        ));
    }

    let port_text = port_output.trim();
    let port = port_text.parse::<u16>().map_err(|_| {
        DeployError::Resolve(format!("service node port {:?} is not a port", port_text))
    })?;

    Ok(ServiceEndpoint {
        host: host.to_string(),
        port,
    })
}

/// Query the cluster for the storefront's address; no retries
pub async fn resolve_endpoint(
    runner: &dyn CommandRunner,
    tools: &ToolsConfig,
    service: &str,
) -> Result<ServiceEndpoint, DeployError> {
    let ip = runner
        .output(&CommandSpec::new(&tools.minikube).arg("ip"))
        .await?;
    let port = runner
        .output(&CommandSpec::new(&tools.kubectl).args([
            "get",
            "svc",
            service,
            "-o",
            "jsonpath={.spec.ports[0].nodePort}",
        ]))
        .await?;

    let endpoint = parse_endpoint(&ip, &port)?;
    info!(service = service, url = %endpoint, "Resolved service URL");
    Ok(endpoint)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::deploy::fake::ScriptedRunner;

    #[test]
    fn test_parse_endpoint_trims_output() {
        let endpoint = parse_endpoint("192.168.49.2\n", "30007\n").unwrap();
        assert_eq!(endpoint.host, "192.168.49.2");
        assert_eq!(endpoint.port, 30007);
        assert_eq!(endpoint.url(), "http://192.168.49.2:30007");
    }

    #[test]
    fn test_parse_endpoint_rejects_bad_values() {
        assert!(matches!(
            parse_endpoint("  \n", "30007"),
            Err(DeployError::Resolve(_))
        ));
        // Service without a node port renders an empty jsonpath result
        assert!(matches!(
            parse_endpoint("192.168.49.2", ""),
            Err(DeployError::Resolve(_))
        ));
        assert!(matches!(
            parse_endpoint("192.168.49.2", "70000"),
            Err(DeployError::Resolve(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_endpoint_queries_minikube_then_service() {
        let runner = ScriptedRunner::new()
            .with_output("192.168.49.2\n")
            .with_output("30007");

        let endpoint = resolve_endpoint(&runner, &ToolsConfig::default(), "mf-node-app-service")
            .await
            .unwrap();

        assert_eq!(endpoint.url(), "http://192.168.49.2:30007");
        assert_eq!(
            runner.calls(),
            vec![
                "minikube ip",
                "kubectl get svc mf-node-app-service -o jsonpath={.spec.ports[0].nodePort}",
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_endpoint_propagates_query_failure() {
        let runner = ScriptedRunner::new()
            .with_output("192.168.49.2")
            .with_failed_output("Error from server (NotFound): services \"x\" not found");

        let err = resolve_endpoint(&runner, &ToolsConfig::default(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::CommandFailed { .. }));
    }
}
