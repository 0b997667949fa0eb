use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A discovered entity: one normalized record per inventory item.
///
/// The enum tag doubles as the `resource_type` discriminator in the JSON
/// encoding, and each variant carries exactly one type-specific details
/// payload, so a resource can never hold details for more than one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resource_type", rename_all = "snake_case")]
pub enum Resource {
    AwsEc2Instance {
        aws_ec2_instance_details: AwsEc2InstanceDetails,
    },
    AwsEcsCluster {
        aws_ecs_cluster_details: AwsEcsClusterDetails,
    },
    AwsRdsInstance {
        aws_rds_instance_details: AwsRdsInstanceDetails,
    },
    AwsSsmTarget {
        aws_ssm_target_details: AwsSsmTargetDetails,
    },
    KubernetesService {
        kubernetes_service_details: KubernetesServiceDetails,
    },
    LocalDockerContainer {
        local_docker_container_details: LocalDockerContainerDetails,
    },
    NetworkHttpServer {
        network_http_server_details: NetworkBaseDetails,
    },
    NetworkHttpsServer {
        network_https_server_details: NetworkBaseDetails,
    },
    NetworkMysqlServer {
        network_mysql_server_details: NetworkBaseDetails,
    },
    NetworkPostgresqlServer {
        network_postgresql_server_details: NetworkBaseDetails,
    },
    NetworkSshServer {
        network_ssh_server_details: NetworkBaseDetails,
    },
}

impl Resource {
    /// The `resource_type` discriminator value, for logging and metadata.
    pub fn resource_type(&self) -> &'static str {
        match self {
            Resource::AwsEc2Instance { .. } => "aws_ec2_instance",
            Resource::AwsEcsCluster { .. } => "aws_ecs_cluster",
            Resource::AwsRdsInstance { .. } => "aws_rds_instance",
            Resource::AwsSsmTarget { .. } => "aws_ssm_target",
            Resource::KubernetesService { .. } => "kubernetes_service",
            Resource::LocalDockerContainer { .. } => "local_docker_container",
            Resource::NetworkHttpServer { .. } => "network_http_server",
            Resource::NetworkHttpsServer { .. } => "network_https_server",
            Resource::NetworkMysqlServer { .. } => "network_mysql_server",
            Resource::NetworkPostgresqlServer { .. } => "network_postgresql_server",
            Resource::NetworkSshServer { .. } => "network_ssh_server",
        }
    }
}

/// Details shared by all discovered AWS resources.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AwsBaseDetails {
    pub aws_account_id: String,
    pub aws_region: String,
    pub aws_arn: String,
}

/// Details of a discovered AWS EC2 instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AwsEc2InstanceDetails {
    #[serde(flatten)]
    pub base: AwsBaseDetails,

    #[serde(default)]
    pub tags: HashMap<String, String>,

    pub instance_id: String,
    pub instance_type: String,
    pub instance_state: String,
    pub vpc_id: String,
    pub subnet_id: String,
    pub availability_zone: String,
    pub private_dns_name: String,
    pub private_ip_address: String,
    pub public_dns_name: String,
    pub public_ip_address: String,
}

/// Details of a discovered AWS ECS cluster.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AwsEcsClusterDetails {
    #[serde(flatten)]
    pub base: AwsBaseDetails,

    #[serde(default)]
    pub tags: HashMap<String, String>,

    pub cluster_name: String,
    pub cluster_status: String,
    pub services: Vec<String>,
    pub tasks: Vec<String>,
}

/// Details of a discovered AWS RDS instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AwsRdsInstanceDetails {
    #[serde(flatten)]
    pub base: AwsBaseDetails,

    #[serde(default)]
    pub tags: HashMap<String, String>,

    pub db_instance_identifier: String,
    pub db_instance_status: String,
    pub engine: String,
    pub engine_version: String,
    pub vpc_id: String,
    pub endpoint_address: String,
    pub endpoint_port: u16,
}

/// Details of a discovered AWS SSM managed-instance target.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AwsSsmTargetDetails {
    #[serde(flatten)]
    pub base: AwsBaseDetails,

    pub instance_id: String,
    pub ping_status: String,
}

/// Details of a discovered Kubernetes service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KubernetesServiceDetails {
    pub namespace: String,
    pub name: String,
    pub uid: String,
    pub service_type: String,
    pub cluster_ip: String,
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Details of a container managed by the local Docker daemon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalDockerContainerDetails {
    pub container_id: String,
    pub image: String,
    pub status: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub port_bindings: HashMap<String, Vec<String>>,
}

/// Details shared by all services discovered on the network.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NetworkBaseDetails {
    pub ip_address: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<String>,
}
