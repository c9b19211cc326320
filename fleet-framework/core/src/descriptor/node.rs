use fleet_framework_config::{
    constants::{DEFAULT_CHAIN, DEFAULT_MAX_CONNECTIONS},
    fleet::FleetConfig,
    genesis::GenesisMaterial,
    nodes::{ChannelSpec, FleetNode},
};
use serde::Serialize;

use super::minter::StartupProbe;

const EXPORTER_CONTAINER_NAME: &str = "lnd-exporter";
const EXPORTER_PULL_POLICY: &str = "IfNotPresent";
const EXPORTER_PORT_NAME: &str = "prom-metrics";
const MACAROON_VOLUME: &str = "config";
const MACAROON_MOUNT_PATH: &str = "/macaroon.hex";
const MACAROON_SUB_PATH: &str = "MACAROON_HEX";

/// `(metric, REST path, JSON field)` triples the exporter scrapes from lnd.
const EXPORTED_METRICS: [(&str, &str, &str); 5] = [
    ("lnd_balance_channels", "/v1/balance/channels", "balance"),
    (
        "lnd_local_balance_channels",
        "/v1/balance/channels",
        "local_balance.sat",
    ),
    (
        "lnd_remote_balance_channels",
        "/v1/balance/channels",
        "remote_balance.sat",
    ),
    ("lnd_block_height", "/v1/getinfo", "block_height"),
    ("lnd_peers", "/v1/getinfo", "num_peers"),
];

/// One entry of `network.yaml`'s `nodes` list.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDeclaration {
    name: String,
    image: ImageTag,
    global: GlobalSettings,
    config: String,
    addnode: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ln: Option<LnToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lnd: Option<LndDeclaration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    startup_probe: Option<StartupProbe>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ImageTag {
    pub tag: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct GlobalSettings {
    pub rpcpassword: String,
    pub chain: String,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct LnToggle {
    pub lnd: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LndDeclaration {
    pub image: ImageTag,
    pub channels: Vec<ChannelSpec>,
    pub config: String,
    pub macaroon_root_key: String,
    pub admin_macaroon: String,
    pub metrics_export: bool,
    pub prometheus_metrics_port: u16,
    pub extra_containers: Vec<ContainerSpec>,
}

/// Sidecar container spec, in Kubernetes field naming.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub image_pull_policy: String,
    pub volume_mounts: Vec<VolumeMount>,
    pub env: Vec<EnvEntry>,
    pub ports: Vec<ContainerPort>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub name: String,
    pub mount_path: String,
    pub sub_path: String,
}

/// Environment variable entry for container specs.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct EnvEntry {
    pub name: String,
    pub value: String,
}

impl EnvEntry {
    pub(crate) fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    pub name: String,
    pub container_port: u16,
    pub protocol: String,
}

impl NodeDeclaration {
    /// Render a fleet node with its lnd subtree and metrics sidecar.
    #[must_use]
    pub fn from_node(node: &FleetNode, genesis: &GenesisMaterial, config: &FleetConfig) -> Self {
        Self {
            name: node.name().to_owned(),
            image: ImageTag {
                tag: node.bitcoin_image_tag().to_owned(),
            },
            global: GlobalSettings {
                rpcpassword: node.rpc_password().to_owned(),
                chain: DEFAULT_CHAIN.to_owned(),
            },
            config: bitcoin_conf(node.name(), genesis),
            addnode: node.addnode().to_vec(),
            ln: Some(LnToggle { lnd: true }),
            lnd: Some(lnd_declaration(node, config)),
            startup_probe: None,
        }
    }

    pub(crate) fn strip_lightning(&mut self) {
        self.ln = None;
        self.lnd = None;
    }

    pub(crate) fn set_startup_probe(&mut self, probe: StartupProbe) {
        self.startup_probe = Some(probe);
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn image(&self) -> &ImageTag {
        &self.image
    }

    #[must_use]
    pub fn global(&self) -> &GlobalSettings {
        &self.global
    }

    #[must_use]
    pub fn config(&self) -> &str {
        &self.config
    }

    #[must_use]
    pub fn addnode(&self) -> &[String] {
        &self.addnode
    }

    #[must_use]
    pub fn ln(&self) -> Option<LnToggle> {
        self.ln
    }

    #[must_use]
    pub fn lnd(&self) -> Option<&LndDeclaration> {
        self.lnd.as_ref()
    }

    #[must_use]
    pub fn startup_probe(&self) -> Option<&StartupProbe> {
        self.startup_probe.as_ref()
    }
}

fn bitcoin_conf(name: &str, genesis: &GenesisMaterial) -> String {
    [
        format!("maxconnections={DEFAULT_MAX_CONNECTIONS}"),
        format!("uacomment=miner{name}"),
        format!("signetchallenge={}", genesis.challenge_hex()),
        "coinstatsindex=1".to_owned(),
    ]
    .join("\n")
}

fn lnd_declaration(node: &FleetNode, config: &FleetConfig) -> LndDeclaration {
    let credential = node.credential();
    LndDeclaration {
        image: ImageTag {
            tag: node.lnd_image_tag().to_owned(),
        },
        channels: node.channels().to_vec(),
        config: format!("alias={}", node.name()),
        macaroon_root_key: credential.root_key_base64().to_owned(),
        admin_macaroon: credential.admin_macaroon().to_owned(),
        metrics_export: true,
        prometheus_metrics_port: config.metrics.port,
        extra_containers: vec![exporter_container(config)],
    }
}

fn exporter_container(config: &FleetConfig) -> ContainerSpec {
    ContainerSpec {
        name: EXPORTER_CONTAINER_NAME.to_owned(),
        image: config.metrics.exporter_image.clone(),
        image_pull_policy: EXPORTER_PULL_POLICY.to_owned(),
        volume_mounts: vec![VolumeMount {
            name: MACAROON_VOLUME.to_owned(),
            mount_path: MACAROON_MOUNT_PATH.to_owned(),
            sub_path: MACAROON_SUB_PATH.to_owned(),
        }],
        env: vec![EnvEntry::new("METRICS", metrics_expression())],
        ports: vec![ContainerPort {
            name: EXPORTER_PORT_NAME.to_owned(),
            container_port: config.metrics.port,
            protocol: "TCP".to_owned(),
        }],
    }
}

fn metrics_expression() -> String {
    EXPORTED_METRICS
        .iter()
        .map(|(metric, path, field)| format!(r#"{metric}=parse("{path}","{field}")"#))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use fleet_framework_config::{
        genesis::derive_genesis,
        nodes::{ChannelId, Credential, ln_endpoint},
    };

    use super::*;

    fn sample_node() -> FleetNode {
        let mut node = FleetNode::new(
            "tank-0007",
            "29.0",
            "v0.19.0-beta",
            "cafebabe",
            Credential::new(&[0; 32], "0201abcd".into()),
        );
        node.open_channel(ChannelSpec {
            id: ChannelId::new(500, 1),
            target: ln_endpoint("tank-0003"),
            capacity: 300_000,
            push_amount: 150_000,
        })
        .unwrap();
        node.add_peer("miner");
        node
    }

    #[test]
    fn bitcoin_config_embeds_shared_challenge() {
        let genesis = derive_genesis().unwrap();
        let decl = NodeDeclaration::from_node(&sample_node(), &genesis, &FleetConfig::default());

        let lines: Vec<&str> = decl.config().lines().collect();
        assert_eq!(
            lines,
            [
                "maxconnections=1000",
                "uacomment=minertank-0007",
                format!("signetchallenge={}", genesis.challenge_hex()).as_str(),
                "coinstatsindex=1",
            ]
        );
        assert_eq!(decl.global().chain, "signet");
        assert_eq!(decl.global().rpcpassword, "cafebabe");
        assert_eq!(decl.addnode(), ["miner"]);
        assert_eq!(decl.ln(), Some(LnToggle { lnd: true }));
    }

    #[test]
    fn lnd_subtree_carries_credentials_and_channels() {
        let genesis = derive_genesis().unwrap();
        let decl = NodeDeclaration::from_node(&sample_node(), &genesis, &FleetConfig::default());
        let lnd = decl.lnd().unwrap();

        assert_eq!(lnd.image.tag, "v0.19.0-beta");
        assert_eq!(lnd.config, "alias=tank-0007");
        assert_eq!(lnd.admin_macaroon, "0201abcd");
        assert_eq!(
            lnd.macaroon_root_key,
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
        );
        assert_eq!(lnd.channels.len(), 1);
        assert_eq!(lnd.channels[0].target, "tank-0003-ln");
        assert!(lnd.metrics_export);
        assert_eq!(lnd.prometheus_metrics_port, 9332);
    }

    #[test]
    fn exporter_sidecar_matches_reference() {
        let container = exporter_container(&FleetConfig::default());
        assert_eq!(container.name, "lnd-exporter");
        assert_eq!(container.image, "bitdonkey/lnd-exporter:0.1.3");
        assert_eq!(container.image_pull_policy, "IfNotPresent");
        assert_eq!(container.volume_mounts[0].mount_path, "/macaroon.hex");
        assert_eq!(container.volume_mounts[0].sub_path, "MACAROON_HEX");
        assert_eq!(container.ports[0].container_port, 9332);
        assert_eq!(container.ports[0].protocol, "TCP");
        assert_eq!(
            container.env[0].value,
            concat!(
                r#"lnd_balance_channels=parse("/v1/balance/channels","balance") "#,
                r#"lnd_local_balance_channels=parse("/v1/balance/channels","local_balance.sat") "#,
                r#"lnd_remote_balance_channels=parse("/v1/balance/channels","remote_balance.sat") "#,
                r#"lnd_block_height=parse("/v1/getinfo","block_height") "#,
                r#"lnd_peers=parse("/v1/getinfo","num_peers")"#,
            )
        );
    }

    #[test]
    fn serializes_with_warnet_keys() {
        let genesis = derive_genesis().unwrap();
        let decl = NodeDeclaration::from_node(&sample_node(), &genesis, &FleetConfig::default());
        let yaml = serde_yaml::to_string(&decl).unwrap();

        for key in [
            "macaroonRootKey:",
            "adminMacaroon:",
            "metricsExport: true",
            "prometheusMetricsPort: 9332",
            "extraContainers:",
            "imagePullPolicy: IfNotPresent",
            "mountPath: /macaroon.hex",
            "containerPort: 9332",
            "push_amt: 150000",
        ] {
            assert!(yaml.contains(key), "missing {key} in:\n{yaml}");
        }
        assert!(!yaml.contains("startupProbe"));
    }
}
