use std::collections::HashSet;

use thiserror::Error;

use crate::nodes::{ChannelId, FleetNode, MinterNode};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FleetInvariantError {
    #[error("fleet must include at least one node")]
    EmptyFleet,
    #[error("fleet has no minter attached")]
    MissingMinter,
    #[error("node name {name} appears more than once")]
    DuplicateName { name: String },
    #[error("node {node} has a channel to itself")]
    SelfLoop { node: String },
    #[error("node {node} has a channel to the minter")]
    ChannelToMinter { node: String },
    #[error("channel id {block}x{index} on node {node} is not newer than its predecessor")]
    ChannelIdOrder {
        node: String,
        block: u64,
        index: u32,
    },
    #[error("channel id {block}x{index} is used more than once")]
    DuplicateChannelId { block: u64, index: u32 },
    #[error("node {node} lists the minter {count} times (expected exactly once)")]
    MinterPeerCount { node: String, count: usize },
    #[error("minter must not dial any peer, found {peers}")]
    MinterHasPeers { peers: usize },
}

/// Validate the shape of a fully wired fleet before it is rendered.
pub fn validate_fleet(
    nodes: &[FleetNode],
    minter: Option<&MinterNode>,
) -> Result<(), FleetInvariantError> {
    if nodes.is_empty() {
        return Err(FleetInvariantError::EmptyFleet);
    }
    let minter = minter.ok_or(FleetInvariantError::MissingMinter)?;

    let mut names = HashSet::with_capacity(nodes.len() + 1);
    for name in nodes.iter().map(FleetNode::name).chain([minter.name()]) {
        if !names.insert(name) {
            return Err(FleetInvariantError::DuplicateName {
                name: name.to_owned(),
            });
        }
    }

    let minter_endpoint = minter.node().ln_endpoint();
    let mut seen_ids: HashSet<ChannelId> = HashSet::new();
    for node in nodes {
        validate_channels(node, &minter_endpoint, &mut seen_ids)?;

        let count = node
            .addnode()
            .iter()
            .filter(|peer| peer.as_str() == minter.name())
            .count();
        if count != 1 {
            return Err(FleetInvariantError::MinterPeerCount {
                node: node.name().to_owned(),
                count,
            });
        }
    }

    let peers = minter.node().addnode().len();
    if peers != 0 {
        return Err(FleetInvariantError::MinterHasPeers { peers });
    }

    Ok(())
}

fn validate_channels(
    node: &FleetNode,
    minter_endpoint: &str,
    seen_ids: &mut HashSet<ChannelId>,
) -> Result<(), FleetInvariantError> {
    let own_endpoint = node.ln_endpoint();
    let mut previous: Option<ChannelId> = None;

    for channel in node.channels() {
        if channel.target == own_endpoint {
            return Err(FleetInvariantError::SelfLoop {
                node: node.name().to_owned(),
            });
        }
        if channel.target == minter_endpoint {
            return Err(FleetInvariantError::ChannelToMinter {
                node: node.name().to_owned(),
            });
        }
        if previous.is_some_and(|prev| prev >= channel.id) {
            return Err(FleetInvariantError::ChannelIdOrder {
                node: node.name().to_owned(),
                block: channel.id.block,
                index: channel.id.index,
            });
        }
        if !seen_ids.insert(channel.id) {
            return Err(FleetInvariantError::DuplicateChannelId {
                block: channel.id.block,
                index: channel.id.index,
            });
        }
        previous = Some(channel.id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fleet::ImageConfig,
        nodes::{ChannelSpec, Credential, ln_endpoint, node_name},
    };

    fn credential() -> Credential {
        Credential::new(&[3; 32], "0201".into())
    }

    fn node(index: usize) -> FleetNode {
        FleetNode::new(node_name(index), "29.0", "v0.19.0-beta", "pw", credential())
    }

    fn minter() -> MinterNode {
        MinterNode::generate(&ImageConfig::default(), credential()).unwrap()
    }

    fn channel(block: u64, index: u32, target: &str) -> ChannelSpec {
        ChannelSpec {
            id: ChannelId::new(block, index),
            target: ln_endpoint(target),
            capacity: 300_000,
            push_amount: 150_000,
        }
    }

    fn linked(mut nodes: Vec<FleetNode>) -> Vec<FleetNode> {
        for node in &mut nodes {
            node.add_peer("miner");
        }
        nodes
    }

    #[test]
    fn accepts_wired_fleet() {
        let mut nodes = vec![node(0), node(1)];
        nodes[0].open_channel(channel(500, 1, "tank-0001")).unwrap();
        nodes[1].open_channel(channel(500, 2, "tank-0000")).unwrap();
        let nodes = linked(nodes);
        assert_eq!(validate_fleet(&nodes, Some(&minter())), Ok(()));
    }

    #[test]
    fn rejects_missing_minter() {
        let nodes = linked(vec![node(0)]);
        assert_eq!(
            validate_fleet(&nodes, None),
            Err(FleetInvariantError::MissingMinter)
        );
    }

    #[test]
    fn rejects_empty_fleet() {
        assert_eq!(
            validate_fleet(&[], Some(&minter())),
            Err(FleetInvariantError::EmptyFleet)
        );
    }

    #[test]
    fn rejects_unlinked_node() {
        let nodes = vec![node(0)];
        assert_eq!(
            validate_fleet(&nodes, Some(&minter())),
            Err(FleetInvariantError::MinterPeerCount {
                node: "tank-0000".into(),
                count: 0
            })
        );
    }

    #[test]
    fn rejects_doubly_linked_node() {
        let mut nodes = linked(vec![node(0)]);
        nodes[0].add_peer("miner");
        assert!(matches!(
            validate_fleet(&nodes, Some(&minter())),
            Err(FleetInvariantError::MinterPeerCount { count: 2, .. })
        ));
    }

    #[test]
    fn rejects_reused_channel_id() {
        let mut nodes = vec![node(0), node(1)];
        nodes[0].open_channel(channel(500, 1, "tank-0001")).unwrap();
        nodes[1].open_channel(channel(500, 1, "tank-0000")).unwrap();
        let nodes = linked(nodes);
        assert_eq!(
            validate_fleet(&nodes, Some(&minter())),
            Err(FleetInvariantError::DuplicateChannelId {
                block: 500,
                index: 1
            })
        );
    }

    #[test]
    fn rejects_out_of_order_ids() {
        let mut nodes = vec![node(0), node(1)];
        nodes[0].open_channel(channel(500, 2, "tank-0001")).unwrap();
        nodes[0].open_channel(channel(500, 1, "tank-0001")).unwrap();
        let nodes = linked(nodes);
        assert!(matches!(
            validate_fleet(&nodes, Some(&minter())),
            Err(FleetInvariantError::ChannelIdOrder { .. })
        ));
    }

    #[test]
    fn rejects_channel_to_minter() {
        let mut nodes = vec![node(0)];
        nodes[0].open_channel(channel(500, 1, "miner")).unwrap();
        let nodes = linked(nodes);
        assert_eq!(
            validate_fleet(&nodes, Some(&minter())),
            Err(FleetInvariantError::ChannelToMinter {
                node: "tank-0000".into()
            })
        );
    }

    #[test]
    fn rejects_duplicate_names() {
        let nodes = linked(vec![node(0), node(0)]);
        assert!(matches!(
            validate_fleet(&nodes, Some(&minter())),
            Err(FleetInvariantError::DuplicateName { .. })
        ));
    }
}
