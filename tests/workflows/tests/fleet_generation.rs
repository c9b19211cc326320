use std::{collections::HashSet, fs};

use serde_yaml::Value;
use tests_workflows::{config_value, generate_fleet, read_nodes, str_field};

const SPECIAL: [char; 5] = ['"', ' ', '(', ')', ','];

fn channels(node: &Value) -> Vec<&Value> {
    node.get("lnd")
        .and_then(|lnd| lnd.get("channels"))
        .and_then(Value::as_sequence)
        .map(|seq| seq.iter().collect())
        .unwrap_or_default()
}

fn channel_id(channel: &Value) -> (u64, u64) {
    let id = &channel["id"];
    (id["block"].as_u64().unwrap(), id["index"].as_u64().unwrap())
}

#[tokio::test]
async fn small_fleet_has_expected_shape() {
    let root = tempfile::tempdir().unwrap();
    let artifacts = generate_fleet(root.path(), "test", 5, 10).await.unwrap();

    assert_eq!(artifacts.network_dir, root.path().join("test"));
    assert_eq!(
        fs::read_to_string(&artifacts.defaults_file).unwrap(),
        "comment: enjoy"
    );

    let nodes = read_nodes(&artifacts).unwrap();
    assert_eq!(nodes.len(), 6);

    let names: Vec<&str> = nodes.iter().map(|n| str_field(n, "name").unwrap()).collect();
    assert_eq!(
        names,
        ["tank-0000", "tank-0001", "tank-0002", "tank-0003", "tank-0004", "miner"]
    );

    let challenge = config_value(&nodes[0], "signetchallenge").unwrap();
    assert!(challenge.starts_with("0014"));
    assert_eq!(challenge.len(), 44);
    for node in &nodes {
        assert_eq!(config_value(node, "signetchallenge"), Some(challenge));
        assert_eq!(node["global"]["chain"].as_str(), Some("signet"));
    }
}

#[tokio::test]
async fn channel_graph_properties_hold() {
    let root = tempfile::tempdir().unwrap();
    let artifacts = generate_fleet(root.path(), "graph", 5, 10).await.unwrap();
    let nodes = read_nodes(&artifacts).unwrap();

    let mut ids = HashSet::new();
    let mut total = 0;
    for node in &nodes[..5] {
        let name = str_field(node, "name").unwrap();
        let mut previous = None;
        for channel in channels(node) {
            total += 1;
            assert_ne!(channel["target"].as_str(), Some(format!("{name}-ln").as_str()));
            assert_ne!(channel["target"].as_str(), Some("miner-ln"));
            assert_eq!(channel["capacity"].as_u64(), Some(300_000));
            assert_eq!(channel["push_amt"].as_u64(), Some(150_000));

            let id = channel_id(channel);
            assert_eq!(id.0, 500);
            assert!(previous.is_none_or(|prev| prev < id), "ids out of order on {name}");
            assert!(ids.insert(id), "duplicate id {id:?}");
            previous = Some(id);
        }
    }
    assert!(total <= 9);
}

#[tokio::test]
async fn minter_is_linked_and_provisioned() {
    let root = tempfile::tempdir().unwrap();
    let artifacts = generate_fleet(root.path(), "test", 3, 4).await.unwrap();
    let nodes = read_nodes(&artifacts).unwrap();
    let (minter, ordinary) = nodes.split_last().unwrap();

    for node in ordinary {
        let addnode: Vec<&str> = node["addnode"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(addnode.iter().filter(|peer| **peer == "miner").count(), 1);
        assert_eq!(node["ln"]["lnd"].as_bool(), Some(true));
        assert_eq!(node["lnd"]["prometheusMetricsPort"].as_u64(), Some(9332));
        assert!(node.get("startupProbe").is_none());
    }

    assert_eq!(str_field(minter, "name"), Some("miner"));
    assert_eq!(minter["image"]["tag"].as_str(), Some("29.0-util"));
    assert!(minter["addnode"].as_sequence().unwrap().is_empty());
    assert!(minter.get("ln").is_none());
    assert!(minter.get("lnd").is_none());

    let command = minter["startupProbe"]["exec"]["command"][2].as_str().unwrap();
    let descriptor = command
        .strip_prefix("bitcoin-cli createwallet miner && bitcoin-cli importdescriptors ")
        .unwrap();
    assert!(descriptor.contains("combo\\("));
    let chars: Vec<char> = descriptor.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if SPECIAL.contains(c) {
            assert!(i > 0 && chars[i - 1] == '\\', "unescaped {c:?} in {descriptor}");
        }
    }
}

#[tokio::test]
async fn single_channel_request_yields_empty_graph() {
    let root = tempfile::tempdir().unwrap();
    let artifacts = generate_fleet(root.path(), "test", 4, 1).await.unwrap();
    let nodes = read_nodes(&artifacts).unwrap();
    assert!(nodes.iter().all(|node| channels(node).is_empty()));
}

#[tokio::test]
async fn separate_runs_do_not_share_secrets() {
    let root = tempfile::tempdir().unwrap();
    let first = read_nodes(&generate_fleet(root.path(), "a", 2, 2).await.unwrap()).unwrap();
    let second = read_nodes(&generate_fleet(root.path(), "b", 2, 2).await.unwrap()).unwrap();

    assert_ne!(
        config_value(&first[0], "signetchallenge"),
        config_value(&second[0], "signetchallenge")
    );
    assert_ne!(
        first[0]["lnd"]["macaroonRootKey"],
        second[0]["lnd"]["macaroonRootKey"]
    );
    assert_ne!(
        first[0]["global"]["rpcpassword"],
        first[1]["global"]["rpcpassword"]
    );
}

#[tokio::test]
async fn rerun_overwrites_existing_network() {
    let root = tempfile::tempdir().unwrap();
    let first = generate_fleet(root.path(), "test", 2, 2).await.unwrap();
    let before = fs::read_to_string(&first.network_file).unwrap();

    let second = generate_fleet(root.path(), "test", 3, 2).await.unwrap();
    assert_eq!(first.network_file, second.network_file);
    assert_ne!(fs::read_to_string(&second.network_file).unwrap(), before);
    assert_eq!(read_nodes(&second).unwrap().len(), 4);
}
