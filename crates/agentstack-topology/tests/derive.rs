//! Topology derivation from resolved configuration, end to end.

use agentstack_config::{ConfigError, ConfigurationSet, ResolvedArguments};
use agentstack_topology::security::SecurityGroupPlan;
use agentstack_topology::{NetworkPlacement, Topology};
use serde_json::{Value, json};

fn resolve(pairs: &[(&str, &str)]) -> Result<ResolvedArguments, ConfigError> {
    ResolvedArguments::from_set(&ConfigurationSet::from_pairs(pairs.iter().copied()))
}

fn minimal() -> Vec<(&'static str, &'static str)> {
    vec![
        ("SEMAPHORE_AGENT_STACK_NAME", "s"),
        ("SEMAPHORE_ORGANIZATION", "acme"),
        ("SEMAPHORE_AGENT_TOKEN_PARAMETER_NAME", "tok"),
    ]
}

fn derive_json(pairs: &[(&str, &str)]) -> Value {
    let topology = Topology::derive(&resolve(pairs).unwrap());
    serde_json::from_str(&topology.to_json().unwrap()).unwrap()
}

#[test]
fn minimal_config_payload() {
    let json = derive_json(&minimal());
    assert_eq!(
        json["ssm_parameter"]["value"],
        json!({
            "endpoint": "acme.semaphoreci.com",
            "agentTokenParameterName": "tok",
            "disconnectAfterJob": "true",
            "disconnectAfterIdleTimeout": "300",
            "envVars": []
        })
    );
    assert_eq!(json["ssm_parameter"]["name"], "s-config");
}

#[test]
fn cache_bucket_adds_env_vars_and_statement() {
    let mut pairs = minimal();
    pairs.push(("SEMAPHORE_AGENT_CACHE_BUCKET_NAME", "b"));
    let topology = Topology::derive(&resolve(&pairs).unwrap());

    assert_eq!(
        topology.ssm_parameter.value.env_vars,
        ["SEMAPHORE_CACHE_BACKEND=s3", "SEMAPHORE_CACHE_S3_BUCKET=b"]
    );

    let s3 = topology.instance_profile.find("s3:PutObject").unwrap();
    assert_eq!(s3.actions.len(), 4);
    assert_eq!(s3.resources, ["arn:aws:s3:::b/*", "arn:aws:s3:::b"]);
}

#[test]
fn network_without_subnets_is_rejected() {
    let mut pairs = minimal();
    pairs.push(("SEMAPHORE_AGENT_VPC_ID", "vpc-1"));
    let err = resolve(&pairs).unwrap_err();
    assert!(matches!(err, ConfigError::MissingSubnetsForNetwork));
}

#[test]
fn placement_forms_are_exclusive() {
    let default = derive_json(&minimal());
    let placement = &default["auto_scaling_group"]["placement"];
    assert!(placement.get("availability_zones").is_some());
    assert!(placement.get("subnet_ids").is_none());

    let mut pairs = minimal();
    pairs.push(("SEMAPHORE_AGENT_VPC_ID", "vpc-1"));
    pairs.push(("SEMAPHORE_AGENT_SUBNETS", "subnet-b,subnet-a"));
    let custom = derive_json(&pairs);
    let placement = &custom["auto_scaling_group"]["placement"];
    assert!(placement.get("availability_zones").is_none());
    assert_eq!(placement["subnet_ids"], json!(["subnet-b", "subnet-a"]));
    assert_eq!(custom["security_group"]["vpc"]["vpc_id"], "vpc-1");
}

#[test]
fn restricted_os_with_key_has_no_ingress() {
    let mut pairs = minimal();
    pairs.push(("SEMAPHORE_AGENT_KEY_NAME", "k"));
    pairs.push(("SEMAPHORE_AGENT_OS", "windows"));
    let topology = Topology::derive(&resolve(&pairs).unwrap());

    let SecurityGroupPlan::Managed { rules, .. } = &topology.security_group else {
        panic!("expected a managed security group");
    };
    assert!(rules.ingress.is_empty());
    assert_eq!(topology.launch_template.key_name.as_deref(), Some("k"));
}

#[test]
fn dynamic_scaling_toggle_controls_scaler() {
    assert!(derive_json(&minimal()).get("scaler").is_some());

    let mut pairs = minimal();
    pairs.push(("SEMAPHORE_AGENT_USE_DYNAMIC_SCALING", "false"));
    let topology = Topology::derive(&resolve(&pairs).unwrap());
    assert!(!topology.is_scaler_enabled());
    assert!(matches!(
        topology.auto_scaling_group.placement,
        NetworkPlacement::Default { .. }
    ));
}

#[test]
fn identical_input_is_byte_identical() {
    let mut pairs = minimal();
    pairs.push(("SEMAPHORE_AGENT_TOKEN_KMS_KEY", "key-1"));
    pairs.push(("SEMAPHORE_AGENT_KEY_NAME", "k"));
    let first = Topology::derive(&resolve(&pairs).unwrap()).to_json_pretty().unwrap();
    let second = Topology::derive(&resolve(&pairs).unwrap()).to_json_pretty().unwrap();
    assert_eq!(first, second);
}
