use super::*;

#[test]
fn test_deploy_args_override_config() {
    let mut config = Config::default();
    let args = DeployArgs {
        skip_build: true,
        skip_push: false,
        image: Some("localhost:5000/shop:dev".to_string()),
    };

    apply_deploy_args(&mut config, &args);

    assert!(config.deploy.skip_build);
    assert!(!config.deploy.skip_push);
    assert_eq!(config.deploy.image, "localhost:5000/shop:dev");
}

#[test]
fn test_unset_deploy_flags_keep_file_values() {
    let mut config = Config::default();
    config.deploy.skip_push = true;

    apply_deploy_args(&mut config, &DeployArgs::default());

    assert!(config.deploy.skip_push);
    assert_eq!(
        config.deploy.image,
        "malcolmcfraser/mf-node-app-template:latest"
    );
}

#[test]
fn test_test_args_override_username() {
    let mut config = Config::default();
    apply_test_args(
        &mut config,
        &TestArgs {
            base_url: None,
            username: Some("ci-user".to_string()),
        },
    );
    assert_eq!(config.suite.username, "ci-user");
}
