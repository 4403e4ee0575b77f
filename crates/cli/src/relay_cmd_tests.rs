use super::*;

#[test]
fn defaults_match_documented_values() {
    let args = RelayArgs::try_parse_from(["webhook-relay"]).unwrap();

    assert_eq!(args.bind, "127.0.0.1:8080".parse().unwrap());
    assert_eq!(args.concourse_url, "http://localhost:8888");
    assert_eq!(args.token, "");
    assert!(!args.insecure);
    assert_eq!(args.timeout, 30);
    assert_eq!(args.log_format, LogFormat::Json);
}

#[test]
fn flags_override_defaults() {
    let args = RelayArgs::try_parse_from([
        "webhook-relay",
        "--bind",
        "0.0.0.0:9000",
        "--concourse-url",
        "https://ci.example.com",
        "--token",
        "t0k3n",
        "--insecure",
        "--timeout",
        "5",
        "--log-format",
        "pretty",
    ])
    .unwrap();

    let config = args.client_config().unwrap();
    assert_eq!(config.base_url.as_str(), "https://ci.example.com/");
    assert!(config.insecure);
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(args.log_format, LogFormat::Pretty);
}

#[test]
fn relative_concourse_url_is_rejected() {
    let args =
        RelayArgs::try_parse_from(["webhook-relay", "--concourse-url", "ci.example.com"]).unwrap();

    assert!(args.client_config().is_err());
}

#[test]
fn malformed_bind_address_is_a_usage_error() {
    assert!(RelayArgs::try_parse_from(["webhook-relay", "--bind", "localhost"]).is_err());
}

#[test]
fn zero_timeout_is_a_usage_error() {
    assert!(RelayArgs::try_parse_from(["webhook-relay", "--timeout", "0"]).is_err());
}
