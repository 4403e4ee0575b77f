use super::*;
use crate::{PipelineName, ResourceName, ResourceTarget, TeamName, TriggerRule};

fn push(git_ref: &str) -> WebhookEvent {
    let body = format!(r#"{{"ref":"{git_ref}","forced":false,"repository":{{"full_name":"octo/hello"}}}}"#);
    WebhookEvent::decode("push", body.as_bytes()).unwrap()
}

fn pull_request(action: &str) -> WebhookEvent {
    let body = format!(
        r#"{{"action":"{action}","number":7,"pull_request":{{"head":{{"ref":"feature","sha":"a"}},"base":{{"ref":"main","sha":"b"}}}}}}"#
    );
    WebhookEvent::decode("pull_request", body.as_bytes()).unwrap()
}

fn trigger(event: &str, rules: Vec<TriggerRule>) -> Trigger {
    Trigger {
        event: event.to_string(),
        rules,
        checks: Vec::new(),
    }
}

#[test]
fn anchored_ref_pattern_matches_exact_branch() {
    let triggers = vec![trigger("push", vec![TriggerRule::new().with("ref", "^refs/heads/main$")])];

    let matched = match_triggers(&push("refs/heads/main"), &triggers).unwrap().unwrap();
    assert_eq!(matched.index, 0);
    assert_eq!(matched.version, VersionOut::matched());

    assert!(match_triggers(&push("refs/heads/feature"), &triggers).unwrap().is_none());
}

#[test]
fn unanchored_pattern_matches_substring() {
    let triggers = vec![trigger("push", vec![TriggerRule::new().with("ref", "main")])];

    assert!(match_triggers(&push("refs/heads/main-next"), &triggers).unwrap().is_some());
}

#[test]
fn later_trigger_wins_when_earlier_does_not_match() {
    let mut second = trigger("push", vec![TriggerRule::new().with("ref", "^refs/tags/")]);
    second.checks = vec![ResourceTarget::new(
        TeamName::new("main").unwrap(),
        PipelineName::new("release").unwrap(),
        ResourceName::new("image").unwrap(),
    )];
    let triggers = vec![
        trigger("push", vec![TriggerRule::new().with("ref", "^refs/heads/")]),
        second,
    ];

    let matched = match_triggers(&push("refs/tags/v1.2.0"), &triggers).unwrap().unwrap();
    assert_eq!(matched.index, 1);
    assert_eq!(matched.trigger.checks.len(), 1);
}

#[test]
fn first_matching_trigger_short_circuits() {
    let triggers = vec![
        trigger("push", vec![TriggerRule::new().with("ref", "heads")]),
        trigger("push", vec![TriggerRule::new().with("ref", "main")]),
    ];

    let matched = match_triggers(&push("refs/heads/main"), &triggers).unwrap().unwrap();
    assert_eq!(matched.index, 0);
}

#[test]
fn later_rule_within_trigger_can_match() {
    let triggers = vec![trigger(
        "push",
        vec![
            TriggerRule::new().with("ref", "^refs/tags/"),
            TriggerRule::new().with("ref", "^refs/heads/release/"),
        ],
    )];

    assert!(match_triggers(&push("refs/heads/release/2.0"), &triggers)
        .unwrap()
        .is_some());
}

#[test]
fn every_field_in_a_rule_must_match() {
    let triggers = vec![trigger(
        "push",
        vec![TriggerRule::new()
            .with("ref", "^refs/heads/main$")
            .with("repository", "^octo/other$")],
    )];

    assert!(match_triggers(&push("refs/heads/main"), &triggers).unwrap().is_none());
}

#[test]
fn trigger_without_rules_never_matches() {
    let triggers = vec![trigger("push", Vec::new())];
    assert!(match_triggers(&push("refs/heads/main"), &triggers).unwrap().is_none());
}

#[test]
fn rule_without_fields_never_matches() {
    let triggers = vec![trigger("push", vec![TriggerRule::new()])];
    assert!(match_triggers(&push("refs/heads/main"), &triggers).unwrap().is_none());
}

#[test]
fn triggers_for_other_event_types_are_skipped() {
    let triggers = vec![
        trigger("pull_request", vec![TriggerRule::new().with("action", "opened")]),
        trigger("push", vec![TriggerRule::new().with("ref", "main")]),
    ];

    let matched = match_triggers(&push("refs/heads/main"), &triggers).unwrap().unwrap();
    assert_eq!(matched.index, 1);

    let matched = match_triggers(&pull_request("opened"), &triggers).unwrap().unwrap();
    assert_eq!(matched.index, 0);
    assert!(match_triggers(&pull_request("closed"), &triggers).unwrap().is_none());
}

#[test]
fn empty_payload_field_does_not_match() {
    let triggers = vec![trigger("push", vec![TriggerRule::new().with("base_ref", ".*")])];
    assert!(match_triggers(&push("refs/heads/main"), &triggers).unwrap().is_none());
}

#[test]
fn boolean_field_matches_textual_pattern() {
    let triggers = vec![trigger(
        "push",
        vec![TriggerRule::new().with("forced", "^false$")],
    )];
    assert!(match_triggers(&push("refs/heads/main"), &triggers).unwrap().is_some());
}

#[test]
fn unknown_field_is_a_configuration_error() {
    let triggers = vec![trigger("push", vec![TriggerRule::new().with("action", "opened")])];

    let err = match_triggers(&push("refs/heads/main"), &triggers).unwrap_err();
    assert!(matches!(
        err,
        RuleError::UnknownField { event: EventKind::Push, ref field, .. } if field == "action"
    ));
    assert!(err.to_string().contains("available: ref, before"));
}

#[test]
fn unknown_field_in_other_event_trigger_is_still_reported() {
    let triggers = vec![
        trigger("push", vec![TriggerRule::new().with("ref", "main")]),
        trigger("pull_request", vec![TriggerRule::new().with("forced", "true")]),
    ];

    assert!(matches!(
        TriggerSet::compile(&triggers).unwrap_err(),
        RuleError::UnknownField { event: EventKind::PullRequest, .. }
    ));
}

#[test]
fn invalid_regex_is_a_configuration_error() {
    let triggers = vec![trigger("push", vec![TriggerRule::new().with("ref", "refs/(heads")])];

    assert!(matches!(
        TriggerSet::compile(&triggers).unwrap_err(),
        RuleError::InvalidPattern { ref field, .. } if field == "ref"
    ));
}

#[test]
fn trigger_for_unsupported_event_is_skipped() {
    let triggers = vec![
        trigger("issues", vec![TriggerRule::new().with("action", "opened")]),
        trigger("push", vec![TriggerRule::new().with("ref", "^refs/heads/main$")]),
    ];

    let matched = match_triggers(&push("refs/heads/main"), &triggers).unwrap().unwrap();
    assert_eq!(matched.index, 1);
    assert_eq!(matched.trigger.event, "push");
}

#[test]
fn compiled_set_can_be_reused_across_events() {
    let triggers = vec![trigger("push", vec![TriggerRule::new().with("ref", "^refs/heads/main$")])];
    let set = TriggerSet::compile(&triggers).unwrap();

    assert!(set.find_match(&push("refs/heads/main")).unwrap().is_some());
    assert!(set.find_match(&push("refs/heads/dev")).unwrap().is_none());
    assert!(set.find_match(&pull_request("opened")).unwrap().is_none());
}
