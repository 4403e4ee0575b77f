use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use super::*;
use crate::{
    signature::sign, CapturedRequest, PipelineName, ResourceName, ResourceTarget, TeamName,
    Trigger, TriggerRule,
};

const SECRET: &str = "s3cr3t";

/// Records every check request and optionally fails them.
#[derive(Default)]
struct RecordingRequester {
    calls: Mutex<Vec<(ResourceTarget, EnvelopeToken, String)>>,
    reject_with: Option<u16>,
}

#[async_trait]
impl CheckRequester for RecordingRequester {
    async fn request_check(
        &self,
        target: &ResourceTarget,
        token: &EnvelopeToken,
        bearer: &str,
    ) -> Result<(), ForwardError> {
        self.calls
            .lock()
            .unwrap()
            .push((target.clone(), token.clone(), bearer.to_string()));
        match self.reject_with {
            Some(status) => Err(ForwardError::Rejected {
                target: target.clone(),
                status,
            }),
            None => Ok(()),
        }
    }
}

fn push_body(git_ref: &str) -> Vec<u8> {
    format!(r#"{{"ref":"{git_ref}","forced":false,"repository":{{"full_name":"octo/hello"}}}}"#)
        .into_bytes()
}

fn delivery(body: Vec<u8>, signature: Option<String>) -> CapturedRequest {
    let mut request = CapturedRequest::new("POST", "/hook/main/deploy/github", "HTTP/1.1")
        .with_header("content-type", "application/json")
        .with_header("x-github-delivery", "abc")
        .with_header("x-github-event", "push");
    if let Some(signature) = signature {
        request = request.with_header("x-hub-signature", signature);
    }
    request.with_body(body).with_token("relay-token")
}

fn signed_push(git_ref: &str) -> CapturedRequest {
    let body = push_body(git_ref);
    let signature = sign(&body, SECRET.as_bytes());
    delivery(body, Some(signature))
}

fn main_branch_source() -> Source {
    Source {
        secret: SECRET.to_string(),
        insecure: false,
        triggers: vec![Trigger {
            event: "push".to_string(),
            rules: vec![TriggerRule::new().with("ref", "^refs/heads/main$")],
            checks: Vec::new(),
        }],
    }
}

fn input_for(source: Source, request: &CapturedRequest) -> CheckInput {
    CheckInput {
        source,
        version: Some(VersionIn {
            version_ref: Some(EnvelopeToken::encode(request).unwrap()),
        }),
    }
}

fn image_target() -> ResourceTarget {
    ResourceTarget::new(
        TeamName::new("main").unwrap(),
        PipelineName::new("release").unwrap(),
        ResourceName::new("image").unwrap(),
    )
}

#[tokio::test]
async fn matching_push_emits_marker_version() {
    let input = input_for(main_branch_source(), &signed_push("refs/heads/main"));

    let versions = evaluate(&input, None).await.unwrap();

    assert_eq!(
        serde_json::to_value(&versions).unwrap(),
        json!([{"ref": "blue", "name": "blood"}])
    );
}

#[tokio::test]
async fn non_matching_push_emits_empty_list() {
    let input = input_for(main_branch_source(), &signed_push("refs/heads/feature"));

    let versions = evaluate(&input, None).await.unwrap();

    assert!(versions.is_empty());
    assert_eq!(serde_json::to_string(&versions).unwrap(), "[]");
}

#[tokio::test]
async fn tampered_signature_is_rejected() {
    let body = push_body("refs/heads/main");
    let mut signature = sign(&body, SECRET.as_bytes());
    let last = signature.pop().unwrap();
    signature.push(if last == 'a' { 'b' } else { 'a' });
    let input = input_for(main_branch_source(), &delivery(body, Some(signature)));

    let err = evaluate(&input, None).await.unwrap_err();

    assert!(matches!(err, CheckError::InvalidSignature { ref delivery } if delivery.as_str() == "abc"));
}

#[tokio::test]
async fn missing_signature_header_is_rejected() {
    let input = input_for(
        main_branch_source(),
        &delivery(push_body("refs/heads/main"), None),
    );

    let err = evaluate(&input, None).await.unwrap_err();

    assert!(matches!(err, CheckError::MissingHeader(_)));
    assert_eq!(err.to_string(), "x-hub-signature header is missing");
}

#[tokio::test]
async fn placeholder_ref_emits_empty_list() {
    let input = CheckInput {
        source: main_branch_source(),
        version: Some(VersionIn {
            version_ref: Some(EnvelopeToken::from_ref("this is not an envelope")),
        }),
    };

    assert!(evaluate(&input, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn first_check_without_version_emits_empty_list() {
    let input = CheckInput::from_slice(
        br#"{"source":{"secret":"s3cr3t","triggers":[]},"version":null}"#,
    )
    .unwrap();

    assert!(evaluate(&input, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_marked_envelope_is_fatal() {
    let input = CheckInput {
        source: main_branch_source(),
        version: Some(VersionIn {
            version_ref: Some(EnvelopeToken::from_ref("webhook.v1:%%%")),
        }),
    };

    assert!(matches!(
        evaluate(&input, None).await.unwrap_err(),
        CheckError::MalformedEnvelope { .. }
    ));
}

#[tokio::test]
async fn unsupported_event_type_is_fatal() {
    let body = br#"{"action":"opened"}"#.to_vec();
    let signature = sign(&body, SECRET.as_bytes());
    let request = CapturedRequest::new("POST", "/", "HTTP/1.1")
        .with_header("x-github-delivery", "abc")
        .with_header("x-github-event", "issues")
        .with_header("x-hub-signature", signature)
        .with_body(body);

    let err = evaluate(&input_for(main_branch_source(), &request), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckError::Event(crate::EventError::UnknownEventType { .. })
    ));
}

#[tokio::test]
async fn rule_on_unknown_field_is_fatal() {
    let mut source = main_branch_source();
    source.triggers[0].rules = vec![TriggerRule::new().with("action", "opened")];

    let err = evaluate(&input_for(source, &signed_push("refs/heads/main")), None)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckError::RuleConfiguration(_)));
}

#[tokio::test]
async fn trigger_for_unsupported_event_does_not_block_push_match() {
    let mut source = main_branch_source();
    source.triggers.push(Trigger {
        event: "issues".to_string(),
        rules: Vec::new(),
        checks: Vec::new(),
    });
    let input = input_for(source, &signed_push("refs/heads/main"));

    let versions = evaluate(&input, None).await.unwrap();

    assert_eq!(versions, vec![VersionOut::matched()]);
}

#[tokio::test]
async fn header_names_are_matched_case_insensitively() {
    let body = push_body("refs/heads/main");
    let signature = sign(&body, SECRET.as_bytes());
    let mut request = CapturedRequest::new("POST", "/", "HTTP/1.1").with_body(body);
    request.headers = vec![
        crate::HeaderPair::new("X-GitHub-Delivery", "abc"),
        crate::HeaderPair::new("X-GitHub-Event", "push"),
        crate::HeaderPair::new("X-Hub-Signature", signature),
    ];

    let versions = evaluate(&input_for(main_branch_source(), &request), None)
        .await
        .unwrap();

    assert_eq!(versions, vec![VersionOut::matched()]);
}

#[tokio::test]
async fn matching_trigger_notifies_listed_resources_with_envelope_token() {
    let mut source = main_branch_source();
    source.triggers[0].checks = vec![image_target()];
    let input = input_for(source, &signed_push("refs/heads/main"));
    let requester = RecordingRequester::default();

    let versions = evaluate(&input, Some(&requester)).await.unwrap();

    assert_eq!(versions, vec![VersionOut::matched()]);
    let calls = requester.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, image_target());
    assert_eq!(Some(&calls[0].1), input.version.as_ref().unwrap().version_ref.as_ref());
    assert_eq!(calls[0].2, "relay-token");
}

#[tokio::test]
async fn unmatched_delivery_notifies_nobody() {
    let mut source = main_branch_source();
    source.triggers[0].checks = vec![image_target()];
    let input = input_for(source, &signed_push("refs/heads/feature"));
    let requester = RecordingRequester::default();

    assert!(evaluate(&input, Some(&requester)).await.unwrap().is_empty());
    assert!(requester.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_notification_aborts_without_version() {
    let mut source = main_branch_source();
    source.triggers[0].checks = vec![image_target()];
    let input = input_for(source, &signed_push("refs/heads/main"));
    let requester = RecordingRequester {
        reject_with: Some(401),
        ..Default::default()
    };

    let err = evaluate(&input, Some(&requester)).await.unwrap_err();

    assert!(matches!(
        err,
        CheckError::DownstreamUnavailable(ForwardError::Rejected { status: 401, .. })
    ));
}

#[tokio::test]
async fn notification_without_requester_is_reported() {
    let mut source = main_branch_source();
    source.triggers[0].checks = vec![image_target()];
    let input = input_for(source, &signed_push("refs/heads/main"));

    assert!(matches!(
        evaluate(&input, None).await.unwrap_err(),
        CheckError::DownstreamUnavailable(ForwardError::NotConfigured { .. })
    ));
}

#[test]
fn unreadable_input_is_reported() {
    assert!(matches!(
        CheckInput::from_slice(b"{not json").unwrap_err(),
        CheckError::InputUnreadable { .. }
    ));
}

#[test]
fn documented_input_shape_parses() {
    let input = CheckInput::from_slice(
        br#"{
            "source": {"secret": "s3cr3t", "insecure": false, "triggers": [{"event": "push", "rules": [{"ref": "^refs/heads/main$"}]}]},
            "version": {"ref": "webhook.v1:e30="}
        }"#,
    )
    .unwrap();

    assert_eq!(input.source.triggers[0].event, "push");
    assert_eq!(
        input.token().map(EnvelopeToken::as_str),
        Some("webhook.v1:e30=")
    );
}
