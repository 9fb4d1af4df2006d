use crate::helpers::{endpoint, full_profile, load_profile, read, run_tool, save_profile, scratch_dir};
use claims::{assert_err, assert_ok};
use dear_rep::api::SubmissionOutcome;
use dear_rep::message::{DEFAULT_SUBJECT, RenderError};
use dear_rep::profile::FIELDS;
use dear_rep::ui::RunOutcome;
use serde_json::{json, Value};
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn accepted() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"data": {"submitGravityFormsForm": {"entryId": 99, "errors": []}}}))
}

async fn sent_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    serde_json::from_slice(&requests[0].body).unwrap()
}

#[tokio::test]
async fn first_run_collects_the_profile_and_sends_without_a_terminal() {
    let dir = scratch_dir();
    let server = MockServer::start().await;
    Mock::given(path("/graphql"))
        .and(method("POST"))
        .respond_with(accepted())
        .expect(1)
        .mount(&server)
        .await;

    let answers = [
        "USA", "1 Main St.", "Durham", "NC", "27701", "Ms.", "Ana", "Lopez", "ana@example.com",
    ];
    let script: String = answers.iter().map(|a| format!("{}\ny\n", a)).collect();

    let run = run_tool(&dir, endpoint(&server), &[], &script, false).await;

    let outcome = assert_ok!(run.outcome);
    assert_eq!(outcome.exit_code(), 0);
    assert!(matches!(outcome, RunOutcome::Submitted(SubmissionOutcome::Accepted(_))));
    assert!(run
        .output
        .starts_with("Collecting user info to sign message. This will only happen the first time!\n"));
    assert!(run.output.contains("Saving sender-data.json...\n"));
    assert!(run.output.contains("Message accepted!\nEntry ID: 99\nErrors: []\n"));
    // No "Send and save" question without a terminal.
    assert!(!run.prompts.contains("Send and save"));

    let profile = load_profile(&dir).unwrap();
    for ((key, _), answer) in FIELDS.iter().zip(answers) {
        assert_eq!(profile.get(key), Some(answer));
    }

    assert_eq!(read(&dir, "subject.txt").as_deref(), Some(DEFAULT_SUBJECT));
    let message = read(&dir, "message.txt").unwrap();
    assert!(message.ends_with("- Ana Lopez\n"));
    assert!(!message.contains('{'));

    let body = sent_body(&server).await;
    assert_eq!(body["variables"]["fieldValues"][1]["value"], message.as_str());
}

#[tokio::test]
async fn saved_profile_is_not_asked_for_again() {
    let dir = scratch_dir();
    save_profile(&dir, &full_profile());
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(accepted()).expect(1).mount(&server).await;

    let run = run_tool(&dir, endpoint(&server), &[], "y\n", true).await;

    assert_ok!(run.outcome);
    assert!(run.output.starts_with("Loading sender-data.json...\n"));
    assert_eq!(run.prompts, "Send and save [y/n]: ");
    assert_eq!(load_profile(&dir), Some(full_profile()));
}

#[tokio::test]
async fn declining_saves_the_profile_but_sends_nothing() {
    let dir = scratch_dir();
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(accepted()).expect(0).mount(&server).await;

    let script: String = FIELDS.iter().map(|_| "x\ny\n").collect::<String>() + "n\n";
    let run = run_tool(&dir, endpoint(&server), &[], &script, true).await;

    let outcome = assert_ok!(run.outcome);
    assert!(matches!(outcome, RunOutcome::Declined));
    assert_eq!(outcome.exit_code(), 0);
    assert!(run.output.ends_with("Not sending or saving message. Goodbye!\n"));
    assert!(load_profile(&dir).unwrap().is_complete());
    assert_eq!(read(&dir, "subject.txt"), None);
    assert_eq!(read(&dir, "message.txt"), None);
}

#[tokio::test]
async fn command_line_message_wins_over_saved_files() {
    let dir = scratch_dir();
    save_profile(&dir, &full_profile());
    std::fs::write(dir.join("subject.txt"), "Saved subject from {first}").unwrap();
    std::fs::write(dir.join("message.txt"), "Saved message").unwrap();
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(accepted()).expect(1).mount(&server).await;

    let args = ["Hello from {city}", "Thanks, {first} {last}"];
    let run = run_tool(&dir, endpoint(&server), &args, "", false).await;

    assert_ok!(run.outcome);
    assert!(run.output.contains("Using message from command line...\n"));
    assert!(run.output.contains("Subject: Hello from Durham\n"));

    let body = sent_body(&server).await;
    assert_eq!(body["variables"]["fieldValues"][0]["value"], "Hello from Durham");
    assert_eq!(body["variables"]["fieldValues"][1]["value"], "Thanks, Sam Rivera");
    assert_eq!(read(&dir, "subject.txt").as_deref(), Some("Hello from Durham"));
    assert_eq!(read(&dir, "message.txt").as_deref(), Some("Thanks, Sam Rivera"));
}

#[tokio::test]
async fn saved_templates_are_replaced_by_their_rendered_text() {
    let dir = scratch_dir();
    save_profile(&dir, &full_profile());
    std::fs::write(dir.join("subject.txt"), "A note from {city}, {state}").unwrap();
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(accepted()).expect(1).mount(&server).await;

    // Three arguments do not count as an explicit message.
    let run = run_tool(&dir, endpoint(&server), &["a", "b", "c"], "", false).await;

    assert_ok!(run.outcome);
    assert!(run.output.contains("Loading subject.txt...\n"));
    assert!(!run.output.contains("Loading message.txt..."));
    assert_eq!(read(&dir, "subject.txt").as_deref(), Some("A note from Durham, NC"));
    assert!(read(&dir, "message.txt").unwrap().ends_with("- Sam Rivera\n"));
}

#[tokio::test]
async fn unknown_placeholder_aborts_before_anything_is_sent() {
    let dir = scratch_dir();
    save_profile(&dir, &full_profile());
    std::fs::write(dir.join("message.txt"), "Signed, {first} {middle} {last}").unwrap();
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(accepted()).expect(0).mount(&server).await;

    let run = run_tool(&dir, endpoint(&server), &[], "", false).await;

    let err = assert_err!(run.outcome);
    assert_eq!(
        err.downcast_ref::<RenderError>(),
        Some(&RenderError::UnknownPlaceholder("middle".into()))
    );
    assert_eq!(
        read(&dir, "message.txt").as_deref(),
        Some("Signed, {first} {middle} {last}")
    );
    assert_eq!(read(&dir, "subject.txt"), None);
}

#[tokio::test]
async fn rejected_submission_exits_1_after_saving_the_message() {
    let dir = scratch_dir();
    save_profile(&dir, &full_profile());
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(400).set_body_string("nope"))
        .expect(1)
        .mount(&server)
        .await;

    let run = run_tool(&dir, endpoint(&server), &["Subject", "Body"], "", false).await;

    let outcome = assert_ok!(run.outcome);
    assert_eq!(outcome.exit_code(), 1);
    assert!(run
        .output
        .ends_with("Error code 400\nUninterpretable response data: nope\n"));
    assert_eq!(read(&dir, "subject.txt").as_deref(), Some("Subject"));
}

#[tokio::test]
async fn a_200_block_page_fails_the_run() {
    let dir = scratch_dir();
    save_profile(&dir, &full_profile());
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Request blocked</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let run = run_tool(&dir, endpoint(&server), &["Subject", "Body"], "", false).await;

    assert_err!(run.outcome);
    assert!(!run.output.contains("Message accepted!"));
}
