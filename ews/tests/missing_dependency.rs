#![cfg(not(windows))]

use std::path::Path;

use ews_mail::{
    library::{StaticLoader, DEFAULT_REGISTRY_PATH},
    send_mail_message, MailSendRequest,
};
use ews_testing_client::RecordingLibrary;

#[test_log::test(tokio::test)]
async fn test_send_without_installed_library() {
    if Path::new(DEFAULT_REGISTRY_PATH).exists() {
        return;
    }

    let library = RecordingLibrary::new();
    let loader = StaticLoader::new(library.clone());
    let req = MailSendRequest::new(["b@x.com"]).with_subject("Test");

    let err = send_mail_message(&req, &loader).await.unwrap_err();

    assert!(err.is_dependency_missing());
    assert!(err.to_string().contains("EWS Managed API"));
    assert!(library.sessions().is_empty());
}
