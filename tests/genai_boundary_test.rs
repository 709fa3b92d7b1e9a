mod common;

use common::{ImageReply, ScriptedModel};
use rag_explorer::config::DEFAULT_ANSWER_CONTEXT;
use rag_explorer::genai::{generate_answer, GenerativeModel, ANSWER_ERROR_TEXT};
use rag_explorer::studio::{IMAGE_EMPTY_LINE, IMAGE_ERROR_LINE};
use rag_explorer::{ExplorerConfig, ImageSize, Session};
use std::sync::Arc;

#[tokio::test]
async fn test_answer_failure_returns_fixed_text() {
    let model = ScriptedModel::failing();
    let answer = generate_answer(&model, "what is the vacation policy?", DEFAULT_ANSWER_CONTEXT).await;
    assert_eq!(answer, ANSWER_ERROR_TEXT);
}

#[tokio::test]
async fn test_empty_image_is_absent() {
    let model = ScriptedModel::answering("ok").with_image(ImageReply::Empty);
    let image = model.generate_image("a data center", ImageSize::TwoK).await.unwrap();
    assert!(image.is_none());

    let mut session = Session::new(Arc::new(model), &ExplorerConfig::default());
    let image = session.generate_image("a data center", ImageSize::TwoK).await.unwrap();
    assert!(image.is_none());
    assert_eq!(session.view().log[0], IMAGE_EMPTY_LINE);
}

#[tokio::test]
async fn test_image_error_rejects_and_logs_once() {
    let model = ScriptedModel::answering("ok").with_image(ImageReply::Fail);
    assert!(model.generate_image("a cat", ImageSize::OneK).await.is_err());

    let mut session = Session::new(Arc::new(model), &ExplorerConfig::default());
    let image = session.generate_image("a cat", ImageSize::OneK).await.unwrap();
    assert!(image.is_none());

    let log = session.view().log;
    assert_eq!(log.iter().filter(|l| *l == IMAGE_ERROR_LINE).count(), 1);
    assert_eq!(log[0], IMAGE_ERROR_LINE);
    assert!(!session.studio().is_busy());
}

#[tokio::test]
async fn test_image_requests_do_not_overlap() {
    let model = ScriptedModel::answering("ok");
    let mut session = Session::new(Arc::new(model), &ExplorerConfig::default());

    let request = session.begin_image("first", ImageSize::OneK).unwrap();
    assert!(session.begin_image("second", ImageSize::OneK).is_err());

    let outcome = session.model().generate_image(&request.prompt, request.size).await;
    session.finish_image(outcome);
    assert!(session.begin_image("second", ImageSize::OneK).is_ok());
}
