//! One explorer session
//!
//! Holds the user-facing inputs (tenant selector, query field, image
//! prompt) next to the playback controller and the image studio, and
//! enforces which inputs are editable in which phase.

use crate::config::ExplorerConfig;
use crate::genai::{GenAiClient, GenAiResult, GenerativeModel, ImageSize};
use crate::inspector::InspectorView;
use crate::playback::{Phase, PlaybackController, StepOutcome, StepProgress};
use crate::scenario::ScenarioName;
use crate::studio::{ImageRequest, ImageStudio, StudioError, StudioView};
use crate::topology::{diagram_view, DiagramView, Edge, NodeId};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Tenants offered by the selector
pub const TENANTS: [&str; 4] = ["T-800", "Cyberdyne", "Massive Dynamic", "Acme Corp"];

pub const DEFAULT_QUERY: &str = "What is the vacation policy?";

/// Session errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("Inputs are locked while a scenario is active")]
    Locked,

    #[error(transparent)]
    Studio(#[from] StudioError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Snapshot of everything a front end renders
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub tenant: String,
    pub query: String,
    pub phase: Phase,
    pub scenario: Option<ScenarioName>,
    pub progress: Option<StepProgress>,
    pub active_node: Option<NodeId>,
    pub active_edge: Option<Edge>,
    pub log: Vec<String>,
    pub inspector: InspectorView,
    pub diagram: DiagramView,
    pub studio: StudioView,
}

pub struct Session {
    tenant: String,
    controller: PlaybackController,
    studio: ImageStudio,
    model: Arc<dyn GenerativeModel>,
}

impl Session {
    pub fn new(model: Arc<dyn GenerativeModel>, config: &ExplorerConfig) -> Self {
        let mut controller = PlaybackController::new(Arc::clone(&model), config.playback.clone());
        controller.set_query(DEFAULT_QUERY);
        Self {
            tenant: TENANTS[0].to_string(),
            controller,
            studio: ImageStudio::new(),
            model,
        }
    }

    /// Session backed by the configured provider
    pub fn from_config(config: &ExplorerConfig) -> GenAiResult<Self> {
        let client = GenAiClient::new(&config.genai)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn query(&self) -> &str {
        self.controller.query()
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    pub fn studio(&self) -> &ImageStudio {
        &self.studio
    }

    pub fn model(&self) -> Arc<dyn GenerativeModel> {
        Arc::clone(&self.model)
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    fn ensure_idle(&self) -> SessionResult<()> {
        match self.phase() {
            Phase::Idle => Ok(()),
            Phase::Running | Phase::Completed => Err(SessionError::Locked),
        }
    }

    pub fn select_tenant(&mut self, tenant: &str) -> SessionResult<()> {
        self.ensure_idle()?;
        let tenant = TENANTS
            .iter()
            .find(|t| **t == tenant)
            .ok_or_else(|| SessionError::UnknownTenant(tenant.to_string()))?;
        self.tenant = tenant.to_string();
        info!("Tenant selected: {}", tenant);
        Ok(())
    }

    pub fn set_query(&mut self, query: &str) -> SessionResult<()> {
        self.ensure_idle()?;
        self.controller.set_query(query);
        Ok(())
    }

    pub fn start(&mut self, scenario: ScenarioName) -> StepOutcome {
        let tenant = self.tenant.clone();
        self.controller.start(scenario, &tenant)
    }

    pub fn advance(&mut self) -> StepOutcome {
        self.controller.advance()
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Accept an image request; pair with [`finish_image`](Self::finish_image)
    pub fn begin_image(&mut self, prompt: &str, size: ImageSize) -> SessionResult<ImageRequest> {
        Ok(self.studio.begin(prompt, size, self.controller.console())?)
    }

    pub fn finish_image(&mut self, outcome: GenAiResult<Option<String>>) {
        self.studio.finish(outcome, self.controller.console());
    }

    /// Run an image request to completion while holding the session
    pub async fn generate_image(&mut self, prompt: &str, size: ImageSize) -> SessionResult<Option<String>> {
        let request = self.begin_image(prompt, size)?;
        let outcome = self.model.generate_image(&request.prompt, request.size).await;
        self.finish_image(outcome);
        Ok(self.studio.image().map(str::to_string))
    }

    pub fn view(&self) -> SessionView {
        let state = self.controller.state();
        SessionView {
            tenant: self.tenant.clone(),
            query: self.controller.query().to_string(),
            phase: state.phase(),
            scenario: state.scenario_name(),
            progress: state.progress(),
            active_node: state.active_node(),
            active_edge: state.active_edge(),
            log: self.controller.console().lines(),
            inspector: InspectorView::from_payload(state.inspector()),
            diagram: diagram_view(state.scenario_name(), state.active_node(), state.active_edge()),
            studio: self.studio.view(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::GenAiError;
    use async_trait::async_trait;

    struct NoImage;

    #[async_trait]
    impl GenerativeModel for NoImage {
        async fn generate_text(&self, _prompt: &str) -> GenAiResult<String> {
            Err(GenAiError::NetworkError("offline".to_string()))
        }

        async fn generate_image(&self, _prompt: &str, _size: ImageSize) -> GenAiResult<Option<String>> {
            Ok(None)
        }
    }

    fn session() -> Session {
        Session::new(Arc::new(NoImage), &ExplorerConfig::default())
    }

    #[test]
    fn test_defaults() {
        let s = session();
        assert_eq!(s.tenant(), "T-800");
        assert_eq!(s.query(), DEFAULT_QUERY);
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn test_tenant_selection() {
        let mut s = session();
        s.select_tenant("Acme Corp").unwrap();
        assert_eq!(s.tenant(), "Acme Corp");
        assert_eq!(
            s.select_tenant("Initech"),
            Err(SessionError::UnknownTenant("Initech".to_string()))
        );
    }

    #[test]
    fn test_inputs_locked_until_reset() {
        let mut s = session();
        s.start(ScenarioName::Ingestion);
        assert_eq!(s.select_tenant("Cyberdyne"), Err(SessionError::Locked));
        assert_eq!(s.set_query("other"), Err(SessionError::Locked));

        while s.advance() != StepOutcome::Completed {}
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(s.select_tenant("Cyberdyne"), Err(SessionError::Locked));

        s.reset();
        s.select_tenant("Cyberdyne").unwrap();
        s.set_query("How many sick days?").unwrap();
        assert_eq!(s.query(), "How many sick days?");
    }

    #[test]
    fn test_start_uses_selected_tenant() {
        let mut s = session();
        s.select_tenant("Massive Dynamic").unwrap();
        s.start(ScenarioName::Query);
        let view = s.view();
        assert_eq!(view.scenario, Some(ScenarioName::Query));
        assert_eq!(view.log, vec!["User (Massive Dynamic): Submitting vague query"]);
        assert!(view.diagram.nodes.iter().any(|n| n.selected && n.id == NodeId::User));
    }

    #[tokio::test]
    async fn test_image_without_data() {
        let mut s = session();
        let image = s.generate_image("a server rack", ImageSize::OneK).await.unwrap();
        assert!(image.is_none());
        assert!(!s.studio().is_busy());
        assert_eq!(
            s.view().log.first().map(String::as_str),
            Some(crate::studio::IMAGE_EMPTY_LINE)
        );
    }

    #[tokio::test]
    async fn test_image_requires_prompt() {
        let mut s = session();
        let err = s.generate_image("", ImageSize::OneK).await.unwrap_err();
        assert_eq!(err, SessionError::Studio(StudioError::EmptyPrompt));
    }
}
