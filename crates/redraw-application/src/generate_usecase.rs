//! Diagram generation use case.
//!
//! This module provides the `GenerateUseCase` which orchestrates one
//! generation turn end to end: session resolution, edit-vs-create
//! classification, payload assembly, the drafter call, and state recording.
//!
//! The central contract is that session state only ever advances on a fully
//! successful turn. Any failure, at any point after the session is loaded,
//! leaves the persisted record exactly as it was.

use crate::share::terrastruct_play_link;
use redraw_core::classify::{EditClassifier, detect_dialect};
use redraw_core::config::EngineConfig;
use redraw_core::context::ContextCompactor;
use redraw_core::drafter::{DiagramDrafter, DraftRequest};
use redraw_core::error::{RedrawError, Result};
use redraw_core::extract::extract_components;
use redraw_core::instruction::build_instruction;
use redraw_core::session::{DiagramDialect, Session, SessionRepository};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// The result of one successful generation turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutcome {
    /// The stable filename stem all output assets share.
    pub unique_name: String,
    /// The session this turn belongs to.
    pub session_id: String,
    /// The session's iteration count after this turn.
    pub iteration: u32,
    /// The dialect the diagram was generated in.
    pub dialect: DiagramDialect,
    /// Whether this turn was classified as an edit of the existing diagram.
    pub is_edit: bool,
    /// A shareable playground link, for D2 diagrams only.
    pub terrastruct_link: Option<String>,
}

/// Use case for iterative diagram generation.
///
/// `GenerateUseCase` coordinates between `SessionRepository`, an
/// `EditClassifier`, and the external `DiagramDrafter` to run one generation
/// turn at a time while maintaining session invariants.
///
/// # Responsibilities
///
/// - Resolving or creating the session for a turn
/// - Enforcing the per-session iteration cap before any drafter work
/// - Classifying requests as edits or fresh creations
/// - Assembling the drafter payload (context digest plus edit instructions)
/// - Recording successful turns and persisting the updated session
pub struct GenerateUseCase {
    /// Repository for session data persistence
    session_repository: Arc<dyn SessionRepository>,
    /// External diagram code generator
    drafter: Arc<dyn DiagramDrafter>,
    /// Edit-vs-create classifier
    classifier: Arc<dyn EditClassifier>,
    /// Engine limits and paths
    config: EngineConfig,
    /// Digest builder derived from `config`
    compactor: ContextCompactor,
}

impl GenerateUseCase {
    /// Creates a new `GenerateUseCase` instance.
    pub fn new(
        session_repository: Arc<dyn SessionRepository>,
        drafter: Arc<dyn DiagramDrafter>,
        classifier: Arc<dyn EditClassifier>,
        config: EngineConfig,
    ) -> Self {
        let compactor = ContextCompactor::from_config(&config);
        Self {
            session_repository,
            drafter,
            classifier,
            config,
            compactor,
        }
    }

    /// Runs one generation turn.
    ///
    /// `input` is either a natural-language request or a path to an existing
    /// IaC file to visualize. `session_id` selects the session to continue;
    /// `None` starts a fresh one. With `is_continuation` set, a missing
    /// session record is an error instead of silently starting over.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if `is_continuation` names an unknown session.
    /// - `IterationLimitExceeded` if the session is already at the cap.
    ///   Checked before the drafter is invoked; a capped session costs no
    ///   drafter call.
    /// - `GenerationFailed` / `ArtifactTimeout` on drafter-path failures.
    ///   The persisted session is left untouched.
    pub async fn generate(
        &self,
        input: &str,
        session_id: Option<&str>,
        is_continuation: bool,
    ) -> Result<GenerateOutcome> {
        let mut session = self.resolve_session(session_id, is_continuation).await?;

        // Fail fast: a capped session must not reach the drafter.
        if session.iteration >= self.config.max_iterations {
            tracing::warn!(
                "[GenerateUseCase] Session {} is at the iteration cap ({})",
                session.id,
                self.config.max_iterations
            );
            return Err(RedrawError::iteration_limit(self.config.max_iterations));
        }

        let turn = self.prepare_turn(&session, input).await?;

        let stem = session
            .assign_base_filename(format!("diagram_{}", short_uuid()))
            .to_string();

        let payload = if turn.is_edit {
            let mut payload = self.compactor.compact(&session);
            payload.push_str(&build_instruction(input).directive);
            payload.push_str(&format!(
                "\nTask: Apply the requested edit to the current diagram.\nFilename: output/{stem}\n"
            ));
            payload
        } else {
            format!("Create: {}\nFilename: output/{stem}\n", turn.prompt)
        };

        tracing::info!(
            "[GenerateUseCase] Session {} step {}: {} ({} dialect)",
            session.id,
            session.iteration + 1,
            if turn.is_edit { "edit" } else { "create" },
            turn.dialect
        );

        let request = DraftRequest {
            session_id: session.id.clone(),
            dialect: turn.dialect,
            base_filename: stem.clone(),
            payload,
        };

        let timeout = Duration::from_secs(self.config.draft_timeout_secs);
        let code = match tokio::time::timeout(timeout, self.drafter.draft(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(RedrawError::generation_failed(format!(
                    "Drafter did not respond within {}s",
                    self.config.draft_timeout_secs
                )));
            }
        };

        if code.trim().is_empty() {
            return Err(RedrawError::generation_failed(
                "Drafter returned no diagram code",
            ));
        }

        if let Some(output_dir) = &self.config.output_dir {
            if let Some(extension) = turn.dialect.artifact_extension() {
                let artifact = output_dir.join(format!("{stem}.{extension}"));
                redraw_infrastructure::wait_for_artifact(
                    &artifact,
                    self.config.artifact_poll_retries,
                    Duration::from_millis(self.config.artifact_poll_interval_ms),
                )
                .await?;
            }
        }

        // Only now, with the whole turn known good, does session state move.
        let components = extract_components(&code, turn.dialect);
        let modifications = vec![if turn.is_edit {
            format!("Applied: {}", snippet(input, 50))
        } else {
            "Initial creation".to_string()
        }];

        let iteration = session.record_iteration(
            turn.prompt,
            code.clone(),
            turn.dialect,
            modifications,
            components,
            self.config.max_iterations,
        )?;
        self.session_repository.save(&session).await?;

        let terrastruct_link = if turn.dialect == DiagramDialect::D2 {
            Some(terrastruct_play_link(&code))
        } else {
            None
        };

        tracing::info!(
            "[GenerateUseCase] Session {} completed step {}/{}",
            session.id,
            iteration,
            self.config.max_iterations
        );

        Ok(GenerateOutcome {
            unique_name: stem,
            session_id: session.id,
            iteration,
            dialect: turn.dialect,
            is_edit: turn.is_edit,
            terrastruct_link,
        })
    }

    /// Deletes a session's persisted record. Idempotent; resetting an
    /// unknown session succeeds.
    pub async fn reset_session(&self, session_id: &str) -> Result<()> {
        tracing::info!("[GenerateUseCase] Resetting session {}", session_id);
        self.session_repository.delete(session_id).await
    }

    /// Loads or creates the session for this turn.
    async fn resolve_session(
        &self,
        session_id: Option<&str>,
        is_continuation: bool,
    ) -> Result<Session> {
        let Some(id) = session_id else {
            return Ok(Session::new(Uuid::new_v4().to_string()));
        };

        match self.session_repository.find_by_id(id).await? {
            Some(session) => Ok(session),
            None if is_continuation => Err(RedrawError::session_not_found(id)),
            None => Ok(Session::new(id)),
        }
    }

    /// Classifies the input and resolves prompt and dialect for this turn.
    ///
    /// An input naming an existing file is always a fresh creation: the file
    /// contents become the prompt and the dialect is forced to `Cloud`,
    /// since IaC sources map to cloud architecture diagrams. A session
    /// already locked to a different dialect rejects the import here,
    /// before any drafter work is spent.
    ///
    /// Text input on a dialect-locked session always reuses the stored
    /// dialect, edit or not; keyword scoring only decides the dialect of a
    /// session's first turn.
    async fn prepare_turn(&self, session: &Session, input: &str) -> Result<Turn> {
        let path = Path::new(input);
        if path.is_file() {
            if !session.dialect.is_unset() && session.dialect != DiagramDialect::Cloud {
                return Err(RedrawError::invalid_state(format!(
                    "session {} is locked to dialect '{}'; importing IaC code needs a new session",
                    session.id, session.dialect
                )));
            }
            let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
                RedrawError::io(format!("Failed to read input file {path:?}: {e}"))
            })?;
            return Ok(Turn {
                prompt: format!("Visualize this IaC code:\n\n{contents}"),
                dialect: DiagramDialect::Cloud,
                is_edit: false,
            });
        }

        let is_edit = self.classifier.is_edit(session, input);
        let dialect = if session.dialect.is_unset() {
            detect_dialect(input)
        } else {
            session.dialect
        };

        Ok(Turn {
            prompt: input.to_string(),
            dialect,
            is_edit,
        })
    }
}

/// Resolved prompt, dialect, and classification for one turn.
struct Turn {
    prompt: String,
    dialect: DiagramDialect,
    is_edit: bool,
}

fn short_uuid() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Truncates at a character boundary, never mid-codepoint.
fn snippet(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use redraw_core::classify::KeywordEditClassifier;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    struct InMemorySessionRepository {
        sessions: Mutex<HashMap<String, Session>>,
    }

    impl InMemorySessionRepository {
        fn new() -> Self {
            Self {
                sessions: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl SessionRepository for InMemorySessionRepository {
        async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
            Ok(self.sessions.lock().unwrap().get(session_id).cloned())
        }

        async fn save(&self, session: &Session) -> Result<()> {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.id.clone(), session.clone());
            Ok(())
        }

        async fn delete(&self, session_id: &str) -> Result<()> {
            self.sessions.lock().unwrap().remove(session_id);
            Ok(())
        }

        async fn list_all(&self) -> Result<Vec<Session>> {
            Ok(self.sessions.lock().unwrap().values().cloned().collect())
        }
    }

    struct MockDrafter {
        responses: Mutex<VecDeque<Result<String>>>,
        requests: Mutex<Vec<DraftRequest>>,
    }

    impl MockDrafter {
        fn with_responses(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_payload(&self) -> String {
            self.requests
                .lock()
                .unwrap()
                .last()
                .map(|r| r.payload.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl DiagramDrafter for MockDrafter {
        async fn draft(&self, request: &DraftRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("graph TD\nA[Default]".to_string()))
        }
    }

    struct SlowDrafter;

    #[async_trait]
    impl DiagramDrafter for SlowDrafter {
        async fn draft(&self, _request: &DraftRequest) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    fn usecase_with(
        drafter: Arc<dyn DiagramDrafter>,
        config: EngineConfig,
    ) -> (GenerateUseCase, Arc<InMemorySessionRepository>) {
        let repository = Arc::new(InMemorySessionRepository::new());
        let usecase = GenerateUseCase::new(
            repository.clone(),
            drafter,
            Arc::new(KeywordEditClassifier),
            config,
        );
        (usecase, repository)
    }

    #[tokio::test]
    async fn test_two_turn_edit_flow() {
        let drafter = Arc::new(MockDrafter::with_responses(vec![
            Ok("graph TD\nA[Start] --> B[Login]".to_string()),
            Ok("graph TD\nA[Start] --> B[Login] --> C[Logout]".to_string()),
        ]));
        let (usecase, repository) = usecase_with(drafter.clone(), EngineConfig::default());

        let first = usecase
            .generate("draw a login flowchart", Some("s-1"), false)
            .await
            .unwrap();
        assert_eq!(first.iteration, 1);
        assert!(!first.is_edit);
        assert_eq!(first.dialect, DiagramDialect::Mermaid);

        let second = usecase
            .generate("add a logout node", Some("s-1"), true)
            .await
            .unwrap();
        assert_eq!(second.iteration, 2);
        assert!(second.is_edit);
        assert_eq!(second.dialect, DiagramDialect::Mermaid);
        assert_eq!(second.unique_name, first.unique_name);

        // The edit payload carries the previous code as ground truth plus
        // explicit editing instructions.
        let payload = drafter.last_payload();
        assert!(payload.contains("CURRENT CODE (ground truth)"));
        assert!(payload.contains("graph TD\nA[Start] --> B[Login]"));
        assert!(payload.contains("OPERATION: ADD"));

        let session = repository.find_by_id("s-1").await.unwrap().unwrap();
        assert_eq!(session.iteration, 2);
        assert_eq!(session.history.len(), 2);
        assert!(session.current_code.unwrap().contains("C[Logout]"));
    }

    #[tokio::test]
    async fn test_login_flowchart_refinement_scenario() {
        let drafter = Arc::new(MockDrafter::with_responses(vec![
            Ok("graph TD\nA[Login] --> B[Check password] --> C[Done]".to_string()),
            Ok("graph TD\nA[Login] --> C[Done]".to_string()),
        ]));
        let (usecase, repository) = usecase_with(drafter.clone(), EngineConfig::default());

        let first = usecase
            .generate("Create a flowchart for login", Some("s-login"), false)
            .await
            .unwrap();
        assert_eq!(first.dialect, DiagramDialect::Mermaid);
        assert_eq!(first.iteration, 1);
        assert!(!first.is_edit);

        let second = usecase
            .generate("remove the password check step", Some("s-login"), true)
            .await
            .unwrap();
        assert!(second.is_edit);
        assert_eq!(second.dialect, DiagramDialect::Mermaid);
        assert_eq!(second.iteration, 2);
        assert_eq!(second.unique_name, first.unique_name);
        assert!(drafter.last_payload().contains("OPERATION: REMOVE"));

        let session = repository.find_by_id("s-login").await.unwrap().unwrap();
        assert!(!session.component_state.contains_key("B"));
    }

    #[tokio::test]
    async fn test_iteration_cap_blocks_before_drafter() {
        let config = EngineConfig {
            max_iterations: 2,
            ..Default::default()
        };
        let drafter = Arc::new(MockDrafter::with_responses(vec![]));
        let (usecase, _repository) = usecase_with(drafter.clone(), config);

        usecase.generate("draw a flowchart", Some("s-cap"), false).await.unwrap();
        usecase.generate("add a node", Some("s-cap"), true).await.unwrap();
        assert_eq!(drafter.call_count(), 2);

        let err = usecase
            .generate("add another node", Some("s-cap"), true)
            .await
            .unwrap_err();
        assert!(err.is_iteration_limit());
        // The capped turn never reached the drafter.
        assert_eq!(drafter.call_count(), 2);
    }

    #[tokio::test]
    async fn test_drafter_failure_leaves_state_unchanged() {
        let drafter = Arc::new(MockDrafter::with_responses(vec![
            Ok("graph TD\nA[Start]".to_string()),
            Err(RedrawError::generation_failed("backend unavailable")),
        ]));
        let (usecase, repository) = usecase_with(drafter, EngineConfig::default());

        usecase.generate("draw a flowchart", Some("s-fail"), false).await.unwrap();
        let before = repository.find_by_id("s-fail").await.unwrap().unwrap();

        let err = usecase
            .generate("add a node", Some("s-fail"), true)
            .await
            .unwrap_err();
        assert!(err.is_generation_failure());

        let after = repository.find_by_id("s-fail").await.unwrap().unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_empty_drafter_output_is_a_failure() {
        let drafter = Arc::new(MockDrafter::with_responses(vec![Ok("   \n".to_string())]));
        let (usecase, repository) = usecase_with(drafter, EngineConfig::default());

        let err = usecase
            .generate("draw a flowchart", Some("s-empty"), false)
            .await
            .unwrap_err();
        assert!(err.is_generation_failure());
        assert!(repository.find_by_id("s-empty").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_drafter_timeout() {
        let config = EngineConfig {
            draft_timeout_secs: 0,
            ..Default::default()
        };
        let (usecase, repository) = usecase_with(Arc::new(SlowDrafter), config);

        let err = usecase
            .generate("draw a flowchart", Some("s-slow"), false)
            .await
            .unwrap_err();
        assert!(err.is_generation_failure());
        assert!(repository.find_by_id("s-slow").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_locked_dialect_wins_over_fresh_detection() {
        let drafter = Arc::new(MockDrafter::with_responses(vec![
            Ok("graph TD\nA[Start]".to_string()),
            Ok("graph TD\nA[Start] --> B[Cloud]".to_string()),
        ]));
        let (usecase, _repository) = usecase_with(drafter, EngineConfig::default());

        usecase
            .generate("draw a login flowchart", Some("s-lock"), false)
            .await
            .unwrap();

        // No mutation keyword, so this is a fresh creation whose text would
        // score as cloud. The locked session dialect still wins.
        let outcome = usecase
            .generate("visualize my aws setup", Some("s-lock"), true)
            .await
            .unwrap();
        assert!(!outcome.is_edit);
        assert_eq!(outcome.dialect, DiagramDialect::Mermaid);
        assert_eq!(outcome.iteration, 2);
    }

    #[tokio::test]
    async fn test_file_import_on_locked_session_fails_before_drafter() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let tf_path = temp_dir.path().join("main.tf");
        std::fs::write(&tf_path, "resource \"aws_s3_bucket\" \"assets\" {}").unwrap();

        let drafter = Arc::new(MockDrafter::with_responses(vec![Ok(
            "graph TD\nA[Start]".to_string(),
        )]));
        let (usecase, repository) = usecase_with(drafter.clone(), EngineConfig::default());

        usecase
            .generate("draw a login flowchart", Some("s-lock-file"), false)
            .await
            .unwrap();

        let err = usecase
            .generate(tf_path.to_str().unwrap(), Some("s-lock-file"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, RedrawError::InvalidState(_)));
        // The conflicting import never reached the drafter.
        assert_eq!(drafter.call_count(), 1);

        let session = repository.find_by_id("s-lock-file").await.unwrap().unwrap();
        assert_eq!(session.iteration, 1);
        assert_eq!(session.dialect, DiagramDialect::Mermaid);
    }

    #[tokio::test]
    async fn test_continuation_of_unknown_session_is_an_error() {
        let drafter = Arc::new(MockDrafter::with_responses(vec![]));
        let (usecase, _repository) = usecase_with(drafter.clone(), EngineConfig::default());

        let err = usecase
            .generate("add a node", Some("ghost"), true)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(drafter.call_count(), 0);
    }

    #[tokio::test]
    async fn test_file_input_forces_cloud_creation() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let tf_path = temp_dir.path().join("main.tf");
        std::fs::write(&tf_path, "resource \"aws_s3_bucket\" \"assets\" {}").unwrap();

        let drafter = Arc::new(MockDrafter::with_responses(vec![Ok(
            "bucket = S3(\"assets\")".to_string(),
        )]));
        let (usecase, repository) = usecase_with(drafter.clone(), EngineConfig::default());

        let outcome = usecase
            .generate(tf_path.to_str().unwrap(), Some("s-file"), false)
            .await
            .unwrap();
        assert_eq!(outcome.dialect, DiagramDialect::Cloud);
        assert!(!outcome.is_edit);

        let session = repository.find_by_id("s-file").await.unwrap().unwrap();
        assert!(session.history[0].prompt.starts_with("Visualize this IaC code:"));
        assert!(session.history[0].prompt.contains("aws_s3_bucket"));
    }

    #[tokio::test]
    async fn test_d2_outcome_carries_playground_link() {
        let drafter = Arc::new(MockDrafter::with_responses(vec![Ok(
            "client -> server: HTTPS".to_string(),
        )]));
        let (usecase, _repository) = usecase_with(drafter, EngineConfig::default());

        let outcome = usecase
            .generate("create a d2 diagram of a client and server", Some("s-d2"), false)
            .await
            .unwrap();
        assert_eq!(outcome.dialect, DiagramDialect::D2);
        let link = outcome.terrastruct_link.unwrap();
        assert!(link.starts_with("https://play.terrastruct.com/?script="));
    }

    #[tokio::test]
    async fn test_reset_session_is_idempotent() {
        let drafter = Arc::new(MockDrafter::with_responses(vec![]));
        let (usecase, repository) = usecase_with(drafter, EngineConfig::default());

        usecase.generate("draw a flowchart", Some("s-reset"), false).await.unwrap();
        assert!(repository.find_by_id("s-reset").await.unwrap().is_some());

        usecase.reset_session("s-reset").await.unwrap();
        assert!(repository.find_by_id("s-reset").await.unwrap().is_none());

        usecase.reset_session("s-reset").await.unwrap();
        usecase.reset_session("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_artifact_wait_when_output_dir_configured() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = EngineConfig {
            output_dir: Some(temp_dir.path().to_path_buf()),
            artifact_poll_retries: 2,
            artifact_poll_interval_ms: 1,
            ..Default::default()
        };
        let drafter = Arc::new(MockDrafter::with_responses(vec![Ok(
            "graph TD\nA[Start]".to_string(),
        )]));
        let (usecase, repository) = usecase_with(drafter, config);

        // The drafter never writes the expected artifact file.
        let err = usecase
            .generate("draw a flowchart", Some("s-artifact"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, RedrawError::ArtifactTimeout { .. }));
        assert!(repository.find_by_id("s-artifact").await.unwrap().is_none());
    }
}
