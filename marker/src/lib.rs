//! # Marker Library
//!
//! This crate provides the core logic for AI-assisted grading of exam essays against a
//! fixed rubric. It turns a rubric and an essay into a grading prompt, and turns the
//! language model's reply back into a validated score record.
//!
//! ## Key Concepts
//! - **Rubric Store**: immutable rubrics keyed by essay prompt title, validated at load.
//! - **Prompt Compiler**: a pure function rendering rubric + essay into the grading prompt.
//! - **Response Validator**: parses the model's JSON reply and checks every grade and
//!   score against the rubric.
//! - **GradingJob**: the compile → generate → validate loop for one submission, with a
//!   bounded retry when the model's output is malformed.
//! - **Reports**: the [`ScoreRecord`](report::ScoreRecord) handed to the external store.

pub mod error;
pub mod generators;
pub mod parsers;
pub mod prompt;
pub mod report;
pub mod request;
pub mod rubric;
pub mod scorer;
pub mod traits;
pub mod types;
pub mod utilities;

use crate::error::MarkerError;
use crate::parsers::grading_parser::{GradingReplyParser, TotalPolicy};
use crate::prompt::refinement::compile_refinement;
use crate::report::ScoreRecord;
use crate::request::GradingRequest;
use crate::rubric::Rubric;
use crate::rubric::store::RubricStore;
use crate::traits::generator::TextGenerator;
use crate::traits::parser::Parser;
use tracing::{info, warn};
use util::config;

/// Represents a grading job for a single essay submission.
///
/// The job owns the per-submission state (request, chosen rubric, generator) and is
/// consumed by [`GradingJob::grade`]; nothing is shared between submissions.
pub struct GradingJob<'a> {
    rubric: &'a Rubric,
    request: GradingRequest,
    generator: Box<dyn TextGenerator + 'a>,
    total_policy: TotalPolicy,
    max_attempts: u32,
}

impl<'a> GradingJob<'a> {
    /// Create a grading job for an already-resolved rubric.
    ///
    /// Defaults: lenient total policy, two model attempts (one retry).
    pub fn new<G: TextGenerator + 'a>(
        rubric: &'a Rubric,
        request: GradingRequest,
        generator: G,
    ) -> Self {
        Self {
            rubric,
            request,
            generator: Box::new(generator),
            total_policy: TotalPolicy::Warn,
            max_attempts: 2,
        }
    }

    /// Validate `request` and resolve its rubric from `store`.
    ///
    /// # Errors
    /// * [`MarkerError::InvalidRequest`] for a blank title or essay.
    /// * [`MarkerError::Rubric`] when no rubric is defined for the title.
    pub fn from_request<G: TextGenerator + 'a>(
        store: &'a RubricStore,
        request: GradingRequest,
        generator: G,
    ) -> Result<Self, MarkerError> {
        request.check()?;
        let rubric = store.lookup(&request.title)?;
        Ok(Self::new(rubric, request, generator))
    }

    /// Apply `GRADING_STRICT_TOTAL` and `GRADING_MAX_ATTEMPTS` from the global config.
    pub fn configured(self) -> Self {
        let policy = if config::grading_strict_total() {
            TotalPolicy::Reject
        } else {
            TotalPolicy::Warn
        };
        self.with_total_policy(policy)
            .with_max_attempts(config::grading_max_attempts())
    }

    pub fn with_total_policy(mut self, policy: TotalPolicy) -> Self {
        self.total_policy = policy;
        self
    }

    /// Total number of model calls allowed; values below 1 are treated as 1.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// The grading prompt this job sends.
    pub fn prompt(&self) -> String {
        prompt::compile(&self.request.title, self.rubric, &self.request.essay_text)
    }

    /// Run the grading process and build the score record.
    ///
    /// # Steps
    /// 1. Compiles the grading prompt.
    /// 2. Sends it to the configured [`TextGenerator`].
    /// 3. Validates the reply against the rubric.
    /// 4. On a retryable [`ParseError`](error::ParseError) asks the model again, up to the
    ///    attempt limit; other errors are returned immediately.
    pub async fn grade(self) -> Result<ScoreRecord, MarkerError> {
        let prompt = self.prompt();
        let parser = GradingReplyParser::new(self.rubric).with_total_policy(self.total_policy);

        let mut attempt = 1;
        loop {
            let reply = self.generator.generate(&prompt).await?;
            match parser.parse(&reply) {
                Ok(graded) => {
                    info!(
                        rubric = %self.rubric.title,
                        total = graded.result.total,
                        warnings = graded.warnings.len(),
                        attempt,
                        "Essay graded"
                    );
                    return Ok(ScoreRecord::new(self.rubric, graded));
                }
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    warn!(attempt, error = %err, "Model reply rejected, retrying");
                    attempt += 1;
                }
                Err(err) => {
                    warn!(attempt, error = %err, "Model reply rejected");
                    return Err(err.into());
                }
            }
        }
    }
}

/// Ask the model to clean up OCR output, returning the trimmed refined text.
pub async fn refine_ocr_text(
    generator: &dyn TextGenerator,
    ocr_text: &str,
) -> Result<String, MarkerError> {
    let prompt = compile_refinement(ocr_text)?;
    let refined = generator.generate(&prompt).await?;
    Ok(refined.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, RubricError};
    use crate::rubric::tests::sample_rubric;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const GOOD_REPLY: &str = r#"```json
{"total":20,"parts":[{"part":"第一小題","grade":"A","score":3,"reason":"ok"},{"part":"第二小題","grade":"A","score":17,"reason":"ok"}],"grammar_analysis":{"score":8,"comment":"ok"},"vocabulary_usage":{"score":7,"comment":"ok"},"structure_issues":{"score":8,"comment":"ok"},"summary":"good"}
```"#;

    /// Replays canned replies in order and counts calls.
    struct ScriptedGenerator<'c> {
        replies: Mutex<VecDeque<Result<String, MarkerError>>>,
        calls: &'c AtomicUsize,
    }

    impl<'c> ScriptedGenerator<'c> {
        fn new(calls: &'c AtomicUsize, replies: Vec<Result<&str, &str>>) -> Self {
            let replies = replies
                .into_iter()
                .map(|r| {
                    r.map(str::to_string)
                        .map_err(|e| MarkerError::Backend(e.to_string()))
                })
                .collect();
            Self {
                replies: Mutex::new(replies),
                calls,
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator<'_> {
        async fn generate(&self, _prompt: &str) -> Result<String, MarkerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(MarkerError::Backend("script exhausted".into())))
        }
    }

    fn request() -> GradingRequest {
        GradingRequest::new("X", "示例作文內容")
    }

    #[tokio::test]
    async fn grades_on_first_valid_reply() {
        let calls = AtomicUsize::new(0);
        let rubric = sample_rubric();
        let generator = ScriptedGenerator::new(&calls, vec![Ok(GOOD_REPLY)]);

        let record = GradingJob::new(&rubric, request(), generator)
            .grade()
            .await
            .unwrap();
        assert_eq!(record.total_score, 20);
        assert!(record.warnings.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_once_after_malformed_reply() {
        let calls = AtomicUsize::new(0);
        let rubric = sample_rubric();
        let generator = ScriptedGenerator::new(&calls, vec![Ok("抱歉，我無法評分。"), Ok(GOOD_REPLY)]);

        let record = GradingJob::new(&rubric, request(), generator)
            .grade()
            .await
            .unwrap();
        assert_eq!(record.feedback_json.parts[0].score, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_attempt_limit() {
        let calls = AtomicUsize::new(0);
        let rubric = sample_rubric();
        let generator = ScriptedGenerator::new(&calls, vec![Ok("{"), Ok("{"), Ok(GOOD_REPLY)]);

        let err = GradingJob::new(&rubric, request(), generator)
            .grade()
            .await
            .unwrap_err();
        assert!(matches!(err, MarkerError::Parse(ParseError::MalformedJson(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn single_attempt_disables_retry() {
        let calls = AtomicUsize::new(0);
        let rubric = sample_rubric();
        let generator = ScriptedGenerator::new(&calls, vec![Ok("{"), Ok(GOOD_REPLY)]);

        let result = GradingJob::new(&rubric, request(), generator)
            .with_max_attempts(0)
            .grade()
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rubric_mismatch_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let rubric = sample_rubric();
        let bad = GOOD_REPLY.replace(r#""grade":"A","score":3"#, r#""grade":"D","score":3"#);
        let generator = ScriptedGenerator::new(&calls, vec![Ok(bad.as_str()), Ok(GOOD_REPLY)]);

        let err = GradingJob::new(&rubric, request(), generator)
            .grade()
            .await
            .unwrap_err();
        assert!(matches!(err, MarkerError::Parse(ParseError::InvalidGrade { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn strict_policy_retries_total_mismatch() {
        let calls = AtomicUsize::new(0);
        let rubric = sample_rubric();
        let off = GOOD_REPLY.replace(r#""total":20"#, r#""total":21"#);
        let generator = ScriptedGenerator::new(&calls, vec![Ok(off.as_str()), Ok(GOOD_REPLY)]);

        let record = GradingJob::new(&rubric, request(), generator)
            .with_total_policy(TotalPolicy::Reject)
            .grade()
            .await
            .unwrap();
        assert_eq!(record.total_score, 20);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn backend_errors_propagate_without_retry() {
        let calls = AtomicUsize::new(0);
        let rubric = sample_rubric();
        let generator = ScriptedGenerator::new(&calls, vec![Err("503"), Ok(GOOD_REPLY)]);

        let err = GradingJob::new(&rubric, request(), generator)
            .grade()
            .await
            .unwrap_err();
        assert!(matches!(err, MarkerError::Backend(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn from_request_surfaces_unknown_title() {
        let calls = AtomicUsize::new(0);
        let store = RubricStore::builtin().unwrap();
        let generator = ScriptedGenerator::new(&calls, vec![]);

        let err = GradingJob::from_request(&store, GradingRequest::new("未知題目", "作文"), generator)
            .err()
            .unwrap();
        assert!(matches!(err, MarkerError::Rubric(RubricError::NotFound(_))));
    }

    #[test]
    fn from_request_validates_input_first() {
        let calls = AtomicUsize::new(0);
        let store = RubricStore::builtin().unwrap();
        let generator = ScriptedGenerator::new(&calls, vec![]);

        let err = GradingJob::from_request(&store, GradingRequest::new("未知題目", " "), generator)
            .err()
            .unwrap();
        assert!(matches!(err, MarkerError::InvalidRequest(_)));
    }

    #[test]
    fn job_prompt_matches_compiler() {
        let calls = AtomicUsize::new(0);
        let rubric = sample_rubric();
        let job = GradingJob::new(&rubric, request(), ScriptedGenerator::new(&calls, vec![]));
        assert_eq!(job.prompt(), prompt::compile("X", &rubric, "示例作文內容"));
    }

    #[tokio::test]
    async fn refine_trims_model_output() {
        let calls = AtomicUsize::new(0);
        let generator = ScriptedGenerator::new(&calls, vec![Ok("  今天天氣很好。\n")]);
        let refined = refine_ocr_text(&generator, "今天天汽很好").await.unwrap();
        assert_eq!(refined, "今天天氣很好。");
    }

    #[tokio::test]
    async fn refine_rejects_blank_text_without_calling_model() {
        let calls = AtomicUsize::new(0);
        let generator = ScriptedGenerator::new(&calls, vec![]);
        assert!(refine_ocr_text(&generator, "   ").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
