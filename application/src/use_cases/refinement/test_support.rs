//! Scripted ports shared by the refinement engine tests.

use crate::ports::content_generator::{ContentGenerator, GenerationError};
use crate::ports::progress::{ProgressNotifier, ProgressUpdate};
use crate::ports::quality_evaluator::{EvaluationError, QualityEvaluator};
use async_trait::async_trait;
use stagecraft_domain::{IterationRecord, QualityVector, SceneRequirements};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

pub(crate) fn refined(content: &str) -> String {
    format!("REFINED SCENE:\n{content}\n\nREFINEMENT ANALYSIS:\n1. Improved things")
}

pub(crate) fn expanded(content: &str) -> String {
    format!("EXPANDED SCENE:\n{content}\n\nEXPANSION ANALYSIS:\n1. Longer now")
}

pub(crate) fn scores(dialogue: f64, pacing: f64, character: f64) -> QualityVector {
    QualityVector::from_pairs([
        ("dialogue", dialogue),
        ("pacing", pacing),
        ("character", character),
    ])
}

/// Generator that returns scripted responses in order and records prompts
pub(crate) struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
    cancel_on_call: Option<(usize, CancellationToken)>,
}

impl ScriptedGenerator {
    pub(crate) fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            prompts: Mutex::new(Vec::new()),
            cancel_on_call: None,
        }
    }

    pub(crate) fn failing(error: GenerationError) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(vec![Err(error)])),
            prompts: Mutex::new(Vec::new()),
            cancel_on_call: None,
        }
    }

    /// Cancel `token` while serving the `call`-th request (1-based).
    pub(crate) fn cancelling_on_call(mut self, call: usize, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, token));
        self
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };
        if let Some((n, token)) = &self.cancel_on_call
            && *n == call
        {
            token.cancel();
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Other("no more responses".to_string())))
    }
}

/// Evaluator that returns the scores registered for each exact content
pub(crate) struct MirrorEvaluator {
    scores: HashMap<String, QualityVector>,
    evaluated: Mutex<Vec<String>>,
}

impl MirrorEvaluator {
    pub(crate) fn new(scores: Vec<(&str, QualityVector)>) -> Self {
        Self {
            scores: scores
                .into_iter()
                .map(|(content, q)| (content.to_string(), q))
                .collect(),
            evaluated: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.evaluated.lock().unwrap().len()
    }
}

#[async_trait]
impl QualityEvaluator for MirrorEvaluator {
    async fn evaluate(
        &self,
        content: &str,
        _requirements: &SceneRequirements,
    ) -> Result<QualityVector, EvaluationError> {
        self.evaluated.lock().unwrap().push(content.to_string());
        self.scores
            .get(content)
            .cloned()
            .ok_or_else(|| EvaluationError::Failed(format!("unscripted content: {content}")))
    }
}

/// Progress notifier that records what it was told
#[derive(Default)]
pub(crate) struct RecordingProgress {
    pub(crate) updates: Mutex<Vec<ProgressUpdate>>,
    pub(crate) iterations: Mutex<Vec<usize>>,
    pub(crate) skipped: Mutex<Vec<usize>>,
}

impl ProgressNotifier for RecordingProgress {
    fn on_progress(&self, update: &ProgressUpdate) {
        self.updates.lock().unwrap().push(update.clone());
    }

    fn on_iteration_complete(&self, record: &IterationRecord) {
        self.iterations.lock().unwrap().push(record.iteration);
    }

    fn on_round_skipped(&self, attempt: usize) {
        self.skipped.lock().unwrap().push(attempt);
    }
}
