//! The Planner: AI-first orchestration with deterministic fallback

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use contextstore::ContextProvider;
use taskstore::{Priority, Task, TaskId, TaskRepository, TaskStore};

use super::report::{PlanError, PlanMethod, PlanReport, PriorityReport, MAX_PLANNED_SUBTASKS};
use crate::llm::{parse, prompts, ChatGateway};
use crate::rules;

/// Planning orchestrator.
///
/// Owns no tasks itself: it mutates the borrowed store and pushes a snapshot
/// to the repository after each successful planning mutation. The gateway is
/// optional - its absence means "AI not configured" and routes every request
/// straight to the rule-based components.
pub struct Planner<'a> {
    store: &'a mut TaskStore,
    repo: &'a dyn TaskRepository,
    context: &'a dyn ContextProvider,
    gateway: Option<Arc<dyn ChatGateway>>,
    /// Task ids with a planning/priority request currently pending. A second
    /// request for the same id is rejected instead of risking duplicate
    /// subtasks from a double invocation.
    in_flight: HashSet<TaskId>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl<'a> Planner<'a> {
    pub fn new(
        store: &'a mut TaskStore,
        repo: &'a dyn TaskRepository,
        context: &'a dyn ContextProvider,
        gateway: Option<Arc<dyn ChatGateway>>,
    ) -> Self {
        Self {
            store,
            repo,
            context,
            gateway,
            in_flight: HashSet::new(),
        }
    }

    /// Decompose a task into subtasks and append them to the store.
    ///
    /// AI gateway first when configured; any gateway failure is logged and
    /// falls back to the rule-based generator. The result is capped at
    /// [`MAX_PLANNED_SUBTASKS`], whitespace-only entries are discarded, and
    /// generator order is preserved. Zero added subtasks is an Ok outcome.
    pub async fn plan_task(&mut self, task_id: TaskId) -> Result<PlanReport, PlanError> {
        let task_text = self
            .store
            .task(task_id)
            .ok_or(PlanError::TaskNotFound(task_id))?
            .text
            .clone();
        if !self.in_flight.insert(task_id) {
            return Err(PlanError::PlanningInFlight(task_id));
        }
        let result = self.plan_task_inner(task_id, &task_text).await;
        self.in_flight.remove(&task_id);
        result
    }

    async fn plan_task_inner(
        &mut self,
        task_id: TaskId,
        task_text: &str,
    ) -> Result<PlanReport, PlanError> {
        let (candidates, method) = match &self.gateway {
            Some(gateway) => match gateway.request_subtasks(task_text).await {
                Ok(items) => {
                    debug!(task_id, count = items.len(), "plan_task: AI subtasks received");
                    (items, PlanMethod::AiPowered)
                }
                Err(e) => {
                    warn!(task_id, error = %e, "AI planning failed, falling back to rule-based");
                    (rules::subtasks::generate(task_text), PlanMethod::RuleBased)
                }
            },
            None => (rules::subtasks::generate(task_text), PlanMethod::RuleBased),
        };

        let mut added = 0;
        for text in candidates.iter().take(MAX_PLANNED_SUBTASKS) {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            self.store.add_subtask(task_id, text)?;
            added += 1;
        }

        if added > 0 {
            self.persist()?;
        }
        info!(task_id, added, method = %method, "plan_task: complete");
        Ok(PlanReport { added, method })
    }

    /// Suggest and apply a priority for an existing task.
    ///
    /// The AI path asks for a `{level, reason, confidence}` object; a
    /// missing or unparseable suggestion counts as failure and triggers the
    /// rule-based scorer. Either way the task ends up with a priority and
    /// `ai_suggested_priority` set.
    pub async fn suggest_priority(&mut self, task_id: TaskId) -> Result<PriorityReport, PlanError> {
        let task = self
            .store
            .task(task_id)
            .ok_or(PlanError::TaskNotFound(task_id))?
            .clone();
        if !self.in_flight.insert(task_id) {
            return Err(PlanError::PlanningInFlight(task_id));
        }
        let result = self.suggest_priority_inner(task_id, &task).await;
        self.in_flight.remove(&task_id);
        result
    }

    async fn suggest_priority_inner(
        &mut self,
        task_id: TaskId,
        task: &Task,
    ) -> Result<PriorityReport, PlanError> {
        let (level, method, reason) = match &self.gateway {
            Some(gateway) => {
                let prompt = prompts::priority_prompt(
                    task,
                    &self.context.profile(),
                    self.context.calendar().as_ref(),
                    self.context.work().as_ref(),
                );
                let suggestion = match gateway.request_freeform(&prompt).await {
                    Ok(reply) => parse::priority_suggestion(&reply),
                    Err(e) => {
                        warn!(task_id, error = %e, "AI priority request failed");
                        None
                    }
                };
                match suggestion {
                    Some(s) => (s.level, PlanMethod::AiPowered, Some(s.reason)),
                    None => {
                        warn!(task_id, "no usable AI suggestion, falling back to rule-based");
                        (
                            self.rule_based_priority(&task.text, task.due_date),
                            PlanMethod::RuleBased,
                            None,
                        )
                    }
                }
            }
            None => (
                self.rule_based_priority(&task.text, task.due_date),
                PlanMethod::RuleBased,
                None,
            ),
        };

        self.store.set_ai_priority(task_id, level)?;
        self.persist()?;
        info!(task_id, %level, method = %method, "suggest_priority: applied");
        Ok(PriorityReport {
            level,
            method,
            reason,
        })
    }

    /// Pre-creation priority suggestion for the input form.
    ///
    /// Infallible by design: an AI failure degrades to `medium` and a
    /// missing gateway uses the rule-based scorer, so priority suggestion
    /// can never block task creation.
    pub async fn suggest_smart_priority(
        &self,
        task_text: &str,
        due_date: Option<NaiveDate>,
    ) -> Priority {
        let calendar = self.context.calendar();
        let work = self.context.work();

        if let Some(gateway) = &self.gateway {
            let prompt = prompts::smart_priority_prompt(
                task_text,
                due_date,
                calendar.as_ref(),
                work.as_ref(),
                today(),
            );
            return match gateway.request_freeform(&prompt).await {
                Ok(reply) => parse::priority_word(&reply),
                Err(e) => {
                    warn!(error = %e, "smart priority AI call failed, defaulting to medium");
                    Priority::Medium
                }
            };
        }

        rules::priority::score(task_text, due_date, calendar.as_ref(), work.as_ref(), today())
    }

    /// Freeform AI analysis of a task. No rule-based fallback exists for
    /// this, so it requires a configured gateway.
    pub async fn analyze_task(&self, task_id: TaskId) -> Result<String, PlanError> {
        let task = self
            .store
            .task(task_id)
            .ok_or(PlanError::TaskNotFound(task_id))?;
        let gateway = self.gateway.as_ref().ok_or(PlanError::NotConfigured)?;
        let analysis = gateway
            .request_freeform(&prompts::analysis_prompt(task))
            .await?;
        Ok(analysis)
    }

    fn rule_based_priority(&self, text: &str, due_date: Option<NaiveDate>) -> Priority {
        rules::priority::score(
            text,
            due_date,
            self.context.calendar().as_ref(),
            self.context.work().as_ref(),
            today(),
        )
    }

    fn persist(&self) -> Result<(), PlanError> {
        self.repo.save(&self.store.snapshot())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contextstore::FixedProvider;
    use taskstore::MemoryRepository;

    use crate::llm::LlmError;

    struct FailingGateway;

    #[async_trait]
    impl ChatGateway for FailingGateway {
        async fn request_subtasks(&self, _task_text: &str) -> Result<Vec<String>, LlmError> {
            Err(LlmError::Service {
                status: 500,
                body: "internal error".to_string(),
            })
        }

        async fn request_freeform(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Service {
                status: 500,
                body: "internal error".to_string(),
            })
        }
    }

    struct CannedGateway {
        subtasks: Vec<String>,
        freeform: String,
    }

    #[async_trait]
    impl ChatGateway for CannedGateway {
        async fn request_subtasks(&self, _task_text: &str) -> Result<Vec<String>, LlmError> {
            Ok(self.subtasks.clone())
        }

        async fn request_freeform(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.freeform.clone())
        }
    }

    fn store_with(text: &str) -> (TaskStore, TaskId) {
        let mut store = TaskStore::new();
        let id = store.create_task(text, Priority::None, None).unwrap().id;
        (store, id)
    }

    #[tokio::test]
    async fn test_plan_without_gateway_uses_rules() {
        let (mut store, id) = store_with("Build website for client");
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();

        let mut planner = Planner::new(&mut store, &repo, &context, None);
        let report = planner.plan_task(id).await.unwrap();

        assert_eq!(report.method, PlanMethod::RuleBased);
        assert_eq!(report.added, 4);
        assert_eq!(
            store.task(id).unwrap().subtasks[0].text,
            "Plan website structure and features"
        );
    }

    #[tokio::test]
    async fn test_plan_gateway_failure_falls_back_not_propagates() {
        let (mut store, id) = store_with("Write the annual report");
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();

        let mut planner = Planner::new(&mut store, &repo, &context, Some(Arc::new(FailingGateway)));
        let report = planner.plan_task(id).await.unwrap();

        assert_eq!(report.method, PlanMethod::RuleBased);
        assert!((1..=4).contains(&report.added));
    }

    #[tokio::test]
    async fn test_plan_ai_result_truncated_and_blank_filtered() {
        let (mut store, id) = store_with("Anything");
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();
        let gateway = CannedGateway {
            subtasks: vec![
                "One".to_string(),
                "   ".to_string(),
                "Two".to_string(),
                "Three".to_string(),
                "Four".to_string(),
                "Five".to_string(),
                "Six".to_string(),
            ],
            freeform: String::new(),
        };

        let mut planner = Planner::new(&mut store, &repo, &context, Some(Arc::new(gateway)));
        let report = planner.plan_task(id).await.unwrap();

        assert_eq!(report.method, PlanMethod::AiPowered);
        // cap of 5 candidates, one of which was whitespace
        assert_eq!(report.added, 4);
        let texts: Vec<_> = store.task(id).unwrap().subtasks.iter().map(|s| s.text.clone()).collect();
        assert_eq!(texts, vec!["One", "Two", "Three", "Four"]);
    }

    #[tokio::test]
    async fn test_plan_zero_subtasks_is_ok_not_error() {
        let (mut store, id) = store_with("Anything");
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();
        let gateway = CannedGateway {
            subtasks: vec!["  ".to_string()],
            freeform: String::new(),
        };

        let mut planner = Planner::new(&mut store, &repo, &context, Some(Arc::new(gateway)));
        let report = planner.plan_task(id).await.unwrap();
        assert_eq!(report.added, 0);
        assert!(store.task(id).unwrap().subtasks.is_empty());
    }

    #[tokio::test]
    async fn test_in_flight_guard_releases_after_each_invocation() {
        let (mut store, id) = store_with("Plan the quarter");
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();

        let mut planner = Planner::new(&mut store, &repo, &context, None);
        planner.plan_task(id).await.unwrap();
        // a completed run releases the guard, so planning again is allowed
        let second = planner.plan_task(id).await.unwrap();
        assert_eq!(second.added, 4);
        assert_eq!(store.task(id).unwrap().subtasks.len(), 8);
    }

    #[tokio::test]
    async fn test_plan_unknown_task() {
        let mut store = TaskStore::new();
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();

        let mut planner = Planner::new(&mut store, &repo, &context, None);
        assert!(matches!(
            planner.plan_task(42).await,
            Err(PlanError::TaskNotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_plan_persists_snapshot() {
        let (mut store, id) = store_with("Plan the offsite");
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();

        let mut planner = Planner::new(&mut store, &repo, &context, None);
        planner.plan_task(id).await.unwrap();

        assert_eq!(repo.task_count(), 1);
        assert!(!repo.load().unwrap().tasks[0].subtasks.is_empty());
    }

    #[tokio::test]
    async fn test_suggest_priority_uses_ai_suggestion() {
        let (mut store, id) = store_with("Renew certificates");
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();
        let gateway = CannedGateway {
            subtasks: vec![],
            freeform: r#"{"level": "high", "reason": "expiry is close", "confidence": 0.9}"#.to_string(),
        };

        let mut planner = Planner::new(&mut store, &repo, &context, Some(Arc::new(gateway)));
        let report = planner.suggest_priority(id).await.unwrap();

        assert_eq!(report.level, Priority::High);
        assert_eq!(report.method, PlanMethod::AiPowered);
        assert_eq!(report.reason.as_deref(), Some("expiry is close"));

        let task = store.task(id).unwrap();
        assert_eq!(task.priority, Priority::High);
        assert!(task.ai_suggested_priority);
    }

    #[tokio::test]
    async fn test_suggest_priority_unparseable_reply_falls_back() {
        let (mut store, id) = store_with("Water the plants");
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();
        let gateway = CannedGateway {
            subtasks: vec![],
            freeform: "I'd say it's pretty important!".to_string(),
        };

        let mut planner = Planner::new(&mut store, &repo, &context, Some(Arc::new(gateway)));
        let report = planner.suggest_priority(id).await.unwrap();

        assert_eq!(report.method, PlanMethod::RuleBased);
        // no due date, no context: baseline 50 maps to medium
        assert_eq!(report.level, Priority::Medium);
        assert!(store.task(id).unwrap().ai_suggested_priority);
    }

    #[tokio::test]
    async fn test_suggest_priority_gateway_error_falls_back() {
        let (mut store, id) = store_with("Water the plants");
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();

        let mut planner = Planner::new(&mut store, &repo, &context, Some(Arc::new(FailingGateway)));
        let report = planner.suggest_priority(id).await.unwrap();
        assert_eq!(report.method, PlanMethod::RuleBased);
    }

    #[tokio::test]
    async fn test_smart_priority_without_gateway_scores() {
        let mut store = TaskStore::new();
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();

        let planner = Planner::new(&mut store, &repo, &context, None);
        let due = today() + chrono::Duration::days(1);
        assert_eq!(
            planner.suggest_smart_priority("Submit report", Some(due)).await,
            Priority::High
        );
        assert_eq!(
            planner.suggest_smart_priority("Read article", None).await,
            Priority::Medium
        );
    }

    #[tokio::test]
    async fn test_smart_priority_parses_single_word() {
        let mut store = TaskStore::new();
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();
        let gateway = CannedGateway {
            subtasks: vec![],
            freeform: "HIGH.".to_string(),
        };

        let planner = Planner::new(&mut store, &repo, &context, Some(Arc::new(gateway)));
        assert_eq!(
            planner.suggest_smart_priority("anything", None).await,
            Priority::High
        );
    }

    #[tokio::test]
    async fn test_smart_priority_ai_error_degrades_to_medium() {
        let mut store = TaskStore::new();
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();

        let planner = Planner::new(&mut store, &repo, &context, Some(Arc::new(FailingGateway)));
        assert_eq!(
            planner.suggest_smart_priority("urgent thing", None).await,
            Priority::Medium
        );
    }

    #[tokio::test]
    async fn test_analyze_requires_configuration() {
        let (mut store, id) = store_with("Anything");
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();

        let planner = Planner::new(&mut store, &repo, &context, None);
        assert!(matches!(
            planner.analyze_task(id).await,
            Err(PlanError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_analyze_surfaces_gateway_error() {
        let (mut store, id) = store_with("Anything");
        let repo = MemoryRepository::new();
        let context = FixedProvider::empty();

        let planner = Planner::new(&mut store, &repo, &context, Some(Arc::new(FailingGateway)));
        assert!(matches!(
            planner.analyze_task(id).await,
            Err(PlanError::Ai(_))
        ));
    }
}
