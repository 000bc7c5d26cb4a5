//! 测试用的内存存储：记录每次调用，支持注入失败，并统计同时进行中的请求数
#![allow(dead_code)]

use async_trait::async_trait;
use lab_result_entry::error::{AppError, AppResult};
use lab_result_entry::models::{
    ExamType, ParameterDefinition, ResultPayload, ResultRecord, Template, TemplateDetail,
};
use lab_result_entry::{ParameterStore, TemplateCatalog};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// 存储端收到的调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Create { exam_id: String, parameter_name: String },
    Update(String),
    Delete(String),
    Complete(String),
}

#[derive(Default)]
struct State {
    results: Vec<ResultRecord>,
    next_id: u64,
    completed: HashSet<String>,
    calls: Vec<Call>,
    fail_creates: HashSet<String>,
    fail_updates: HashSet<String>,
    fail_deletes: HashSet<String>,
    fail_complete: bool,
    /// 接下来每次 list 是否失败，用完后看 `list_down`
    list_script: VecDeque<bool>,
    list_down: bool,
    in_flight: usize,
    max_in_flight: usize,
    exam_types: Vec<ExamType>,
    templates: Vec<Template>,
    details: HashMap<String, Vec<ParameterDefinition>>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 预置一条结果，返回分配的 ID
    pub fn seed_result(&self, exam_id: &str, name: &str, value: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let result_id = format!("r{}", state.next_id);
        state.results.push(ResultRecord {
            result_id: Some(result_id.clone()),
            exam_id: exam_id.to_string(),
            parameter_name: name.to_string(),
            value: value.to_string(),
            unit: "mg/dL".to_string(),
            reference_range: String::new(),
        });
        result_id
    }

    pub fn seed_template(
        &self,
        exam_type_id: &str,
        exam_type_name: &str,
        template_id: &str,
        parameters: Vec<ParameterDefinition>,
    ) {
        let mut state = self.state.lock().unwrap();
        if !state.exam_types.iter().any(|t| t.id == exam_type_id) {
            state.exam_types.push(ExamType {
                id: exam_type_id.to_string(),
                name: exam_type_name.to_string(),
            });
        }
        state.templates.push(Template {
            template_id: template_id.to_string(),
            name: format!("{} 模板", exam_type_name),
            description: None,
            exam_type_id: exam_type_id.to_string(),
        });
        state.details.insert(template_id.to_string(), parameters);
    }

    pub fn fail_create(&self, parameter_name: &str) {
        self.state.lock().unwrap().fail_creates.insert(parameter_name.to_string());
    }

    pub fn fail_update(&self, result_id: &str) {
        self.state.lock().unwrap().fail_updates.insert(result_id.to_string());
    }

    pub fn fail_delete(&self, result_id: &str) {
        self.state.lock().unwrap().fail_deletes.insert(result_id.to_string());
    }

    pub fn fail_complete(&self) {
        self.state.lock().unwrap().fail_complete = true;
    }

    /// 再成功 `remaining` 次之后，所有 list 请求都返回 503
    pub fn fail_list_after(&self, remaining: usize) {
        let mut state = self.state.lock().unwrap();
        state.list_script = std::iter::repeat(false).take(remaining).collect();
        state.list_down = true;
    }

    /// 再成功 `remaining` 次之后，只让下一次 list 失败
    pub fn fail_list_once_after(&self, remaining: usize) {
        let mut state = self.state.lock().unwrap();
        state.list_script = std::iter::repeat(false).take(remaining).collect();
        state.list_script.push_back(true);
        state.list_down = false;
    }

    pub fn restore_list(&self) {
        let mut state = self.state.lock().unwrap();
        state.list_script.clear();
        state.list_down = false;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// 除 List 以外的调用
    pub fn write_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::List(_)))
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    pub fn results(&self, exam_id: &str) -> Vec<ResultRecord> {
        self.state
            .lock()
            .unwrap()
            .results
            .iter()
            .filter(|r| r.exam_id == exam_id)
            .cloned()
            .collect()
    }

    pub fn result_named(&self, exam_id: &str, name: &str) -> Option<ResultRecord> {
        self.results(exam_id)
            .into_iter()
            .find(|r| r.parameter_name == name)
    }

    pub fn is_completed(&self, exam_id: &str) -> bool {
        self.state.lock().unwrap().completed.contains(exam_id)
    }

    /// 记录调用并让出执行权，模拟一次真实的异步请求
    async fn begin(&self, call: Call) {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }
        tokio::task::yield_now().await;
        self.state.lock().unwrap().in_flight -= 1;
    }
}

fn injected(endpoint: &str) -> AppError {
    AppError::bad_response(endpoint, 500, Some("injected failure".to_string()))
}

#[async_trait]
impl ParameterStore for MemoryStore {
    async fn list_results(&self, exam_id: &str) -> AppResult<Vec<ResultRecord>> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::List(exam_id.to_string()));
            let fail = match state.list_script.pop_front() {
                Some(fail) => fail,
                None => state.list_down,
            };
            if fail {
                return Err(AppError::bad_response("list", 503, None));
            }
        }
        Ok(self.results(exam_id))
    }

    async fn create_result(&self, exam_id: &str, payload: &ResultPayload) -> AppResult<ResultRecord> {
        self.begin(Call::Create {
            exam_id: exam_id.to_string(),
            parameter_name: payload.parameter_name.clone(),
        })
        .await;

        let mut state = self.state.lock().unwrap();
        if state.fail_creates.contains(&payload.parameter_name) {
            return Err(injected("create"));
        }
        state.next_id += 1;
        let record = ResultRecord {
            result_id: Some(format!("r{}", state.next_id)),
            exam_id: exam_id.to_string(),
            parameter_name: payload.parameter_name.clone(),
            value: payload.value.clone(),
            unit: payload.unit.clone(),
            reference_range: payload.reference_range.clone(),
        };
        state.results.push(record.clone());
        Ok(record)
    }

    async fn update_result(&self, result_id: &str, payload: &ResultPayload) -> AppResult<ResultRecord> {
        self.begin(Call::Update(result_id.to_string())).await;

        let mut state = self.state.lock().unwrap();
        if state.fail_updates.contains(result_id) {
            return Err(injected("update"));
        }
        let record = state
            .results
            .iter_mut()
            .find(|r| r.result_id.as_deref() == Some(result_id))
            .ok_or_else(|| AppError::bad_response("update", 404, None))?;
        record.value = payload.value.clone();
        record.unit = payload.unit.clone();
        record.reference_range = payload.reference_range.clone();
        Ok(record.clone())
    }

    async fn delete_result(&self, result_id: &str) -> AppResult<()> {
        self.begin(Call::Delete(result_id.to_string())).await;

        let mut state = self.state.lock().unwrap();
        if state.fail_deletes.contains(result_id) {
            return Err(injected("delete"));
        }
        state
            .results
            .retain(|r| r.result_id.as_deref() != Some(result_id));
        Ok(())
    }

    async fn mark_exam_completed(&self, exam_id: &str) -> AppResult<()> {
        self.begin(Call::Complete(exam_id.to_string())).await;

        let mut state = self.state.lock().unwrap();
        if state.fail_complete {
            return Err(injected("complete"));
        }
        state.completed.insert(exam_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl TemplateCatalog for MemoryStore {
    async fn list_exam_types(&self) -> AppResult<Vec<ExamType>> {
        Ok(self.state.lock().unwrap().exam_types.clone())
    }

    async fn list_templates_for_exam_type(&self, exam_type_id: &str) -> AppResult<Vec<Template>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .templates
            .iter()
            .filter(|t| t.exam_type_id == exam_type_id)
            .cloned()
            .collect())
    }

    async fn get_template_detail(&self, template_id: &str) -> AppResult<TemplateDetail> {
        let state = self.state.lock().unwrap();
        let parameters = state
            .details
            .get(template_id)
            .cloned()
            .ok_or_else(|| AppError::bad_response("template", 404, None))?;
        Ok(TemplateDetail {
            template_id: template_id.to_string(),
            parameters,
        })
    }
}

pub fn param(name: &str) -> ParameterDefinition {
    ParameterDefinition::new(name, "g/dL")
}
