#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use taskhub_core::api::{ApiRequest, ApiResponse, Transport, TransportError};

pub const BASE_URL: &str = "http://api.test/api";

/// Replays canned responses in order and records every request.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(ApiResponse::new(status, body)));
        self
    }

    pub fn fail(&self, error: TransportError) -> &Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn pending(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Failed("no scripted response".to_string())))
    }
}

pub fn task_json(id: u64, title: &str) -> String {
    format!(
        r#"{{"id":{id},"title":"{title}","description":"","attachment":null,"created_at":"2024-05-01T12:00:00Z","updated_at":"2024-05-01T12:00:00Z"}}"#
    )
}

pub fn task_list_json(tasks: &[(u64, &str)]) -> String {
    let items: Vec<String> = tasks
        .iter()
        .map(|(id, title)| task_json(*id, title))
        .collect();
    format!("[{}]", items.join(","))
}

pub const PROFILE_JSON: &str = r#"{"username":"ada","email":"ada@example.com","full_name":"Ada Lovelace","date_of_birth":"1815-12-10","address":"London","gender":"F","mobile_number":"555-0100","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-02T00:00:00Z"}"#;
