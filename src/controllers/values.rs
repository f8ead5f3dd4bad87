//! Values controller
//!
//! Untyped JSON records mounted at `/api/values`.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::error::Outcome;
use crate::handler::handler_with_state;
use crate::middleware::{IsAuthorized, RequestLogger};
use crate::models::{ActionResult, RequestContext};
use crate::router::Controller;

/// Records stored as JSON objects, each with a numeric `id`.
#[derive(Debug, Default)]
pub struct ValueStore {
    values: RwLock<Vec<Value>>,
}

impl ValueStore {
    /// Records `{ "id": 1 }` through `{ "id": 5 }`.
    pub fn seeded() -> Self {
        Self {
            values: RwLock::new((1..=5).map(|id| json!({ "id": id })).collect()),
        }
    }
}

pub fn controller(store: Arc<ValueStore>) -> Controller {
    Controller::new("/api/values")
        .middleware(RequestLogger)
        .get("", handler_with_state(Arc::clone(&store), list_values))
        .get("/:id", handler_with_state(Arc::clone(&store), get_value))
        .post("", handler_with_state(Arc::clone(&store), create_value))
        .guard(IsAuthorized)
        .delete("/:id", handler_with_state(store, delete_value))
        .guard(IsAuthorized)
}

fn has_id(value: &Value, id: &str) -> bool {
    match (&value["id"], id.parse::<u64>()) {
        (Value::Number(n), Ok(id)) => n.as_u64() == Some(id),
        _ => false,
    }
}

/// One past the collection size or the highest live id, whichever is larger.
fn next_id(values: &[Value]) -> u64 {
    let highest = values
        .iter()
        .filter_map(|value| value["id"].as_u64())
        .max()
        .unwrap_or(0);
    highest.max(values.len() as u64) + 1
}

async fn list_values(store: Arc<ValueStore>, _ctx: RequestContext) -> Outcome {
    let values = store.values.read().await;
    Ok(Some(ActionResult::ok(Value::Array(values.clone()))))
}

async fn get_value(store: Arc<ValueStore>, ctx: RequestContext) -> Outcome {
    let id = ctx.param("id").unwrap_or_default();
    let values = store.values.read().await;
    Ok(Some(match values.iter().find(|v| has_id(v, id)) {
        Some(value) => ActionResult::ok(value.clone()),
        None => ActionResult::not_found(format!("Value with id {id} not found")),
    }))
}

async fn create_value(store: Arc<ValueStore>, ctx: RequestContext) -> Outcome {
    // Non-object bodies are stored as an empty record.
    let mut record = match ctx.body {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let mut values = store.values.write().await;
    record.insert("id".to_string(), json!(next_id(&values)));
    let record = Value::Object(record);
    values.push(record.clone());
    Ok(Some(ActionResult::created(record)))
}

async fn delete_value(store: Arc<ValueStore>, ctx: RequestContext) -> Outcome {
    let id = ctx.param("id").unwrap_or_default();
    let mut values = store.values.write().await;
    Ok(Some(match values.iter().position(|v| has_id(v, id)) {
        Some(index) => {
            values.remove(index);
            ActionResult::ok(json!({ "message": "Value deleted successfully" }))
        }
        None => ActionResult::not_found(format!("Value with id {id} not found")),
    }))
}
