//! Cars controller
//!
//! In-memory car collection mounted at `/api/cars`.

use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{HandlerError, Outcome};
use crate::handler::handler_with_state;
use crate::middleware::{IsAuthorized, RequestLogger};
use crate::models::{ActionResult, RequestContext};
use crate::router::Controller;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: u64,
    pub make: String,
    pub model: String,
}

/// Body accepted by `POST /api/cars`. Missing fields are left empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NewCar {
    make: String,
    model: String,
}

/// Backing collection shared by the car handlers.
#[derive(Debug, Default)]
pub struct CarStore {
    cars: RwLock<Vec<Car>>,
}

impl CarStore {
    pub fn new(cars: Vec<Car>) -> Self {
        Self {
            cars: RwLock::new(cars),
        }
    }

    /// The five cars every fresh server starts with.
    pub fn seeded() -> Self {
        let seed = [
            (1, "Toyota", "Corolla"),
            (2, "Ford", "F150"),
            (3, "Chevy", "Silverado"),
            (4, "Chevy", "Tahoe"),
            (5, "Ford", "Fusion"),
        ];
        Self::new(
            seed.into_iter()
                .map(|(id, make, model)| Car {
                    id,
                    make: make.to_string(),
                    model: model.to_string(),
                })
                .collect(),
        )
    }

    pub async fn len(&self) -> usize {
        self.cars.read().await.len()
    }
}

/// Builds the `/api/cars` controller over `store`.
pub fn controller(store: Arc<CarStore>) -> Controller {
    Controller::new("/api/cars")
        .middleware(RequestLogger)
        .get("", handler_with_state(Arc::clone(&store), list_cars))
        .describe("List cars, optionally filtered by ?make=")
        .get("/:id", handler_with_state(Arc::clone(&store), get_car))
        .describe("Get a car by id")
        .get("/:id/bids", handler_with_state(Arc::clone(&store), get_car_bids))
        .describe("Get a car's bids")
        .post("", handler_with_state(Arc::clone(&store), create_car))
        .guard(IsAuthorized)
        .describe("Create a car")
        .delete("/:id", handler_with_state(store, delete_car))
        .guard(IsAuthorized)
        .describe("Delete a car")
}

async fn list_cars(store: Arc<CarStore>, ctx: RequestContext) -> Outcome {
    let cars = store.cars.read().await;
    let make = ctx.query.get("make");
    let selected: Vec<&Car> = cars
        .iter()
        .filter(|car| make.map_or(true, |make| &car.make == make))
        .collect();
    let body = serde_json::to_value(selected).context("serializing cars")?;
    Ok(Some(ActionResult::ok(body)))
}

async fn get_car(store: Arc<CarStore>, ctx: RequestContext) -> Outcome {
    let id = ctx.param("id").unwrap_or_default();
    let cars = store.cars.read().await;
    let Some(car) = parse_id(id).and_then(|id| cars.iter().find(|car| car.id == id)) else {
        return Ok(Some(ActionResult::not_found(format!("Car with id {id} not found"))));
    };
    let body = serde_json::to_value(car).context("serializing car")?;
    Ok(Some(ActionResult::ok(body)))
}

async fn get_car_bids(_store: Arc<CarStore>, _ctx: RequestContext) -> Outcome {
    Ok(Some(ActionResult::ok(json!([
        { "id": 1, "amount": 1000 },
        { "id": 2, "amount": 2000 },
    ]))))
}

async fn create_car(store: Arc<CarStore>, ctx: RequestContext) -> Outcome {
    let new_car: NewCar = serde_json::from_value(ctx.body).unwrap_or_else(|err| {
        debug!(error = %err, "car body has the wrong shape; storing an empty car");
        NewCar::default()
    });

    let mut cars = store.cars.write().await;
    let car = Car {
        id: next_id(&cars),
        make: new_car.make,
        model: new_car.model,
    };
    cars.push(car.clone());

    let body = serde_json::to_value(car).context("serializing car")?;
    Ok(Some(ActionResult::created(body)))
}

async fn delete_car(store: Arc<CarStore>, ctx: RequestContext) -> Outcome {
    ctx.require_identity()?;
    let id = ctx.param("id").unwrap_or_default();

    let mut cars = store.cars.write().await;
    let index = parse_id(id).and_then(|id| cars.iter().position(|car| car.id == id));
    match index {
        Some(index) => {
            cars.remove(index);
            Ok(Some(ActionResult::ok(json!({ "message": "Car deleted successfully" }))))
        }
        None => Err(HandlerError::not_found(format!("Car with id {id} not found"))),
    }
}

/// One past the collection size or the highest live id, whichever is larger.
fn next_id(cars: &[Car]) -> u64 {
    let highest = cars.iter().map(|car| car.id).max().unwrap_or(0);
    highest.max(cars.len() as u64) + 1
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;
    use axum::http::{Method, StatusCode};

    fn ctx_with_id(method: Method, id: &str) -> RequestContext {
        let mut ctx = RequestContext::new(method, format!("/api/cars/{id}"));
        ctx.params.insert("id".to_string(), id.to_string());
        ctx
    }

    #[tokio::test]
    async fn test_list_filters_by_make() {
        let store = Arc::new(CarStore::seeded());
        let mut ctx = RequestContext::new(Method::GET, "/api/cars");
        ctx.query.insert("make".to_string(), "Chevy".to_string());

        let result = list_cars(store, ctx).await.unwrap().unwrap();

        let cars: Vec<Car> = serde_json::from_value(result.body().cloned().unwrap()).unwrap();
        assert_eq!(cars.len(), 2);
        assert!(cars.iter().all(|car| car.make == "Chevy"));
    }

    #[tokio::test]
    async fn test_get_car_found_and_missing() {
        let store = Arc::new(CarStore::seeded());

        let found = get_car(Arc::clone(&store), ctx_with_id(Method::GET, "2"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.body().unwrap()["model"], "F150");

        let missing = get_car(Arc::clone(&store), ctx_with_id(Method::GET, "99"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.error_message(), Some("Car with id 99 not found"));

        let garbage = get_car(store, ctx_with_id(Method::GET, "abc"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(garbage.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let store = Arc::new(CarStore::seeded());
        let mut ctx = RequestContext::new(Method::POST, "/api/cars");
        ctx.body = json!({ "make": "Honda", "model": "Civic" });

        let result = create_car(Arc::clone(&store), ctx).await.unwrap().unwrap();

        assert_eq!(result.status_code(), StatusCode::CREATED);
        assert_eq!(
            result.body().unwrap(),
            &json!({ "id": 6, "make": "Honda", "model": "Civic" })
        );
        assert_eq!(store.len().await, 6);
    }

    #[tokio::test]
    async fn test_create_accepts_empty_body() {
        let store = Arc::new(CarStore::seeded());
        let ctx = RequestContext::new(Method::POST, "/api/cars");

        let result = create_car(Arc::clone(&store), ctx).await.unwrap().unwrap();

        assert_eq!(result.status_code(), StatusCode::CREATED);
        assert_eq!(
            result.body().unwrap(),
            &json!({ "id": 6, "make": "", "model": "" })
        );
        assert_eq!(store.len().await, 6);
    }

    #[tokio::test]
    async fn test_create_with_wrong_shape_stores_empty_car() {
        let store = Arc::new(CarStore::seeded());
        let mut ctx = RequestContext::new(Method::POST, "/api/cars");
        ctx.body = json!([1, 2]);

        let result = create_car(store, ctx).await.unwrap().unwrap();

        assert_eq!(result.status_code(), StatusCode::CREATED);
        assert_eq!(result.body().unwrap()["id"], 6);
    }

    #[tokio::test]
    async fn test_create_after_delete_does_not_reuse_live_id() {
        let store = Arc::new(CarStore::seeded());
        let mut delete = ctx_with_id(Method::DELETE, "1");
        delete.identity = Some(Identity {
            token: "t".to_string(),
        });
        delete_car(Arc::clone(&store), delete).await.unwrap().unwrap();

        let mut create = RequestContext::new(Method::POST, "/api/cars");
        create.body = json!({ "make": "Honda", "model": "Civic" });
        let created = create_car(Arc::clone(&store), create).await.unwrap().unwrap();
        assert_eq!(created.body().unwrap()["id"], 6);

        let fetched = get_car(store, ctx_with_id(Method::GET, "6"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.body().unwrap()["model"], "Civic");
    }

    #[tokio::test]
    async fn test_delete_requires_identity() {
        let store = Arc::new(CarStore::seeded());

        let err = delete_car(Arc::clone(&store), ctx_with_id(Method::DELETE, "1"))
            .await
            .unwrap_err();
        assert_eq!(err.into_action_result().status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(store.len().await, 5);

        let mut ctx = ctx_with_id(Method::DELETE, "1");
        ctx.identity = Some(Identity {
            token: "t".to_string(),
        });
        let result = delete_car(Arc::clone(&store), ctx).await.unwrap().unwrap();
        assert_eq!(result.status_code(), StatusCode::OK);
        assert_eq!(store.len().await, 4);
    }

    #[test]
    fn test_controller_routes() {
        let controller = controller(Arc::new(CarStore::default()));
        assert_eq!(controller.base_path(), "/api/cars");
        assert_eq!(controller.routes().len(), 5);
        assert_eq!(controller.controller_middleware()[0].name(), "requestLogger");
    }
}
