use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use maze::shared::requests::{
    CreateItemRequest, CreateNpcRequest, Credentials, GenerateMapRequest, LogoutRequest,
    SaveGameRequest, UpdateItemRequest, UpdateNpcRequest,
};
use maze::shared::responses::{
    CreateItemResponse, CreateNpcResponse, DeleteItemResponse, DeleteNpcResponse, FetchMapResponse,
    GenerateMapResponse, LoadGameResponse, LoginResponse, LogoutResponse, RegisterUserResponse,
    SaveGameResponse, UpdateItemResponse, UpdateNpcResponse,
};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::Server;

type ApiResult<T> = Result<Json<T>, ServiceError>;

/// `Json` whose rejections come back as `ServiceError` bodies.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ServiceError))]
struct ApiJson<T>(T);

/// `Path` whose rejections come back as `ServiceError` bodies.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ServiceError))]
struct ApiPath<T>(T);

pub fn router(server: Arc<Server>) -> Router {
    Router::new()
        .route("/map/generate", post(generate_map))
        .route("/map/:game_state_id/render", get(fetch_map))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/item/create", post(create_item))
        .route("/item/:item_id/update", put(update_item))
        .route("/item/:item_id/delete", delete(delete_item))
        .route("/npc/create", post(create_npc))
        .route("/npc/:npc_id/update", put(update_npc))
        .route("/npc/:npc_id/delete", delete(delete_npc))
        .route("/game/save", post(save_game))
        .route("/game/load/:game_state_id", get(load_game))
        .with_state(server)
}

async fn generate_map(
    State(server): State<Arc<Server>>,
    ApiJson(request): ApiJson<GenerateMapRequest>,
) -> ApiResult<GenerateMapResponse> {
    server.generator.generate(&request).await.map(Json)
}

async fn fetch_map(State(server): State<Arc<Server>>, ApiPath(game_state_id): ApiPath<Uuid>) -> ApiResult<FetchMapResponse> {
    server.render.fetch(game_state_id).await.map(Json)
}

async fn register(
    State(server): State<Arc<Server>>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> ApiResult<RegisterUserResponse> {
    server.auth.register(&credentials).await.map(Json)
}

async fn login(State(server): State<Arc<Server>>, ApiJson(credentials): ApiJson<Credentials>) -> ApiResult<LoginResponse> {
    server.auth.login(&credentials).await.map(Json)
}

async fn logout(State(server): State<Arc<Server>>, ApiJson(request): ApiJson<LogoutRequest>) -> Json<LogoutResponse> {
    Json(server.auth.logout(&request))
}

async fn create_item(
    State(server): State<Arc<Server>>,
    ApiJson(request): ApiJson<CreateItemRequest>,
) -> ApiResult<CreateItemResponse> {
    server.items.create(&request).await.map(Json)
}

async fn update_item(
    State(server): State<Arc<Server>>,
    ApiPath(item_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateItemRequest>,
) -> ApiResult<UpdateItemResponse> {
    server.items.update(item_id, &request).await.map(Json)
}

async fn delete_item(State(server): State<Arc<Server>>, ApiPath(item_id): ApiPath<Uuid>) -> ApiResult<DeleteItemResponse> {
    server.items.delete(item_id).await.map(Json)
}

async fn create_npc(
    State(server): State<Arc<Server>>,
    ApiJson(request): ApiJson<CreateNpcRequest>,
) -> ApiResult<CreateNpcResponse> {
    server.npcs.create(&request).await.map(Json)
}

async fn update_npc(
    State(server): State<Arc<Server>>,
    ApiPath(npc_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateNpcRequest>,
) -> ApiResult<UpdateNpcResponse> {
    server.npcs.update(npc_id, &request).await.map(Json)
}

async fn delete_npc(State(server): State<Arc<Server>>, ApiPath(npc_id): ApiPath<Uuid>) -> ApiResult<DeleteNpcResponse> {
    server.npcs.delete(npc_id).await.map(Json)
}

async fn save_game(
    State(server): State<Arc<Server>>,
    ApiJson(request): ApiJson<SaveGameRequest>,
) -> ApiResult<SaveGameResponse> {
    server.game.save(&request).await.map(Json)
}

async fn load_game(State(server): State<Arc<Server>>, ApiPath(game_state_id): ApiPath<Uuid>) -> ApiResult<LoadGameResponse> {
    server.game.load(game_state_id).await.map(Json)
}
