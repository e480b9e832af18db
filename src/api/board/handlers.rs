use actix_web::{
    HttpResponse, Responder, get, post,
    web::{Data, ServiceConfig, scope},
};
use actix_web_validator::{Json, Query};

use crate::board::BoardParams;
use super::dto::EventRequest;
use super::service::{BoardService, ServiceError};

#[get("")]
async fn get_board(
    service: Data<BoardService>,
    params: Query<BoardParams>,
) -> Result<impl Responder, ServiceError> {
    let response = service.view(&params)?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/counts")]
async fn get_counts(service: Data<BoardService>) -> Result<impl Responder, ServiceError> {
    let counts = service.counts()?;
    Ok(HttpResponse::Ok().json(counts))
}

#[post("/events")]
async fn post_event(
    service: Data<BoardService>,
    request: Json<EventRequest>,
) -> Result<impl Responder, ServiceError> {
    let response = service.apply_event(request.into_inner().event)?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/refresh")]
async fn post_refresh(service: Data<BoardService>) -> Result<impl Responder, ServiceError> {
    let response = service.refresh().await?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn board_config(config: &mut ServiceConfig) {
    config.service(
        scope("board")
            .service(get_board)
            .service(get_counts)
            .service(post_event)
            .service(post_refresh),
    );
}
