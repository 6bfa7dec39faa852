use actix_web::{Responder, get, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::respond;
use crate::services::notifications;

#[derive(Deserialize)]
struct NotificationQueryParams {
    #[serde(default)]
    unread: bool,
}

#[get("/notifications")]
pub async fn list_notifications(
    params: web::Query<NotificationQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(notifications::list_notifications(
        repo.get_ref(),
        &user,
        params.unread,
    ))
}

#[post("/notifications/read-all")]
pub async fn read_all(user: AuthenticatedUser, repo: web::Data<DieselRepository>) -> impl Responder {
    respond(
        notifications::mark_all_read(repo.get_ref(), &user)
            .map(|updated| json!({ "updated": updated })),
    )
}

#[post("/notifications/{notification_id}/read")]
pub async fn read_one(
    notification_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(notifications::mark_read(
        repo.get_ref(),
        &user,
        notification_id.into_inner(),
    ))
}
