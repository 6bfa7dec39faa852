use actix_web::{Responder, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::forms::jobs::{JobForm, JobRangeParams, JobStatusForm};
use crate::repository::DieselRepository;
use crate::routes::{Dispatcher, created, respond};
use crate::services::jobs;

#[get("/jobs")]
pub async fn list_jobs(
    params: web::Query<JobRangeParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(jobs::list_jobs(repo.get_ref(), &user, params.into_inner()))
}

#[post("/jobs")]
pub async fn create_job(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    events: web::Data<Dispatcher>,
    form: web::Json<JobForm>,
) -> impl Responder {
    created(jobs::create_job(
        repo.get_ref(),
        events.get_ref(),
        &user,
        form.into_inner(),
    ))
}

#[get("/jobs/{job_id}")]
pub async fn show_job(
    job_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(jobs::get_job(repo.get_ref(), &user, job_id.into_inner()))
}

#[post("/jobs/{job_id}/status")]
pub async fn change_status(
    job_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<JobStatusForm>,
) -> impl Responder {
    respond(jobs::change_job_status(
        repo.get_ref(),
        &user,
        job_id.into_inner(),
        form.into_inner(),
    ))
}
