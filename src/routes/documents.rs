use actix_web::{Responder, post, web};

use crate::auth::AuthenticatedUser;
use crate::forms::documents::GenerateDocumentForm;
use crate::integrations::ai_gateway::GatewayClient;
use crate::repository::DieselRepository;
use crate::routes::created;
use crate::services::documents;

#[post("/claims/{claim_id}/documents")]
pub async fn generate(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<GatewayClient>,
    form: web::Json<GenerateDocumentForm>,
) -> impl Responder {
    created(
        documents::generate_document(
            repo.get_ref(),
            gateway.get_ref(),
            &user,
            claim_id.into_inner(),
            form.into_inner(),
        )
        .await,
    )
}
