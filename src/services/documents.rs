//! Claim documents drafted through the language-model gateway.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::json;

use crate::SERVICE_ACCESS_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::claim::Claim;
use crate::domain::claim_event::{ClaimEvent, ClaimEventType, NewClaimEvent};
use crate::domain::client::Client;
use crate::domain::document::DocumentKind;
use crate::domain::estimate::Estimate;
use crate::domain::organization::Branding;
use crate::domain::property::Property;
use crate::domain::types::{ClaimId, OrgId};
use crate::forms::documents::{GenerateDocumentForm, GenerateDocumentPayload};
use crate::integrations::ai_gateway::{DocumentGenerator, GatewayError};
use crate::repository::{
    ClaimEventWriter, ClaimReader, ClientReader, EstimateReader, MemberReader, MemberWriter,
    OrganizationReader, PropertyReader,
};
use crate::services::claims::load_visible_claim;
use crate::services::members::current_member;
use crate::services::organizations::get_branding;
use crate::services::{ServiceError, ServiceResult};

#[derive(Debug, Serialize)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    pub title: String,
    pub content: String,
    pub model: String,
    pub event: ClaimEvent,
}

const SYSTEM_PROMPT: &str = "You draft documents for a roofing and storm restoration \
contractor. Write in a professional tone, never invent facts that are not in the claim \
data and leave placeholders in square brackets for anything missing.";

fn build_prompt(
    kind: DocumentKind,
    claim: &Claim,
    client: Option<&Client>,
    property: Option<&Property>,
    estimates: &[Estimate],
    branding: &Branding,
    extra: Option<&str>,
) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "{}", kind.instructions());
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Contractor: {}", branding.company_name);
    if let Some(license) = &branding.license_number {
        let _ = writeln!(prompt, "License: {license}");
    }
    if let Some(phone) = &branding.phone {
        let _ = writeln!(prompt, "Phone: {phone}");
    }

    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Claim number: {}", claim.claim_number);
    let _ = writeln!(prompt, "Carrier: {}", claim.carrier);
    if let Some(policy) = &claim.policy_number {
        let _ = writeln!(prompt, "Policy: {policy}");
    }
    let _ = writeln!(prompt, "Status: {}", claim.status);
    let _ = writeln!(prompt, "Damage: {}", claim.damage_type);
    if let Some(date) = claim.date_of_loss {
        let _ = writeln!(prompt, "Date of loss: {date}");
    }
    if let Some(description) = &claim.description {
        let _ = writeln!(prompt, "Description: {description}");
    }
    if let Some(amount) = claim.approved_amount {
        let _ = writeln!(prompt, "Approved by carrier: {}", amount);
    }

    if let Some(client) = client {
        let _ = writeln!(prompt, "Homeowner: {}", client.name);
    }
    if let Some(property) = property {
        let _ = writeln!(
            prompt,
            "Property: {}, {}, {} {}",
            property.address_line, property.city, property.state, property.postal_code
        );
        if let Some(roof) = &property.roof_type {
            let _ = writeln!(prompt, "Roof type: {roof}");
        }
    }

    for estimate in estimates {
        let _ = writeln!(
            prompt,
            "Estimate \"{}\" ({}): total {}",
            estimate.title,
            estimate.status,
            estimate.total
        );
        for item in &estimate.items {
            let _ = writeln!(
                prompt,
                "  - {} x {}: {}",
                item.quantity,
                item.description,
                item.total
            );
        }
    }

    if let Some(extra) = extra {
        let _ = writeln!(prompt);
        let _ = writeln!(prompt, "Additional instructions: {extra}");
    }

    prompt
}

/// Drafts a document for the claim and stores it on the claim timeline.
pub async fn generate_document<R>(
    repo: &R,
    generator: &dyn DocumentGenerator,
    user: &AuthenticatedUser,
    claim_id: i32,
    form: GenerateDocumentForm,
) -> ServiceResult<GeneratedDocument>
where
    R: ClaimReader
        + ClientReader
        + PropertyReader
        + EstimateReader
        + OrganizationReader
        + MemberReader
        + MemberWriter
        + ClaimEventWriter
        + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = GenerateDocumentPayload::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;
    let claim = load_visible_claim(repo, user, ClaimId::new(claim_id)?)?;

    let client = repo.get_client_by_id(claim.client_id, org_id)?;
    let property = match claim.property_id {
        Some(property_id) => repo.get_property_by_id(property_id, org_id)?,
        None => None,
    };
    let estimates = repo.list_estimates(claim.id, org_id)?;
    let branding = get_branding(repo, user)?;

    let prompt = build_prompt(
        payload.kind,
        &claim,
        client.as_ref(),
        property.as_ref(),
        &estimates,
        &branding,
        payload.instructions.as_deref(),
    );

    let content = generator
        .complete(SYSTEM_PROMPT, &prompt)
        .await
        .map_err(|err| {
            log::error!("Document generation for claim {} failed: {err}", claim.id);
            match err {
                GatewayError::NotConfigured => ServiceError::Unavailable(err.to_string()),
                other => ServiceError::External(other.to_string()),
            }
        })?;

    let author = current_member(repo, user)?;
    let title = format!("{} for claim {}", payload.kind.title(), claim.claim_number);
    let model = generator.model().to_string();

    let event = repo
        .create_claim_event(
            &NewClaimEvent::new(
                claim.id,
                author.id,
                ClaimEventType::GeneratedDocument,
                json!({
                    "kind": payload.kind,
                    "title": &title,
                    "content": &content,
                    "model": &model,
                }),
            ),
            org_id,
        )
        .map_err(|err| {
            log::error!("Failed to store generated document for claim {}: {err}", claim.id);
            err
        })?;

    Ok(GeneratedDocument {
        kind: payload.kind,
        title,
        content,
        model,
        event,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::claim::ClaimStatus;
    use crate::domain::types::ClaimEventId;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        ORG, sample_claim, sample_client, sample_member, sample_organization, sample_property,
        ts, viewer_user,
    };

    struct FakeGenerator {
        reply: Result<String, GatewayError>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        fn replying(reply: Result<String, GatewayError>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DocumentGenerator for FakeGenerator {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, GatewayError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(GatewayError::NotConfigured) => Err(GatewayError::NotConfigured),
                Err(other) => Err(GatewayError::Http(other.to_string())),
            }
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    fn repo_with_claim() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Filed))));
        repo.expect_get_client_by_id()
            .returning(|id, _| Ok(Some(sample_client(id.get()))));
        repo.expect_get_property_by_id()
            .returning(|id, _| Ok(Some(sample_property(id.get(), 1, "TX"))));
        repo.expect_list_estimates().returning(|_, _| Ok(vec![]));
        repo.expect_get_branding().returning(|_| Ok(None));
        repo.expect_get_organization()
            .returning(|_| Ok(Some(sample_organization())));
        repo
    }

    fn form() -> GenerateDocumentForm {
        GenerateDocumentForm {
            kind: "SupplementRequest".to_string(),
            instructions: Some("Mention drip edge".to_string()),
        }
    }

    #[actix_web::test]
    async fn generated_document_is_stored_on_timeline() {
        let mut repo = repo_with_claim();
        repo.expect_get_member_by_email()
            .returning(|email, _| Ok(Some(sample_member(2, email.as_str()))));
        repo.expect_create_claim_event()
            .withf(|event, org_id| {
                org_id.get() == ORG
                    && event.event_type == ClaimEventType::GeneratedDocument
                    && event.event_data["model"] == "test-model"
                    && event.event_data["content"] == "Dear adjuster"
            })
            .times(1)
            .returning(|event, _| {
                Ok(ClaimEvent {
                    id: ClaimEventId::new(30).unwrap(),
                    claim_id: event.claim_id,
                    member_id: event.member_id,
                    event_type: event.event_type.clone(),
                    event_data: event.event_data.clone(),
                    created_at: ts(11),
                })
            });
        let generator = FakeGenerator::replying(Ok("Dear adjuster".to_string()));

        let document = generate_document(&repo, &generator, &viewer_user(), 7, form())
            .await
            .unwrap();

        assert_eq!(document.title, "Supplement request for claim CLM-7");
        assert_eq!(document.event.id.get(), 30);

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Claim number: CLM-7"));
        assert!(prompts[0].contains("Contractor: Summit Roofing"));
        assert!(prompts[0].contains("Plano, TX 75023"));
        assert!(prompts[0].contains("Mention drip edge"));
    }

    #[actix_web::test]
    async fn unconfigured_gateway_is_unavailable() {
        let mut repo = repo_with_claim();
        repo.expect_create_claim_event().times(0);
        let generator = FakeGenerator::replying(Err(GatewayError::NotConfigured));

        let result = generate_document(&repo, &generator, &viewer_user(), 7, form()).await;
        assert!(matches!(result, Err(ServiceError::Unavailable(_))));
    }

    #[actix_web::test]
    async fn gateway_failure_is_external() {
        let mut repo = repo_with_claim();
        repo.expect_create_claim_event().times(0);
        let generator = FakeGenerator::replying(Err(GatewayError::Http("timeout".into())));

        let result = generate_document(&repo, &generator, &viewer_user(), 7, form()).await;
        assert!(matches!(result, Err(ServiceError::External(_))));
    }
}
